//! Append-only registry of proxy accounts.

use std::collections::BTreeMap;

use alloy_primitives::Address;
use tracing::info;

use crate::{
    account::ProxyAccount, errors::GuardError, guard::AccessGuard, utils::address::derive_address,
};

/// Creation record, one per proxy, in creation order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountCreated {
    pub owner: Address,
    pub proxy: Address,
    pub protocol_tag: Option<String>,
    pub sequence_id: u64,
}

#[derive(Clone, Debug)]
pub struct AccountFactory {
    address: Address,
    guard: Address,
    /// owner => proxies in creation order
    accounts: BTreeMap<Address, Vec<Address>>,
    proxies: BTreeMap<Address, ProxyAccount>,
    next_id: u64,
    events: Vec<AccountCreated>,
}

impl AccountFactory {
    pub fn new(address: Address, guard: Address) -> Self {
        Self {
            address,
            guard,
            accounts: BTreeMap::new(),
            proxies: BTreeMap::new(),
            next_id: 1,
            events: Vec::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn guard(&self) -> Address {
        self.guard
    }

    /// Create a proxy for `owner`, bind it to the guard and register its owner there.
    ///
    /// The guard must have this factory bound; otherwise nothing is created.
    pub fn create_account(
        &mut self,
        guard: &mut AccessGuard,
        owner: Address,
        protocol_tag: Option<String>,
    ) -> Result<ProxyAccount, GuardError> {
        let sequence_id = self.next_id;
        let proxy = ProxyAccount::new(derive_address(self.address, sequence_id), self.guard);
        guard.register_proxy(self.address, proxy.address(), owner)?;

        self.next_id += 1;
        self.accounts.entry(owner).or_default().push(proxy.address());
        self.proxies.insert(proxy.address(), proxy);
        info!(
            %owner,
            proxy = %proxy.address(),
            sequence_id,
            tag = protocol_tag.as_deref(),
            "account created"
        );
        self.events.push(AccountCreated {
            owner,
            proxy: proxy.address(),
            protocol_tag,
            sequence_id,
        });
        Ok(proxy)
    }

    /// Proxies ever created for `owner`; later ownership changes do not move them.
    pub fn accounts_count(&self, owner: Address) -> usize {
        self.accounts.get(&owner).map_or(0, Vec::len)
    }

    pub fn accounts(&self, owner: Address, index: usize) -> Option<Address> {
        self.accounts.get(&owner).and_then(|list| list.get(index)).copied()
    }

    pub fn proxy(&self, address: Address) -> Option<ProxyAccount> {
        self.proxies.get(&address).copied()
    }

    pub fn events(&self) -> &[AccountCreated] {
        &self.events
    }
}
