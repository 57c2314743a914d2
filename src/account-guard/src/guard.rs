//! Global permission registry shared by every proxy account.
//!
//! The guard answers two questions for a proxy: *who* may drive it (its owner plus any
//! delegates the owner or a delegate has permitted) and *where* it may call (two independent
//! target allowlists, one per execution mode). Allowlists belong to a single administrative
//! owner; per-proxy state belongs to whoever can call that proxy.

use std::collections::{BTreeMap, BTreeSet};

use alloy_primitives::Address;
use tracing::{debug, info, warn};

use crate::errors::GuardError;

#[derive(Clone, Debug)]
pub struct AccessGuard {
    address: Address,
    /// Administrative owner of the allowlists.
    owner: Address,
    /// Factory allowed to register new proxies; bound once.
    factory: Option<Address>,
    /// proxy => owner
    owners: BTreeMap<Address, Address>,
    /// (proxy, delegate). Owners are never stored here.
    permits: BTreeSet<(Address, Address)>,
    whitelist_execute: BTreeSet<Address>,
    whitelist_send: BTreeSet<Address>,
}

impl AccessGuard {
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            address,
            owner,
            factory: None,
            owners: BTreeMap::new(),
            permits: BTreeSet::new(),
            whitelist_execute: BTreeSet::new(),
            whitelist_send: BTreeSet::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// The administrative owner.
    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn factory(&self) -> Option<Address> {
        self.factory
    }

    pub fn owner_of(&self, proxy: Address) -> Option<Address> {
        self.owners.get(&proxy).copied()
    }

    // ── Administration ──────────────────────────────────────────

    pub fn set_whitelist(
        &mut self,
        caller: Address,
        target: Address,
        allowed: bool,
    ) -> Result<(), GuardError> {
        self.only_owner(caller)?;
        toggle(&mut self.whitelist_execute, target, allowed);
        info!(%target, allowed, mode = "execute", "whitelist updated");
        Ok(())
    }

    pub fn set_whitelist_send(
        &mut self,
        caller: Address,
        target: Address,
        allowed: bool,
    ) -> Result<(), GuardError> {
        self.only_owner(caller)?;
        toggle(&mut self.whitelist_send, target, allowed);
        info!(%target, allowed, mode = "send", "whitelist updated");
        Ok(())
    }

    /// Hand the allowlists to a new administrative owner.
    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), GuardError> {
        self.only_owner(caller)?;
        info!(previous = %self.owner, %new_owner, "guard ownership transferred");
        self.owner = new_owner;
        Ok(())
    }

    /// Bind the registering factory. The first caller wins; there is no way to rebind.
    pub fn initialize_factory(&mut self, caller: Address) -> Result<(), GuardError> {
        if self.factory.is_some() {
            return Err(GuardError::FactoryAlreadyInitialized);
        }
        self.factory = Some(caller);
        info!(factory = %caller, "factory bound");
        Ok(())
    }

    /// Record the owner of a freshly created proxy. Factory only.
    pub fn register_proxy(
        &mut self,
        caller: Address,
        proxy: Address,
        owner: Address,
    ) -> Result<(), GuardError> {
        if self.factory != Some(caller) {
            warn!(%caller, %proxy, "proxy registration by non-factory rejected");
            return Err(GuardError::Unauthorized { caller });
        }
        if self.owners.contains_key(&proxy) {
            return Err(GuardError::ProxyAlreadyRegistered { proxy });
        }
        self.owners.insert(proxy, owner);
        info!(%proxy, %owner, "proxy registered");
        Ok(())
    }

    // ── Per-proxy permissions ───────────────────────────────────

    /// Grant or revoke `identity`'s calling rights on `proxy`.
    ///
    /// The caller must itself be able to call `proxy`. The owner's own right is implicit:
    /// revoking it fails, granting it is a no-op.
    pub fn permit(
        &mut self,
        caller: Address,
        identity: Address,
        proxy: Address,
        allowed: bool,
    ) -> Result<(), GuardError> {
        if !self.can_call(proxy, caller) {
            warn!(%caller, %proxy, "permit by non-authorized caller rejected");
            return Err(GuardError::Unauthorized { caller });
        }
        if self.owners.get(&proxy) == Some(&identity) {
            if !allowed {
                return Err(GuardError::CannotDenyOwner { proxy });
            }
            debug!(%proxy, "permit for owner is implicit");
            return Ok(());
        }
        if allowed {
            self.permits.insert((proxy, identity));
            info!(%proxy, delegate = %identity, by = %caller, "permission granted");
        } else {
            self.permits.remove(&(proxy, identity));
            info!(%proxy, delegate = %identity, by = %caller, "permission revoked");
        }
        Ok(())
    }

    /// Replace the owner of `proxy`. Existing delegate permits are left in place.
    pub fn change_owner(
        &mut self,
        caller: Address,
        new_owner: Address,
        proxy: Address,
    ) -> Result<(), GuardError> {
        match self.owners.get_mut(&proxy) {
            Some(owner) if *owner == caller => {
                *owner = new_owner;
            }
            _ => return Err(GuardError::OnlyProxyOwner { caller, proxy }),
        }
        // An identity is either the owner or a delegate, never both.
        self.permits.remove(&(proxy, new_owner));
        info!(%proxy, previous = %caller, %new_owner, "proxy ownership transferred");
        Ok(())
    }

    // ── Lookups ─────────────────────────────────────────────────

    pub fn can_call(&self, proxy: Address, identity: Address) -> bool {
        self.owners.get(&proxy) == Some(&identity) || self.permits.contains(&(proxy, identity))
    }

    pub fn is_whitelisted(&self, target: Address) -> bool {
        self.whitelist_execute.contains(&target)
    }

    pub fn is_whitelisted_send(&self, target: Address) -> bool {
        self.whitelist_send.contains(&target)
    }

    pub fn is_permitted(&self, proxy: Address, identity: Address) -> bool {
        self.permits.contains(&(proxy, identity))
    }

    /// Delegates of `proxy` in address order.
    pub fn delegates(&self, proxy: Address) -> impl Iterator<Item = Address> + '_ {
        self.permits
            .range((proxy, Address::ZERO)..=(proxy, Address::repeat_byte(0xff)))
            .map(|(_, delegate)| *delegate)
    }

    pub fn whitelist(&self) -> impl Iterator<Item = Address> + '_ {
        self.whitelist_execute.iter().copied()
    }

    pub fn whitelist_send(&self) -> impl Iterator<Item = Address> + '_ {
        self.whitelist_send.iter().copied()
    }

    fn only_owner(&self, caller: Address) -> Result<(), GuardError> {
        if caller != self.owner {
            warn!(%caller, "guard administration by non-owner rejected");
            return Err(GuardError::Unauthorized { caller });
        }
        Ok(())
    }
}

fn toggle(set: &mut BTreeSet<Address>, target: Address, allowed: bool) {
    if allowed {
        set.insert(target);
    } else {
        set.remove(&target);
    }
}
