//! Single-writer world the guard, the factory and the proxies live in.
//!
//! Every entry point is a transaction: guard, factory and world state are snapshotted first
//! and restored if anything fails, so a rejected or reverted call leaves no trace.

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, B256, U256};
use tracing::{debug, info, warn};

use crate::{
    account::ProxyAccount,
    config::GuardConfig,
    errors::LedgerError,
    factory::AccountFactory,
    guard::AccessGuard,
    utils::address::derive_address,
    vm::{Contract, Log, Vm},
};

#[derive(Clone, Debug)]
pub struct Ledger {
    guard: AccessGuard,
    factory: AccountFactory,
    vm: Vm,
}

impl Ledger {
    /// A guard administered by `admin` and a factory bound to it.
    pub fn new(admin: Address) -> Result<Self, LedgerError> {
        let guard_address = derive_address(admin, 0);
        let factory = AccountFactory::new(derive_address(admin, 1), guard_address);
        let mut guard = AccessGuard::new(guard_address, admin);
        guard.initialize_factory(factory.address())?;
        info!(%admin, guard = %guard_address, factory = %factory.address(), "ledger created");
        Ok(Self { guard, factory, vm: Vm::new() })
    }

    /// Bootstrap from a config, applying its allowlists as the administrator.
    pub fn from_config(config: &GuardConfig) -> Result<Self, LedgerError> {
        let mut ledger = Self::new(config.admin)?;
        for target in &config.whitelist {
            ledger.set_whitelist(config.admin, *target, true)?;
        }
        for target in &config.whitelist_send {
            ledger.set_whitelist_send(config.admin, *target, true)?;
        }
        Ok(ledger)
    }

    pub fn deploy(&mut self, address: Address, contract: Arc<dyn Contract>) {
        debug!(%address, "code deployed");
        self.vm.deploy(address, contract);
    }

    /// Genesis funding; not a transfer and not guarded.
    pub fn credit(&mut self, account: Address, amount: U256) {
        let balance = self.vm.state().balance_of(account).saturating_add(amount);
        self.vm.state_mut().set_balance(account, balance);
    }

    // ── Transactions ────────────────────────────────────────────

    /// Create a proxy owned by `owner`, or by `caller` when no owner is given.
    pub fn create_account(
        &mut self,
        caller: Address,
        owner: Option<Address>,
        protocol_tag: Option<String>,
    ) -> Result<ProxyAccount, LedgerError> {
        let owner = owner.unwrap_or(caller);
        self.transact(|ledger| {
            Ok(ledger.factory.create_account(&mut ledger.guard, owner, protocol_tag)?)
        })
    }

    pub fn execute(
        &mut self,
        caller: Address,
        proxy: Address,
        target: Address,
        data: &[u8],
    ) -> Result<Bytes, LedgerError> {
        let account = self.account(proxy)?;
        self.transact(|ledger| {
            Ok(account.execute(&ledger.guard, &mut ledger.vm, caller, target, data)?)
        })
    }

    pub fn send(
        &mut self,
        caller: Address,
        proxy: Address,
        target: Address,
        data: &[u8],
    ) -> Result<Bytes, LedgerError> {
        let account = self.account(proxy)?;
        self.transact(|ledger| {
            Ok(account.send(&ledger.guard, &mut ledger.vm, caller, target, data)?)
        })
    }

    /// Plain value transfer. Proxies accept value from anyone.
    pub fn transfer(&mut self, from: Address, to: Address, value: U256) -> Result<(), LedgerError> {
        self.transact(|ledger| {
            let available = ledger.vm.state().balance_of(from);
            if available < value {
                return Err(LedgerError::InsufficientBalance {
                    account: from,
                    available,
                    required: value,
                });
            }
            let state = ledger.vm.state_mut();
            state.set_balance(from, available - value);
            let credited = state.balance_of(to).saturating_add(value);
            state.set_balance(to, credited);
            debug!(%from, %to, %value, "value transferred");
            Ok(())
        })
    }

    pub fn set_whitelist(
        &mut self,
        caller: Address,
        target: Address,
        allowed: bool,
    ) -> Result<(), LedgerError> {
        self.transact(|ledger| Ok(ledger.guard.set_whitelist(caller, target, allowed)?))
    }

    pub fn set_whitelist_send(
        &mut self,
        caller: Address,
        target: Address,
        allowed: bool,
    ) -> Result<(), LedgerError> {
        self.transact(|ledger| Ok(ledger.guard.set_whitelist_send(caller, target, allowed)?))
    }

    pub fn transfer_guard_ownership(
        &mut self,
        caller: Address,
        new_admin: Address,
    ) -> Result<(), LedgerError> {
        self.transact(|ledger| Ok(ledger.guard.transfer_ownership(caller, new_admin)?))
    }

    pub fn permit(
        &mut self,
        caller: Address,
        identity: Address,
        proxy: Address,
        allowed: bool,
    ) -> Result<(), LedgerError> {
        self.transact(|ledger| Ok(ledger.guard.permit(caller, identity, proxy, allowed)?))
    }

    pub fn change_owner(
        &mut self,
        caller: Address,
        new_owner: Address,
        proxy: Address,
    ) -> Result<(), LedgerError> {
        self.transact(|ledger| Ok(ledger.guard.change_owner(caller, new_owner, proxy)?))
    }

    // ── Reads ───────────────────────────────────────────────────

    pub fn guard(&self) -> &AccessGuard {
        &self.guard
    }

    pub fn factory(&self) -> &AccountFactory {
        &self.factory
    }

    pub fn storage_at(&self, account: Address, key: B256) -> B256 {
        self.vm.state().storage_at(account, key)
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.vm.state().balance_of(account)
    }

    pub fn logs(&self) -> &[Log] {
        self.vm.state().logs()
    }

    fn account(&self, proxy: Address) -> Result<ProxyAccount, LedgerError> {
        self.factory.proxy(proxy).ok_or(LedgerError::UnknownProxy(proxy))
    }

    fn transact<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        let guard = self.guard.clone();
        let factory = self.factory.clone();
        let state = self.vm.snapshot();
        let result = f(self);
        if let Err(err) = &result {
            warn!(error = %err, "transaction failed, rolled back");
            self.guard = guard;
            self.factory = factory;
            self.vm.restore(state);
        }
        result
    }
}
