//! In-memory call host: deployed target code plus world state (storage, balances, logs).
//!
//! Every call snapshots the world state and restores it if the callee fails, so a revert
//! never leaves partial effects behind, however deep the nesting.

use std::{collections::BTreeMap, fmt, sync::Arc};

use alloy_primitives::{Address, Bytes, B256, U256};
use tracing::trace;

use crate::host::CallHost;

/// A log emitted during a call, attributed to the executing account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Log {
    pub emitter: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

#[derive(Clone, Debug, Default)]
pub struct WorldState {
    storage: BTreeMap<Address, BTreeMap<B256, B256>>,
    balances: BTreeMap<Address, U256>,
    logs: Vec<Log>,
}

impl WorldState {
    pub fn storage_at(&self, account: Address, key: B256) -> B256 {
        self.storage
            .get(&account)
            .and_then(|slots| slots.get(&key))
            .copied()
            .unwrap_or(B256::ZERO)
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or(U256::ZERO)
    }

    pub fn logs(&self) -> &[Log] {
        &self.logs
    }

    pub(crate) fn set_balance(&mut self, account: Address, value: U256) {
        self.balances.insert(account, value);
    }
}

/// Code a target identity runs when called.
pub trait Contract: Send + Sync + fmt::Debug {
    /// `Err` carries the revert payload.
    fn call(&self, ctx: &mut CallContext<'_>, data: &[u8]) -> Result<Bytes, Bytes>;
}

/// What a running contract can see and touch.
pub struct CallContext<'a> {
    this: Address,
    sender: Address,
    code_address: Address,
    vm: &'a mut Vm,
}

impl CallContext<'_> {
    /// The account whose storage and balance are in scope.
    pub fn this(&self) -> Address {
        self.this
    }

    /// The immediate caller as observed by the callee.
    pub fn sender(&self) -> Address {
        self.sender
    }

    /// Where the running code was loaded from; differs from `this` under in-context execution.
    pub fn code_address(&self) -> Address {
        self.code_address
    }

    pub fn sload(&self, key: B256) -> B256 {
        self.vm.state.storage_at(self.this, key)
    }

    pub fn sstore(&mut self, key: B256, value: B256) {
        self.vm.state.storage.entry(self.this).or_default().insert(key, value);
    }

    pub fn balance(&self) -> U256 {
        self.vm.state.balance_of(self.this)
    }

    pub fn emit(&mut self, topics: Vec<B256>, data: Bytes) {
        self.vm.state.logs.push(Log { emitter: self.this, topics, data });
    }

    /// Nested external call made by the running contract.
    pub fn call(&mut self, target: Address, data: &[u8]) -> Result<Bytes, Bytes> {
        self.vm.call(self.this, target, data)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Vm {
    code: BTreeMap<Address, Arc<dyn Contract>>,
    state: WorldState,
}

impl Vm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deploy(&mut self, address: Address, contract: Arc<dyn Contract>) {
        self.code.insert(address, contract);
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut WorldState {
        &mut self.state
    }

    pub(crate) fn snapshot(&self) -> WorldState {
        self.state.clone()
    }

    pub(crate) fn restore(&mut self, snapshot: WorldState) {
        self.state = snapshot;
    }

    fn run(
        &mut self,
        this: Address,
        sender: Address,
        code_address: Address,
        data: &[u8],
    ) -> Result<Bytes, Bytes> {
        // Calling an account without code succeeds with empty return data.
        let Some(code) = self.code.get(&code_address).cloned() else {
            return Ok(Bytes::new());
        };
        let snapshot = self.snapshot();
        let mut ctx = CallContext { this, sender, code_address, vm: self };
        let result = code.call(&mut ctx, data);
        if result.is_err() {
            trace!(%this, %code_address, "call reverted, state restored");
            self.restore(snapshot);
        }
        result
    }
}

impl CallHost for Vm {
    fn delegate_call(
        &mut self,
        context: Address,
        sender: Address,
        code: Address,
        data: &[u8],
    ) -> Result<Bytes, Bytes> {
        self.run(context, sender, code, data)
    }

    fn call(&mut self, caller: Address, target: Address, data: &[u8]) -> Result<Bytes, Bytes> {
        self.run(target, caller, target, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: B256 = B256::repeat_byte(0x01);

    /// Writes its sender into slot KEY, then reverts if asked to.
    #[derive(Debug)]
    struct Writer;

    impl Contract for Writer {
        fn call(&self, ctx: &mut CallContext<'_>, data: &[u8]) -> Result<Bytes, Bytes> {
            let value = B256::left_padding_from(ctx.sender().as_slice());
            ctx.sstore(KEY, value);
            ctx.emit(vec![B256::repeat_byte(0xee)], Bytes::new());
            if data == b"fail" {
                return Err(Bytes::from_static(b"boom"));
            }
            Ok(Bytes::copy_from_slice(ctx.this().as_slice()))
        }
    }

    /// Calls `Writer` and then fails itself.
    #[derive(Debug)]
    struct Relay(Address);

    impl Contract for Relay {
        fn call(&self, ctx: &mut CallContext<'_>, _data: &[u8]) -> Result<Bytes, Bytes> {
            ctx.call(self.0, b"")?;
            Err(Bytes::from_static(b"relay"))
        }
    }

    #[test]
    fn test_call_and_delegate_call_scope_storage() {
        let writer = Address::repeat_byte(0x10);
        let proxy = Address::repeat_byte(0x20);
        let user = Address::repeat_byte(0x30);
        let mut vm = Vm::new();
        vm.deploy(writer, Arc::new(Writer));

        let out = vm.delegate_call(proxy, user, writer, b"").unwrap();
        assert_eq!(out.as_ref(), proxy.as_slice());
        assert_eq!(vm.state().storage_at(proxy, KEY), B256::left_padding_from(user.as_slice()));
        assert_eq!(vm.state().storage_at(writer, KEY), B256::ZERO);

        let out = vm.call(proxy, writer, b"").unwrap();
        assert_eq!(out.as_ref(), writer.as_slice());
        assert_eq!(vm.state().storage_at(writer, KEY), B256::left_padding_from(proxy.as_slice()));
        assert_eq!(vm.state().logs().len(), 2);
        assert_eq!(vm.state().logs()[0].emitter, proxy);
        assert_eq!(vm.state().logs()[1].emitter, writer);
    }

    #[test]
    fn test_revert_discards_effects() {
        let writer = Address::repeat_byte(0x10);
        let mut vm = Vm::new();
        vm.deploy(writer, Arc::new(Writer));

        let err = vm.call(Address::repeat_byte(0x30), writer, b"fail").unwrap_err();
        assert_eq!(err, Bytes::from_static(b"boom"));
        assert_eq!(vm.state().storage_at(writer, KEY), B256::ZERO);
        assert!(vm.state().logs().is_empty());
    }

    #[test]
    fn test_outer_revert_discards_successful_inner_call() {
        let writer = Address::repeat_byte(0x10);
        let relay = Address::repeat_byte(0x11);
        let mut vm = Vm::new();
        vm.deploy(writer, Arc::new(Writer));
        vm.deploy(relay, Arc::new(Relay(writer)));

        assert_eq!(vm.call(Address::repeat_byte(0x30), relay, b""), Err(Bytes::from_static(b"relay")));
        assert_eq!(vm.state().storage_at(writer, KEY), B256::ZERO);
        assert!(vm.state().logs().is_empty());
    }

    #[test]
    fn test_call_without_code_succeeds_empty() {
        let mut vm = Vm::new();
        let eoa = Address::repeat_byte(0x44);
        assert_eq!(vm.call(Address::repeat_byte(0x30), eoa, b"anything"), Ok(Bytes::new()));
    }
}
