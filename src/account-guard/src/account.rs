//! Per-owner guarded executor.
//!
//! Both call modes check `canCall` before anything else, so a caller without rights never
//! learns whether a target is allowlisted. `execute` runs the target's code in the proxy's own
//! context; `send` calls the target as an ordinary external caller and therefore has its own,
//! usually smaller, allowlist.

use alloy_primitives::{Address, Bytes};
use tracing::{debug, warn};

use crate::{errors::AccountError, guard::AccessGuard, host::CallHost};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProxyAccount {
    address: Address,
    /// Fixed at creation.
    guard: Address,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Execute,
    Send,
}

impl ProxyAccount {
    pub fn new(address: Address, guard: Address) -> Self {
        Self { address, guard }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn guard(&self) -> Address {
        self.guard
    }

    /// In-context execution of `target`'s code. Returns the callee's raw return bytes.
    pub fn execute<H: CallHost + ?Sized>(
        &self,
        guard: &AccessGuard,
        host: &mut H,
        caller: Address,
        target: Address,
        data: &[u8],
    ) -> Result<Bytes, AccountError> {
        self.authorize(guard, caller, target, Mode::Execute)?;
        debug!(proxy = %self.address, %caller, %target, "execute");
        host.delegate_call(self.address, caller, target, data)
            .map_err(AccountError::Reverted)
    }

    /// External call from the proxy into `target`. Returns the callee's raw return bytes.
    pub fn send<H: CallHost + ?Sized>(
        &self,
        guard: &AccessGuard,
        host: &mut H,
        caller: Address,
        target: Address,
        data: &[u8],
    ) -> Result<Bytes, AccountError> {
        self.authorize(guard, caller, target, Mode::Send)?;
        debug!(proxy = %self.address, %caller, %target, "send");
        host.call(self.address, target, data).map_err(AccountError::Reverted)
    }

    fn authorize(
        &self,
        guard: &AccessGuard,
        caller: Address,
        target: Address,
        mode: Mode,
    ) -> Result<(), AccountError> {
        if guard.address() != self.guard {
            return Err(AccountError::ForeignGuard { expected: self.guard, found: guard.address() });
        }
        if !guard.can_call(self.address, caller) {
            warn!(proxy = %self.address, %caller, "caller cannot drive proxy");
            return Err(AccountError::NotOwner { caller, proxy: self.address });
        }
        let allowed = match mode {
            Mode::Execute => guard.is_whitelisted(target),
            Mode::Send => guard.is_whitelisted_send(target),
        };
        if !allowed {
            warn!(proxy = %self.address, %target, ?mode, "target not allowlisted");
            return Err(AccountError::IllegalTarget { target });
        }
        Ok(())
    }
}
