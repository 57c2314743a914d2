use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{Revert, SolError};
use thiserror::Error;

/// Errors from guard administration and permission management.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    /// Caller lacks the rights the operation needs (guard admin, factory, or calling rights).
    #[error("account-guard/unauthorized: {caller}")]
    Unauthorized { caller: Address },
    #[error("account-guard/only-proxy-owner: {caller} does not own {proxy}")]
    OnlyProxyOwner { caller: Address, proxy: Address },
    #[error("account-guard/cant-deny-owner: {proxy}")]
    CannotDenyOwner { proxy: Address },
    #[error("account-guard/factory-already-initialized")]
    FactoryAlreadyInitialized,
    #[error("account-guard/proxy-already-registered: {proxy}")]
    ProxyAlreadyRegistered { proxy: Address },
}

impl GuardError {
    /// Solidity-style revert reason.
    pub fn reason(&self) -> &'static str {
        match self {
            GuardError::Unauthorized { .. } => "account-guard/unauthorized",
            GuardError::OnlyProxyOwner { .. } => "account-guard/only-proxy-owner",
            GuardError::CannotDenyOwner { .. } => "account-guard/cant-deny-owner",
            GuardError::FactoryAlreadyInitialized => "account-guard/factory-already-initialized",
            GuardError::ProxyAlreadyRegistered { .. } => "account-guard/proxy-already-registered",
        }
    }

    /// ABI `Error(string)` payload carrying [`GuardError::reason`].
    pub fn revert_data(&self) -> Bytes {
        revert_payload(self.reason())
    }
}

/// Errors from a guarded `execute` / `send`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    #[error("account-guard/not-owner: {caller} cannot drive {proxy}")]
    NotOwner { caller: Address, proxy: Address },
    #[error("account-guard/illegal-target: {target}")]
    IllegalTarget { target: Address },
    /// The proxy was handed a guard other than the one it was created with.
    #[error("account-guard/foreign-guard: expected {expected}, got {found}")]
    ForeignGuard { expected: Address, found: Address },
    /// The callee failed; its revert payload is carried unchanged.
    #[error("call reverted: {0:?}")]
    Reverted(Bytes),
}

impl AccountError {
    /// The payload an on-chain caller would observe for this failure.
    ///
    /// Callee reverts are returned verbatim; guard-side failures are wrapped in `Error(string)`.
    pub fn revert_data(&self) -> Bytes {
        match self {
            AccountError::NotOwner { .. } => revert_payload("account-guard/not-owner"),
            AccountError::IllegalTarget { .. } => revert_payload("account-guard/illegal-target"),
            AccountError::ForeignGuard { .. } => revert_payload("account-guard/foreign-guard"),
            AccountError::Reverted(data) => data.clone(),
        }
    }
}

/// Errors surfaced by ledger transactions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Guard(#[from] GuardError),
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error("unknown proxy {0}")]
    UnknownProxy(Address),
    #[error("insufficient balance: {account} holds {available}, needs {required}")]
    InsufficientBalance { account: Address, available: U256, required: U256 },
}

impl LedgerError {
    pub fn revert_data(&self) -> Bytes {
        match self {
            LedgerError::Guard(err) => err.revert_data(),
            LedgerError::Account(err) => err.revert_data(),
            LedgerError::UnknownProxy(_) => Bytes::new(),
            LedgerError::InsufficientBalance { .. } => Bytes::new(),
        }
    }
}

/// Errors while loading a guard bootstrap config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read guard config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse guard config: {0}")]
    Parse(#[from] serde_json::Error),
}

pub(crate) fn revert_payload(reason: &str) -> Bytes {
    Bytes::from(Revert { reason: reason.to_string() }.abi_encode())
}
