//! Guarded proxy accounts with delegated permissions.
//!
//! An [`AccessGuard`] records who owns each proxy, which delegates may drive it and which
//! targets proxies may reach in each call mode. [`ProxyAccount`] enforces those rules on every
//! `execute` / `send`; [`AccountFactory`] creates proxies and registers their owners. The
//! [`Ledger`] ties them to an in-memory [`Vm`] with all-or-nothing transactions.
//!
//! Trigger payloads consumed by automation are decoded and described here as well.

pub mod account;
pub mod config;
pub mod decoder;
pub mod describe;
pub mod errors;
pub mod factory;
pub mod guard;
pub mod host;
pub mod ledger;
pub mod utils;
pub mod vm;


pub use account::ProxyAccount;
pub use config::GuardConfig;
pub use decoder::{decode, decode_header, decode_trigger};
pub use describe::describe;
pub use errors::{AccountError, ConfigError, GuardError, LedgerError};
pub use factory::{AccountCreated, AccountFactory};
pub use guard::AccessGuard;
pub use host::CallHost;
pub use ledger::Ledger;
pub use vm::{CallContext, Contract, Log, Vm, WorldState};
