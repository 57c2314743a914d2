//! Off-chain producer of trigger payloads.
//!
//! The output is exactly what the guard crate's decoder accepts.

pub mod encoder;

mod tests;

pub use encoder::{encode, encode_trigger};
