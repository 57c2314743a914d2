//! Shared helpers for the guard crate.

pub mod address;
pub mod bytes;
