//! Shared types for automation triggers: kinds, wire layouts and typed payloads.
//!
//! The guard crate decodes and describes triggers; the encoder tool produces them.
//! Both agree on the layout tables defined here.

pub mod errors;
pub mod triggers;

pub use errors::{CodecError, PayloadFault};
pub use triggers::{
    check_layout, CloseTo, DecodedTrigger, Field, Trigger, TriggerHeader, TriggerKind,
    TriggerParams, Width, HEADER_FIELDS, HEADER_LEN, WORD,
};
