//! Minimal big-endian word helpers for trigger payloads.
//!
//! Every trigger field occupies one right-aligned 32-byte word.

use alloy_primitives::U256;
use automation_types::{Field, PayloadFault, WORD};

/// Read the next word and check it against the field's declared width.
pub fn read_field(bytes: &[u8], i: &mut usize, field: &Field) -> Result<U256, PayloadFault> {
    let word = read_u256(bytes, i)?;
    if !field.width.fits(word) {
        return Err(PayloadFault::FieldOverflow { field: field.name });
    }
    Ok(word)
}

pub fn read_u256(bytes: &[u8], i: &mut usize) -> Result<U256, PayloadFault> {
    if bytes.len() < *i + WORD {
        return Err(PayloadFault::Length { expected: *i + WORD, actual: bytes.len() });
    }
    let out = U256::from_be_slice(&bytes[*i..*i + WORD]);
    *i += WORD;
    Ok(out)
}
