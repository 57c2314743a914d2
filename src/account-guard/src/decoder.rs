use alloy_primitives::U256;
use automation_types::{
    CodecError, DecodedTrigger, PayloadFault, Trigger, TriggerHeader, TriggerKind, HEADER_FIELDS,
    HEADER_LEN,
};

use crate::utils::bytes::{read_field, read_u256};

/// Decode only `(vaultId, triggerType)`.
///
/// Succeeds for any payload at least as long as the header, whether or not the kind is known,
/// so callers can dispatch before a full decode. The type word is read as its low 16 bits;
/// [`decode`] is where over-wide words are rejected.
pub fn decode_header(bytes: &[u8]) -> Result<TriggerHeader, CodecError> {
    if bytes.len() < HEADER_LEN {
        return Err(PayloadFault::Length { expected: HEADER_LEN, actual: bytes.len() }.into());
    }
    let mut i = 0usize;
    let vault_id = read_u256(bytes, &mut i)?;
    let trigger_type = (read_u256(bytes, &mut i)? & U256::from(u16::MAX)).to::<u16>();
    Ok(TriggerHeader { vault_id, trigger_type })
}

/// Full positional decode using `trigger_type`'s layout.
pub fn decode(trigger_type: u16, bytes: &[u8]) -> Result<DecodedTrigger, CodecError> {
    let kind = TriggerKind::try_from(trigger_type)?;
    let expected = kind.encoded_len();
    if bytes.len() != expected {
        return Err(PayloadFault::Length { expected, actual: bytes.len() }.into());
    }

    let mut i = 0usize;
    let vault_id = read_field(bytes, &mut i, &HEADER_FIELDS[0])?;
    let found = read_field(bytes, &mut i, &HEADER_FIELDS[1])?.to::<u16>();
    if found != trigger_type {
        return Err(PayloadFault::TypeMismatch { expected: trigger_type, found }.into());
    }

    let fields = kind
        .fields()
        .iter()
        .map(|field| read_field(bytes, &mut i, field))
        .collect::<Result<Vec<U256>, _>>()?;

    Ok(DecodedTrigger { vault_id, trigger_type, fields })
}

/// Header dispatch followed by a typed decode.
pub fn decode_trigger(bytes: &[u8]) -> Result<Trigger, CodecError> {
    let header = decode_header(bytes)?;
    Trigger::try_from(decode(header.trigger_type, bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use automation_types::{CloseTo, TriggerParams, WORD};

    fn words(values: &[u64]) -> Vec<u8> {
        values
            .iter()
            .flat_map(|v| U256::from(*v).to_be_bytes::<32>())
            .collect()
    }

    #[test]
    fn test_decode_header_ignores_support_status() {
        let bytes = words(&[42, 99, 1, 2, 3]);
        let header = decode_header(&bytes).unwrap();
        assert_eq!(header, TriggerHeader { vault_id: U256::from(42u64), trigger_type: 99 });
        assert_eq!(header.kind(), Err(CodecError::UnsupportedTriggerType(99)));
    }

    #[test]
    fn test_decode_header_keeps_low_bits_of_dirty_type_word() {
        let mut bytes = words(&[7, 3]);
        bytes[40] = 0xff;
        let header = decode_header(&bytes).unwrap();
        assert_eq!(header, TriggerHeader { vault_id: U256::from(7u64), trigger_type: 3 });
    }

    #[test]
    fn test_decode_rejects_dirty_type_word() {
        let mut bytes = words(&[7, 1, 15_000]);
        bytes[40] = 0xff;
        assert_eq!(
            decode(1, &bytes),
            Err(CodecError::MalformedPayload(PayloadFault::FieldOverflow { field: "triggerType" }))
        );
        assert_eq!(
            decode_trigger(&bytes),
            Err(CodecError::MalformedPayload(PayloadFault::FieldOverflow { field: "triggerType" }))
        );
    }

    #[test]
    fn test_decode_header_too_short() {
        assert_eq!(
            decode_header(&[0u8; 40]),
            Err(CodecError::MalformedPayload(PayloadFault::Length { expected: 64, actual: 40 }))
        );
    }

    #[test]
    fn test_decode_unsupported_type() {
        let bytes = words(&[1, 99, 5]);
        assert_eq!(decode(99, &bytes), Err(CodecError::UnsupportedTriggerType(99)));
    }

    #[test]
    fn test_decode_stop_loss() {
        let bytes = words(&[321, 2, 15_000]);
        let decoded = decode(2, &bytes).unwrap();
        assert_eq!(decoded.vault_id, U256::from(321u64));
        assert_eq!(decoded.trigger_type, 2);
        assert_eq!(decoded.fields, vec![U256::from(15_000u64)]);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let mut bytes = words(&[1, 1, 15_000]);
        bytes.extend_from_slice(&[0u8; WORD]);
        assert_eq!(
            decode(1, &bytes),
            Err(CodecError::MalformedPayload(PayloadFault::Length { expected: 96, actual: 128 }))
        );
        assert!(matches!(
            decode(3, &words(&[1, 3, 1, 2])),
            Err(CodecError::MalformedPayload(PayloadFault::Length { .. }))
        ));
    }

    #[test]
    fn test_decode_rejects_mismatched_header() {
        let bytes = words(&[1, 1, 15_000]);
        assert_eq!(
            decode(2, &bytes),
            Err(CodecError::MalformedPayload(PayloadFault::TypeMismatch { expected: 2, found: 1 }))
        );
    }

    #[test]
    fn test_decode_rejects_overwide_narrow_field() {
        // maxBaseFeeInGwei is uint32.
        let mut bytes = words(&[1, 7, 2_000]);
        let mut fee = [0u8; 32];
        fee[27] = 1; // 2^32
        bytes.extend_from_slice(&fee);
        assert_eq!(
            decode(7, &bytes),
            Err(CodecError::MalformedPayload(PayloadFault::FieldOverflow { field: "maxBaseFeeInGwei" }))
        );
    }

    #[test]
    fn test_decode_trigger_typed() {
        let bytes = words(&[9, 8, 3_000, 150]);
        let trigger = decode_trigger(&bytes).unwrap();
        assert_eq!(trigger.vault_id, U256::from(9u64));
        assert_eq!(
            trigger.params,
            TriggerParams::AutoTakeProfit {
                close_to: CloseTo::Dai,
                execution_price: U256::from(3_000u64),
                max_base_fee_gwei: 150,
            }
        );
    }
}
