use alloy_primitives::U256;
use automation_types::{check_layout, CodecError, Trigger, TriggerKind, WORD};

/// Encode a trigger from raw field values in layout order.
///
/// Fails with `UnsupportedTriggerType` for an unknown kind and `MalformedPayload` when the
/// field count or any field width does not match the kind's layout.
pub fn encode(vault_id: U256, trigger_type: u16, fields: &[U256]) -> Result<Vec<u8>, CodecError> {
    let kind = TriggerKind::try_from(trigger_type)?;
    check_layout(kind, fields)?;
    Ok(encode_words(vault_id, kind, fields))
}

/// Encode a typed trigger. Typed params always satisfy their layout.
pub fn encode_trigger(trigger: &Trigger) -> Vec<u8> {
    encode_words(trigger.vault_id, trigger.kind(), &trigger.params.to_fields())
}

fn encode_words(vault_id: U256, kind: TriggerKind, fields: &[U256]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(kind.encoded_len());
    buf.extend_from_slice(&vault_id.to_be_bytes::<WORD>());
    buf.extend_from_slice(&U256::from(kind.discriminant()).to_be_bytes::<WORD>());
    for field in fields {
        buf.extend_from_slice(&field.to_be_bytes::<WORD>());
    }
    buf
}
