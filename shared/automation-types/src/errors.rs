use thiserror::Error;

/// Errors during trigger encoding/decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The discriminant is not one of the known trigger kinds.
    #[error("unsupported trigger type {0}")]
    UnsupportedTriggerType(u16),
    /// Length, arity or field width does not match the kind's layout.
    #[error("malformed trigger payload: {0}")]
    MalformedPayload(PayloadFault),
}

/// What exactly was wrong with a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PayloadFault {
    #[error("expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },
    #[error("expected {expected} fields, got {actual}")]
    Arity { expected: usize, actual: usize },
    #[error("field `{field}` exceeds its declared width")]
    FieldOverflow { field: &'static str },
    #[error("payload declares trigger type {found}, expected {expected}")]
    TypeMismatch { expected: u16, found: u16 },
}

impl From<PayloadFault> for CodecError {
    fn from(fault: PayloadFault) -> Self {
        CodecError::MalformedPayload(fault)
    }
}
