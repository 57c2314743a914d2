use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RebalanceError {
    /// A price, rate or target is out of range, or the target cannot be reached.
    #[error("invalid parameters: {0}")]
    InvalidParameters(&'static str),
    #[error("arithmetic overflow")]
    MathOverflow,
    /// Not a non-negative decimal with at most 18 fractional digits.
    #[error("invalid decimal `{0}`")]
    InvalidDecimal(String),
}
