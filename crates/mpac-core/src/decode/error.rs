use thiserror::Error;

/// Errors raised while applying a single decode directive.
///
/// The decoder absorbs these and renders the affected field as a
/// diagnostic; they never escape `decode`.
///
/// # Examples
/// ```
/// use mpac_core::decode::error::DecodeError;
///
/// let err = DecodeError::TooShort { needed: 2, actual: 1 };
/// assert!(err.to_string().contains("payload too short"));
/// ```
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("payload too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("division by zero")]
    DivisionByZero,
}
