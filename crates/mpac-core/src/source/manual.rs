use thiserror::Error;

/// Errors returned when parsing operator-entered hex bytes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManualInputError {
    #[error("no bytes entered")]
    Empty,
    #[error("invalid hex byte '{token}' at position {index}")]
    InvalidToken { index: usize, token: String },
}

/// Parse whitespace-separated hex byte tokens (`"01 02 0a FF"`).
///
/// Each token is one or two hex digits.
///
/// # Examples
/// ```
/// use mpac_core::parse_hex_tokens;
///
/// assert_eq!(parse_hex_tokens("01 02 5 ff")?, vec![0x01, 0x02, 0x05, 0xFF]);
/// assert!(parse_hex_tokens("01 zz").is_err());
/// # Ok::<(), mpac_core::ManualInputError>(())
/// ```
pub fn parse_hex_tokens(input: &str) -> Result<Vec<u8>, ManualInputError> {
    let bytes = input
        .split_whitespace()
        .enumerate()
        .map(|(index, token)| parse_token(token).ok_or_else(|| invalid(index, token)))
        .collect::<Result<Vec<u8>, _>>()?;
    if bytes.is_empty() {
        return Err(ManualInputError::Empty);
    }
    Ok(bytes)
}

fn parse_token(token: &str) -> Option<u8> {
    if token.is_empty() || token.len() > 2 || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(token, 16).ok()
}

fn invalid(index: usize, token: &str) -> ManualInputError {
    ManualInputError::InvalidToken {
        index,
        token: token.to_string(),
    }
}
