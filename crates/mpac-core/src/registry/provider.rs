use crate::MessageFormat;

use super::error::ProvisionError;

/// External bulk source of company formats.
///
/// Each call returns the provider's full list; the registry never diffs
/// against previous results.
pub trait FormatProvider {
    /// Label used in status notes and errors.
    fn name(&self) -> String;

    fn fetch(&self) -> Result<Vec<MessageFormat>, ProvisionError>;
}
