use thiserror::Error;

use crate::CatalogKind;

/// Errors returned by direct catalog mutation.
///
/// # Examples
/// ```
/// use mpac_core::{CatalogKind, RegistryError};
///
/// let err = RegistryError::AdministratorRequired {
///     catalog: CatalogKind::Company,
/// };
/// assert!(err.to_string().contains("administrator"));
/// ```
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{catalog} catalog requires administrator privilege")]
    AdministratorRequired { catalog: CatalogKind },
}

/// Errors returned by company format providers.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("provider '{provider}' failed: {message}")]
    Provider { provider: String, message: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
