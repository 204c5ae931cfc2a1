//! Registry error types

use thiserror::Error;

/// Errors returned by typed lookups and the shared registry
///
/// A key that was never registered is not an error: lookups report it as
/// `Ok(None)`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Key '{key}' holds a {found}, not a {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Shared registry is already initialized")]
    AlreadyInitialized,

    #[error("Shared registry has not been initialized")]
    NotInitialized,
}
