//! Process-wide shared registry
//!
//! The shared registry is published exactly once by an explicit call to
//! [`init_shared`], normally early in `main`, and is read-only afterwards.
//! Nothing is initialized implicitly: reading before initialization is an
//! error rather than an empty registry.

use std::sync::OnceLock;

use tracing::{debug, info};

use crate::error::RegistryError;
use crate::registry::Registry;

static SHARED: OnceLock<Registry> = OnceLock::new();

/// Publish `registry` as the process-wide shared registry
///
/// Fails with [`RegistryError::AlreadyInitialized`] on every call after the
/// first; the registry passed to a failed call is dropped.
pub fn init_shared(registry: Registry) -> Result<&'static Registry, RegistryError> {
    let entries = registry.len();
    SHARED.set(registry).map_err(|_| RegistryError::AlreadyInitialized)?;
    info!(entries, "Shared registry initialized");
    shared()
}

/// The process-wide shared registry
pub fn shared() -> Result<&'static Registry, RegistryError> {
    debug!("shared: called");
    SHARED.get().ok_or(RegistryError::NotInitialized)
}
