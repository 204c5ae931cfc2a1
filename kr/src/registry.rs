//! Core Registry implementation

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::RegistryError;

/// A stored value plus the name of its concrete type, kept for error reporting
struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

/// Name-keyed store of shared objects
///
/// Each key maps to at most one value; registering an existing key replaces
/// the previous value. The registry holds `Arc` clones and never decides when a
/// value is dropped.
///
/// The registry is not internally synchronized. Registration needs `&mut self`
/// and lookups need `&self`, so sharing one registry between threads that
/// register concurrently requires the embedder to wrap it, for example in an
/// `RwLock<Registry>`. A registry that is fully built before it is shared can
/// be read from any number of threads.
#[derive(Default)]
pub struct Registry {
    entries: HashMap<String, Entry>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value` under `key`, replacing whatever was stored there
    pub fn register<T>(&mut self, key: impl Into<String>, value: Arc<T>)
    where
        T: Any + Send + Sync,
    {
        let key = key.into();
        let entry = Entry {
            value,
            type_name: type_name::<T>(),
        };

        if let Some(previous) = self.entries.insert(key.clone(), entry) {
            debug!(%key, previous = previous.type_name, "Registry::register: replaced");
        } else {
            debug!(%key, value_type = type_name::<T>(), "Registry::register: inserted");
        }
    }

    /// Look up `key` expecting a value of type `T`
    ///
    /// Returns `Ok(None)` when nothing was registered under `key`, and
    /// [`RegistryError::TypeMismatch`] when the stored value is not a `T`.
    pub fn get<T>(&self, key: &str) -> Result<Option<Arc<T>>, RegistryError>
    where
        T: Any + Send + Sync,
    {
        let Some(entry) = self.entries.get(key) else {
            debug!(%key, "Registry::get: not found");
            return Ok(None);
        };

        match Arc::clone(&entry.value).downcast::<T>() {
            Ok(value) => Ok(Some(value)),
            Err(_) => Err(RegistryError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
                found: entry.type_name,
            }),
        }
    }

    /// Check whether anything is registered under `key`
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Name of the concrete type stored under `key`
    pub fn type_name_of(&self, key: &str) -> Option<&'static str> {
        self.entries.get(key).map(|entry| entry.type_name)
    }

    /// All registered keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for key in self.keys() {
            map.entry(&key, &self.entries[&key].type_name);
        }
        map.finish()
    }
}
