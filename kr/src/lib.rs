//! KeyReg - name-keyed registry of shared objects
//!
//! Decouples producers of shared objects from their consumers: one side
//! registers an `Arc<T>` under a name, the other side looks it up by name and
//! states the type it expects.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use keyreg::Registry;
//!
//! let mut registry = Registry::new();
//! registry.register("greeting", Arc::new(String::from("hello")));
//!
//! let greeting = registry.get::<String>("greeting").unwrap();
//! assert_eq!(greeting.as_deref().map(String::as_str), Some("hello"));
//! assert!(registry.get::<String>("missing").unwrap().is_none());
//! assert!(registry.get::<u32>("greeting").is_err());
//! ```
//!
//! A fully built registry can be published once for the whole process with
//! [`init_shared`] and read from anywhere with [`shared`].

mod error;
mod registry;
mod shared;

pub use error::RegistryError;
pub use registry::Registry;
pub use shared::{init_shared, shared};
