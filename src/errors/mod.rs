//! # Error Handling
//!
//! Error types shared by the resource handlers and the provider registry.

pub mod types;

pub use types::{ProviderError, Result};
