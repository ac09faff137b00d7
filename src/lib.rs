//! # Incapsula Provider
//!
//! Resource handlers that reconcile declared infrastructure state with the
//! Incapsula CDN/WAF API. Two resources are managed:
//!
//! - `incapsula_certificate`: the custom TLS certificate of a site
//! - `incapsula_user`: a user account under a parent account, with roles
//!
//! ## Architecture
//!
//! ```text
//! Hosting framework → IncapsulaProvider → Resource handlers → IncapsulaClient
//!   (JSON state)         (registry)        (reconciliation)     (remote API)
//! ```
//!
//! The API client is injected. This crate owns validation, identity handling,
//! eventual-consistency waits and the mapping of remote answers back into
//! state, but never HTTP transport.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use incapsula_provider::{IncapsulaProvider, ProviderSettings};
//! use std::sync::Arc;
//!
//! let settings = ProviderSettings::resolve()?;
//! incapsula_provider::init_logging(&settings.logging);
//!
//! let provider = IncapsulaProvider::new(Arc::new(my_client), &settings);
//! let state = provider
//!     .create("incapsula_user", serde_json::json!({
//!         "account_id": 5,
//!         "email": "a@b.com",
//!         "role_names": ["admin"],
//!     }))
//!     .await?;
//! ```

pub mod client;
pub mod config;
pub mod consistency;
pub mod errors;
pub mod observability;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod sensitive;

// Re-export commonly used types and traits
pub use client::{ClientError, IncapsulaClient, TracedClient};
pub use config::ProviderSettings;
pub use consistency::PropagationPolicy;
pub use errors::{ProviderError, Result};
pub use observability::init_logging;
pub use provider::IncapsulaProvider;
pub use resources::{ResourceId, ResourceState};
pub use sensitive::Sensitive;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(APP_NAME, "incapsula-provider");
        assert!(!VERSION.is_empty());
    }
}
