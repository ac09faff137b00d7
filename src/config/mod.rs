//! # Configuration Management
//!
//! Provider settings are read from `~/.incapsula/provider.toml` (or an explicit
//! path), overridden by `INCAPSULA_*` environment variables and validated
//! before use.

pub mod settings;

pub use settings::{LoggingSettings, PropagationSettings, ProviderSettings};
