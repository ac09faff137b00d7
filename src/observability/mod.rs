//! # Observability
//!
//! Structured logging for the resource handlers, built on `tracing`.

pub mod logging;

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingSettings;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `settings.level`. Calling this more than
/// once is harmless: a subscriber installed elsewhere (e.g. by the hosting
/// framework or a test harness) is left in place and `false` is returned.
pub fn init_logging(settings: &LoggingSettings) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.level.as_str()));

    let installed = if settings.json {
        fmt().json().with_env_filter(filter).with_current_span(true).try_init().is_ok()
    } else {
        fmt().with_env_filter(filter).with_target(true).try_init().is_ok()
    };

    if installed {
        tracing::debug!(level = %settings.level, json = settings.json, "Logging initialized");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        let settings = LoggingSettings::default();
        init_logging(&settings);
        assert!(!init_logging(&settings));
    }
}
