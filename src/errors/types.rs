//! # Error Types
//!
//! Error types for the Incapsula resource handlers using `thiserror`.

use crate::client::ClientError;
use crate::resources::ResourceId;

/// Custom result type for provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Main error type returned to the hosting framework
#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    /// A call on the external API client failed. The client error is carried
    /// unchanged as the source.
    #[error("{operation} failed: {source}")]
    ExternalApi {
        operation: &'static str,
        #[source]
        source: ClientError,
    },

    /// Declared attributes failed validation
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// An immutable attribute changed; the framework must destroy and recreate
    #[error("Attribute '{attribute}' of {resource_type} cannot be changed in place")]
    RequiresReplacement {
        resource_type: String,
        attribute: String,
    },

    /// Resource type not served by this provider
    #[error("Unknown resource type: {resource_type}")]
    UnknownResource { resource_type: String },

    /// State document could not be decoded or encoded
    #[error("Invalid state for {resource_type}: {source}")]
    InvalidState {
        resource_type: String,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A propagation wait was cancelled before it finished
    #[error("Operation cancelled: {operation}")]
    Cancelled { operation: String },

    /// The remote object was created but reading it back failed. The
    /// identity must be kept so the next run reads or deletes the object
    /// instead of creating it again.
    #[error("{resource_type} '{id}' was created but could not be read back: {source}")]
    PartialCreate {
        resource_type: String,
        id: ResourceId,
        /// State document for the framework, filled in by the provider
        state: Option<serde_json::Value>,
        #[source]
        source: Box<ProviderError>,
    },
}

impl ProviderError {
    /// Wrap a client error raised by the named API call
    pub fn external_api(operation: &'static str, source: ClientError) -> Self {
        Self::ExternalApi { operation, source }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a replacement-required error
    pub fn requires_replacement<R: Into<String>, A: Into<String>>(
        resource_type: R,
        attribute: A,
    ) -> Self {
        Self::RequiresReplacement {
            resource_type: resource_type.into(),
            attribute: attribute.into(),
        }
    }

    /// Create an unknown resource type error
    pub fn unknown_resource<S: Into<String>>(resource_type: S) -> Self {
        Self::UnknownResource {
            resource_type: resource_type.into(),
        }
    }

    /// Create an invalid state error
    pub fn invalid_state<S: Into<String>>(resource_type: S, source: serde_json::Error) -> Self {
        Self::InvalidState {
            resource_type: resource_type.into(),
            source,
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a cancellation error
    pub fn cancelled<S: Into<String>>(operation: S) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    /// Wrap the failure of the read-back that follows a successful remote create
    pub fn partial_create<S: Into<String>>(
        resource_type: S,
        id: ResourceId,
        source: ProviderError,
    ) -> Self {
        Self::PartialCreate {
            resource_type: resource_type.into(),
            id,
            state: None,
            source: Box::new(source),
        }
    }

    /// Attach the framework state document to a `PartialCreate` error
    pub fn with_state(self, document: serde_json::Value) -> Self {
        match self {
            Self::PartialCreate {
                resource_type,
                id,
                source,
                ..
            } => Self::PartialCreate {
                resource_type,
                id,
                state: Some(document),
                source,
            },
            other => other,
        }
    }

    /// Identity of a remote object created before the operation failed
    pub fn created_id(&self) -> Option<&ResourceId> {
        match self {
            ProviderError::PartialCreate { id, .. } => Some(id),
            _ => None,
        }
    }

    /// State document the framework should persist despite the error
    pub fn partial_state(&self) -> Option<&serde_json::Value> {
        match self {
            ProviderError::PartialCreate { state, .. } => state.as_ref(),
            _ => None,
        }
    }

    /// The client error behind an `ExternalApi` failure, including one
    /// wrapped in `PartialCreate`
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            ProviderError::ExternalApi { source, .. } => Some(source),
            ProviderError::PartialCreate { source, .. } => source.client_error(),
            _ => None,
        }
    }
}

impl From<validator::ValidationErrors> for ProviderError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let field = field_errors.keys().next().map(|f| f.to_string());
        let message = field_errors
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::Validation {
            message: format!("Validation failed: {}", message),
            field,
        }
    }
}

impl From<toml::de::Error> for ProviderError {
    fn from(error: toml::de::Error) -> Self {
        Self::config_with_source("Failed to parse settings file", Box::new(error))
    }
}
