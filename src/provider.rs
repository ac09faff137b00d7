//! # Provider Registry
//!
//! Maps resource type names onto their handlers and translates between the
//! hosting framework's JSON state documents and typed [`ResourceState`]s.
//!
//! A state document is a flat JSON object holding the identity under `"id"`
//! (a string, or null/absent when the resource does not exist) next to the
//! declared attributes:
//!
//! ```json
//! {"id": "12345", "site_id": "100", "certificate": "BASE64A"}
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn, Instrument};

use crate::client::IncapsulaClient;
use crate::config::ProviderSettings;
use crate::errors::{ProviderError, Result};
use crate::resource_span;
use crate::resources::{
    CertificateAttributes, CertificateResource, ResourceId, ResourceState, UserAttributes,
    UserResource,
};
use crate::schema::{certificate_schema, user_schema, ResourceSchema};

/// Resource types served by this provider
pub const RESOURCE_TYPES: [&str; 2] = [CertificateResource::TYPE_NAME, UserResource::TYPE_NAME];

#[derive(Debug, Serialize, Deserialize)]
struct StateDocument<A> {
    #[serde(default)]
    id: Option<String>,
    #[serde(flatten)]
    attributes: A,
}

/// Entry point the hosting framework drives
#[derive(Clone)]
pub struct IncapsulaProvider {
    certificate: CertificateResource,
    user: UserResource,
}

impl IncapsulaProvider {
    /// Build both handlers over one shared client
    pub fn new(client: Arc<dyn IncapsulaClient>, settings: &ProviderSettings) -> Self {
        Self {
            certificate: CertificateResource::new(client.clone()),
            user: UserResource::new(client).with_propagation(settings.propagation.to_policy()),
        }
    }

    /// Cancel pending propagation waits when `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.user = self.user.with_cancellation(cancel);
        self
    }

    pub fn certificate(&self) -> &CertificateResource {
        &self.certificate
    }

    pub fn user(&self) -> &UserResource {
        &self.user
    }

    pub fn resource_types(&self) -> &'static [&'static str] {
        &RESOURCE_TYPES
    }

    pub fn schema(&self, resource_type: &str) -> Result<ResourceSchema> {
        match resource_type {
            CertificateResource::TYPE_NAME => Ok(certificate_schema()),
            UserResource::TYPE_NAME => Ok(user_schema()),
            other => Err(ProviderError::unknown_resource(other)),
        }
    }

    /// Create a resource from its planned attributes.
    ///
    /// If the remote object was created but reading it back failed, the
    /// returned [`ProviderError::PartialCreate`] carries the state document
    /// to persist (see [`ProviderError::partial_state`]).
    pub async fn create(&self, resource_type: &str, planned: Value) -> Result<Value> {
        let span = resource_span!(resource_type, "create");
        async move {
            match resource_type {
                CertificateResource::TYPE_NAME => {
                    let planned = decode_planned::<CertificateAttributes>(resource_type, planned)?;
                    let state = self
                        .certificate
                        .create(&planned)
                        .await
                        .map_err(|e| with_partial_state(resource_type, &planned, e))?;
                    encode(resource_type, &state)
                }
                UserResource::TYPE_NAME => {
                    let planned = decode_planned::<UserAttributes>(resource_type, planned)?;
                    let state = self
                        .user
                        .create(&planned)
                        .await
                        .map_err(|e| with_partial_state(resource_type, &planned, e))?;
                    encode(resource_type, &state)
                }
                other => Err(ProviderError::unknown_resource(other)),
            }
        }
        .instrument(span)
        .await
    }

    /// Refresh a resource from the remote API
    pub async fn read(&self, resource_type: &str, current: Value) -> Result<Value> {
        let span = resource_span!(resource_type, "read");
        async move {
            match resource_type {
                CertificateResource::TYPE_NAME => {
                    let current = decode_certificate_state(current)?;
                    let state = self.certificate.read(&current).await?;
                    encode(resource_type, &state)
                }
                UserResource::TYPE_NAME => {
                    let current = decode_user_state(current)?;
                    let state = self.user.read(&current).await?;
                    encode(resource_type, &state)
                }
                other => Err(ProviderError::unknown_resource(other)),
            }
        }
        .instrument(span)
        .await
    }

    /// Change a resource in place
    pub async fn update(&self, resource_type: &str, prior: Value, planned: Value) -> Result<Value> {
        let span = resource_span!(resource_type, "update");
        async move {
            match resource_type {
                CertificateResource::TYPE_NAME => {
                    let prior = decode_certificate_state(prior)?;
                    let planned = decode_planned::<CertificateAttributes>(resource_type, planned)?;
                    let state = self.certificate.update(&prior, &planned).await?;
                    encode(resource_type, &state)
                }
                UserResource::TYPE_NAME => {
                    Err(ProviderError::requires_replacement(resource_type, "*"))
                }
                other => Err(ProviderError::unknown_resource(other)),
            }
        }
        .instrument(span)
        .await
    }

    /// Delete a resource. On success the returned document has a null id.
    pub async fn delete(&self, resource_type: &str, current: Value) -> Result<Value> {
        let span = resource_span!(resource_type, "delete");
        async move {
            match resource_type {
                CertificateResource::TYPE_NAME => {
                    let current = decode_certificate_state(current)?;
                    let state = self.certificate.delete(&current).await?;
                    encode(resource_type, &state)
                }
                UserResource::TYPE_NAME => {
                    let current = decode_user_state(current)?;
                    let state = self.user.delete(&current).await?;
                    encode(resource_type, &state)
                }
                other => Err(ProviderError::unknown_resource(other)),
            }
        }
        .instrument(span)
        .await
    }

    /// Adopt an existing remote resource under `import_id`
    pub fn import(&self, resource_type: &str, import_id: &str, current: Value) -> Result<Value> {
        let _guard = resource_span!(resource_type, "import", import_id = %import_id).entered();
        match resource_type {
            CertificateResource::TYPE_NAME => {
                let current = decode_certificate_state(current)?;
                let state = self.certificate.import_state(import_id, &current.attributes);
                encode(resource_type, &state)
            }
            UserResource::TYPE_NAME => {
                let current = decode_user_state(current)?;
                let state = self.user.import_state(import_id, &current.attributes);
                encode(resource_type, &state)
            }
            other => Err(ProviderError::unknown_resource(other)),
        }
    }
}

fn decode_document<A: DeserializeOwned>(
    resource_type: &str,
    document: Value,
) -> Result<StateDocument<A>> {
    serde_json::from_value(document).map_err(|e| ProviderError::invalid_state(resource_type, e))
}

/// Planned attributes come from configuration; any `id` is ignored.
fn decode_planned<A: DeserializeOwned>(resource_type: &str, document: Value) -> Result<A> {
    Ok(decode_document::<A>(resource_type, document)?.attributes)
}

fn decode_certificate_state(document: Value) -> Result<ResourceState<CertificateAttributes>> {
    let doc = decode_document::<CertificateAttributes>(CertificateResource::TYPE_NAME, document)?;
    // Any stored id denotes the singleton certificate of the site.
    Ok(ResourceState {
        id: doc.id.filter(|id| !id.is_empty()).map(|_| ResourceId::Singleton),
        attributes: doc.attributes.from_stored(),
    })
}

fn decode_user_state(document: Value) -> Result<ResourceState<UserAttributes>> {
    let doc = decode_document::<UserAttributes>(UserResource::TYPE_NAME, document)?;
    Ok(ResourceState {
        id: doc.id.filter(|id| !id.is_empty()).map(ResourceId::Assigned),
        attributes: doc.attributes,
    })
}

/// Give a `PartialCreate` error the document the framework must keep.
fn with_partial_state<A: Serialize>(
    resource_type: &str,
    planned: &A,
    error: ProviderError,
) -> ProviderError {
    let Some(id) = error.created_id().cloned() else {
        return error;
    };
    match encode(resource_type, &ResourceState::present(id, planned)) {
        Ok(document) => error.with_state(document),
        Err(e) => {
            warn!(error = %e, "Could not encode partially created state");
            error
        }
    }
}

fn encode<A: Serialize>(resource_type: &str, state: &ResourceState<A>) -> Result<Value> {
    let document = StateDocument {
        id: state.id.as_ref().map(|id| id.as_str().to_string()),
        attributes: &state.attributes,
    };
    let value = serde_json::to_value(document)
        .map_err(|e| ProviderError::invalid_state(resource_type, e))?;
    debug!(
        resource_type = %resource_type,
        present = state.is_present(),
        "Encoded resource state"
    );
    Ok(value)
}
