//! Custom TLS certificate attached to a site.
//!
//! Incapsula keeps at most one custom certificate per site and gives it no
//! identifier, so the resource identity is always [`ResourceId::Singleton`].

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use validator::{Validate, ValidationError};

use super::{ResourceId, ResourceState};
use crate::client::{CertificateRequest, ClientError, ClientResult, IncapsulaClient};
use crate::errors::{ProviderError, Result};
use crate::sensitive::Sensitive;

/// `res` code returned by ListCertificates when the site has been deleted.
pub const SITE_NOT_FOUND_RES: i64 = 9413;

/// Declared attributes of an `incapsula_certificate` resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CertificateAttributes {
    /// Numeric identifier of the site. Forces replacement when changed.
    #[validate(custom(function = "validate_site_id"))]
    pub site_id: String,

    /// Certificate file in base64 format
    #[validate(length(min = 1, message = "certificate cannot be empty"))]
    pub certificate: String,

    /// Private key in base64 format. Optional for PFX certificates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<Sensitive>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<Sensitive>,
}

impl CertificateAttributes {
    fn to_request(&self) -> CertificateRequest {
        CertificateRequest {
            site_id: self.site_id.clone(),
            certificate: self.certificate.clone(),
            private_key: self.private_key.clone(),
            passphrase: self.passphrase.clone(),
        }
    }

    /// Attributes decoded from persisted state hold digests in the sensitive
    /// fields, not the secrets themselves.
    pub fn from_stored(mut self) -> Self {
        self.private_key = self
            .private_key
            .take()
            .map(|k| Sensitive::from_state_hash(k.expose()));
        self.passphrase = self
            .passphrase
            .take()
            .map(|p| Sensitive::from_state_hash(p.expose()));
        self
    }
}

/// A response the client returned as `Ok` can still carry a failing `res`.
fn check_res(res: i64, message: String) -> ClientResult<()> {
    if res == 0 {
        Ok(())
    } else {
        Err(ClientError::api(res, message))
    }
}

fn validate_site_id(site_id: &str) -> std::result::Result<(), ValidationError> {
    if !site_id.is_empty() && site_id.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_site_id")
            .with_message("site_id must be a numeric site identifier".into()))
    }
}

/// Handler for the `incapsula_certificate` resource
#[derive(Clone)]
pub struct CertificateResource {
    client: Arc<dyn IncapsulaClient>,
}

impl CertificateResource {
    pub const TYPE_NAME: &'static str = "incapsula_certificate";

    pub fn new(client: Arc<dyn IncapsulaClient>) -> Self {
        Self { client }
    }

    /// Upload the certificate, then read it back.
    ///
    /// Once the upload succeeded, a failed read-back returns
    /// [`ProviderError::PartialCreate`] carrying the singleton identity.
    #[instrument(skip_all, fields(site_id = %planned.site_id))]
    pub async fn create(
        &self,
        planned: &CertificateAttributes,
    ) -> Result<ResourceState<CertificateAttributes>> {
        planned.validate()?;

        info!(site_id = %planned.site_id, "Adding custom certificate to Incapsula site");

        self.client
            .add_certificate(&planned.to_request())
            .await
            .and_then(|response| check_res(response.res, response.res_message))
            .map_err(|e| {
                error!(site_id = %planned.site_id, error = %e, "Could not add custom certificate");
                ProviderError::external_api("AddCertificate", e)
            })?;

        let state = ResourceState::present(ResourceId::Singleton, planned.clone());
        self.read(&state).await.map_err(|e| {
            warn!(
                site_id = %planned.site_id,
                error = %e,
                "Custom certificate added but could not be read back"
            );
            ProviderError::partial_create(Self::TYPE_NAME, ResourceId::Singleton, e)
        })
    }

    /// Refresh the certificate state.
    ///
    /// A deleted site (`res` 9413) is not an error: the state comes back absent.
    /// An absent state stays absent unless the site lists a custom certificate.
    #[instrument(skip_all, fields(site_id = %state.attributes.site_id))]
    pub async fn read(
        &self,
        state: &ResourceState<CertificateAttributes>,
    ) -> Result<ResourceState<CertificateAttributes>> {
        let site_id = &state.attributes.site_id;
        let result = self.client.list_certificates(site_id).await;

        let site_gone = match &result {
            Ok(response) => response.res == SITE_NOT_FOUND_RES,
            Err(e) => e.res_code() == Some(SITE_NOT_FOUND_RES),
        };
        if site_gone {
            info!(site_id = %site_id, "Incapsula site has already been deleted");
            return Ok(state.clone().cleared());
        }

        let response = result
            .and_then(|response| {
                check_res(response.res, response.res_message.clone())?;
                Ok(response)
            })
            .map_err(|e| {
                error!(
                    site_id = %site_id,
                    error = %e,
                    "Could not read custom certificate from Incapsula site"
                );
                ProviderError::external_api("ListCertificates", e)
            })?;

        if !state.is_present() && response.custom_certificates.is_empty() {
            debug!(site_id = %site_id, "No custom certificate on site");
            return Ok(state.clone());
        }

        Ok(ResourceState::present(ResourceId::Singleton, state.attributes.clone()))
    }

    /// Replace the certificate material in place.
    #[instrument(skip_all, fields(site_id = %planned.site_id))]
    pub async fn update(
        &self,
        prior: &ResourceState<CertificateAttributes>,
        planned: &CertificateAttributes,
    ) -> Result<ResourceState<CertificateAttributes>> {
        if prior.attributes.site_id != planned.site_id {
            return Err(ProviderError::requires_replacement(Self::TYPE_NAME, "site_id"));
        }
        planned.validate()?;

        self.client
            .edit_certificate(&planned.to_request())
            .await
            .and_then(|response| check_res(response.res, response.res_message))
            .map_err(|e| {
                error!(site_id = %planned.site_id, error = %e, "Could not edit custom certificate");
                ProviderError::external_api("EditCertificate", e)
            })?;

        info!(site_id = %planned.site_id, "Updated custom certificate");
        Ok(ResourceState::present(ResourceId::Singleton, planned.clone()))
    }

    /// Remove the certificate from the site and clear identity.
    #[instrument(skip_all, fields(site_id = %state.attributes.site_id))]
    pub async fn delete(
        &self,
        state: &ResourceState<CertificateAttributes>,
    ) -> Result<ResourceState<CertificateAttributes>> {
        let site_id = &state.attributes.site_id;

        self.client.delete_certificate(site_id).await.map_err(|e| {
            error!(site_id = %site_id, error = %e, "Could not delete custom certificate");
            ProviderError::external_api("DeleteCertificate", e)
        })?;

        info!(site_id = %site_id, "Deleted custom certificate");
        Ok(state.clone().cleared())
    }

    /// Adopt an existing certificate. The import id carries no information;
    /// whatever `site_id` is already set is kept.
    pub fn import_state(
        &self,
        _import_id: &str,
        current: &CertificateAttributes,
    ) -> ResourceState<CertificateAttributes> {
        ResourceState::present(
            ResourceId::Singleton,
            CertificateAttributes {
                site_id: current.site_id.clone(),
                ..Default::default()
            },
        )
    }
}
