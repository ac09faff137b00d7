//! User account scoped to a parent account.
//!
//! Every declared attribute is immutable, so there is no update path: the
//! framework destroys and recreates the user instead. The remote user id is
//! captured once at creation; reads look the user up by account and email.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

use super::{ResourceId, ResourceState};
use crate::client::{IncapsulaClient, UserAddRequest, UserStatusResponse};
use crate::consistency::{wait_until_visible, PropagationPolicy};
use crate::errors::{ProviderError, Result};

/// Declared attributes of an `incapsula_user` resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct UserAttributes {
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,

    #[validate(range(min = 1, message = "account_id must be a positive account identifier"))]
    pub account_id: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    /// Role names in declaration order
    pub role_names: Vec<String>,
}

impl UserAttributes {
    fn to_request(&self) -> UserAddRequest {
        UserAddRequest {
            account_id: self.account_id,
            email: self.email.clone(),
            role_names: self.role_names.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }

    fn from_status(status: UserStatusResponse) -> Self {
        let role_names = status.role_names();
        Self {
            email: status.email,
            account_id: status.account_id,
            first_name: non_empty(status.first_name),
            last_name: non_empty(status.last_name),
            role_names,
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Handler for the `incapsula_user` resource
#[derive(Clone)]
pub struct UserResource {
    client: Arc<dyn IncapsulaClient>,
    propagation: PropagationPolicy,
    cancel: CancellationToken,
}

impl UserResource {
    pub const TYPE_NAME: &'static str = "incapsula_user";

    pub fn new(client: Arc<dyn IncapsulaClient>) -> Self {
        Self {
            client,
            propagation: PropagationPolicy::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Use a different propagation wait after creating a user
    pub fn with_propagation(mut self, propagation: PropagationPolicy) -> Self {
        self.propagation = propagation;
        self
    }

    /// Abort pending propagation waits when `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn propagation(&self) -> &PropagationPolicy {
        &self.propagation
    }

    /// Create the user, wait for it to propagate, then read it back.
    ///
    /// Once AddUser succeeded, a cancelled wait or a failed read-back returns
    /// [`ProviderError::PartialCreate`] carrying the assigned identity.
    #[instrument(skip_all, fields(email = %planned.email, account_id = planned.account_id))]
    pub async fn create(&self, planned: &UserAttributes) -> Result<ResourceState<UserAttributes>> {
        planned.validate()?;

        info!(email = %planned.email, "Creating Incapsula user");

        let response = self
            .client
            .add_user(&planned.to_request())
            .await
            .map_err(|e| {
                error!(email = %planned.email, error = %e, "Could not create user");
                ProviderError::external_api("AddUser", e)
            })?;

        let id = ResourceId::Assigned(response.user_id.to_string());
        info!(email = %planned.email, user_id = response.user_id, "Created Incapsula user");

        let state = ResourceState::present(id.clone(), planned.clone());
        self.settle_and_read(&state).await.map_err(|e| {
            warn!(
                email = %planned.email,
                user_id = response.user_id,
                error = %e,
                "User created but could not be read back"
            );
            ProviderError::partial_create(Self::TYPE_NAME, id, e)
        })
    }

    async fn settle_and_read(
        &self,
        state: &ResourceState<UserAttributes>,
    ) -> Result<ResourceState<UserAttributes>> {
        let planned = &state.attributes;
        let outcome = wait_until_visible(&self.propagation, &self.cancel, "AddUser", move || {
            self.is_visible(planned)
        })
        .await?;
        if !outcome.is_visible() {
            warn!(
                email = %planned.email,
                ?outcome,
                "User not fully visible after propagation wait, reading current state"
            );
        }

        self.read(state).await
    }

    /// Refresh every attribute from the remote user. Identity is carried over
    /// unchanged; the lookup key is account and email, not the stored id.
    #[instrument(
        skip_all,
        fields(email = %state.attributes.email, account_id = state.attributes.account_id)
    )]
    pub async fn read(
        &self,
        state: &ResourceState<UserAttributes>,
    ) -> Result<ResourceState<UserAttributes>> {
        let email = &state.attributes.email;
        debug!(user_id = ?state.id, email = %email, "Reading Incapsula user");

        let status = self
            .client
            .user_status(state.attributes.account_id, email)
            .await
            .map_err(|e| {
                error!(email = %email, error = %e, "Could not read Incapsula user");
                ProviderError::external_api("UserStatus", e)
            })?;

        debug!(roles = ?status.roles, "Fetched user roles");
        let attributes = UserAttributes::from_status(status);

        info!(email = %email, "Finished reading Incapsula user");
        Ok(ResourceState {
            id: state.id.clone(),
            attributes,
        })
    }

    /// Delete the user by account and email and clear identity.
    #[instrument(
        skip_all,
        fields(email = %state.attributes.email, account_id = state.attributes.account_id)
    )]
    pub async fn delete(
        &self,
        state: &ResourceState<UserAttributes>,
    ) -> Result<ResourceState<UserAttributes>> {
        let email = &state.attributes.email;
        info!(email = %email, "Deleting Incapsula user");

        self.client
            .delete_user(state.attributes.account_id, email)
            .await
            .map_err(|e| {
                error!(email = %email, error = %e, "Could not delete Incapsula user");
                ProviderError::external_api("DeleteUser", e)
            })?;

        info!(email = %email, "Deleted Incapsula user");
        Ok(state.clone().cleared())
    }

    /// Adopt an existing user; the import id becomes the identity as-is.
    pub fn import_state(
        &self,
        import_id: &str,
        current: &UserAttributes,
    ) -> ResourceState<UserAttributes> {
        ResourceState::present(ResourceId::Assigned(import_id.to_string()), current.clone())
    }

    /// True once the user exists remotely with every requested role.
    async fn is_visible(&self, planned: &UserAttributes) -> bool {
        match self.client.user_status(planned.account_id, &planned.email).await {
            Ok(status) => planned
                .role_names
                .iter()
                .all(|wanted| status.roles.iter().any(|role| &role.role_name == wanted)),
            Err(e) => {
                debug!(email = %planned.email, error = %e, "User not visible yet");
                false
            }
        }
    }
}
