//! External Incapsula API client boundary.
//!
//! The resource handlers never talk HTTP themselves. They consume an
//! [`IncapsulaClient`] implementation supplied by the provider configuration,
//! which owns transport, authentication and request encoding.

pub mod error;
pub mod traced;
pub mod types;

use async_trait::async_trait;

pub use error::{ClientError, ClientResult};
pub use traced::TracedClient;
pub use types::{
    CertificateRequest, CertificateResponse, CustomCertificate, ListCertificatesResponse,
    UserAddRequest, UserAddResponse, UserRole, UserStatusResponse,
};

/// Calls the resource handlers make against the Incapsula API.
///
/// Implementations MUST NOT log certificate private keys or passphrases.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use incapsula_provider::client::*;
/// use async_trait::async_trait;
///
/// struct HttpClient { /* api id, api key, base url */ }
///
/// #[async_trait]
/// impl IncapsulaClient for HttpClient {
///     async fn add_certificate(
///         &self,
///         request: &CertificateRequest,
///     ) -> ClientResult<CertificateResponse> {
///         // POST /api/prov/v1/sites/customCertificate/upload
///         todo!()
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait IncapsulaClient: Send + Sync {
    /// Upload a custom certificate for a site.
    async fn add_certificate(&self, request: &CertificateRequest)
        -> ClientResult<CertificateResponse>;

    /// List the custom certificates of a site.
    ///
    /// A response (or [`ClientError::Api`]) carrying `res` 9413 means the site
    /// no longer exists. Any other non-zero `res` in an `Ok` response is
    /// treated as a failure by the handlers, as for add and edit.
    async fn list_certificates(&self, site_id: &str) -> ClientResult<ListCertificatesResponse>;

    /// Replace the custom certificate of a site.
    async fn edit_certificate(
        &self,
        request: &CertificateRequest,
    ) -> ClientResult<CertificateResponse>;

    /// Remove the custom certificate of a site.
    async fn delete_certificate(&self, site_id: &str) -> ClientResult<()>;

    /// Create a user under an account. Returns the remote-assigned user id.
    async fn add_user(&self, request: &UserAddRequest) -> ClientResult<UserAddResponse>;

    /// Look up a user by account and email.
    async fn user_status(&self, account_id: u64, email: &str) -> ClientResult<UserStatusResponse>;

    /// Delete a user by account and email.
    async fn delete_user(&self, account_id: u64, email: &str) -> ClientResult<()>;
}
