//! Tracing wrapper for client implementations.
//!
//! Emits one structured event per API call with the operation name, the
//! lookup keys and the outcome. Certificate material is never recorded.

use async_trait::async_trait;
use std::time::Instant;

use super::error::ClientResult;
use super::types::{
    CertificateRequest, CertificateResponse, ListCertificatesResponse, UserAddRequest,
    UserAddResponse, UserStatusResponse,
};
use super::IncapsulaClient;

/// Wraps any [`IncapsulaClient`] and logs every call it forwards.
pub struct TracedClient<C: IncapsulaClient> {
    inner: C,
}

impl<C: IncapsulaClient> TracedClient<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    /// The wrapped client
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

fn record<T>(operation: &str, key: &str, started: Instant, result: &ClientResult<T>) {
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match result {
        Ok(_) => tracing::debug!(
            operation = %operation,
            key = %key,
            elapsed_ms,
            "Incapsula API call succeeded"
        ),
        Err(e) => tracing::warn!(
            operation = %operation,
            key = %key,
            elapsed_ms,
            res = ?e.res_code(),
            error = %e,
            "Incapsula API call failed"
        ),
    }
}

#[async_trait]
impl<C: IncapsulaClient> IncapsulaClient for TracedClient<C> {
    async fn add_certificate(
        &self,
        request: &CertificateRequest,
    ) -> ClientResult<CertificateResponse> {
        let started = Instant::now();
        let result = self.inner.add_certificate(request).await;
        record("AddCertificate", &request.site_id, started, &result);
        result
    }

    async fn list_certificates(&self, site_id: &str) -> ClientResult<ListCertificatesResponse> {
        let started = Instant::now();
        let result = self.inner.list_certificates(site_id).await;
        record("ListCertificates", site_id, started, &result);
        result
    }

    async fn edit_certificate(
        &self,
        request: &CertificateRequest,
    ) -> ClientResult<CertificateResponse> {
        let started = Instant::now();
        let result = self.inner.edit_certificate(request).await;
        record("EditCertificate", &request.site_id, started, &result);
        result
    }

    async fn delete_certificate(&self, site_id: &str) -> ClientResult<()> {
        let started = Instant::now();
        let result = self.inner.delete_certificate(site_id).await;
        record("DeleteCertificate", site_id, started, &result);
        result
    }

    async fn add_user(&self, request: &UserAddRequest) -> ClientResult<UserAddResponse> {
        let started = Instant::now();
        let result = self.inner.add_user(request).await;
        record("AddUser", &request.email, started, &result);
        result
    }

    async fn user_status(&self, account_id: u64, email: &str) -> ClientResult<UserStatusResponse> {
        let started = Instant::now();
        let result = self.inner.user_status(account_id, email).await;
        record("UserStatus", email, started, &result);
        result
    }

    async fn delete_user(&self, account_id: u64, email: &str) -> ClientResult<()> {
        let started = Instant::now();
        let result = self.inner.delete_user(account_id, email).await;
        record("DeleteUser", email, started, &result);
        result
    }
}
