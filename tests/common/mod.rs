//! Common test utilities for all integration tests.
//!
//! Provides an in-memory Incapsula API with failure injection and a call log.

#![allow(dead_code)]
#![allow(clippy::duplicate_mod)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use incapsula_provider::client::{
    CertificateRequest, CertificateResponse, ClientError, ClientResult, IncapsulaClient,
    ListCertificatesResponse, UserAddRequest, UserAddResponse, UserRole, UserStatusResponse,
};
use incapsula_provider::resources::SITE_NOT_FOUND_RES;

/// Error injected into a named API operation
#[derive(Debug, Clone)]
pub enum Failure {
    Api { res: i64, message: String },
    Transport(String),
}

impl Failure {
    fn to_error(&self) -> ClientError {
        match self {
            Failure::Api { res, message } => ClientError::api(*res, message.clone()),
            Failure::Transport(message) => ClientError::transport(message.clone()),
        }
    }
}

/// How a deleted site shows up in ListCertificates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteGone {
    /// Successful response with `res` 9413
    InResponse,
    /// [`ClientError::Api`] with `res` 9413
    AsError,
}

#[derive(Debug, Clone)]
pub struct StoredUser {
    pub user_id: u64,
    pub first_name: String,
    pub last_name: String,
    pub role_names: Vec<String>,
}

#[derive(Default)]
struct FakeState {
    certificates: HashMap<String, CertificateRequest>,
    gone_sites: HashMap<String, SiteGone>,
    users: HashMap<(u64, String), StoredUser>,
    next_user_id: u64,
    failures: HashMap<&'static str, Failure>,
    hidden_role_reads: u32,
    list_res: Option<(i64, String)>,
    invisible_users: HashSet<(u64, String)>,
    calls: Vec<&'static str>,
}

/// In-memory stand-in for the Incapsula API
pub struct FakeIncapsula {
    state: Mutex<FakeState>,
}

impl Default for FakeIncapsula {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeIncapsula {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                next_user_id: 1,
                ..Default::default()
            }),
        }
    }

    /// Make every call to `operation` fail with `failure`
    pub fn fail(&self, operation: &'static str, failure: Failure) {
        self.state.lock().unwrap().failures.insert(operation, failure);
    }

    pub fn fail_api(&self, operation: &'static str, res: i64, message: &str) {
        self.fail(
            operation,
            Failure::Api {
                res,
                message: message.to_string(),
            },
        );
    }

    pub fn fail_transport(&self, operation: &'static str, message: &str) {
        self.fail(operation, Failure::Transport(message.to_string()));
    }

    pub fn clear_failures(&self) {
        self.state.lock().unwrap().failures.clear();
    }

    /// Simulate the site having been deleted out of band
    pub fn delete_site(&self, site_id: &str, how: SiteGone) {
        let mut state = self.state.lock().unwrap();
        state.certificates.remove(site_id);
        state.gone_sites.insert(site_id.to_string(), how);
    }

    /// ListCertificates answers `Ok` with this non-zero `res`
    pub fn answer_list_with(&self, res: i64, message: &str) {
        self.state.lock().unwrap().list_res = Some((res, message.to_string()));
    }

    pub fn set_next_user_id(&self, user_id: u64) {
        self.state.lock().unwrap().next_user_id = user_id;
    }

    /// The next `reads` UserStatus calls report the user without roles
    pub fn hide_roles_for(&self, reads: u32) {
        self.state.lock().unwrap().hidden_role_reads = reads;
    }

    /// UserStatus never finds this user, even after AddUser
    pub fn never_visible(&self, account_id: u64, email: &str) {
        self.state
            .lock()
            .unwrap()
            .invisible_users
            .insert((account_id, email.to_string()));
    }

    pub fn insert_user(&self, account_id: u64, email: &str, user: StoredUser) {
        self.state
            .lock()
            .unwrap()
            .users
            .insert((account_id, email.to_string()), user);
    }

    pub fn certificate(&self, site_id: &str) -> Option<CertificateRequest> {
        self.state.lock().unwrap().certificates.get(site_id).cloned()
    }

    pub fn user(&self, account_id: u64, email: &str) -> Option<StoredUser> {
        self.state
            .lock()
            .unwrap()
            .users
            .get(&(account_id, email.to_string()))
            .cloned()
    }

    /// Operations called so far, in order
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| **c == operation)
            .count()
    }

    fn begin(
        &self,
        operation: &'static str,
    ) -> ClientResult<std::sync::MutexGuard<'_, FakeState>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(operation);
        match state.failures.get(operation) {
            Some(failure) => Err(failure.to_error()),
            None => Ok(state),
        }
    }
}

fn ok_response() -> CertificateResponse {
    CertificateResponse {
        res: 0,
        res_message: "OK".to_string(),
    }
}

#[async_trait]
impl IncapsulaClient for FakeIncapsula {
    async fn add_certificate(
        &self,
        request: &CertificateRequest,
    ) -> ClientResult<CertificateResponse> {
        let mut state = self.begin("AddCertificate")?;
        state.gone_sites.remove(&request.site_id);
        state.certificates.insert(request.site_id.clone(), request.clone());
        Ok(ok_response())
    }

    async fn list_certificates(&self, site_id: &str) -> ClientResult<ListCertificatesResponse> {
        let state = self.begin("ListCertificates")?;
        if let Some((res, message)) = &state.list_res {
            return Ok(ListCertificatesResponse {
                res: *res,
                res_message: message.clone(),
                custom_certificates: Vec::new(),
            });
        }
        match state.gone_sites.get(site_id) {
            Some(SiteGone::InResponse) => Ok(ListCertificatesResponse {
                res: SITE_NOT_FOUND_RES,
                res_message: "Unknown/unauthorized site_id".to_string(),
                custom_certificates: Vec::new(),
            }),
            Some(SiteGone::AsError) => {
                Err(ClientError::api(SITE_NOT_FOUND_RES, "Unknown/unauthorized site_id"))
            }
            None => Ok(ListCertificatesResponse {
                res: 0,
                res_message: "OK".to_string(),
                custom_certificates: state
                    .certificates
                    .get(site_id)
                    .map(|_| vec![Default::default()])
                    .unwrap_or_default(),
            }),
        }
    }

    async fn edit_certificate(
        &self,
        request: &CertificateRequest,
    ) -> ClientResult<CertificateResponse> {
        let mut state = self.begin("EditCertificate")?;
        state.certificates.insert(request.site_id.clone(), request.clone());
        Ok(ok_response())
    }

    async fn delete_certificate(&self, site_id: &str) -> ClientResult<()> {
        let mut state = self.begin("DeleteCertificate")?;
        state.certificates.remove(site_id);
        Ok(())
    }

    async fn add_user(&self, request: &UserAddRequest) -> ClientResult<UserAddResponse> {
        let mut state = self.begin("AddUser")?;
        let user_id = state.next_user_id;
        state.next_user_id += 1;

        let user = StoredUser {
            user_id,
            first_name: request.first_name.clone().unwrap_or_default(),
            last_name: request.last_name.clone().unwrap_or_default(),
            role_names: request.role_names.clone(),
        };
        state.users.insert((request.account_id, request.email.clone()), user.clone());

        Ok(UserAddResponse {
            user_id,
            account_id: request.account_id,
            email: request.email.clone(),
            first_name: user.first_name,
            last_name: user.last_name,
            roles: Vec::new(),
        })
    }

    async fn user_status(&self, account_id: u64, email: &str) -> ClientResult<UserStatusResponse> {
        let mut state = self.begin("UserStatus")?;
        let key = (account_id, email.to_string());
        if state.invisible_users.contains(&key) {
            return Err(ClientError::api(1, "User not found"));
        }
        let user = state
            .users
            .get(&key)
            .cloned()
            .ok_or_else(|| ClientError::api(1, "User not found"))?;

        let roles = if state.hidden_role_reads > 0 {
            state.hidden_role_reads -= 1;
            Vec::new()
        } else {
            user.role_names
                .iter()
                .enumerate()
                .map(|(i, name)| UserRole {
                    role_id: i as u64 + 1,
                    role_name: name.clone(),
                })
                .collect()
        };

        Ok(UserStatusResponse {
            user_id: user.user_id,
            account_id,
            email: email.to_string(),
            first_name: user.first_name,
            last_name: user.last_name,
            roles,
        })
    }

    async fn delete_user(&self, account_id: u64, email: &str) -> ClientResult<()> {
        let mut state = self.begin("DeleteUser")?;
        state
            .users
            .remove(&(account_id, email.to_string()))
            .map(|_| ())
            .ok_or_else(|| ClientError::api(1, "User not found"))
    }
}
