//! Request and response types exchanged with the Incapsula API.

use serde::{Deserialize, Serialize};

use crate::sensitive::Sensitive;

/// Certificate material uploaded for a site (add and edit share this shape)
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateRequest {
    pub site_id: String,
    /// Certificate file in base64 format
    pub certificate: String,
    /// Absent for PFX certificates
    pub private_key: Option<Sensitive>,
    pub passphrase: Option<Sensitive>,
}

/// Response to a certificate upload or edit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificateResponse {
    pub res: i64,
    #[serde(default)]
    pub res_message: String,
}

/// Summary of a custom certificate attached to a site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomCertificate {
    #[serde(default)]
    pub expiration_date: Option<i64>,
    #[serde(default)]
    pub revocation_error: Option<bool>,
    #[serde(default)]
    pub validity_error: Option<bool>,
    #[serde(default)]
    pub chain_error: Option<bool>,
    #[serde(default)]
    pub hostname_mismatch_error: Option<bool>,
}

/// Response to listing the custom certificates of a site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListCertificatesResponse {
    pub res: i64,
    #[serde(default)]
    pub res_message: String,
    #[serde(default)]
    pub custom_certificates: Vec<CustomCertificate>,
}

/// Request to create a user under an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAddRequest {
    pub account_id: u64,
    pub email: String,
    pub role_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Role record attached to a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRole {
    pub role_id: u64,
    pub role_name: String,
}

/// Response to creating a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAddResponse {
    pub user_id: u64,
    pub account_id: u64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub roles: Vec<UserRole>,
}

/// Current status of a user, looked up by account and email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatusResponse {
    pub user_id: u64,
    pub account_id: u64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub roles: Vec<UserRole>,
}

impl UserStatusResponse {
    /// Role names in the order the API reported them
    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|role| role.role_name.clone()).collect()
    }
}
