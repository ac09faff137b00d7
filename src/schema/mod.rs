//! # Attribute Schemas
//!
//! Declared attribute schema for each resource type. The hosting framework
//! diffs desired against actual state with these declarations to decide which
//! lifecycle operation to invoke, and forces replacement when a `force_new`
//! attribute changes.

use serde::Serialize;

use crate::resources::{CertificateResource, UserResource};

/// Value type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Int,
    StringList,
}

/// One declared attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "type")]
    pub kind: AttributeType,
    pub required: bool,
    /// Changing the value destroys and recreates the resource
    pub force_new: bool,
    /// Value is never shown in plans; state keeps a sha256 digest
    pub sensitive: bool,
}

impl Attribute {
    pub fn required(name: &'static str, kind: AttributeType, description: &'static str) -> Self {
        Self {
            name,
            description,
            kind,
            required: true,
            force_new: false,
            sensitive: false,
        }
    }

    pub fn optional(name: &'static str, kind: AttributeType, description: &'static str) -> Self {
        Self {
            name,
            description,
            kind,
            required: false,
            force_new: false,
            sensitive: false,
        }
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }
}

/// How `terraform import`-style adoption derives identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    /// Any import id is accepted; identity is the singleton placeholder
    Singleton,
    /// The import id becomes the identity unchanged
    Passthrough,
}

/// Full schema of one resource type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceSchema {
    pub type_name: &'static str,
    pub attributes: Vec<Attribute>,
    /// Whether the resource can be changed in place
    pub supports_update: bool,
    pub import: ImportKind,
}

impl ResourceSchema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Names of attributes whose change forces replacement
    pub fn force_new_attributes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.attributes.iter().filter(|a| a.force_new).map(|a| a.name)
    }
}

pub fn certificate_schema() -> ResourceSchema {
    ResourceSchema {
        type_name: CertificateResource::TYPE_NAME,
        attributes: vec![
            Attribute::required(
                "site_id",
                AttributeType::String,
                "Numeric identifier of the site to operate on.",
            )
            .force_new(),
            Attribute::required(
                "certificate",
                AttributeType::String,
                "The certificate file in base64 format.",
            ),
            Attribute::optional(
                "private_key",
                AttributeType::String,
                "The private key of the certificate in base64 format. Optional in case of PFX \
                 certificate file format. This will be encoded in sha256 in state.",
            )
            .sensitive(),
            Attribute::optional(
                "passphrase",
                AttributeType::String,
                "The passphrase used to protect your SSL certificate. This will be encoded in \
                 sha256 in state.",
            )
            .sensitive(),
        ],
        supports_update: true,
        import: ImportKind::Singleton,
    }
}

pub fn user_schema() -> ResourceSchema {
    ResourceSchema {
        type_name: UserResource::TYPE_NAME,
        attributes: vec![
            Attribute::required(
                "email",
                AttributeType::String,
                "Email address. For example: joe@example.com",
            )
            .force_new(),
            Attribute::required(
                "account_id",
                AttributeType::Int,
                "Unique ID of the required account. For example: 123456",
            )
            .force_new(),
            Attribute::optional(
                "first_name",
                AttributeType::String,
                "The first name of the user that was acted on. For example: John",
            )
            .force_new(),
            Attribute::optional(
                "last_name",
                AttributeType::String,
                "The last name of the user that was acted on. For example: Snow",
            )
            .force_new(),
            Attribute::optional(
                "role_names",
                AttributeType::StringList,
                "List of role names to add to the user. Use role IDs or role names to add roles \
                 to the user, but not both.",
            )
            .force_new(),
        ],
        supports_update: false,
        import: ImportKind::Passthrough,
    }
}
