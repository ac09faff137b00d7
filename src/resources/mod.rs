//! # Resource Handlers
//!
//! Each handler maps declared attributes onto calls against an
//! [`IncapsulaClient`](crate::client::IncapsulaClient) and reconciles the
//! remote answer back into a [`ResourceState`].
//!
//! Operations borrow the prior state and return a new one. A failed operation
//! returns an error and the caller keeps the state it already had, so identity
//! is only ever cleared or replaced on success.
//!
//! ```text
//! Absent --Create--> Present --Delete--> Absent
//!                    Present --Update--> Present   (certificate only)
//! ```

pub mod certificate;
pub mod user;

use std::fmt;

pub use certificate::{CertificateAttributes, CertificateResource, SITE_NOT_FOUND_RES};
pub use user::{UserAttributes, UserResource};

/// Identity the hosting framework uses to track a managed resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceId {
    /// The remote API keeps at most one instance per parent and has no
    /// identifier of its own. Rendered as [`ResourceId::SINGLETON_PLACEHOLDER`].
    Singleton,
    /// Identifier assigned by the remote API.
    Assigned(String),
}

impl ResourceId {
    /// String form of [`ResourceId::Singleton`] written to framework state.
    pub const SINGLETON_PLACEHOLDER: &'static str = "12345";

    pub fn as_str(&self) -> &str {
        match self {
            ResourceId::Singleton => Self::SINGLETON_PLACEHOLDER,
            ResourceId::Assigned(id) => id,
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local view of one managed resource: its identity (if present) and attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<A> {
    pub id: Option<ResourceId>,
    pub attributes: A,
}

impl<A> ResourceState<A> {
    /// State of a resource that exists remotely
    pub fn present(id: ResourceId, attributes: A) -> Self {
        Self {
            id: Some(id),
            attributes,
        }
    }

    /// State of a resource that does not exist (yet, or any more)
    pub fn absent(attributes: A) -> Self {
        Self {
            id: None,
            attributes,
        }
    }

    pub fn is_present(&self) -> bool {
        self.id.is_some()
    }

    /// Same attributes with identity cleared
    pub fn cleared(self) -> Self {
        Self { id: None, ..self }
    }
}
