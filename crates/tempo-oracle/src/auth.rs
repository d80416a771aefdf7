//! Authorization capability for configuration changes.
//!
//! The oracle does not manage principals itself. It asks an injected
//! [`Authorizer`] before every admin mutation.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identity of a caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal(pub String);

impl Principal {
    /// Create a principal from any string-like identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decides whether a principal may change oracle configuration.
pub trait Authorizer: Send + Sync {
    /// Return `true` if `principal` may invoke admin operations.
    fn is_authorized(&self, principal: &Principal) -> bool;
}

impl fmt::Debug for dyn Authorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Authorizer")
    }
}

/// Fixed set of admin principals.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    principals: HashSet<Principal>,
}

impl AllowList {
    /// Build an allow list from principal identifiers.
    pub fn new<I, S>(principals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            principals: principals.into_iter().map(Principal::new).collect(),
        }
    }

    /// Number of enrolled principals.
    pub fn len(&self) -> usize {
        self.principals.len()
    }

    /// Whether no principal is enrolled.
    pub fn is_empty(&self) -> bool {
        self.principals.is_empty()
    }
}

impl Authorizer for AllowList {
    fn is_authorized(&self, principal: &Principal) -> bool {
        self.principals.contains(principal)
    }
}

/// Authorizes everyone. For single-operator deployments and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn is_authorized(&self, _principal: &Principal) -> bool {
        true
    }
}
