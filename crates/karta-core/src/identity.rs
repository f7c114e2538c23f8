//! Versioned identifiers for knowledge assets, artifacts and operators

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Version assigned to freshly minted identifiers
pub const INITIAL_VERSION: &str = "1.0.0";

/// A UUID tag paired with a version string
///
/// Used for the semantic identity of a knowledge asset, the identity of one
/// physical artifact encoding it, and the identity of operators. Rendered as
/// `urn:uuid:<tag>:<version>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VersionedId {
    tag: Uuid,
    version: String,
}

impl VersionedId {
    /// Create an identifier from its parts
    pub fn new(tag: Uuid, version: impl Into<String>) -> Self {
        Self {
            tag,
            version: version.into(),
        }
    }

    /// Mint a random identifier at the initial version
    pub fn mint() -> Self {
        Self::new(Uuid::new_v4(), INITIAL_VERSION)
    }

    /// Deterministic identifier derived from a name, namespaced under a tag
    pub fn named(namespace: &Uuid, name: &str, version: impl Into<String>) -> Self {
        Self::new(Uuid::new_v5(namespace, name.as_bytes()), version)
    }

    /// Deterministic identifier derived from this one, keeping the version
    ///
    /// Deriving twice with the same name yields the same identifier, so
    /// repeated translations of one asset agree on the identity they mint.
    pub fn derive(&self, name: &str) -> Self {
        Self::named(&self.tag, name, self.version.clone())
    }

    /// Same tag, different version
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        Self::new(self.tag, version)
    }

    pub fn tag(&self) -> &Uuid {
        &self.tag
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for VersionedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "urn:uuid:{}:{}", self.tag, self.version)
    }
}

impl FromStr for VersionedId {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix("urn:uuid:").ok_or_else(|| {
            crate::Error::configuration(format!("Identifier '{}' must start with 'urn:uuid:'", s), None)
        })?;
        let (tag, version) = rest.split_once(':').ok_or_else(|| {
            crate::Error::configuration(format!("Identifier '{}' has no version", s), None)
        })?;
        let tag = Uuid::parse_str(tag).map_err(|e| {
            crate::Error::configuration(format!("Invalid UUID in '{}': {}", s, e), None)
        })?;
        Ok(Self::new(tag, version))
    }
}
