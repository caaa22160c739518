//! Newtype wrappers for the string identifiers the export pipeline passes around.
//!
//! A section identifier and an asset location are both plain strings on the
//! wire; keeping them as distinct types stops one being handed where the other
//! is expected.

use serde::Deserialize;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Identifies one capturable region of the dashboard (the `data-export-id`
/// marker on the rendered section).
#[derive(Debug, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(from = "String")]
pub struct SectionId(Arc<str>);

impl SectionId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SectionId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for SectionId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl AsRef<str> for SectionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Location of an auxiliary resource: a relative path for the filesystem
/// provider or an absolute `http(s)` URL for the HTTP provider.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(from = "String")]
pub struct ResourceUri(Arc<str>);

impl ResourceUri {
    pub fn new(uri: impl Into<Arc<str>>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_remote(&self) -> bool {
        let lower = self.0.to_ascii_lowercase();
        lower.starts_with("http://") || lower.starts_with("https://")
    }
}

impl From<String> for ResourceUri {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for ResourceUri {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl AsRef<str> for ResourceUri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
