//! ResourceProvider trait for abstracting where auxiliary assets come from.
//!
//! The export pipeline fetches its branding image through this seam, so the
//! same orchestrator runs against the local filesystem, a web server or a
//! pre-populated in-memory store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use thiserror::Error;

/// Error type for resource loading operations.
#[derive(Error, Debug, Clone)]
pub enum ResourceError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Request for '{path}' returned status {status}")]
    Status { path: String, status: u16 },

    #[error("Failed to load resource '{path}': {message}")]
    LoadFailed { path: String, message: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ResourceError {
    fn from(err: std::io::Error) -> Self {
        ResourceError::Io(err.to_string())
    }
}

/// Shared resource data type (reference-counted bytes).
pub type SharedResourceData = Arc<Vec<u8>>;

/// A source of raw resource bytes.
///
/// # Implementations
///
/// - `FilesystemResourceProvider` (kolreport-resource): relative paths under a base directory
/// - `HttpResourceProvider` (kolreport-resource): absolute `http(s)` URLs
/// - `InMemoryResourceProvider`: pre-populated memory, used by tests and embedding hosts
#[async_trait]
pub trait ResourceProvider: Send + Sync + Debug {
    /// Fetch a resource by its path or URI. One attempt, no retry.
    async fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError>;

    /// Returns a human-readable name for this provider (for logging/debugging).
    fn name(&self) -> &'static str;
}

/// Resources held in memory, keyed by the exact path callers ask for.
#[derive(Debug, Default, Clone)]
pub struct InMemoryResourceProvider {
    resources: HashMap<String, SharedResourceData>,
}

impl InMemoryResourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `data` under `path`, replacing any earlier entry.
    pub fn with(mut self, path: impl Into<String>, data: Vec<u8>) -> Self {
        self.insert(path, data);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, data: Vec<u8>) {
        self.resources.insert(path.into(), Arc::new(data));
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[async_trait]
impl ResourceProvider for InMemoryResourceProvider {
    async fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError> {
        self.resources
            .get(path)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(path.to_string()))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
