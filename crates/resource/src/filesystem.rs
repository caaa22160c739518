//! Filesystem-based resource provider for native platforms.
//!
//! Paths are resolved relative to a base directory the way a web server
//! resolves paths under its public root: a leading `/` refers to the base
//! directory itself. Resolved paths must stay inside the base directory.

use async_trait::async_trait;
use kolreport_traits::{ResourceError, ResourceProvider, SharedResourceData};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// A resource provider that loads resources from a public directory.
#[derive(Debug)]
pub struct FilesystemResourceProvider {
    base_path: PathBuf,
    /// Canonicalized base path for security checks
    canonical_base: Option<PathBuf>,
}

impl FilesystemResourceProvider {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        let base = base_path.as_ref().to_path_buf();
        // May fail if the directory doesn't exist yet
        let canonical = base.canonicalize().ok();
        Self {
            base_path: base,
            canonical_base: canonical,
        }
    }

    pub fn base(&self) -> &Path {
        &self.base_path
    }

    /// Resolves a resource path under the base directory.
    ///
    /// Returns `None` if the path would escape the base directory.
    fn resolve_path_safe(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative.as_os_str().is_empty() {
            return None;
        }
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return None;
        }

        let full_path = self.base_path.join(relative);

        if let Ok(canonical) = full_path.canonicalize()
            && let Some(ref base) = self.canonical_base
        {
            // Symlinks may still point outside the base directory.
            return canonical.starts_with(base).then_some(canonical);
        }

        Some(full_path)
    }
}

#[async_trait]
impl ResourceProvider for FilesystemResourceProvider {
    async fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError> {
        let full_path = self
            .resolve_path_safe(path)
            .ok_or_else(|| ResourceError::NotFound(format!("{} (path traversal blocked)", path)))?;

        log::debug!("Reading resource '{}' from {}", path, full_path.display());
        tokio::fs::read(&full_path)
            .await
            .map(Arc::new)
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ResourceError::NotFound(path.to_string())
                } else {
                    ResourceError::LoadFailed {
                        path: path.to_string(),
                        message: e.to_string(),
                    }
                }
            })
    }

    fn name(&self) -> &'static str {
        "filesystem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_filesystem_provider_load_existing_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("logo.png"), b"logo bytes").unwrap();

        let provider = FilesystemResourceProvider::new(dir.path());
        let data = provider.load("logo.png").await.unwrap();
        assert_eq!(&*data, b"logo bytes");
    }

    #[tokio::test]
    async fn test_filesystem_provider_treats_leading_slash_as_public_root() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("logo.png"), b"logo bytes").unwrap();

        let provider = FilesystemResourceProvider::new(dir.path());
        let data = provider.load("/logo.png").await.unwrap();
        assert_eq!(&*data, b"logo bytes");
    }

    #[tokio::test]
    async fn test_filesystem_provider_not_found() {
        let dir = tempdir().unwrap();
        let provider = FilesystemResourceProvider::new(dir.path());

        let result = provider.load("missing.png").await;
        assert!(matches!(result, Err(ResourceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_filesystem_provider_blocks_path_traversal() {
        let dir = tempdir().unwrap();
        let provider = FilesystemResourceProvider::new(dir.path());

        for attempt in ["../../../etc/passwd", "..", "foo/../../bar", "./../secret", ""] {
            let result = provider.load(attempt).await;
            assert!(
                matches!(result, Err(ResourceError::NotFound(_))),
                "expected '{}' to be blocked",
                attempt
            );
        }
    }

    #[tokio::test]
    async fn test_filesystem_provider_allows_nested_paths() {
        let dir = tempdir().unwrap();
        let nested_dir = dir.path().join("brand");
        fs::create_dir(&nested_dir).unwrap();
        fs::write(nested_dir.join("logo.jpg"), b"nested").unwrap();

        let provider = FilesystemResourceProvider::new(dir.path());
        let data = provider.load("brand/logo.jpg").await.unwrap();
        assert_eq!(&*data, b"nested");
    }
}
