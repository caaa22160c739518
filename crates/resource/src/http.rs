//! HTTP(S) resource provider.

use async_trait::async_trait;
use kolreport_traits::{ResourceError, ResourceProvider, SharedResourceData};
use kolreport_types::ResourceUri;
use std::sync::Arc;

/// Fetches resources with a single GET request.
///
/// Absolute `http(s)` URLs are fetched as-is; anything else is joined onto the
/// configured base URL. A non-success status is reported as
/// [`ResourceError::Status`], never as empty data.
#[derive(Debug, Clone, Default)]
pub struct HttpResourceProvider {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl HttpResourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Use a preconfigured client (proxies, timeouts, default headers).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn resolve_url(&self, path: &str) -> Result<String, ResourceError> {
        if ResourceUri::from(path).is_remote() {
            return Ok(path.to_string());
        }
        match &self.base_url {
            Some(base) => Ok(format!(
                "{}/{}",
                base.trim_end_matches('/'),
                path.trim_start_matches('/')
            )),
            None => Err(ResourceError::LoadFailed {
                path: path.to_string(),
                message: "relative path without a base URL".to_string(),
            }),
        }
    }
}

#[async_trait]
impl ResourceProvider for HttpResourceProvider {
    async fn load(&self, path: &str) -> Result<SharedResourceData, ResourceError> {
        let url = self.resolve_url(path)?;
        log::debug!("Fetching resource {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ResourceError::LoadFailed {
                path: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResourceError::Status {
                path: url,
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ResourceError::LoadFailed {
                path: url.clone(),
                message: e.to_string(),
            })?;
        Ok(Arc::new(bytes.to_vec()))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
