use kolreport_render_core::RenderError;
use kolreport_traits::{CaptureError, ResourceError};
use kolreport_types::{ResourceUri, SectionId};
use std::fmt;
use thiserror::Error;

/// Pipeline step a deadline applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Asset,
    Capture,
}

impl fmt::Display for ExportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportStage::Asset => "asset load",
            ExportStage::Capture => "section capture",
        })
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Everything that can abort an export. None of these are retried.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Asset '{uri}' is unavailable: {source}")]
    AssetUnavailable {
        uri: ResourceUri,
        #[source]
        source: ResourceError,
    },

    #[error("Asset '{uri}' could not be decoded: {message}")]
    AssetDecode { uri: ResourceUri, message: String },

    #[error("No rendered region is bound to section '{0}'")]
    SectionNotFound(SectionId),

    #[error("Capture of section '{section}' failed: {message}")]
    Capture { section: SectionId, message: String },

    #[error("Document serialization failed: {0}")]
    Serialization(#[from] RenderError),

    #[error("Could not deliver '{file_name}': {source}")]
    Delivery {
        file_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("The {stage} step did not finish within {after_ms} ms")]
    Timeout { stage: ExportStage, after_ms: u64 },

    #[error("Another export is already running")]
    Busy,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Fieldless mirror of [`ExportError`] for matching and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AssetUnavailable,
    AssetDecode,
    SectionNotFound,
    Capture,
    Serialization,
    Delivery,
    Timeout,
    Busy,
    Config,
}

impl ExportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExportError::AssetUnavailable { .. } => ErrorKind::AssetUnavailable,
            ExportError::AssetDecode { .. } => ErrorKind::AssetDecode,
            ExportError::SectionNotFound(_) => ErrorKind::SectionNotFound,
            ExportError::Capture { .. } => ErrorKind::Capture,
            ExportError::Serialization(_) => ErrorKind::Serialization,
            ExportError::Delivery { .. } => ErrorKind::Delivery,
            ExportError::Timeout { .. } => ErrorKind::Timeout,
            ExportError::Busy => ErrorKind::Busy,
            ExportError::Config(_) => ErrorKind::Config,
        }
    }
}

impl From<CaptureError> for ExportError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::SectionNotFound(section) => ExportError::SectionNotFound(section),
            CaptureError::Raster { section, message } => ExportError::Capture { section, message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_errors_keep_their_kind() {
        let missing: ExportError = CaptureError::SectionNotFound(SectionId::from("campaign-p2")).into();
        assert_eq!(missing.kind(), ErrorKind::SectionNotFound);
        assert!(missing.to_string().contains("campaign-p2"));

        let raster: ExportError = CaptureError::Raster {
            section: SectionId::from("campaign-p1"),
            message: "boom".into(),
        }
        .into();
        assert_eq!(raster.kind(), ErrorKind::Capture);
    }

    #[test]
    fn timeout_message_names_the_stage() {
        let err = ExportError::Timeout { stage: ExportStage::Capture, after_ms: 1500 };
        assert_eq!(err.to_string(), "The section capture step did not finish within 1500 ms");
    }
}
