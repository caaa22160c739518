//! The capture seam: turning a live, rendered section into a raster.

use async_trait::async_trait;
use kolreport_types::{SectionId, Snapshot};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum CaptureError {
    #[error("No rendered region is bound to section '{0}'")]
    SectionNotFound(SectionId),

    #[error("Failed to rasterize section '{section}': {message}")]
    Raster { section: SectionId, message: String },
}

/// Produces snapshots of rendered sections.
///
/// Every snapshot of one export shares the same horizontal resolution,
/// `target_width_px`, whatever the section's on-screen size. Captures are
/// independent and side-effect free on the source region, so an export may
/// run any number of them concurrently.
#[async_trait]
pub trait SectionCapturer: Send + Sync {
    async fn capture(
        &self,
        section: &SectionId,
        target_width_px: u32,
    ) -> Result<Snapshot, CaptureError>;
}
