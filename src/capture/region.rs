use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use kolreport_types::Size;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("{0}")]
pub struct RasterError(pub String);

impl From<image::ImageError> for RasterError {
    fn from(err: image::ImageError) -> Self {
        RasterError(err.to_string())
    }
}

/// A live, rendered area that can be captured.
pub trait Region: Send + Sync {
    /// Current on-screen size in logical pixels. May be zero for regions
    /// that have not been laid out.
    fn rendered_size(&self) -> Size;

    /// Renders the region scaled to exactly `width_px` x `height_px`.
    /// Must not alter the region.
    fn rasterize(&self, width_px: u32, height_px: u32) -> Result<RgbaImage, RasterError>;
}

/// A region backed by an already rendered raster, e.g. a chart image the
/// dashboard exported at some device pixel ratio.
#[derive(Debug, Clone)]
pub struct ImageRegion {
    pixels: Arc<RgbaImage>,
    device_pixel_ratio: f32,
}

impl ImageRegion {
    pub fn new(image: DynamicImage, device_pixel_ratio: f32) -> Self {
        Self {
            pixels: Arc::new(image.to_rgba8()),
            device_pixel_ratio: if device_pixel_ratio > 0.0 { device_pixel_ratio } else { 1.0 },
        }
    }

    pub fn open<P: AsRef<Path>>(path: P, device_pixel_ratio: f32) -> Result<Self, RasterError> {
        Ok(Self::new(image::open(path.as_ref())?, device_pixel_ratio))
    }
}

impl Region for ImageRegion {
    fn rendered_size(&self) -> Size {
        Size::new(
            self.pixels.width() as f32 / self.device_pixel_ratio,
            self.pixels.height() as f32 / self.device_pixel_ratio,
        )
    }

    fn rasterize(&self, width_px: u32, height_px: u32) -> Result<RgbaImage, RasterError> {
        if width_px == 0 || height_px == 0 {
            return Err(RasterError(format!("cannot rasterize to {width_px}x{height_px}")));
        }
        if self.pixels.dimensions() == (width_px, height_px) {
            return Ok(self.pixels.as_ref().clone());
        }
        Ok(imageops::resize(self.pixels.as_ref(), width_px, height_px, FilterType::CatmullRom))
    }
}
