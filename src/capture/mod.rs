//! Section capture from registered regions.

mod region;

pub use region::{ImageRegion, RasterError, Region};

use async_trait::async_trait;
use image::{DynamicImage, RgbImage, RgbaImage};
use kolreport_traits::{CaptureError, SectionCapturer};
use kolreport_types::{SectionId, Size, Snapshot};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, RwLock};

/// Logical size assumed for a region that reports zero width or height.
const FALLBACK_WIDTH: f32 = 800.0;
const FALLBACK_HEIGHT: f32 = 400.0;

/// Captures sections from a registry of live regions.
///
/// Every capture is scaled to the requested logical width, rendered at
/// `pixel_ratio` times that size and flattened onto opaque white.
pub struct RegionCapturer {
    regions: RwLock<HashMap<SectionId, Arc<dyn Region>>>,
    pixel_ratio: u32,
}

impl RegionCapturer {
    pub fn new(pixel_ratio: u32) -> Self {
        Self { regions: RwLock::new(HashMap::new()), pixel_ratio: pixel_ratio.max(1) }
    }

    /// Binds `region` to `section`, returning the region it replaces.
    pub fn bind(&self, section: SectionId, region: Arc<dyn Region>) -> Option<Arc<dyn Region>> {
        match self.regions.write() {
            Ok(mut regions) => regions.insert(section, region),
            Err(poisoned) => poisoned.into_inner().insert(section, region),
        }
    }

    pub fn with_region(self, section: impl Into<SectionId>, region: impl Region + 'static) -> Self {
        self.bind(section.into(), Arc::new(region));
        self
    }

    pub fn unbind(&self, section: &SectionId) -> Option<Arc<dyn Region>> {
        match self.regions.write() {
            Ok(mut regions) => regions.remove(section),
            Err(poisoned) => poisoned.into_inner().remove(section),
        }
    }

    pub fn len(&self) -> usize {
        self.regions.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, section: &SectionId) -> Option<Arc<dyn Region>> {
        match self.regions.read() {
            Ok(regions) => regions.get(section).cloned(),
            Err(poisoned) => poisoned.into_inner().get(section).cloned(),
        }
    }
}

/// Logical capture size for a region: `target_width_px` wide, height scaled
/// by the same factor.
pub fn capture_size(rendered: Size, target_width_px: u32) -> (u32, u32) {
    let w0 = if rendered.width > 0.0 { rendered.width } else { FALLBACK_WIDTH };
    let h0 = if rendered.height > 0.0 { rendered.height } else { FALLBACK_HEIGHT };
    let height = (h0 / w0 * target_width_px as f32).round().max(1.0) as u32;
    (target_width_px, height)
}

#[async_trait]
impl SectionCapturer for RegionCapturer {
    async fn capture(&self, section: &SectionId, target_width_px: u32) -> Result<Snapshot, CaptureError> {
        let region = self
            .lookup(section)
            .ok_or_else(|| CaptureError::SectionNotFound(section.clone()))?;

        let raster_error = |message: String| CaptureError::Raster { section: section.clone(), message };
        let (w, h) = capture_size(region.rendered_size(), target_width_px);
        let (raster_w, raster_h) = w
            .checked_mul(self.pixel_ratio)
            .zip(h.checked_mul(self.pixel_ratio))
            .ok_or_else(|| raster_error(format!("{w}x{h} px at ratio {} overflows", self.pixel_ratio)))?;
        log::debug!("Capturing section '{section}' at {raster_w}x{raster_h} px");

        tokio::task::spawn_blocking(move || render_snapshot(region.as_ref(), raster_w, raster_h))
            .await
            .map_err(|e| raster_error(e.to_string()))?
            .map_err(|e| raster_error(e.to_string()))
    }
}

fn render_snapshot(region: &dyn Region, width_px: u32, height_px: u32) -> Result<Snapshot, RasterError> {
    let raster = region.rasterize(width_px, height_px)?;
    let (w, h) = raster.dimensions();
    let opaque = flatten_on_white(&raster);

    let mut png = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(opaque).write_to(&mut png, image::ImageFormat::Png)?;
    Ok(Snapshot::new(png.into_inner(), w, h))
}

fn flatten_on_white(raster: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(raster.width(), raster.height(), |x, y| {
        let [r, g, b, a] = raster.get_pixel(x, y).0;
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    struct BlankRegion(Size);

    impl Region for BlankRegion {
        fn rendered_size(&self) -> Size {
            self.0
        }

        fn rasterize(&self, width_px: u32, height_px: u32) -> Result<RgbaImage, RasterError> {
            Ok(ImageBuffer::from_pixel(width_px, height_px, Rgba([0, 0, 0, 0])))
        }
    }

    #[test]
    fn capture_size_keeps_aspect_at_target_width() {
        assert_eq!(capture_size(Size::new(800.0, 250.0), 1600), (1600, 500));
        assert_eq!(capture_size(Size::new(1200.0, 525.0), 1600), (1600, 700));
    }

    #[test]
    fn zero_size_falls_back_to_default() {
        assert_eq!(capture_size(Size::zero(), 1600), (1600, 800));
        assert_eq!(capture_size(Size::new(0.0, 100.0), 1600), (1600, 200));
        assert_eq!(capture_size(Size::new(1600.0, 0.0), 1600), (1600, 400));
    }

    #[tokio::test]
    async fn unbound_section_is_not_found() {
        let capturer = RegionCapturer::new(2);
        let err = capturer.capture(&SectionId::from("missing"), 1600).await.unwrap_err();
        assert!(matches!(err, CaptureError::SectionNotFound(ref id) if id.as_str() == "missing"));
    }

    #[tokio::test]
    async fn snapshot_is_double_density_and_opaque_white() {
        let capturer = RegionCapturer::new(2).with_region("chart", BlankRegion(Size::new(400.0, 100.0)));
        let snapshot = capturer.capture(&SectionId::from("chart"), 160).await.unwrap();
        assert_eq!((snapshot.pixel_width(), snapshot.pixel_height()), (320, 80));

        let decoded = image::load_from_memory(snapshot.data()).unwrap();
        assert!(!decoded.color().has_alpha());
        assert_eq!(decoded.to_rgb8().get_pixel(0, 0).0, [255, 255, 255]);
    }

    #[tokio::test]
    async fn oversized_raster_is_a_capture_error() {
        let capturer = RegionCapturer::new(4).with_region("wide", BlankRegion(Size::new(100.0, 10.0)));
        let err = capturer.capture(&SectionId::from("wide"), u32::MAX / 2).await.unwrap_err();
        assert!(matches!(err, CaptureError::Raster { ref section, .. } if section.as_str() == "wide"));
    }

    #[test]
    fn binding_replaces_previous_region() {
        let capturer = RegionCapturer::new(1);
        assert!(capturer.bind(SectionId::from("a"), Arc::new(BlankRegion(Size::zero()))).is_none());
        assert!(capturer.bind(SectionId::from("a"), Arc::new(BlankRegion(Size::zero()))).is_some());
        assert_eq!(capturer.len(), 1);
        assert!(capturer.unbind(&SectionId::from("a")).is_some());
        assert!(capturer.is_empty());
    }
}
