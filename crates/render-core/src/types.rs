use std::sync::Arc;

/// An image registered with a document backend, drawable on any page of
/// that document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageHandle {
    name: Arc<str>,
    pixel_width: u32,
    pixel_height: u32,
}

impl ImageHandle {
    pub fn new(name: impl Into<Arc<str>>, pixel_width: u32, pixel_height: u32) -> Self {
        Self { name: name.into(), pixel_width, pixel_height }
    }

    /// Resource name the backend uses to reference the image (e.g. `Im1`).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pixel_width(&self) -> u32 {
        self.pixel_width
    }

    pub fn pixel_height(&self) -> u32 {
        self.pixel_height
    }

    /// Height over width, 1.0 for degenerate sizes.
    pub fn aspect(&self) -> f32 {
        if self.pixel_width == 0 || self.pixel_height == 0 {
            1.0
        } else {
            self.pixel_height as f32 / self.pixel_width as f32
        }
    }
}
