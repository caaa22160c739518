pub mod capture;
pub mod resource;

pub use capture::{CaptureError, SectionCapturer};
pub use resource::{InMemoryResourceProvider, ResourceError, ResourceProvider, SharedResourceData};
