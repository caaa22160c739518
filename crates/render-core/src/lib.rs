//! Core rendering abstractions for report documents.
//!
//! This crate provides the drawing surface used by the table renderer and
//! page composer:
//! - `PageCanvas` trait for abstracting page drawing operations
//! - `ImageHandle` for images registered once with a document backend
//! - Error types and unit/coordinate helpers

mod error;
mod traits;
mod types;
pub mod utils;

pub use error::RenderError;
pub use kolreport_layout::FontSpec;
pub use traits::PageCanvas;
pub use types::ImageHandle;
