pub mod color;
pub mod geometry;
pub mod ids;
pub mod model;

pub use color::Color;
pub use geometry::{Orientation, PageGeometry, PaperSize, Rect, Size};
pub use ids::{ResourceUri, SectionId};
pub use model::{Asset, ImageFormat, KolRow, Platform, Snapshot, SummaryRow, Totals};
