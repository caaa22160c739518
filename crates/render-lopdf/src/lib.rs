//! PDF document writer using lopdf.
//!
//! Pages are drawn through the `PageCanvas` trait from
//! `kolreport-render-core` and collected into a single in-memory document
//! with shared font and image resources.

mod encoding;
mod page;
mod renderer;
mod xobject;

pub use encoding::to_win_ansi;
pub use page::LopdfPage;
pub use renderer::LopdfDocumentBuilder;
