//! Page rendering on top of the lopdf backend.
//!
//! - [`TableRenderer`] draws a [`kolreport_layout::TableSpec`] on any
//!   [`kolreport_render_core::PageCanvas`], continuing onto new pages when asked.
//! - [`DocumentComposer`] turns an ordered list of [`PageSpec`]s into one
//!   document: title, logo, then a fitted snapshot or a table per page.

mod compose;
mod table;

pub use compose::{ComposedDocument, DocumentComposer, PageContent, PageSpec};
pub use table::{TableRenderer, render_table};
