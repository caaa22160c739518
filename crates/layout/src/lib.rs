use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Row {row} has {found} cells but the table declares {expected} columns.")]
    RowWidthMismatch { row: usize, expected: usize, found: usize },
    #[error("Footer has {found} cells but the table declares {expected} columns.")]
    FooterWidthMismatch { expected: usize, found: usize },
    #[error("Link column {index} is out of range for a table with {columns} columns.")]
    LinkColumnOutOfRange { index: usize, columns: usize },
    #[error("Table needs at least one column.")]
    NoColumns,
}

pub mod fit;
pub mod format;
pub mod metrics;
pub mod table;

pub use self::fit::fit;
pub use self::format::{format_count, format_percent, is_absolute_url, short_link_label};
pub use self::metrics::{ELLIPSIS, FontSpec, ascent_mm, line_height_mm, pt_to_mm, text_width_mm};
pub use self::table::{
    Alignment, CellStyle, CellValue, Column, Overflow, PlacedCell, RowLayout, RowRole, TableLayout,
    TableMargins, TableSpec, TableStyle,
};

pub use kolreport_types::{Rect, Size};
