use crate::types::ImageHandle;
use kolreport_layout::FontSpec;
use kolreport_types::{Color, Rect, Size};

/// A drawing surface for one page.
///
/// Coordinates are millimetres from the top-left corner of the page.
pub trait PageCanvas {
    fn page_size(&self) -> Size;

    fn fill_rect(&mut self, rect: Rect, color: &Color);

    fn stroke_rect(&mut self, rect: Rect, color: &Color, line_width: f32);

    /// Draws a single line of text with its baseline at `baseline_y`.
    fn draw_text(&mut self, text: &str, x: f32, baseline_y: f32, font: &FontSpec, color: &Color);

    fn draw_image(&mut self, image: &ImageHandle, rect: Rect);

    /// Registers a clickable region pointing at `url`.
    fn link(&mut self, rect: Rect, url: &str);
}
