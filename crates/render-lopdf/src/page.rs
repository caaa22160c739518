use crate::encoding::to_win_ansi;
use kolreport_render_core::utils::{flip_y, font_resource_name, mm_to_pt};
use kolreport_render_core::{FontSpec, ImageHandle, PageCanvas};
use kolreport_types::{Color, Rect, Size};
use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};

#[derive(Default, Clone, PartialEq)]
struct PageRenderState {
    font_name: &'static str,
    font_size: f32,
    fill_color: Option<Color>,
    stroke_color: Option<Color>,
    line_width: Option<f32>,
}

/// A page being drawn. Collects content operations and link regions until it
/// is handed back to [`crate::LopdfDocumentBuilder::push_page`].
pub struct LopdfPage {
    size_mm: Size,
    height_pt: f32,
    content: Content,
    state: PageRenderState,
    pub(crate) links: Vec<(Rect, String)>,
}

impl LopdfPage {
    pub(crate) fn new(size_mm: Size) -> Self {
        Self {
            size_mm,
            height_pt: mm_to_pt(size_mm.height),
            content: Content { operations: vec![] },
            state: PageRenderState::default(),
            links: Vec::new(),
        }
    }

    pub(crate) fn into_content(self) -> (Content, Vec<(Rect, String)>) {
        (self.content, self.links)
    }

    /// Converts a top-left mm rectangle into PDF `[x, y, w, h]` in points.
    pub(crate) fn pdf_rect(&self, rect: Rect) -> [f32; 4] {
        [
            mm_to_pt(rect.x),
            flip_y(mm_to_pt(rect.bottom()), self.height_pt),
            mm_to_pt(rect.width),
            mm_to_pt(rect.height),
        ]
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.content.operations.push(Operation::new(operator, operands));
    }

    fn set_fill_color(&mut self, color: &Color) {
        if self.state.fill_color != Some(*color) {
            let [r, g, b] = color.unit_components();
            self.push("rg", vec![r.into(), g.into(), b.into()]);
            self.state.fill_color = Some(*color);
        }
    }

    fn set_stroke(&mut self, color: &Color, line_width: f32) {
        let width_pt = mm_to_pt(line_width);
        if self.state.line_width != Some(width_pt) {
            self.push("w", vec![width_pt.into()]);
            self.state.line_width = Some(width_pt);
        }
        if self.state.stroke_color != Some(*color) {
            let [r, g, b] = color.unit_components();
            self.push("RG", vec![r.into(), g.into(), b.into()]);
            self.state.stroke_color = Some(*color);
        }
    }

    fn set_font(&mut self, font: &FontSpec) {
        let name = font_resource_name(font);
        if self.state.font_name != name || self.state.font_size != font.size_pt {
            self.push("Tf", vec![Object::Name(name.as_bytes().to_vec()), font.size_pt.into()]);
            self.state.font_name = name;
            self.state.font_size = font.size_pt;
        }
    }
}

impl PageCanvas for LopdfPage {
    fn page_size(&self) -> Size {
        self.size_mm
    }

    fn fill_rect(&mut self, rect: Rect, color: &Color) {
        self.set_fill_color(color);
        let [x, y, w, h] = self.pdf_rect(rect);
        self.push("re", vec![x.into(), y.into(), w.into(), h.into()]);
        self.push("f", vec![]);
    }

    fn stroke_rect(&mut self, rect: Rect, color: &Color, line_width: f32) {
        self.set_stroke(color, line_width);
        let [x, y, w, h] = self.pdf_rect(rect);
        self.push("re", vec![x.into(), y.into(), w.into(), h.into()]);
        self.push("S", vec![]);
    }

    fn draw_text(&mut self, text: &str, x: f32, baseline_y: f32, font: &FontSpec, color: &Color) {
        if text.trim().is_empty() {
            return;
        }
        self.push("BT", vec![]);
        self.set_font(font);
        self.set_fill_color(color);
        let pdf_y = flip_y(mm_to_pt(baseline_y), self.height_pt);
        self.push("Td", vec![mm_to_pt(x).into(), pdf_y.into()]);
        self.push("Tj", vec![Object::String(to_win_ansi(text), StringFormat::Literal)]);
        self.push("ET", vec![]);
    }

    fn draw_image(&mut self, image: &ImageHandle, rect: Rect) {
        let [x, y, w, h] = self.pdf_rect(rect);
        self.push("q", vec![]);
        self.push("cm", vec![w.into(), 0.into(), 0.into(), h.into(), x.into(), y.into()]);
        self.push("Do", vec![Object::Name(image.name().as_bytes().to_vec())]);
        self.push("Q", vec![]);
    }

    fn link(&mut self, rect: Rect, url: &str) {
        self.links.push((rect, url.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operators(page: &LopdfPage) -> Vec<String> {
        page.content.operations.iter().map(|op| op.operator.clone()).collect()
    }

    #[test]
    fn rect_is_flipped_into_points() {
        let page = LopdfPage::new(Size::new(297.0, 210.0));
        let [x, y, w, h] = page.pdf_rect(Rect::new(10.0, 20.0, 30.0, 40.0));
        assert!((x - mm_to_pt(10.0)).abs() < 1e-3);
        assert!((y - mm_to_pt(210.0 - 60.0)).abs() < 1e-2);
        assert!((w - mm_to_pt(30.0)).abs() < 1e-3);
        assert!((h - mm_to_pt(40.0)).abs() < 1e-3);
    }

    #[test]
    fn repeated_fill_color_is_not_re_emitted() {
        let mut page = LopdfPage::new(Size::new(100.0, 100.0));
        let gray = Color::rgb(200, 200, 200);
        page.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), &gray);
        page.fill_rect(Rect::new(0.0, 10.0, 10.0, 10.0), &gray);
        assert_eq!(operators(&page), vec!["rg", "re", "f", "re", "f"]);
    }

    #[test]
    fn text_run_is_wrapped_in_text_object() {
        let mut page = LopdfPage::new(Size::new(100.0, 100.0));
        page.draw_text("Hello", 5.0, 10.0, &FontSpec::bold(12.0), &Color::BLACK);
        assert_eq!(operators(&page), vec!["BT", "Tf", "rg", "Td", "Tj", "ET"]);
        assert_eq!(page.content.operations[1].operands[0].as_name().unwrap(), b"F2");
    }

    #[test]
    fn blank_text_is_skipped() {
        let mut page = LopdfPage::new(Size::new(100.0, 100.0));
        page.draw_text("   ", 5.0, 10.0, &FontSpec::default(), &Color::BLACK);
        assert!(page.content.operations.is_empty());
    }

    #[test]
    fn links_are_collected() {
        let mut page = LopdfPage::new(Size::new(100.0, 100.0));
        page.link(Rect::new(1.0, 2.0, 3.0, 4.0), "https://example.com");
        assert_eq!(page.links.len(), 1);
        assert!(page.content.operations.is_empty());
    }
}
