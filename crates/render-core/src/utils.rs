const PT_PER_MM: f32 = 72.0 / 25.4;

/// Convert millimetres to PDF points
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * PT_PER_MM
}

/// Convert layout Y coordinate to PDF Y coordinate (flip origin)
pub fn flip_y(y: f32, page_height: f32) -> f32 {
    page_height - y
}

/// Resource name of the standard font selected by `font`.
pub fn font_resource_name(font: &kolreport_layout::FontSpec) -> &'static str {
    if font.bold { "F2" } else { "F1" }
}
