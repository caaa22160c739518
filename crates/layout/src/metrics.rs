//! Advance widths for the two standard PDF fonts the report uses.
//!
//! Widths are the Adobe Core 14 AFM values in 1/1000 em for the printable
//! ASCII range plus the punctuation the reports emit; anything else is
//! measured as a digit.

const MM_PER_PT: f32 = 25.4 / 72.0;
const LINE_HEIGHT_FACTOR: f32 = 1.15;
const FALLBACK_WIDTH: u16 = 556;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Font selection for a text run: Helvetica at `size_pt`, bold or regular.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub size_pt: f32,
    pub bold: bool,
}

impl FontSpec {
    pub fn regular(size_pt: f32) -> Self {
        Self { size_pt, bold: false }
    }

    pub fn bold(size_pt: f32) -> Self {
        Self { size_pt, bold: true }
    }

    /// PDF base font name.
    pub fn base_font(&self) -> &'static str {
        if self.bold { "Helvetica-Bold" } else { "Helvetica" }
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::regular(10.0)
    }
}

/// Marker for shortened text. WinAnsi has it as a single glyph.
pub const ELLIPSIS: char = '\u{2026}';

pub fn pt_to_mm(pt: f32) -> f32 {
    pt * MM_PER_PT
}

fn glyph_width(ch: char, bold: bool) -> u16 {
    let table = if bold { &HELVETICA_BOLD } else { &HELVETICA };
    match ch {
        ' '..='~' => table[(ch as u32 - 32) as usize],
        ELLIPSIS | '\u{2014}' => 1000,
        '\u{2013}' => 556,
        '\u{2018}' | '\u{2019}' => if bold { 278 } else { 222 },
        '\u{201C}' | '\u{201D}' => if bold { 500 } else { 333 },
        _ => FALLBACK_WIDTH,
    }
}

/// Rendered width of `text` in millimetres.
pub fn text_width_mm(text: &str, font: &FontSpec) -> f32 {
    let units: u32 = text.chars().map(|c| glyph_width(c, font.bold) as u32).sum();
    pt_to_mm(units as f32 / 1000.0 * font.size_pt)
}

pub fn line_height_mm(font: &FontSpec) -> f32 {
    pt_to_mm(font.size_pt * LINE_HEIGHT_FACTOR)
}

/// Distance from the top of a line box to its baseline.
pub fn ascent_mm(font: &FontSpec) -> f32 {
    // Helvetica ascender is 718/1000; centre the remainder in the line box.
    let line = line_height_mm(font);
    let em = pt_to_mm(font.size_pt);
    (line - em) / 2.0 + em * 0.718
}

/// Splits `text` into lines no wider than `max_width_mm`, breaking at spaces
/// and falling back to character breaks for words longer than a line.
pub fn wrap_text(text: &str, font: &FontSpec, max_width_mm: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if text_width_mm(&candidate, font) <= max_width_mm {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if text_width_mm(word, font) <= max_width_mm {
                current = word.to_string();
            } else {
                let mut pieces = break_word(word, font, max_width_mm);
                current = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn break_word(word: &str, font: &FontSpec, max_width_mm: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for ch in word.chars() {
        current.push(ch);
        if text_width_mm(&current, font) > max_width_mm && current.chars().count() > 1 {
            current.pop();
            pieces.push(std::mem::take(&mut current));
            current.push(ch);
        }
    }
    pieces.push(current);
    pieces
}

/// Shortens `text` with a trailing ellipsis until it fits `max_width_mm`.
pub fn ellipsize(text: &str, font: &FontSpec, max_width_mm: f32) -> String {
    if text_width_mm(text, font) <= max_width_mm {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().chain([&ELLIPSIS]).collect();
        if text_width_mm(&candidate, font) <= max_width_mm {
            return candidate;
        }
    }
    String::new()
}
