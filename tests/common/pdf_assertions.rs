use lopdf::content::Content;
use lopdf::{Document as LopdfDocument, Object};

/// A string shown with `Tj`, with the font resource that was active and the
/// `Td` origin in points (PDF space, y up).
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub font: String,
    pub size: f32,
    pub text: String,
    pub x: f32,
    pub y: f32,
}

/// Painting operations in stream order.
#[derive(Debug, Clone, PartialEq)]
pub enum Drawn {
    Text(String),
    Image(String),
}

impl TextRun {
    /// `F2` is the shared Helvetica-Bold resource.
    pub fn is_bold(&self) -> bool {
        self.font == "F2"
    }
}

/// A URI link annotation
#[derive(Debug, Clone, PartialEq)]
pub struct UriLink {
    pub page: u32,
    pub rect: [f32; 4],
    pub uri: String,
}

fn page_content(doc: &LopdfDocument, page_num: u32) -> Option<Content> {
    let page_id = *doc.get_pages().get(&page_num)?;
    let bytes = doc.get_page_content(page_id).ok()?;
    Content::decode(&bytes).ok()
}

/// Decodes WinAnsi bytes back into text for the characters the writer maps.
fn decode_win_ansi(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| match b {
            0x85 => '…',
            0x91 => '‘',
            0x92 => '’',
            0x93 => '“',
            0x94 => '”',
            0x95 => '•',
            0x96 => '–',
            0x97 => '—',
            0x80 => '€',
            other => other as char,
        })
        .collect()
}

fn as_number(obj: &Object) -> f32 {
    match obj {
        Object::Integer(i) => *i as f32,
        Object::Real(r) => *r as f32,
        _ => 0.0,
    }
}

/// Every `Tj` on a page, in drawing order
pub fn text_runs(doc: &LopdfDocument, page_num: u32) -> Vec<TextRun> {
    let Some(content) = page_content(doc, page_num) else {
        return Vec::new();
    };

    let mut font = String::new();
    let mut size = 0.0;
    let (mut x, mut y) = (0.0, 0.0);
    let mut runs = Vec::new();
    for op in content.operations {
        match op.operator.as_str() {
            "Tf" if op.operands.len() == 2 => {
                if let Ok(name) = op.operands[0].as_name() {
                    font = String::from_utf8_lossy(name).into_owned();
                }
                size = as_number(&op.operands[1]);
            }
            "BT" => (x, y) = (0.0, 0.0),
            "Td" if op.operands.len() == 2 => {
                x += as_number(&op.operands[0]);
                y += as_number(&op.operands[1]);
            }
            "Tj" => {
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    runs.push(TextRun { font: font.clone(), size, text: decode_win_ansi(bytes), x, y });
                }
            }
            _ => {}
        }
    }
    runs
}

/// `Tj` and `Do` operations in the order they paint.
pub fn drawing_order(doc: &LopdfDocument, page_num: u32) -> Vec<Drawn> {
    let Some(content) = page_content(doc, page_num) else {
        return Vec::new();
    };

    content
        .operations
        .iter()
        .filter_map(|op| match (op.operator.as_str(), op.operands.first()) {
            ("Tj", Some(Object::String(bytes, _))) => Some(Drawn::Text(decode_win_ansi(bytes))),
            ("Do", Some(Object::Name(name))) => Some(Drawn::Image(String::from_utf8_lossy(name).into_owned())),
            _ => None,
        })
        .collect()
}

/// Number of XObjects painted with `Do` on a page
pub fn image_draw_count(doc: &LopdfDocument, page_num: u32) -> usize {
    page_content(doc, page_num)
        .map(|c| c.operations.iter().filter(|op| op.operator == "Do").count())
        .unwrap_or(0)
}

/// All `/URI` link annotations, page by page
pub fn uri_links(doc: &LopdfDocument) -> Vec<UriLink> {
    let mut links = Vec::new();
    for (page_num, page_id) in doc.get_pages() {
        let Ok(page) = doc.get_dictionary(page_id) else { continue };
        let Ok(annots) = page.get(b"Annots").and_then(Object::as_array) else { continue };

        for annot in annots {
            let Ok(annot) = annot.as_reference().and_then(|id| doc.get_dictionary(id)) else { continue };
            if annot.get(b"Subtype").and_then(Object::as_name).ok() != Some(b"Link".as_slice()) {
                continue;
            }
            let Ok(action) = annot.get(b"A").and_then(Object::as_dict) else { continue };
            let Ok(Object::String(uri, _)) = action.get(b"URI") else { continue };
            let Ok(rect) = annot.get(b"Rect").and_then(Object::as_array) else { continue };
            if rect.len() < 4 {
                continue;
            }
            links.push(UriLink {
                page: page_num,
                rect: [as_number(&rect[0]), as_number(&rect[1]), as_number(&rect[2]), as_number(&rect[3])],
                uri: String::from_utf8_lossy(uri).into_owned(),
            });
        }
    }
    links
}

/// Get page dimensions (width, height) in points
pub fn get_page_dimensions(doc: &LopdfDocument, page_num: u32) -> Option<(f32, f32)> {
    let page_id = *doc.get_pages().get(&page_num)?;
    let media_box = doc.get_dictionary(page_id).ok()?.get(b"MediaBox").ok()?.as_array().ok()?;
    if media_box.len() < 4 {
        return None;
    }
    Some((
        as_number(&media_box[2]) - as_number(&media_box[0]),
        as_number(&media_box[3]) - as_number(&media_box[1]),
    ))
}

// ============================================================================
// Fluent Assertion Macros
// ============================================================================

/// Assert the number of pages in a PDF
#[macro_export]
macro_rules! assert_pdf_page_count {
    ($pdf:expr, $count:expr) => {
        assert_eq!(
            $pdf.page_count(),
            $count,
            "Expected {} pages, got {}",
            $count,
            $pdf.page_count()
        );
    };
}

/// Assert that a page shows a string
#[macro_export]
macro_rules! assert_page_contains_text {
    ($pdf:expr, $page:expr, $text:expr) => {
        let texts = $pdf.texts($page);
        assert!(
            texts.iter().any(|t| t == $text),
            "Page {} should contain '{}', texts were: {:?}",
            $page,
            $text,
            texts
        );
    };
}
