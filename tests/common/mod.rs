#![allow(dead_code)]

pub mod fixtures;
pub mod pdf_assertions;

use lopdf::Document as LopdfDocument;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Wrapper around a generated PDF with helper methods
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Text drawn on a page (1-based), in drawing order.
    pub fn text_runs(&self, page_num: u32) -> Vec<pdf_assertions::TextRun> {
        pdf_assertions::text_runs(&self.doc, page_num)
    }

    pub fn texts(&self, page_num: u32) -> Vec<String> {
        self.text_runs(page_num).into_iter().map(|r| r.text).collect()
    }

    pub fn image_draws(&self, page_num: u32) -> usize {
        pdf_assertions::image_draw_count(&self.doc, page_num)
    }

    pub fn drawing_order(&self, page_num: u32) -> Vec<pdf_assertions::Drawn> {
        pdf_assertions::drawing_order(&self.doc, page_num)
    }

    /// Save PDF to a file for manual debugging
    pub fn save_for_debug(&self, name: &str) -> std::io::Result<()> {
        std::fs::write(format!("test_output_{}.pdf", name), &self.bytes)
    }
}
