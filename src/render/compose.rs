use super::table::TableRenderer;
use crate::asset::detect_format;
use crate::config::ExportConfig;
use kolreport_layout::{TableSpec, fit, text_width_mm};
use kolreport_render_core::{FontSpec, ImageHandle, PageCanvas, RenderError};
use kolreport_render_lopdf::{LopdfDocumentBuilder, LopdfPage};
use kolreport_types::{Asset, Color, Rect, Snapshot};

const TITLE_COLOR: Color = Color::BLACK;

#[derive(Debug, Clone, PartialEq)]
pub enum PageContent {
    Image(Snapshot),
    Table(TableSpec),
}

/// One page of the document, drawn in list order.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSpec {
    pub title: String,
    /// Baseline of the title in mm; the configured default when unset.
    pub title_y: Option<f32>,
    pub content: PageContent,
    /// Stamp the logo over the finished content instead of right after the title.
    pub logo_last: bool,
}

impl PageSpec {
    pub fn image(title: impl Into<String>, snapshot: Snapshot) -> Self {
        Self { title: title.into(), title_y: None, content: PageContent::Image(snapshot), logo_last: false }
    }

    pub fn table(title: impl Into<String>, table: TableSpec) -> Self {
        Self { title: title.into(), title_y: None, content: PageContent::Table(table), logo_last: false }
    }

    pub fn with_title_y(mut self, y_mm: f32) -> Self {
        self.title_y = Some(y_mm);
        self
    }

    pub fn with_logo_last(mut self) -> Self {
        self.logo_last = true;
        self
    }
}

/// Lays out pages on a single landscape geometry. Pages are emitted exactly in
/// input order; a table that overflows continues on extra pages right after
/// its own.
#[derive(Debug, Clone)]
pub struct DocumentComposer {
    config: ExportConfig,
}

impl DocumentComposer {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn compose(&self, title: &str, pages: &[PageSpec], asset: &Asset) -> Result<ComposedDocument, RenderError> {
        let mut builder = LopdfDocumentBuilder::new(self.config.page_geometry()).with_title(title);
        let logo = builder.register_image(&asset.data, asset.format)?;
        let logo_rect = self.logo_rect(builder.page_size().width, asset.aspect());

        for (index, page) in pages.iter().enumerate() {
            log::debug!("Composing page {} '{}'", index + 1, page.title);
            let mut canvas = builder.begin_page();
            self.draw_title(&mut canvas, &page.title, page.title_y.unwrap_or(self.config.title_y_mm));
            if !page.logo_last {
                canvas.draw_image(&logo, logo_rect);
            }

            match &page.content {
                PageContent::Image(snapshot) => {
                    self.draw_snapshot(&mut builder, &mut canvas, snapshot)?;
                    if page.logo_last {
                        canvas.draw_image(&logo, logo_rect);
                    }
                    builder.push_page(canvas)?;
                }
                PageContent::Table(table) => {
                    let size = canvas.page_size();
                    let renderer = TableRenderer::new(table, size.width)?;
                    let (mut last, _) = renderer.render_paged(canvas, self.config.table_start_y_mm, |mut full| {
                        if page.logo_last {
                            full.draw_image(&logo, logo_rect);
                        }
                        builder.push_page(full)?;
                        let mut next = builder.begin_page();
                        if !page.logo_last {
                            next.draw_image(&logo, logo_rect);
                        }
                        Ok(next)
                    })?;
                    if page.logo_last {
                        last.draw_image(&logo, logo_rect);
                    }
                    builder.push_page(last)?;
                }
            }
        }

        log::debug!("Composed {} pages for '{title}'", builder.page_count());
        Ok(ComposedDocument { builder })
    }

    /// Logo box in the top-right corner: fixed width, height from the asset's
    /// aspect ratio.
    fn logo_rect(&self, page_width: f32, aspect: f32) -> Rect {
        let w = self.config.logo_width_mm;
        let margin = self.config.logo_margin_mm;
        Rect::new(page_width - margin - w, margin, w, w * aspect)
    }

    fn draw_title(&self, canvas: &mut LopdfPage, title: &str, baseline_y: f32) {
        let font = FontSpec::bold(self.config.title_font_size);
        let x = (canvas.page_size().width - text_width_mm(title, &font)) / 2.0;
        canvas.draw_text(title, x, baseline_y, &font, &TITLE_COLOR);
    }

    fn draw_snapshot(
        &self,
        builder: &mut LopdfDocumentBuilder,
        canvas: &mut LopdfPage,
        snapshot: &Snapshot,
    ) -> Result<(), RenderError> {
        let handle: ImageHandle = builder.register_image(snapshot.data(), detect_format(snapshot.data()))?;
        if handle.pixel_width() == 0 || handle.pixel_height() == 0 {
            return Err(RenderError::Image {
                name: handle.name().to_string(),
                message: "snapshot has no pixels".into(),
            });
        }
        let size = canvas.page_size();
        let rect = fit(
            handle.pixel_width() as f32,
            handle.pixel_height() as f32,
            size.width,
            size.height,
            self.config.image_margin_mm,
        );
        canvas.draw_image(&handle, rect);
        Ok(())
    }
}

/// A fully laid out document waiting to be serialized.
pub struct ComposedDocument {
    builder: LopdfDocumentBuilder,
}

impl ComposedDocument {
    pub fn page_count(&self) -> usize {
        self.builder.page_count()
    }

    pub fn serialize(self) -> Result<Vec<u8>, RenderError> {
        self.builder.finish()
    }
}
