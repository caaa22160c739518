use kolreport_layout::{Alignment, RowLayout, TableLayout, TableSpec, ascent_mm, line_height_mm, text_width_mm};
use kolreport_render_core::{PageCanvas, RenderError};
use kolreport_types::Rect;

/// Draws a [`TableSpec`] as a grid: a centred header row, body rows in input
/// order with alternating shading, then the optional footer.
pub struct TableRenderer<'a> {
    spec: &'a TableSpec,
    layout: TableLayout,
}

impl<'a> TableRenderer<'a> {
    pub fn new(spec: &'a TableSpec, page_width: f32) -> Result<Self, RenderError> {
        let layout = TableLayout::compute(spec, page_width)?;
        Ok(Self { spec, layout })
    }

    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    /// Draws the whole table on one canvas starting at `start_y` and returns
    /// the y coordinate just below it.
    pub fn render<C: PageCanvas>(&self, canvas: &mut C, start_y: f32) -> f32 {
        let mut y = start_y;
        for row in self.rows() {
            self.draw_row(canvas, row, y);
            y += row.height;
        }
        y
    }

    /// Draws the table, moving to a fresh canvas whenever the next row would
    /// cross the bottom margin. `next_page` receives the full canvas and
    /// returns the one to continue on; the header is repeated there at the top
    /// margin. Returns the last canvas and the y just below the table.
    pub fn render_paged<C, F>(&self, mut canvas: C, start_y: f32, mut next_page: F) -> Result<(C, f32), RenderError>
    where
        C: PageCanvas,
        F: FnMut(C) -> Result<C, RenderError>,
    {
        let margins = &self.spec.style.margins;
        let bottom = canvas.page_size().height - margins.bottom;
        let header = &self.layout.header;

        let mut y = start_y;
        self.draw_row(&mut canvas, header, y);
        y += header.height;

        let mut rows_on_page = 0usize;
        for row in self.layout.body.iter().chain(self.layout.footer.as_ref()) {
            if rows_on_page > 0 && y + row.height > bottom {
                canvas = next_page(canvas)?;
                y = margins.top;
                self.draw_row(&mut canvas, header, y);
                y += header.height;
                rows_on_page = 0;
            }
            self.draw_row(&mut canvas, row, y);
            y += row.height;
            rows_on_page += 1;
        }
        Ok((canvas, y))
    }

    fn rows(&self) -> impl Iterator<Item = &RowLayout> {
        std::iter::once(&self.layout.header)
            .chain(self.layout.body.iter())
            .chain(self.layout.footer.as_ref())
    }

    fn draw_row<C: PageCanvas>(&self, canvas: &mut C, row: &RowLayout, y: f32) {
        let style = &self.spec.style;
        let cell_style = style.cell_style(row.role);
        let font = cell_style.font();
        let line_height = line_height_mm(&font);
        let ascent = ascent_mm(&font);

        if let Some(fill) = style.fill(row.role) {
            canvas.fill_rect(Rect::new(self.layout.x, y, self.layout.width(), row.height), &fill);
        }

        for cell in &row.cells {
            let rect = Rect::new(cell.x, y, cell.width, row.height);
            canvas.stroke_rect(rect, &style.line_color, style.line_width);

            let block = cell.lines.len() as f32 * line_height;
            let text_top = y + (row.height - block) / 2.0;
            for (i, line) in cell.lines.iter().enumerate() {
                let width = text_width_mm(line, &font);
                let x = match cell.align {
                    Alignment::Left => cell.x + cell_style.padding,
                    Alignment::Center => cell.x + (cell.width - width) / 2.0,
                    Alignment::Right => cell.x + cell.width - cell_style.padding - width,
                };
                let baseline = text_top + i as f32 * line_height + ascent;
                canvas.draw_text(line, x, baseline, &font, &cell_style.text_color);
            }

            if let Some(url) = &cell.link {
                canvas.link(rect, url);
            }
        }
    }
}

/// Renders `spec` onto `canvas` starting at `start_y`; returns the y just
/// below the table.
pub fn render_table<C: PageCanvas>(canvas: &mut C, spec: &TableSpec, start_y: f32) -> Result<f32, RenderError> {
    let page_width = canvas.page_size().width;
    Ok(TableRenderer::new(spec, page_width)?.render(canvas, start_y))
}
