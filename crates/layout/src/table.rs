use crate::LayoutError;
use crate::format::{format_count, format_percent, is_absolute_url, short_link_label};
use crate::metrics::{FontSpec, ellipsize, line_height_mm, text_width_mm, wrap_text};
use kolreport_types::Color;

/// Rows sampled when measuring auto-width columns.
const AUTO_LAYOUT_SAMPLE_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub label: String,
    /// Overrides the alignment derived from `numeric` for body and footer cells.
    pub align: Option<Alignment>,
    pub numeric: bool,
    /// Fixed width in millimetres; `None` sizes the column to its content.
    pub width: Option<f32>,
}

impl Column {
    pub fn text(label: impl Into<String>) -> Self {
        Self { label: label.into(), align: None, numeric: false, width: None }
    }

    pub fn numeric(label: impl Into<String>) -> Self {
        Self { numeric: true, ..Self::text(label) }
    }

    pub fn with_width(mut self, width_mm: f32) -> Self {
        self.width = Some(width_mm);
        self
    }

    pub fn aligned(mut self, align: Alignment) -> Self {
        self.align = Some(align);
        self
    }

    pub fn body_alignment(&self) -> Alignment {
        self.align
            .unwrap_or(if self.numeric { Alignment::Right } else { Alignment::Left })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Count(i64),
    Percent(f64),
}

impl CellValue {
    pub fn display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Count(n) => format_count(*n),
            CellValue::Percent(p) => format_percent(*p),
        }
    }

    /// The cell's text if it is an absolute http(s) URL.
    pub fn as_url(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) if is_absolute_url(s.trim()) => Some(s.trim()),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Count(value)
    }
}

impl From<u64> for CellValue {
    fn from(value: u64) -> Self {
        CellValue::Count(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    /// Wrap onto as many lines as needed; the row grows.
    #[default]
    Linebreak,
    /// Keep a single line and cut it with an ellipsis.
    Ellipsize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellStyle {
    pub font_size: f32,
    pub padding: f32,
    pub text_color: Color,
    pub fill: Option<Color>,
    pub bold: bool,
}

impl CellStyle {
    pub fn font(&self) -> FontSpec {
        FontSpec { size_pt: self.font_size, bold: self.bold }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableMargins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Default for TableMargins {
    fn default() -> Self {
        Self { left: 6.0, right: 6.0, top: 12.0, bottom: 10.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableStyle {
    pub head: CellStyle,
    pub body: CellStyle,
    pub foot: CellStyle,
    /// Fill for odd body rows (0-based).
    pub alternate_fill: Option<Color>,
    pub line_color: Color,
    pub line_width: f32,
    pub min_cell_height: f32,
    pub overflow: Overflow,
    pub margins: TableMargins,
}

const GRID_LINE: Color = Color::rgb(229, 231, 235);
const STRIPE: Color = Color::rgb(250, 250, 250);
const INK: Color = Color::rgb(17, 24, 39);

impl TableStyle {
    /// Dense grid for the per-KOL campaign table.
    pub fn compact() -> Self {
        let body = CellStyle {
            font_size: 7.0,
            padding: 0.8,
            text_color: Color::rgb(31, 41, 55),
            fill: None,
            bold: false,
        };
        let head = CellStyle {
            text_color: INK,
            fill: Some(Color::rgb(249, 250, 251)),
            bold: true,
            ..body
        };
        Self {
            head,
            body,
            foot: head,
            alternate_fill: Some(STRIPE),
            line_color: GRID_LINE,
            line_width: 0.2,
            min_cell_height: 6.0,
            overflow: Overflow::Linebreak,
            margins: TableMargins::default(),
        }
    }

    /// Single-line grid for the all-campaigns summary table.
    pub fn summary() -> Self {
        let body = CellStyle {
            font_size: 8.0,
            padding: 0.9,
            text_color: Color::rgb(55, 65, 81),
            fill: None,
            bold: false,
        };
        Self {
            head: CellStyle {
                font_size: 7.2,
                padding: 0.7,
                text_color: Color::rgb(30, 41, 59),
                fill: Some(Color::rgb(241, 245, 249)),
                bold: true,
            },
            body,
            foot: CellStyle {
                font_size: 7.2,
                text_color: INK,
                fill: Some(Color::rgb(248, 250, 252)),
                bold: true,
                ..body
            },
            alternate_fill: Some(STRIPE),
            line_color: GRID_LINE,
            line_width: 0.2,
            min_cell_height: 0.0,
            overflow: Overflow::Ellipsize,
            margins: TableMargins::default(),
        }
    }

    pub fn with_margins(mut self, margins: TableMargins) -> Self {
        self.margins = margins;
        self
    }

    pub fn cell_style(&self, role: RowRole) -> &CellStyle {
        match role {
            RowRole::Header => &self.head,
            RowRole::Body(_) => &self.body,
            RowRole::Footer => &self.foot,
        }
    }

    pub fn fill(&self, role: RowRole) -> Option<Color> {
        match role {
            RowRole::Body(index) if index % 2 == 1 => self.alternate_fill.or(self.body.fill),
            _ => self.cell_style(role).fill,
        }
    }
}

impl Default for TableStyle {
    fn default() -> Self {
        Self::compact()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableSpec {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<CellValue>>,
    pub footer: Option<Vec<CellValue>>,
    /// Column whose URL cells become clickable.
    pub link_column: Option<usize>,
    pub style: TableStyle,
}

impl TableSpec {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns, ..Default::default() }
    }

    pub fn with_rows(mut self, rows: Vec<Vec<CellValue>>) -> Self {
        self.rows = rows;
        self
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    pub fn with_footer(mut self, footer: Vec<CellValue>) -> Self {
        self.footer = Some(footer);
        self
    }

    pub fn with_link_column(mut self, index: usize) -> Self {
        self.link_column = Some(index);
        self
    }

    pub fn with_style(mut self, style: TableStyle) -> Self {
        self.style = style;
        self
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        let expected = self.columns.len();
        if expected == 0 {
            return Err(LayoutError::NoColumns);
        }
        for (row, cells) in self.rows.iter().enumerate() {
            if cells.len() != expected {
                return Err(LayoutError::RowWidthMismatch { row, expected, found: cells.len() });
            }
        }
        if let Some(footer) = &self.footer
            && footer.len() != expected
        {
            return Err(LayoutError::FooterWidthMismatch { expected, found: footer.len() });
        }
        if let Some(index) = self.link_column
            && index >= expected
        {
            return Err(LayoutError::LinkColumnOutOfRange { index, columns: expected });
        }
        Ok(())
    }

    /// Text drawn for a body cell: URL cells in the link column show a short label.
    fn body_text(&self, column: usize, value: &CellValue) -> (String, Option<String>) {
        if self.link_column == Some(column)
            && let Some(url) = value.as_url()
        {
            return (short_link_label(url), Some(url.to_string()));
        }
        (value.display(), None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRole {
    Header,
    /// Body row with its 0-based index in input order.
    Body(usize),
    Footer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedCell {
    /// Left edge in page coordinates (mm).
    pub x: f32,
    pub width: f32,
    pub lines: Vec<String>,
    pub align: Alignment,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowLayout {
    pub role: RowRole,
    pub height: f32,
    pub cells: Vec<PlacedCell>,
}

/// Resolved horizontal geometry and row heights of a table. Vertical
/// placement is left to the renderer so rows can continue across pages.
#[derive(Debug, Clone, PartialEq)]
pub struct TableLayout {
    pub x: f32,
    pub column_widths: Vec<f32>,
    pub header: RowLayout,
    pub body: Vec<RowLayout>,
    pub footer: Option<RowLayout>,
}

impl TableLayout {
    pub fn compute(spec: &TableSpec, page_width: f32) -> Result<Self, LayoutError> {
        spec.validate()?;
        let style = &spec.style;
        let available = (page_width - style.margins.left - style.margins.right).max(0.0);
        let column_widths = resolve_widths(spec, available);
        log::debug!("Resolved {} table column widths: {:?}", column_widths.len(), column_widths);

        let mut offsets = Vec::with_capacity(column_widths.len());
        let mut cursor = style.margins.left;
        for w in &column_widths {
            offsets.push(cursor);
            cursor += w;
        }

        let build_row = |role: RowRole, cells: Vec<(String, Alignment, Option<String>)>| {
            let cell_style = style.cell_style(role);
            let font = cell_style.font();
            let placed: Vec<PlacedCell> = cells
                .into_iter()
                .enumerate()
                .map(|(i, (text, align, link))| {
                    let inner = (column_widths[i] - 2.0 * cell_style.padding).max(0.0);
                    let lines = match style.overflow {
                        Overflow::Linebreak => wrap_text(&text, &font, inner),
                        Overflow::Ellipsize => vec![ellipsize(&text, &font, inner)],
                    };
                    PlacedCell { x: offsets[i], width: column_widths[i], lines, align, link }
                })
                .collect();
            let max_lines = placed.iter().map(|c| c.lines.len()).max().unwrap_or(1);
            let content = max_lines as f32 * line_height_mm(&font) + 2.0 * cell_style.padding;
            RowLayout { role, height: content.max(style.min_cell_height), cells: placed }
        };

        let header = build_row(
            RowRole::Header,
            spec.columns
                .iter()
                .map(|c| (c.label.clone(), Alignment::Center, None))
                .collect(),
        );

        let body = spec
            .rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                let cells = row
                    .iter()
                    .enumerate()
                    .map(|(col, value)| {
                        let (text, link) = spec.body_text(col, value);
                        (text, spec.columns[col].body_alignment(), link)
                    })
                    .collect();
                build_row(RowRole::Body(index), cells)
            })
            .collect();

        let footer = spec.footer.as_ref().map(|cells| {
            let cells = cells
                .iter()
                .enumerate()
                .map(|(col, value)| (value.display(), spec.columns[col].body_alignment(), None))
                .collect();
            build_row(RowRole::Footer, cells)
        });

        Ok(Self { x: style.margins.left, column_widths, header, body, footer })
    }

    pub fn width(&self) -> f32 {
        self.column_widths.iter().sum()
    }

    pub fn total_height(&self) -> f32 {
        self.header.height
            + self.body.iter().map(|r| r.height).sum::<f32>()
            + self.footer.as_ref().map_or(0.0, |r| r.height)
    }
}

/// Fixed columns keep their width; auto columns share what is left in
/// proportion to their single-line content width, growing or shrinking so the
/// table spans the available width.
fn resolve_widths(spec: &TableSpec, available: f32) -> Vec<f32> {
    let style = &spec.style;
    let mut widths = vec![0.0f32; spec.columns.len()];
    let mut auto_indices = Vec::new();
    let mut remaining = available;

    for (i, col) in spec.columns.iter().enumerate() {
        match col.width {
            Some(w) => {
                widths[i] = w;
                remaining -= w;
            }
            None => auto_indices.push(i),
        }
    }
    remaining = remaining.max(0.0);
    if auto_indices.is_empty() {
        return widths;
    }

    let measure = |text: &str, cell: &CellStyle| text_width_mm(text, &cell.font()) + 2.0 * cell.padding;
    let mut preferred = vec![0.0f32; spec.columns.len()];
    for &i in &auto_indices {
        preferred[i] = measure(&spec.columns[i].label, &style.head);
    }
    for row in spec.rows.iter().take(AUTO_LAYOUT_SAMPLE_LIMIT) {
        for &i in &auto_indices {
            let (text, _) = spec.body_text(i, &row[i]);
            preferred[i] = preferred[i].max(measure(&text, &style.body));
        }
    }
    if let Some(footer) = &spec.footer {
        for &i in &auto_indices {
            preferred[i] = preferred[i].max(measure(&footer[i].display(), &style.foot));
        }
    }

    let total_preferred: f32 = auto_indices.iter().map(|&i| preferred[i]).sum();
    if total_preferred > 0.0 {
        let factor = remaining / total_preferred;
        for &i in &auto_indices {
            widths[i] = preferred[i] * factor;
        }
    } else {
        let share = remaining / auto_indices.len() as f32;
        for &i in &auto_indices {
            widths[i] = share;
        }
    }
    widths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ELLIPSIS;

    const PAGE_W: f32 = 297.0;

    fn sample_spec() -> TableSpec {
        TableSpec::new(vec![
            Column::numeric("No."),
            Column::text("KOL Name"),
            Column::text("Link Post"),
            Column::numeric("Total Engagement").with_width(22.0),
            Column::numeric("ER %"),
        ])
        .with_rows(vec![
            vec![
                1i64.into(),
                "Alice".into(),
                "https://example.com/post/1".into(),
                12_345i64.into(),
                CellValue::Percent(3.456),
            ],
            vec![2i64.into(), "Bob".into(), "n/a".into(), 900i64.into(), CellValue::Percent(1.0)],
        ])
        .with_footer(vec![
            CellValue::Empty,
            "TOTAL".into(),
            CellValue::Empty,
            13_245i64.into(),
            CellValue::Percent(2.23),
        ])
        .with_link_column(2)
    }

    #[test]
    fn alignment_follows_numeric_flag_unless_overridden() {
        assert_eq!(Column::numeric("View").body_alignment(), Alignment::Right);
        assert_eq!(Column::text("Name").body_alignment(), Alignment::Left);
        assert_eq!(
            Column::numeric("View").aligned(Alignment::Center).body_alignment(),
            Alignment::Center
        );
    }

    #[test]
    fn widths_span_available_width_and_keep_fixed_columns() {
        let layout = TableLayout::compute(&sample_spec(), PAGE_W).unwrap();
        assert_eq!(layout.column_widths[3], 22.0);
        assert!((layout.width() - (PAGE_W - 12.0)).abs() < 1e-3);
        assert_eq!(layout.x, 6.0);
        assert_eq!(layout.header.cells[0].x, 6.0);
        let last = layout.header.cells.last().unwrap();
        assert!((last.x + last.width - (PAGE_W - 6.0)).abs() < 1e-3);
    }

    #[test]
    fn header_is_centred_and_body_follows_columns() {
        let layout = TableLayout::compute(&sample_spec(), PAGE_W).unwrap();
        assert!(layout.header.cells.iter().all(|c| c.align == Alignment::Center));
        let row = &layout.body[0];
        assert_eq!(row.cells[0].align, Alignment::Right);
        assert_eq!(row.cells[1].align, Alignment::Left);
        assert_eq!(row.cells[4].lines, vec!["3.46%"]);
        assert_eq!(row.cells[3].lines, vec!["12,345"]);
    }

    #[test]
    fn link_column_urls_get_short_label_and_target() {
        let layout = TableLayout::compute(&sample_spec(), PAGE_W).unwrap();
        let linked = &layout.body[0].cells[2];
        assert_eq!(linked.link.as_deref(), Some("https://example.com/post/1"));
        assert_eq!(linked.lines, vec!["example.com/post/1"]);

        let plain = &layout.body[1].cells[2];
        assert_eq!(plain.link, None);
        assert_eq!(plain.lines, vec!["n/a"]);

        let footer = layout.footer.as_ref().unwrap();
        assert!(footer.cells.iter().all(|c| c.link.is_none()));
    }

    #[test]
    fn url_outside_link_column_is_plain_text() {
        let mut spec = sample_spec();
        spec.link_column = Some(1);
        let layout = TableLayout::compute(&spec, PAGE_W).unwrap();
        assert!(layout.body.iter().all(|r| r.cells.iter().all(|c| c.link.is_none())));
    }

    #[test]
    fn rows_keep_input_order_and_min_height() {
        let layout = TableLayout::compute(&sample_spec(), PAGE_W).unwrap();
        assert_eq!(layout.body.len(), 2);
        assert_eq!(layout.body[0].role, RowRole::Body(0));
        assert_eq!(layout.body[1].cells[1].lines, vec!["Bob"]);
        assert!(layout.body.iter().all(|r| r.height >= 6.0));
        assert_eq!(layout.footer.as_ref().unwrap().role, RowRole::Footer);
    }

    #[test]
    fn long_text_wraps_and_grows_the_row() {
        let long = "A very long KOL display name that cannot possibly fit in a narrow column";
        let spec = TableSpec::new(vec![Column::text("Name").with_width(20.0), Column::text("Other").with_width(20.0)])
            .with_rows(vec![vec![long.into(), "x".into()], vec!["short".into(), "y".into()]]);
        let layout = TableLayout::compute(&spec, PAGE_W).unwrap();
        assert!(layout.body[0].cells[0].lines.len() > 1);
        assert!(layout.body[0].height > layout.body[1].height);
        let font = spec.style.body.font();
        for line in &layout.body[0].cells[0].lines {
            assert!(text_width_mm(line, &font) <= 20.0 - 2.0 * spec.style.body.padding + 1e-3);
        }
    }

    #[test]
    fn ellipsize_style_keeps_one_line() {
        let long = "A very long campaign name that cannot possibly fit in a narrow column";
        let spec = TableSpec::new(vec![Column::text("Name").with_width(20.0)])
            .with_rows(vec![vec![long.into()]])
            .with_style(TableStyle::summary());
        let layout = TableLayout::compute(&spec, PAGE_W).unwrap();
        let lines = &layout.body[0].cells[0].lines;
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with(ELLIPSIS));
    }

    #[test]
    fn alternate_fill_applies_to_odd_rows() {
        let style = TableStyle::compact();
        assert_eq!(style.fill(RowRole::Body(0)), None);
        assert_eq!(style.fill(RowRole::Body(1)), Some(Color::rgb(250, 250, 250)));
        assert_eq!(style.fill(RowRole::Header), Some(Color::rgb(249, 250, 251)));
        assert!(style.cell_style(RowRole::Footer).bold);
    }

    #[test]
    fn validation_rejects_malformed_tables() {
        let mut spec = sample_spec();
        spec.rows[1].pop();
        assert_eq!(
            spec.validate(),
            Err(LayoutError::RowWidthMismatch { row: 1, expected: 5, found: 4 })
        );

        let spec = sample_spec().with_link_column(9);
        assert_eq!(spec.validate(), Err(LayoutError::LinkColumnOutOfRange { index: 9, columns: 5 }));

        let spec = sample_spec().with_footer(vec![CellValue::Empty]);
        assert_eq!(spec.validate(), Err(LayoutError::FooterWidthMismatch { expected: 5, found: 1 }));

        assert_eq!(TableSpec::new(vec![]).validate(), Err(LayoutError::NoColumns));
    }
}
