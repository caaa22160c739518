//! The two report kinds the dashboard exports and the requests that drive them.

use crate::render::PageSpec;
use kolreport_layout::{CellValue, Column, TableMargins, TableSpec, TableStyle};
use kolreport_types::{KolRow, ResourceUri, SectionId, Snapshot, SummaryRow, Totals};
use std::fmt;

pub const DEFAULT_ASSET_SOURCE: &str = "/logo.png";

/// Baseline of the campaign overview title, a little higher than the rest.
const CAMPAIGN_OVERVIEW_TITLE_Y: f32 = 35.0;

const CAMPAIGN_LINK_COLUMN: usize = 4;
const CAMPAIGN_ENGAGEMENT_WIDTH_MM: f32 = 22.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Campaign,
    Summary,
}

impl ReportKind {
    pub fn default_title(self) -> &'static str {
        match self {
            ReportKind::Campaign => "Campaign",
            ReportKind::Summary => "Summary",
        }
    }

    pub fn default_file_name(self) -> &'static str {
        match self {
            ReportKind::Campaign => "campaign.pdf",
            ReportKind::Summary => "summary.pdf",
        }
    }

    pub fn default_sections(self) -> Vec<SectionId> {
        let (prefix, count) = match self {
            ReportKind::Campaign => ("campaign", 4),
            ReportKind::Summary => ("summary", 5),
        };
        (1..=count).map(|n| SectionId::from(format!("{prefix}-p{n}"))).collect()
    }

    fn table_title(self) -> &'static str {
        match self {
            ReportKind::Campaign => "KOLs",
            ReportKind::Summary => "Campaigns Data",
        }
    }

    /// Titles of the image pages, in section order. The first one is derived
    /// from the report title.
    fn section_titles(self, report_title: &str) -> Vec<String> {
        let fixed: &[&str] = match self {
            ReportKind::Campaign => &[
                "Total Engagement by KOL",
                "Engagement rate (ER%)",
                "Engagement rate per view (ERV%)",
            ],
            ReportKind::Summary => &[
                "Engagement Share & Ranking",
                "Total by Campaign",
                "ER (%) by Campaign",
                "ERV (%) by Campaign",
            ],
        };
        std::iter::once(format!("{report_title} — Overview"))
            .chain(fixed.iter().map(|t| t.to_string()))
            .collect()
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportKind::Campaign => "campaign",
            ReportKind::Summary => "summary",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportData {
    Campaign(Vec<KolRow>),
    Summary(Vec<SummaryRow>),
}

impl ReportData {
    pub fn kind(&self) -> ReportKind {
        match self {
            ReportData::Campaign(_) => ReportKind::Campaign,
            ReportData::Summary(_) => ReportKind::Summary,
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            ReportData::Campaign(rows) => rows.len(),
            ReportData::Summary(rows) => rows.len(),
        }
    }
}

/// Everything one export needs. Consumed by the run that receives it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub title: String,
    pub file_name: String,
    pub totals: Totals,
    pub data: ReportData,
    /// Captured in this order; one image page per section.
    pub sections: Vec<SectionId>,
    pub asset_source: ResourceUri,
}

impl ExportRequest {
    pub fn new(data: ReportData, totals: Totals) -> Self {
        let kind = data.kind();
        Self {
            title: kind.default_title().to_string(),
            file_name: kind.default_file_name().to_string(),
            totals,
            data,
            sections: kind.default_sections(),
            asset_source: ResourceUri::from(DEFAULT_ASSET_SOURCE),
        }
    }

    pub fn campaign(rows: Vec<KolRow>, totals: Totals) -> Self {
        Self::new(ReportData::Campaign(rows), totals)
    }

    pub fn summary(rows: Vec<SummaryRow>, totals: Totals) -> Self {
        Self::new(ReportData::Summary(rows), totals)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn with_sections(mut self, sections: Vec<SectionId>) -> Self {
        self.sections = sections;
        self
    }

    pub fn with_asset_source(mut self, source: impl Into<ResourceUri>) -> Self {
        self.asset_source = source.into();
        self
    }

    pub fn kind(&self) -> ReportKind {
        self.data.kind()
    }

    pub fn table_spec(&self, margins: TableMargins) -> TableSpec {
        match &self.data {
            ReportData::Campaign(rows) => campaign_table(rows, &self.totals, margins),
            ReportData::Summary(rows) => summary_table(rows, &self.totals, margins),
        }
    }

    /// The document: one image page per snapshot (in section order), then
    /// the data table.
    pub fn page_specs(&self, snapshots: Vec<Snapshot>, margins: TableMargins) -> Vec<PageSpec> {
        let kind = self.kind();
        let titles = kind.section_titles(&self.title);

        let mut pages: Vec<PageSpec> = snapshots
            .into_iter()
            .enumerate()
            .map(|(i, snapshot)| {
                let title = titles.get(i).cloned().unwrap_or_else(|| self.title.clone());
                let page = PageSpec::image(title, snapshot);
                if i == 0 && kind == ReportKind::Campaign {
                    page.with_title_y(CAMPAIGN_OVERVIEW_TITLE_Y)
                } else {
                    page
                }
            })
            .collect();
        pages.push(PageSpec::table(kind.table_title(), self.table_spec(margins)));
        // Summary pages carry the logo over their content.
        if kind == ReportKind::Summary {
            pages = pages.into_iter().map(PageSpec::with_logo_last).collect();
        }
        pages
    }
}

/// Followers arrive as free text; show them as a count when they are one.
fn followers_cell(raw: &str) -> CellValue {
    match raw.trim().parse::<i64>() {
        Ok(n) => CellValue::Count(n),
        Err(_) => CellValue::Text(raw.to_string()),
    }
}

/// Footer averages come from the supplied totals only; an absent or
/// non-finite value prints as `0.00%`.
fn average_cell(value: Option<f64>) -> CellValue {
    CellValue::Percent(value.filter(|v| v.is_finite()).unwrap_or(0.0))
}

pub fn campaign_table(rows: &[KolRow], totals: &Totals, margins: TableMargins) -> TableSpec {
    let columns = vec![
        Column::numeric("No."),
        Column::text("KOL Name"),
        Column::numeric("Followers"),
        Column::text("Platform"),
        Column::text("Link Post"),
        Column::numeric("View"),
        Column::numeric("Like"),
        Column::numeric("Comment"),
        Column::numeric("Share"),
        Column::numeric("Save"),
        Column::numeric("Total Engagement").with_width(CAMPAIGN_ENGAGEMENT_WIDTH_MM),
        Column::numeric("ER %"),
        Column::numeric("ERV %"),
    ];

    let body = rows
        .iter()
        .map(|r| {
            vec![
                CellValue::Count(r.id as i64),
                CellValue::Text(r.name.clone()),
                followers_cell(&r.followers),
                CellValue::Text(r.platform.to_string()),
                CellValue::Text(r.link.clone()),
                r.view.into(),
                r.likes.into(),
                r.comments.into(),
                r.shares.into(),
                r.save.into(),
                r.total_engagement.into(),
                CellValue::Percent(r.er),
                CellValue::Percent(r.erv),
            ]
        })
        .collect();

    let footer = vec![
        CellValue::Empty,
        "TOTAL".into(),
        CellValue::Empty,
        CellValue::Empty,
        CellValue::Empty,
        totals.total_view.into(),
        totals.total_likes.into(),
        totals.total_comments.into(),
        totals.total_shares.into(),
        totals.total_save.into(),
        totals.total_engagement.into(),
        average_cell(totals.average_er),
        average_cell(totals.average_erv),
    ];

    TableSpec::new(columns)
        .with_rows(body)
        .with_footer(footer)
        .with_link_column(CAMPAIGN_LINK_COLUMN)
        .with_style(TableStyle::compact().with_margins(margins))
}

pub fn summary_table(rows: &[SummaryRow], totals: &Totals, margins: TableMargins) -> TableSpec {
    let columns = vec![
        Column::numeric("No."),
        Column::text("Name"),
        Column::numeric("Total KOLs"),
        Column::text("Platform"),
        Column::numeric("View"),
        Column::numeric("Likes"),
        Column::numeric("Comments"),
        Column::numeric("Shares"),
        Column::numeric("Save"),
        Column::numeric("Total Engagement"),
        Column::numeric("ER %"),
        Column::numeric("ERV %"),
    ];

    let body = rows
        .iter()
        .map(|r| {
            vec![
                CellValue::Count(r.id as i64),
                CellValue::Text(r.name.clone()),
                r.total_kols.into(),
                CellValue::Text(r.platform.clone()),
                r.total_view.into(),
                r.total_likes.into(),
                r.total_comments.into(),
                r.total_shares.into(),
                r.total_save.into(),
                r.total_engagement.into(),
                CellValue::Percent(r.avg_er),
                CellValue::Percent(r.avg_erv),
            ]
        })
        .collect();

    let footer = vec![
        CellValue::Empty,
        "TOTAL".into(),
        CellValue::Empty,
        CellValue::Empty,
        totals.total_view.into(),
        totals.total_likes.into(),
        totals.total_comments.into(),
        totals.total_shares.into(),
        totals.total_save.into(),
        totals.total_engagement.into(),
        average_cell(totals.average_er),
        average_cell(totals.average_erv),
    ];

    TableSpec::new(columns)
        .with_rows(body)
        .with_footer(footer)
        .with_style(TableStyle::summary().with_margins(margins))
}
