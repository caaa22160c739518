use async_trait::async_trait;
use image::{DynamicImage, ImageBuffer, Rgb};
use kolreport::{
    Asset, CaptureError, CellValue, Column, ImageFormat, KolRow, SectionCapturer, SectionId, Snapshot,
    SummaryRow, TableSpec, Totals,
};
use kolreport_types::Platform;
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// A solid PNG of the given size
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, Rgb([30u8, 90, 200])));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).expect("encode test png");
    out.into_inner()
}

pub fn snapshot(width: u32, height: u32) -> Snapshot {
    Snapshot::new(png(width, height), width, height)
}

/// 200x100 logo
pub fn logo_bytes() -> Vec<u8> {
    png(200, 100)
}

pub fn logo_asset() -> Asset {
    Asset { data: Arc::new(logo_bytes()), format: ImageFormat::Png, pixel_width: 200, pixel_height: 100 }
}

pub fn kol_rows(count: u32) -> Vec<KolRow> {
    (1..=count)
        .map(|id| KolRow {
            id,
            name: format!("Creator {id}"),
            followers: (10_000 * id).to_string(),
            platform: Platform::TikTok,
            link: format!("https://www.tiktok.com/@creator{id}/video/{id}"),
            view: 5_000 * id as u64,
            likes: 400,
            comments: 30,
            shares: 12,
            save: 8,
            total_engagement: 450,
            er: 2.5,
            erv: 9.0,
        })
        .collect()
}

pub fn summary_rows(count: u32) -> Vec<SummaryRow> {
    (1..=count)
        .map(|id| SummaryRow {
            id,
            name: format!("Campaign {id}"),
            total_kols: 3 * id as u64,
            platform: "TikTok".into(),
            total_view: 20_000 * id as u64,
            total_likes: 900,
            total_comments: 70,
            total_shares: 25,
            total_save: 15,
            total_engagement: 1_010,
            avg_er: 3.25,
            avg_erv: 8.5,
        })
        .collect()
}

pub fn totals() -> Totals {
    Totals {
        total_view: 75_000,
        total_likes: 2_000,
        total_comments: 150,
        total_shares: 60,
        total_save: 40,
        total_engagement: 2_250,
        average_er: Some(2.5),
        average_erv: Some(9.0),
    }
}

/// Five rows and a TOTAL footer
pub fn five_row_table() -> TableSpec {
    TableSpec::new(vec![Column::numeric("No."), Column::text("Name"), Column::numeric("View")])
        .with_rows(
            (1..=5)
                .map(|i| vec![CellValue::Count(i), CellValue::Text(format!("Row {i}")), CellValue::Count(i * 1000)])
                .collect(),
        )
        .with_footer(vec![CellValue::Empty, "TOTAL".into(), CellValue::Count(15_000)])
}

/// Returns a fixed snapshot per section; listed sections fail as unbound.
#[derive(Default)]
pub struct StaticCapturer {
    snapshots: HashMap<SectionId, Snapshot>,
    missing: HashSet<SectionId>,
    pub calls: AtomicUsize,
}

impl StaticCapturer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, section: &str, snapshot: Snapshot) -> Self {
        self.snapshots.insert(SectionId::from(section), snapshot);
        self
    }

    pub fn missing(mut self, section: &str) -> Self {
        self.missing.insert(SectionId::from(section));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SectionCapturer for StaticCapturer {
    async fn capture(&self, section: &SectionId, _target_width_px: u32) -> Result<Snapshot, CaptureError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.missing.contains(section) {
            return Err(CaptureError::SectionNotFound(section.clone()));
        }
        self.snapshots
            .get(section)
            .cloned()
            .ok_or_else(|| CaptureError::SectionNotFound(section.clone()))
    }
}

/// Blocks every capture until [`GatedCapturer::open`] is called.
#[derive(Default)]
pub struct GatedCapturer {
    pub started: Notify,
    gate: Notify,
}

impl GatedCapturer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl SectionCapturer for GatedCapturer {
    async fn capture(&self, _section: &SectionId, _target_width_px: u32) -> Result<Snapshot, CaptureError> {
        self.started.notify_one();
        self.gate.notified().await;
        Ok(snapshot(64, 20))
    }
}
