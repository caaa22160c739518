//! Multi-page PDF export for KOL campaign reports.
//!
//! An export loads the branding asset, captures every requested dashboard
//! section concurrently, lays out one titled and logo-stamped page per
//! section followed by the data table, and hands the finished file to a
//! [`DownloadSink`]. Any failure aborts the whole export; nothing partial is
//! ever saved.

pub mod asset;
pub mod capture;
pub mod config;
pub mod error;
pub mod notify;
pub mod orchestrator;
pub mod render;
pub mod report;
pub mod sink;

pub use asset::AssetLoader;
pub use capture::{ImageRegion, RegionCapturer, Region};
pub use config::ExportConfig;
pub use error::{ConfigError, ErrorKind, ExportError};
pub use notify::{EXPORT_FAILED_ALERT, LogNotifier, Notifier, RecordingNotifier, StderrNotifier};
pub use orchestrator::{ExportOrchestrator, ExportOrchestratorBuilder, ExportState, ExportSummary};
pub use render::{DocumentComposer, PageContent, PageSpec, TableRenderer, render_table};
pub use report::{ExportRequest, ReportData, ReportKind};
pub use sink::{DirectorySink, DownloadSink, MemorySink, SavedDocument};

pub use kolreport_layout::{CellValue, Column, TableSpec, TableStyle, fit};
pub use kolreport_traits::{CaptureError, InMemoryResourceProvider, ResourceProvider, SectionCapturer};
pub use kolreport_types::{Asset, ImageFormat, KolRow, ResourceUri, SectionId, Snapshot, SummaryRow, Totals};
