//! kolreport CLI - export campaign and summary reports to PDF

use std::path::{Component, Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use kolreport::{
    DirectorySink, ExportConfig, ExportOrchestrator, ExportRequest, ImageRegion, KolRow, RegionCapturer,
    ReportKind, ResourceProvider, ResourceUri, SectionId, StderrNotifier, SummaryRow, Totals,
};
use kolreport_resource::{FilesystemResourceProvider, HttpResourceProvider};

#[derive(Parser)]
#[command(name = "kolreport")]
#[command(version)]
#[command(about = "Export KOL campaign dashboards as multi-page PDF reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export one campaign: overview charts plus the KOL table
    Campaign(ExportArgs),
    /// Export the all-campaigns summary
    Summary(ExportArgs),
}

#[derive(Args)]
struct ExportArgs {
    /// JSON file with `totals`, `rows` and an optional `title`
    #[arg(long, value_name = "FILE")]
    data: PathBuf,

    /// Directory holding one `<section-id>.png` per section
    #[arg(long, value_name = "DIR")]
    sections: PathBuf,

    /// Logo image path or http(s) URL
    #[arg(long, value_name = "PATH|URL")]
    logo: String,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    out: PathBuf,

    /// Output file name (defaults to campaign.pdf / summary.pdf)
    #[arg(long)]
    file_name: Option<String>,

    /// Report title (overrides the data file)
    #[arg(long)]
    title: Option<String>,

    /// Section ids in page order (defaults to the report's standard sections)
    #[arg(long = "section", value_name = "ID")]
    section: Vec<String>,

    /// Export settings as JSON
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Deserialize)]
struct DataFile<R> {
    title: Option<String>,
    #[serde(default)]
    totals: Totals,
    rows: Vec<R>,
}

type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let (kind, args) = match cli.command {
        Commands::Campaign(args) => (ReportKind::Campaign, args),
        Commands::Summary(args) => (ReportKind::Summary, args),
    };

    match run(kind, args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::debug!("Export aborted: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(kind: ReportKind, args: ExportArgs) -> CliResult<()> {
    let notifier = Arc::new(StderrNotifier);

    let config = match &args.config {
        Some(path) => ExportConfig::from_json_file(path).inspect_err(|e| eprintln!("{e}"))?,
        None => ExportConfig::default(),
    };

    let mut request = load_request(kind, &args.data).inspect_err(|e| eprintln!("{e}"))?;
    if let Some(title) = args.title {
        request = request.with_title(title);
    }
    if let Some(file_name) = args.file_name {
        request = request.with_file_name(file_name);
    }
    if !args.section.is_empty() {
        request = request.with_sections(args.section.into_iter().map(SectionId::from).collect());
    }

    let (provider, asset_source) = logo_provider(&args.logo);
    request = request.with_asset_source(asset_source);

    let capturer = bind_section_images(args.sections, request.sections.clone(), config.pixel_ratio).await?;

    let orchestrator = ExportOrchestrator::builder()
        .with_config(config)
        .with_resource_provider(provider)
        .with_capturer(Arc::new(capturer))
        .with_sink(Arc::new(DirectorySink::new(&args.out)))
        .with_notifier(notifier)
        .build()
        .inspect_err(|e| eprintln!("{e}"))?;

    let summary = orchestrator.run_export(request).await?;
    println!("Wrote {} ({} pages, {} bytes)", summary.location, summary.page_count, summary.bytes);
    Ok(())
}

fn load_request(kind: ReportKind, path: &Path) -> CliResult<ExportRequest> {
    fn read<R: DeserializeOwned>(path: &Path) -> CliResult<DataFile<R>> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read data file '{}': {e}", path.display()))?;
        serde_json::from_str(&source)
            .map_err(|e| format!("Failed to parse data file '{}': {e}", path.display()).into())
    }

    let (title, request) = match kind {
        ReportKind::Campaign => {
            let data: DataFile<KolRow> = read(path)?;
            (data.title, ExportRequest::campaign(data.rows, data.totals))
        }
        ReportKind::Summary => {
            let data: DataFile<SummaryRow> = read(path)?;
            (data.title, ExportRequest::summary(data.rows, data.totals))
        }
    };
    Ok(match title {
        Some(title) => request.with_title(title),
        None => request,
    })
}

/// A URL is fetched over HTTP; a path is read from its parent directory.
fn logo_provider(logo: &str) -> (Arc<dyn ResourceProvider>, ResourceUri) {
    let uri = ResourceUri::from(logo);
    if uri.is_remote() {
        return (Arc::new(HttpResourceProvider::new()), uri);
    }
    let path = Path::new(logo);
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| logo.to_string());
    (Arc::new(FilesystemResourceProvider::new(dir)), ResourceUri::from(file_name))
}

/// `<dir>/<id>.png`, or `None` when the id could name a file outside `dir`.
fn section_image_path(dir: &Path, section: &SectionId) -> Option<PathBuf> {
    let id = section.as_str();
    if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
        return None;
    }
    let file_name = format!("{id}.png");
    let mut components = Path::new(&file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(dir.join(file_name)),
        _ => None,
    }
}

/// Decodes every section image on the blocking pool. Sections without a
/// usable image stay unbound; the export reports them as missing.
async fn bind_section_images(dir: PathBuf, sections: Vec<SectionId>, pixel_ratio: u32) -> CliResult<RegionCapturer> {
    let capturer = tokio::task::spawn_blocking(move || {
        let capturer = RegionCapturer::new(pixel_ratio);
        for section in sections {
            let Some(path) = section_image_path(&dir, &section) else {
                log::warn!("Section id '{section}' is not a valid file name");
                continue;
            };
            match ImageRegion::open(&path, 1.0) {
                Ok(region) => {
                    capturer.bind(section, Arc::new(region));
                }
                Err(e) => log::warn!("Section '{section}' has no usable image at {}: {e}", path.display()),
            }
        }
        capturer
    })
    .await?;
    Ok(capturer)
}
