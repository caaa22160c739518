//! The export entry point: load the asset, capture every section, compose,
//! serialize and deliver, all or nothing.

use crate::asset::AssetLoader;
use crate::config::ExportConfig;
use crate::error::{ConfigError, ExportError, ExportStage};
use crate::notify::{EXPORT_FAILED_ALERT, LogNotifier, Notifier};
use crate::render::DocumentComposer;
use crate::report::ExportRequest;
use crate::sink::DownloadSink;
use futures::future::try_join_all;
use kolreport_render_core::RenderError;
use kolreport_traits::{ResourceProvider, SectionCapturer};
use kolreport_types::Snapshot;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

const STATE_CHANNEL_CAPACITY: usize = 32;

/// Where an export currently is. Everything but `Idle` counts as busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExportState {
    Idle = 0,
    Loading = 1,
    Capturing = 2,
    Composing = 3,
    Serializing = 4,
    Failed = 5,
}

impl ExportState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ExportState::Loading,
            2 => ExportState::Capturing,
            3 => ExportState::Composing,
            4 => ExportState::Serializing,
            5 => ExportState::Failed,
            _ => ExportState::Idle,
        }
    }

    pub fn is_busy(self) -> bool {
        self != ExportState::Idle
    }
}

impl fmt::Display for ExportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportState::Idle => "IDLE",
            ExportState::Loading => "LOADING",
            ExportState::Capturing => "CAPTURING",
            ExportState::Composing => "COMPOSING",
            ExportState::Serializing => "SERIALIZING",
            ExportState::Failed => "FAILED",
        })
    }
}

/// What a successful export produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub file_name: String,
    pub page_count: usize,
    pub bytes: usize,
    pub location: String,
}

struct StateCell {
    current: AtomicU8,
    events: broadcast::Sender<ExportState>,
}

impl StateCell {
    fn get(&self) -> ExportState {
        ExportState::from_u8(self.current.load(Ordering::SeqCst))
    }

    fn set(&self, state: ExportState) {
        self.current.store(state as u8, Ordering::SeqCst);
        log::debug!("Export state -> {state}");
        // No subscribers is fine.
        let _ = self.events.send(state);
    }

    /// Moves from `Idle` to `Loading` atomically; `false` if an export holds
    /// the state.
    fn try_acquire(&self) -> bool {
        let acquired = self
            .current
            .compare_exchange(
                ExportState::Idle as u8,
                ExportState::Loading as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok();
        if acquired {
            log::debug!("Export state -> {}", ExportState::Loading);
            let _ = self.events.send(ExportState::Loading);
        }
        acquired
    }
}

/// Returns the state to `Idle` on every exit path, including panics and
/// dropped futures.
struct BusyGuard<'a>(&'a StateCell);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(ExportState::Idle);
    }
}

pub struct ExportOrchestrator {
    config: ExportConfig,
    assets: AssetLoader,
    capturer: Arc<dyn SectionCapturer>,
    sink: Arc<dyn DownloadSink>,
    notifier: Arc<dyn Notifier>,
    composer: DocumentComposer,
    state: Arc<StateCell>,
}

impl ExportOrchestrator {
    pub fn builder() -> ExportOrchestratorBuilder {
        ExportOrchestratorBuilder::default()
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn state(&self) -> ExportState {
        self.state.get()
    }

    pub fn is_busy(&self) -> bool {
        self.state().is_busy()
    }

    /// Every state transition from now on, in order.
    pub fn subscribe(&self) -> broadcast::Receiver<ExportState> {
        self.state.events.subscribe()
    }

    /// Runs one export. A call made while another export is running returns
    /// [`ExportError::Busy`] and leaves that export untouched. Any other
    /// failure raises exactly one alert and saves nothing.
    pub async fn run_export(&self, request: ExportRequest) -> Result<ExportSummary, ExportError> {
        if !self.state.try_acquire() {
            log::warn!("Export of '{}' rejected: another export is running", request.file_name);
            return Err(ExportError::Busy);
        }
        let _guard = BusyGuard(&self.state);

        log::info!(
            "Exporting {} report '{}' ({} rows, {} sections) to '{}'",
            request.kind(),
            request.title,
            request.data.row_count(),
            request.sections.len(),
            request.file_name
        );

        let title = request.title.clone();
        let file_name = request.file_name.clone();
        match self.execute(request).await {
            Ok(summary) => {
                log::info!(
                    "Exported '{}': {} pages, {} bytes at {}",
                    summary.file_name,
                    summary.page_count,
                    summary.bytes,
                    summary.location
                );
                Ok(summary)
            }
            Err(err) => {
                self.state.set(ExportState::Failed);
                log::error!("Export of '{title}' to '{file_name}' failed: {}", error_chain(&err));
                self.notifier.alert(EXPORT_FAILED_ALERT);
                Err(err)
            }
        }
    }

    async fn execute(&self, request: ExportRequest) -> Result<ExportSummary, ExportError> {
        let asset = with_deadline(
            ExportStage::Asset,
            self.config.asset_timeout(),
            self.assets.load(&request.asset_source),
        )
        .await?;

        self.state.set(ExportState::Capturing);
        let snapshots = with_deadline(
            ExportStage::Capture,
            self.config.capture_timeout(),
            self.capture_all(&request),
        )
        .await?;

        self.state.set(ExportState::Composing);
        let pages = request.page_specs(snapshots, self.config.table_margins());
        let composer = self.composer.clone();
        let state = Arc::clone(&self.state);
        let title = request.title.clone();
        let (page_count, bytes) = tokio::task::spawn_blocking(move || -> Result<_, RenderError> {
            let document = composer.compose(&title, &pages, &asset)?;
            let page_count = document.page_count();
            state.set(ExportState::Serializing);
            Ok((page_count, document.serialize()?))
        })
        .await
        .map_err(|e| ExportError::Serialization(RenderError::Other(e.to_string())))??;
        let size = bytes.len();

        let location = self
            .sink
            .save(&request.file_name, bytes)
            .await
            .map_err(|source| ExportError::Delivery { file_name: request.file_name.clone(), source })?;

        Ok(ExportSummary { file_name: request.file_name, page_count, bytes: size, location })
    }

    /// Captures every section concurrently; the first failure wins.
    async fn capture_all(&self, request: &ExportRequest) -> Result<Vec<Snapshot>, ExportError> {
        let width = self.config.capture_width_px;
        let captures = request.sections.iter().map(|section| async move {
            let snapshot = self.capturer.capture(section, width).await?;
            log::debug!(
                "Captured section '{section}' at {}x{} px",
                snapshot.pixel_width(),
                snapshot.pixel_height()
            );
            Ok::<_, ExportError>(snapshot)
        });
        try_join_all(captures).await
    }
}

async fn with_deadline<T, F>(stage: ExportStage, limit: Option<Duration>, fut: F) -> Result<T, ExportError>
where
    F: Future<Output = Result<T, ExportError>>,
{
    match limit {
        None => fut.await,
        Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| ExportError::Timeout {
            stage,
            after_ms: whole_millis(limit),
        })?,
    }
}

fn whole_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

/// Assembles an [`ExportOrchestrator`]. Provider, capturer and sink are
/// required; the notifier defaults to [`LogNotifier`].
#[derive(Default)]
pub struct ExportOrchestratorBuilder {
    config: Option<ExportConfig>,
    provider: Option<Arc<dyn ResourceProvider>>,
    capturer: Option<Arc<dyn SectionCapturer>>,
    sink: Option<Arc<dyn DownloadSink>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl ExportOrchestratorBuilder {
    pub fn with_config(mut self, config: ExportConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_resource_provider(mut self, provider: Arc<dyn ResourceProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_capturer(mut self, capturer: Arc<dyn SectionCapturer>) -> Self {
        self.capturer = Some(capturer);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn DownloadSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn build(self) -> Result<ExportOrchestrator, ExportError> {
        let missing = |what: &str| ExportError::Config(ConfigError::Invalid(format!("{what} is required")));

        let config = self.config.unwrap_or_default();
        config.validate()?;
        let provider = self.provider.ok_or_else(|| missing("a resource provider"))?;
        let capturer = self.capturer.ok_or_else(|| missing("a section capturer"))?;
        let sink = self.sink.ok_or_else(|| missing("a download sink"))?;
        let notifier = self.notifier.unwrap_or_else(|| Arc::new(LogNotifier));

        let (events, _) = broadcast::channel(STATE_CHANNEL_CAPACITY);
        Ok(ExportOrchestrator {
            composer: DocumentComposer::new(config.clone()),
            config,
            assets: AssetLoader::new(provider),
            capturer,
            sink,
            notifier,
            state: Arc::new(StateCell { current: AtomicU8::new(ExportState::Idle as u8), events }),
        })
    }
}
