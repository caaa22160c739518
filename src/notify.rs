use std::sync::{Arc, Mutex};

/// The one message a user sees when an export fails; details go to the log.
pub const EXPORT_FAILED_ALERT: &str = "Export PDF failed. See log for details.";

/// Shows alert-level messages to the user.
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// Reports alerts through the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn alert(&self, message: &str) {
        log::warn!("{message}");
    }
}

/// Prints alerts on standard error.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn alert(&self, message: &str) {
        eprintln!("{message}");
    }
}

/// Collects alerts instead of showing them.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    alerts: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<String> {
        match self.alerts.lock() {
            Ok(alerts) => alerts.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        match self.alerts.lock() {
            Ok(mut alerts) => alerts.push(message.to_string()),
            Err(poisoned) => poisoned.into_inner().push(message.to_string()),
        }
    }
}
