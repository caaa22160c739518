use async_trait::async_trait;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Where a finished document is handed to the user.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Store `bytes` under `file_name` and return where it ended up.
    async fn save(&self, file_name: &str, bytes: Vec<u8>) -> io::Result<String>;
}

/// Writes documents into a directory. The file only appears once it is
/// complete.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    base_path: PathBuf,
}

impl DirectorySink {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self { base_path: base_path.as_ref().to_path_buf() }
    }

    pub fn base(&self) -> &Path {
        &self.base_path
    }

    /// Accepts only a bare file name; anything that would leave the base
    /// directory is rejected.
    fn target(&self, file_name: &str) -> io::Result<PathBuf> {
        let mut components = Path::new(file_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Ok(self.base_path.join(name)),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{file_name}' is not a plain file name"),
            )),
        }
    }
}

#[async_trait]
impl DownloadSink for DirectorySink {
    async fn save(&self, file_name: &str, bytes: Vec<u8>) -> io::Result<String> {
        let target = self.target(file_name)?;
        let base = self.base_path.clone();

        tokio::task::spawn_blocking(move || -> io::Result<String> {
            std::fs::create_dir_all(&base)?;
            let mut tmp = tempfile::NamedTempFile::new_in(&base)?;
            tmp.write_all(&bytes)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&target).map_err(|e| e.error)?;
            Ok(target.display().to_string())
        })
        .await
        .map_err(io::Error::other)?
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Keeps saved documents in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    saved: Arc<Mutex<Vec<SavedDocument>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> Vec<SavedDocument> {
        match self.saved.lock() {
            Ok(saved) => saved.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.saved().is_empty()
    }
}

#[async_trait]
impl DownloadSink for MemorySink {
    async fn save(&self, file_name: &str, bytes: Vec<u8>) -> io::Result<String> {
        let doc = SavedDocument { file_name: file_name.to_string(), bytes };
        match self.saved.lock() {
            Ok(mut saved) => saved.push(doc),
            Err(poisoned) => poisoned.into_inner().push(doc),
        }
        Ok(format!("memory://{file_name}"))
    }
}
