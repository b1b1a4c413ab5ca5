use super::{AuditEvent, AuditObserver, AuditObserverError};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Appends one JSON line per event to a file, serialized under a
/// per-instance mutex so concurrent ingests don't interleave writes
///.
pub struct FileAuditObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileAuditObserver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl AuditObserver for FileAuditObserver {
    async fn notify(&self, event: &AuditEvent) -> Result<(), AuditObserverError> {
        let _guard = self.lock.lock().await;

        let mut line = serde_json::to_string(event).expect("AuditEvent serialization cannot fail");
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(AuditObserverError::File)?;

        file.write_all(line.as_bytes())
            .await
            .map_err(AuditObserverError::File)
    }
}

#[cfg(test)]
#[path = "file_observer_tests.rs"]
mod tests;
