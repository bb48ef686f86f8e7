//! C5 — Audit Log.
//!
//! Grounded in the shape of `orchagent`'s audit record/category split,
//! trimmed down to this crate's own fields; that file's NIST-control
//! framing is not carried over, only the append-only/self-describing-line
//! structure.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use cmdforge_core::error::AppError;
use cmdforge_core::error::AppResult;
use cmdforge_core::error::ErrorKind;
use cmdforge_core::model::AuditEntry;
use cmdforge_core::model::AuditFilter;
use cmdforge_core::traits::AuditLog;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::sync::Mutex;
use tracing::instrument;
use tracing::warn;

const COMPONENT: &str = "cmdforge-audit";

#[cfg(unix)]
fn restrict_permissions(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

fn io_error(operation: &'static str, err: std::io::Error) -> AppError {
    AppError::new(ErrorKind::Internal, COMPONENT, operation, "audit log I/O failed").with_cause(err)
}

/// Append-only NDJSON audit log. One [`AuditEntry`] per line; appends are
/// serialized behind a mutex so concurrent writers never interleave
/// partial lines.
pub struct FileAuditLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileAuditLog {
    pub fn new(path: PathBuf) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_error("new", e))?;
            restrict_permissions(parent, 0o750).map_err(|e| io_error("new", e))?;
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }
}

#[async_trait]
impl AuditLog for FileAuditLog {
    #[instrument(skip(self, entry))]
    async fn append(&self, entry: AuditEntry) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut line = serde_json::to_vec(&entry)
            .map_err(|e| AppError::new(ErrorKind::Internal, COMPONENT, "append", "could not serialize audit entry").with_cause(e))?;
        line.push(b'\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| io_error("append", e))?;
        file.write_all(&line).await.map_err(|e| io_error("append", e))?;
        file.flush().await.map_err(|e| io_error("append", e))?;
        drop(file);

        restrict_permissions(&self.path, 0o640).map_err(|e| io_error("append", e))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn read(&self, filter: &AuditFilter) -> AppResult<Vec<AuditEntry>> {
        let file = match tokio::fs::File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("read", e)),
        };

        let mut lines = BufReader::new(file).lines();
        let mut entries = Vec::new();
        while let Some(line) = lines.next_line().await.map_err(|e| io_error("read", e))? {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AuditEntry>(&line) {
                Ok(entry) if filter.matches(&entry) => entries.push(entry),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "skipping malformed audit log line"),
            }
        }
        Ok(entries)
    }
}

/// Discards everything. Used in tests and anywhere an `AuditLog` handle
/// is required but decisions don't need to be durable.
#[derive(Debug, Default)]
pub struct NoopAuditLog;

#[async_trait]
impl AuditLog for NoopAuditLog {
    async fn append(&self, _entry: AuditEntry) -> AppResult<()> {
        Ok(())
    }

    async fn read(&self, _filter: &AuditFilter) -> AppResult<Vec<AuditEntry>> {
        Ok(Vec::new())
    }
}

/// Convenience constructor mirroring `Arc<dyn AuditLog>`, the shape every
/// other crate's trait object field expects.
pub fn noop() -> Arc<dyn AuditLog> {
    Arc::new(NoopAuditLog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdforge_core::model::AuditAction;
    use cmdforge_core::model::DangerLevel;
    use chrono::Utc;

    fn sample(command: &str, action: AuditAction) -> AuditEntry {
        AuditEntry {
            timestamp: Utc::now(),
            command: command.to_string(),
            user_id: "alice".to_string(),
            session_id: "s1".to_string(),
            action,
            danger_level: DangerLevel::Safe,
            reason: "test".to_string(),
        }
    }

    #[tokio::test]
    async fn append_then_read_round_trips_in_write_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = FileAuditLog::new(dir.path().join("audit.log")).unwrap();

        log.append(sample("echo a", AuditAction::Validated)).await.unwrap();
        log.append(sample("echo b", AuditAction::Executed)).await.unwrap();

        let entries = log.read(&AuditFilter::default()).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].command, "echo a");
        assert_eq!(entries[1].command, "echo b");
    }

    #[tokio::test]
    async fn malformed_lines_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.log");
        let log = FileAuditLog::new(path.clone()).unwrap();
        log.append(sample("echo a", AuditAction::Validated)).await.unwrap();

        let mut file = tokio::fs::OpenOptions::new().append(true).open(&path).await.unwrap();
        file.write_all(b"not json at all\n").await.unwrap();
        file.flush().await.unwrap();

        let entries = log.read(&AuditFilter::default()).await.unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn read_on_missing_file_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = FileAuditLog::new(dir.path().join("nested/audit.log")).unwrap();
        let entries = log.read(&AuditFilter::default()).await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn noop_never_records_anything() {
        let log = NoopAuditLog;
        log.append(sample("echo a", AuditAction::Validated)).await.unwrap();
        assert!(log.read(&AuditFilter::default()).await.unwrap().is_empty());
    }
}
