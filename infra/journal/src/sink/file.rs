use crate::error::{JournalError, JournalErrorExt};
use crate::sink::ErrorLogSink;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use stride_domain::ErrorLogEntry;
use tracing::{debug, warn};

const FILE_EXTENSION: &str = "json";

/// Persists the journal as a pretty-printed JSON array in a single file named after the
/// storage key (`<dir>/<storage_key>.json`).
///
/// Writes go to a unique temporary file in the same directory which is then renamed over
/// the target and the directory is synced, so readers never observe a half-written journal.
/// All I/O is blocking; [`crate::ErrorJournal`] keeps it off async workers.
#[derive(Debug)]
pub struct JsonFileSink {
    path: PathBuf,
    tmp_counter: AtomicU64,
}

impl JsonFileSink {
    pub fn new(dir: impl AsRef<Path>, storage_key: &str) -> Self {
        Self::at(dir.as_ref().join(format!("{storage_key}.{FILE_EXTENSION}")))
    }

    /// Uses `path` verbatim as the journal file.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), tmp_counter: AtomicU64::new(0) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        self.path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."))
    }

    fn tmp_path(&self) -> PathBuf {
        let counter = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let file_name = self.path.file_name().and_then(|n| n.to_str()).unwrap_or("journal");
        self.path.with_file_name(format!("{file_name}.tmp.{}.{counter}", std::process::id()))
    }
}

impl ErrorLogSink for JsonFileSink {
    fn name(&self) -> &'static str {
        "json-file"
    }

    fn load(&self) -> Result<Vec<ErrorLogEntry>, JournalError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(JournalError::Io {
                    source: err,
                    context: Some(format!("Failed to read {}", self.path.display()).into()),
                });
            },
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str::<Vec<ErrorLogEntry>>(&raw)
            .context(format!("Corrupt journal file {}", self.path.display()))
    }

    fn store(&self, entries: &[ErrorLogEntry]) -> Result<(), JournalError> {
        let parent = self.parent_dir();
        fs::create_dir_all(parent)
            .context(format!("Failed to create journal directory {}", parent.display()))?;

        let json = serde_json::to_vec_pretty(entries).context("Failed to encode journal")?;
        let temp = self.tmp_path();

        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)
                .context(format!("Temp creation failed: {}", temp.display()))?;
            file.write_all(&json).context("Write failed")?;
            file.sync_all().context("Sync failed")?;
        }

        if let Err(err) = fs::rename(&temp, &self.path) {
            let _ = fs::remove_file(&temp);
            return Err(JournalError::Io {
                source: err,
                context: Some(
                    format!("Atomic swap failed: {} -> {}", temp.display(), self.path.display())
                        .into(),
                ),
            });
        }

        sync_dir(parent);

        debug!(path = %self.path.display(), entries = entries.len(), "Journal persisted");
        Ok(())
    }

    fn clear(&self) -> Result<(), JournalError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(JournalError::Io {
                source: err,
                context: Some(format!("Failed to remove {}", self.path.display()).into()),
            }),
        }
    }
}

/// Syncs `path` so a completed rename survives a crash. Failures are logged.
fn sync_dir(path: &Path) {
    match fs::File::open(path) {
        Ok(dir) => {
            if let Err(err) = dir.sync_all() {
                warn!(path = %path.display(), error = %err, "Directory sync failed");
            }
        },
        Err(err) => warn!(path = %path.display(), error = %err, "Directory open failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stride_domain::{EnrollmentError, ErrorCode};

    fn entry(id: &str) -> ErrorLogEntry {
        ErrorLogEntry {
            id: id.to_owned(),
            error: EnrollmentError::new(ErrorCode::ServerError, "500 from enroll endpoint"),
            step: "review".to_owned(),
            user_id: None,
            session_id: "sess_test".to_owned(),
            user_agent: "stride-tests".to_owned(),
            url: "/enroll/review".to_owned(),
        }
    }

    #[test]
    fn file_is_named_after_storage_key() {
        let sink = JsonFileSink::new("/var/lib/stride", "enrollment_error_logs");
        assert_eq!(sink.path(), Path::new("/var/lib/stride/enrollment_error_logs.json"));
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path(), "absent");
        assert!(sink.load().unwrap().is_empty());
        sink.clear().unwrap();
    }

    #[test]
    fn store_replaces_previous_contents_without_leaving_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path().join("nested"), "journal");

        sink.store(&[entry("a"), entry("b")]).unwrap();
        sink.store(&[entry("c")]).unwrap();

        let loaded = sink.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "c");

        let files: Vec<_> = fs::read_dir(dir.path().join("nested")).unwrap().flatten().collect();
        assert_eq!(files.len(), 1, "temporary files must be renamed away");
    }

    #[test]
    fn bare_file_name_is_written_next_to_the_working_directory() {
        let sink = JsonFileSink::at("journal.json");
        assert_eq!(sink.parent_dir(), Path::new("."));
    }

    #[test]
    fn corrupt_file_reports_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::new(dir.path(), "journal");
        fs::write(sink.path(), b"{ not json").unwrap();

        let err = sink.load().unwrap_err();
        assert_eq!(err.kind(), "Serialization");
    }
}
