//! Line-delimited JSON output for the valid and failed streams.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::errors::AppError;
use crate::models::assessment::{FailureRecord, ScoredRecord};

const JSONL_SUFFIX: &str = ".jsonl";
const FAILED_SUFFIX: &str = "_failed.jsonl";

/// Writes one JSON document per line and flushes after every record.
pub struct JsonlWriter<W: Write> {
    inner: W,
}

impl<W: Write> JsonlWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn write_record<T: Serialize>(&mut self, record: &T) -> Result<(), AppError> {
        serde_json::to_writer(&mut self.inner, record)?;
        self.inner.write_all(b"\n")?;
        self.inner.flush()?;
        Ok(())
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// The two output streams of a batch run. Each post goes to exactly one of them.
pub struct AssessmentSink<V: Write, F: Write> {
    valid: JsonlWriter<V>,
    failed: JsonlWriter<F>,
}

impl<V: Write, F: Write> AssessmentSink<V, F> {
    pub fn new(valid: V, failed: F) -> Self {
        Self {
            valid: JsonlWriter::new(valid),
            failed: JsonlWriter::new(failed),
        }
    }

    pub fn write_valid(&mut self, record: &ScoredRecord) -> Result<(), AppError> {
        self.valid.write_record(record)
    }

    pub fn write_failed(&mut self, record: &FailureRecord) -> Result<(), AppError> {
        self.failed.write_record(record)
    }

    #[cfg(test)]
    pub fn into_inner(self) -> (V, F) {
        (self.valid.into_inner(), self.failed.into_inner())
    }
}

impl AssessmentSink<BufWriter<File>, BufWriter<File>> {
    /// Creates (truncating) both output files, making parent directories as needed.
    /// Both streams must be distinct files; two handles on one file clobber each other.
    pub fn create(valid_path: &Path, failed_path: &Path) -> Result<Self, AppError> {
        if resolve(valid_path) == resolve(failed_path) {
            return Err(AppError::InvalidArgument(format!(
                "valid and failed outputs both point at {}",
                valid_path.display()
            )));
        }
        Ok(Self::new(
            BufWriter::new(create_file(valid_path)?),
            BufWriter::new(create_file(failed_path)?),
        ))
    }
}

/// Best-effort canonical form of a path that may not exist yet.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    let parent = parent.map_or_else(|| fs::canonicalize("."), fs::canonicalize);
    match (parent, path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

fn create_file(path: &Path) -> Result<File, AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}

/// Default failed-stream path: `out/run.jsonl` → `out/run_failed.jsonl`.
/// Paths without a `.jsonl` extension get the suffix appended.
pub fn failed_path_for(valid_path: &Path) -> PathBuf {
    let name = valid_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.strip_suffix(JSONL_SUFFIX).unwrap_or(&name);
    valid_path.with_file_name(format!("{stem}{FAILED_SUFFIX}"))
}
