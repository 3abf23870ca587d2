//! CSV result recorder
//!
//! Writes one row per successful backtest to the batch results file.

use crate::domain::errors::RecordError;
use crate::domain::ports::ResultRecorder;
use crate::domain::record::{RECORD_SCHEMA_VERSION, RESULT_COLUMNS, ResultRecord};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

pub struct CsvResultRecorder {
    path: PathBuf,
    /// Serializes appends; each row is flushed before the lock is released
    writer: Mutex<csv::Writer<File>>,
}

impl CsvResultRecorder {
    /// Starts a fresh results file at `path`, replacing any previous run.
    pub fn create(path: &Path) -> Result<Self, RecordError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(RESULT_COLUMNS)?;
        writer.flush()?;

        info!(
            path = %path.display(),
            schema = RECORD_SCHEMA_VERSION,
            "Results file created"
        );

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(writer),
        })
    }
}

impl ResultRecorder for CsvResultRecorder {
    fn append(&self, record: &ResultRecord) -> Result<(), RecordError> {
        let mut writer = self.writer.lock().map_err(|e| RecordError::Unavailable {
            reason: e.to_string(),
        })?;
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Reads back every row of a results file.
pub fn read_records(path: &Path) -> Result<Vec<ResultRecord>, RecordError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}
