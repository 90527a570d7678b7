use super::departments::DepartmentContact;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("record encode error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Structured complainer-side record, one JSON object per line in
/// `complainer_output.json`.
#[derive(Debug, Clone, Serialize)]
pub struct ComplainerRecord {
    pub departments_forwarded: Vec<String>,
    pub contact_details: BTreeMap<String, DepartmentContact>,
    pub suggestions: Vec<String>,
    pub timestamp: String,
    pub image_analysis: Option<String>,
}

/// Structured officer-side record, one JSON object per line in
/// `officer_output.json`.
#[derive(Debug, Clone, Serialize)]
pub struct OfficerRecord {
    pub timestamp: String,
    pub severity: u8,
    pub summary: String,
    pub original_text: String,
    pub location: String,
    pub departments: Vec<String>,
    pub image_analysis: Option<String>,
}

/// Append-only complaint ledger: human-readable `.txt` views plus JSON Lines
/// `.json` files, all four updated together under one lock so concurrent
/// complaints never interleave.
#[derive(Debug, Clone)]
pub struct RecordStore {
    dir: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl RecordStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn append(
        &self,
        complainer_view: &str,
        officer_view: &str,
        complainer: &ComplainerRecord,
        officer: &OfficerRecord,
    ) -> Result<(), RecordError> {
        let _guard = self.write_lock.lock().await;
        tokio::fs::create_dir_all(&self.dir).await?;
        // Views already end with a newline; one more gives a blank separator.
        append_text(&self.dir.join("complainer_output.txt"), &format!("{}\n", complainer_view))
            .await?;
        append_text(&self.dir.join("officer_output.txt"), &format!("{}\n", officer_view)).await?;
        append_text(
            &self.dir.join("complainer_output.json"),
            &format!("{}\n", serde_json::to_string(complainer)?),
        )
        .await?;
        append_text(
            &self.dir.join("officer_output.json"),
            &format!("{}\n", serde_json::to_string(officer)?),
        )
        .await?;
        Ok(())
    }
}

async fn append_text(path: &Path, contents: &str) -> Result<(), RecordError> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(contents.as_bytes()).await?;
    Ok(())
}
