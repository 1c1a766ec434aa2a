//! Persisted crop growth records.
//!
//! Each successful growth analysis produces a [`GrowthRecord`] that is
//! prepended to a JSON array stored under a fixed path (most recent
//! first). Records are never updated or deleted.

use crate::error::{AdvisoryError, Result};
use crate::gateway::types::GrowthAnalysis;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// One documented growth observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthRecord {
    pub id: String,
    /// Local date of the observation, `YYYY-MM-DD`.
    pub date: String,
    /// The analyzed photo, base64 JPEG.
    pub image: String,
    pub crop_type: String,
    pub stage: String,
    /// Flattened analysis summary.
    pub analysis: String,
}

/// Append-only growth record log backed by a JSON file.
#[derive(Debug)]
pub struct GrowthLog {
    path: PathBuf,
    records: Vec<GrowthRecord>,
}

impl GrowthLog {
    /// Load the log from the default data path.
    #[must_use]
    pub fn load_default() -> Self {
        Self::load(crate::app_dirs::growth_log_path())
    }

    /// Load the log from `path`. A missing or unparsable file yields an
    /// empty log (the file is rewritten on the next record).
    #[must_use]
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("discarding unparsable growth log {}: {e}", path.display());
                Vec::new()
            }),
            Err(_) => Vec::new(),
        };
        Self { path, records }
    }

    /// Records, most recent first.
    #[must_use]
    pub fn records(&self) -> &[GrowthRecord] {
        &self.records
    }

    /// Record a new analysis: build the record, prepend it, persist the
    /// whole list.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be written.
    pub fn record(
        &mut self,
        analysis: &GrowthAnalysis,
        image: &str,
        crop_type: &str,
    ) -> Result<&GrowthRecord> {
        let record = GrowthRecord {
            id: uuid::Uuid::new_v4().to_string(),
            date: chrono::Local::now().format("%Y-%m-%d").to_string(),
            image: image.to_owned(),
            crop_type: crop_type.to_owned(),
            stage: analysis.stage.clone(),
            analysis: format!(
                "{}. {}. Next steps: {}",
                analysis.health, analysis.analysis, analysis.next_steps
            ),
        };
        self.records.insert(0, record);
        self.persist()?;
        Ok(&self.records[0])
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AdvisoryError::Growth(format!("failed to create data dir: {e}")))?;
        }
        let body = serde_json::to_string(&self.records)
            .map_err(|e| AdvisoryError::Growth(format!("failed to serialize records: {e}")))?;
        std::fs::write(&self.path, body).map_err(|e| {
            AdvisoryError::Growth(format!("failed to write {}: {e}", self.path.display()))
        })
    }
}
