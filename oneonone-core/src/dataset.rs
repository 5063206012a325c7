//! Persisted recommendation records.
//!
//! `refresh-dataset` overwrites the whole dataset; `recommend` and
//! `next-one-on-one` read it. Access goes through `DatasetStore` so the
//! read/overwrite cycle can be swapped for an in-memory store.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::recommendation::{MeetingState, Recommendation};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub username: String,
    pub last_meeting: Option<NaiveDate>,
    pub recommended: NaiveDate,
}

impl RecommendationRecord {
    /// State as of `today`, which may be later than the refresh.
    pub fn state_on(&self, today: NaiveDate) -> MeetingState {
        match self.last_meeting {
            None => MeetingState::Overdue,
            Some(_) if today >= self.recommended => MeetingState::Overdue,
            Some(_) => MeetingState::OnTrack,
        }
    }

    pub fn to_recommendation(&self, today: NaiveDate) -> Recommendation {
        let state = self.state_on(today);
        Recommendation {
            username: self.username.clone(),
            last_meeting: self.last_meeting,
            recommended: match state {
                MeetingState::Overdue => self.recommended.min(today),
                MeetingState::OnTrack => self.recommended,
            },
            state,
        }
    }
}

impl From<&Recommendation> for RecommendationRecord {
    fn from(rec: &Recommendation) -> Self {
        RecommendationRecord {
            username: rec.username.clone(),
            last_meeting: rec.last_meeting,
            recommended: rec.recommended,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub generated_at: DateTime<Utc>,
    pub lookback_days: i64,
    pub cadence_days: i64,
    pub records: Vec<RecommendationRecord>,
}

impl Dataset {
    pub fn get(&self, username: &str) -> Option<&RecommendationRecord> {
        self.records.iter().find(|r| r.username == username)
    }
}

pub trait DatasetStore {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Dataset>>;

    /// Replace the stored dataset.
    fn save(&mut self, dataset: &Dataset) -> Result<()>;
}

/// Pretty JSON file, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DatasetStore for JsonFileStore {
    fn load(&self) -> Result<Option<Dataset>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let dataset = serde_json::from_str(&contents).map_err(|e| {
            Error::Dataset(format!("Failed to parse {}: {}", self.path.display(), e))
        })?;

        Ok(Some(dataset))
    }

    fn save(&mut self, dataset: &Dataset) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent)?;

        let contents = serde_json::to_string_pretty(dataset)
            .map_err(|e| Error::Dataset(format!("Failed to serialize dataset: {}", e)))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&parent)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::info!(
            path = %self.path.display(),
            records = dataset.records.len(),
            "Wrote dataset"
        );

        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    dataset: Option<Dataset>,
}

impl MemoryStore {
    pub fn with(dataset: Dataset) -> Self {
        MemoryStore {
            dataset: Some(dataset),
        }
    }
}

impl DatasetStore for MemoryStore {
    fn load(&self) -> Result<Option<Dataset>> {
        Ok(self.dataset.clone())
    }

    fn save(&mut self, dataset: &Dataset) -> Result<()> {
        self.dataset = Some(dataset.clone());
        Ok(())
    }
}
