//! Submission records and their persistence.
//!
//! A [`Submission`] is one student's complete attempt, written once on
//! submit and never changed afterwards. Records are kept newest first behind
//! the [`SubmissionStore`] load/save interface; every mutation through
//! [`SubmissionLog`] is a full read-modify-write of the list.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::exercise::Allocation;

/// Tutor filter value meaning "every tutor".
pub const ALL_TUTORS: &str = "All";

/// Who submitted the attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tutor: String,
}

/// Part C decision-making framework answers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartC {
    #[serde(default)]
    pub aims: String,
    #[serde(default)]
    pub benefits: String,
    #[serde(default)]
    pub costs: String,
    #[serde(default)]
    pub decision_rule: String,
    #[serde(default)]
    pub evaluate: String,
}

/// Opportunity-cost reflection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityCost {
    #[serde(default)]
    pub choose_more: String,
    #[serde(default)]
    pub give_up: String,
    #[serde(default)]
    pub explain: String,
}

/// Everything the student filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answers {
    #[serde(default)]
    pub user_info: UserInfo,
    #[serde(default)]
    pub group_role: String,
    #[serde(default)]
    pub part_a_response: String,
    #[serde(default)]
    pub allocation: Allocation,
    #[serde(default)]
    pub part_c: PartC,
    #[serde(default)]
    pub opportunity_cost: OpportunityCost,
    #[serde(default)]
    pub checklist: BTreeMap<String, bool>,
    #[serde(default)]
    pub food_for_thought: BTreeMap<String, String>,
}

/// A persisted attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(flatten)]
    pub answers: Answers,
}

impl Submission {
    pub fn tutor(&self) -> &str {
        &self.answers.user_info.tutor
    }

    pub fn student_name(&self) -> &str {
        &self.answers.user_info.name
    }
}

/// Errors raised by [`SubmissionLog`].
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// Name or tutor is blank.
    #[error("Please complete your profile (Name and Tutor) before submitting.")]
    IncompleteProfile,

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

/// Key → serialized record list. Any backend that can load and save the
/// whole list satisfies it.
pub trait SubmissionStore: Send + Sync {
    /// Load all records, newest first. A store with nothing saved is empty.
    fn load(&self) -> Result<Vec<Submission>>;

    /// Replace the stored list.
    fn save(&self, submissions: &[Submission]) -> Result<()>;

    /// Remove everything.
    fn clear(&self) -> Result<()>;
}

/// Stores the list as a pretty-printed JSON array in one file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SubmissionStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Submission>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read submissions from {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse submissions in {}", self.path.display()))
    }

    fn save(&self, submissions: &[Submission]) -> Result<()> {
        let json =
            serde_json::to_string_pretty(submissions).context("failed to serialize submissions")?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write submissions to {}", self.path.display()))
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }
}

/// In-process store, handy for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<Submission>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubmissionStore for MemoryStore {
    fn load(&self) -> Result<Vec<Submission>> {
        let records = self
            .records
            .lock()
            .map_err(|_| anyhow::anyhow!("submission store lock poisoned"))?;
        Ok(records.clone())
    }

    fn save(&self, submissions: &[Submission]) -> Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| anyhow::anyhow!("submission store lock poisoned"))?;
        *records = submissions.to_vec();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.save(&[])
    }
}

// ---------------------------------------------------------------------------
// Log
// ---------------------------------------------------------------------------

/// Submission operations over a store.
pub struct SubmissionLog<S> {
    store: S,
}

impl<S: SubmissionStore> SubmissionLog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// All records, newest first.
    pub fn list(&self) -> Result<Vec<Submission>> {
        self.store.load()
    }

    /// Records for one tutor. `None` or `"All"` returns everything.
    pub fn list_for_tutor(&self, tutor: Option<&str>) -> Result<Vec<Submission>> {
        let records = self.store.load()?;
        Ok(match tutor {
            None => records,
            Some(t) if t == ALL_TUTORS => records,
            Some(t) => records.into_iter().filter(|s| s.tutor() == t).collect(),
        })
    }

    pub fn get(&self, id: &str) -> Result<Option<Submission>> {
        Ok(self.store.load()?.into_iter().find(|s| s.id == id))
    }

    /// Persist a new attempt at the front of the list.
    pub fn submit(&self, answers: Answers) -> Result<Submission, SubmissionError> {
        if answers.user_info.name.trim().is_empty() || answers.user_info.tutor.trim().is_empty() {
            return Err(SubmissionError::IncompleteProfile);
        }

        let submission = Submission {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            answers,
        };

        let mut records = self.store.load()?;
        records.insert(0, submission.clone());
        self.store.save(&records)?;

        info!(id = %submission.id, tutor = %submission.tutor(), "submission saved");
        Ok(submission)
    }

    /// Delete one record. Returns `false` if no record had that id.
    pub fn delete(&self, id: &str) -> Result<bool, SubmissionError> {
        let mut records = self.store.load()?;
        let before = records.len();
        records.retain(|s| s.id != id);
        if records.len() == before {
            debug!(%id, "no submission to delete");
            return Ok(false);
        }
        self.store.save(&records)?;
        info!(%id, "submission deleted");
        Ok(true)
    }

    /// Delete every record.
    pub fn clear(&self) -> Result<(), SubmissionError> {
        self.store.clear()?;
        info!("all submissions cleared");
        Ok(())
    }
}
