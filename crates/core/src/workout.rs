//! Client-side workout plan.
//!
//! The plan is a list of exercises with set/rep counts, persisted as a single
//! JSON array under [`STORAGE_KEY`]. Storage is injected through
//! [`PlanStorage`] so the same logic runs against browser-style key/value
//! storage, a JSON file on disk, or memory in tests.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Key the serialized plan is stored under.
pub const STORAGE_KEY: &str = "gym-ar-workout-plan";

pub const DEFAULT_SETS: u32 = 3;
pub const DEFAULT_REPS: u32 = 12;

#[derive(Debug, thiserror::Error)]
pub enum WorkoutError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Plan serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Key/value storage the plan is persisted to.
pub trait PlanStorage {
    fn load(&self, key: &str) -> Result<Option<String>, WorkoutError>;
    fn save(&mut self, key: &str, value: &str) -> Result<(), WorkoutError>;
    fn remove(&mut self, key: &str) -> Result<(), WorkoutError>;
}

/// In-memory storage.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

impl PlanStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, WorkoutError> {
        Ok(self.values.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), WorkoutError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), WorkoutError> {
        self.values.remove(key);
        Ok(())
    }
}

/// Stores each key as `{dir}/{key}.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl PlanStorage for JsonFileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, WorkoutError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), WorkoutError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), WorkoutError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// The catalog fields copied into a plan entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanExercise {
    pub id: DbId,
    #[serde(alias = "title")]
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// One exercise in the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutEntry {
    #[serde(flatten)]
    pub exercise: PlanExercise,
    #[serde(default = "default_sets")]
    pub sets: u32,
    #[serde(default = "default_reps")]
    pub reps: u32,
    /// Milliseconds since the Unix epoch.
    pub added_at: i64,
}

fn default_sets() -> u32 {
    DEFAULT_SETS
}

fn default_reps() -> u32 {
    DEFAULT_REPS
}

/// Result of [`WorkoutPlan::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

/// A workout plan bound to its storage.
///
/// Entries are unique by exercise id. Every mutation is written through to
/// storage immediately; an empty plan removes the key instead of storing `[]`.
#[derive(Debug)]
pub struct WorkoutPlan<S: PlanStorage> {
    storage: S,
    entries: Vec<WorkoutEntry>,
}

impl<S: PlanStorage> WorkoutPlan<S> {
    /// Load the plan from storage.
    ///
    /// Stored data that is not a JSON array of entries is discarded (and the
    /// key removed) so a corrupt value never blocks the user.
    pub fn load(mut storage: S) -> Result<Self, WorkoutError> {
        let entries = match storage.load(STORAGE_KEY)? {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<WorkoutEntry>>(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(error = %e, key = STORAGE_KEY, "Discarding unreadable workout plan");
                    storage.remove(STORAGE_KEY)?;
                    Vec::new()
                }
            },
        };
        Ok(Self { storage, entries })
    }

    /// Add an exercise with the default 3 x 12 prescription.
    pub fn add(&mut self, exercise: PlanExercise) -> Result<AddOutcome, WorkoutError> {
        self.add_with(exercise, DEFAULT_SETS, DEFAULT_REPS)
    }

    /// Add an exercise unless one with the same id is already in the plan.
    pub fn add_with(
        &mut self,
        exercise: PlanExercise,
        sets: u32,
        reps: u32,
    ) -> Result<AddOutcome, WorkoutError> {
        if self.is_selected(exercise.id) {
            return Ok(AddOutcome::AlreadyPresent);
        }
        tracing::debug!(exercise_id = exercise.id, sets, reps, "Adding exercise to plan");
        let mut next = self.entries.clone();
        next.push(WorkoutEntry {
            exercise,
            sets,
            reps,
            added_at: chrono::Utc::now().timestamp_millis(),
        });
        self.commit(next)?;
        Ok(AddOutcome::Added)
    }

    /// Remove an exercise, returning the removed entry if it was present.
    pub fn remove(&mut self, exercise_id: DbId) -> Result<Option<WorkoutEntry>, WorkoutError> {
        let Some(index) = self
            .entries
            .iter()
            .position(|e| e.exercise.id == exercise_id)
        else {
            return Ok(None);
        };
        let mut next = self.entries.clone();
        let removed = next.remove(index);
        self.commit(next)?;
        Ok(Some(removed))
    }

    /// Change the set and/or rep count of an entry. Returns `false` if absent.
    pub fn update(
        &mut self,
        exercise_id: DbId,
        sets: Option<u32>,
        reps: Option<u32>,
    ) -> Result<bool, WorkoutError> {
        let mut next = self.entries.clone();
        let Some(entry) = next.iter_mut().find(|e| e.exercise.id == exercise_id) else {
            return Ok(false);
        };
        if let Some(sets) = sets {
            entry.sets = sets;
        }
        if let Some(reps) = reps {
            entry.reps = reps;
        }
        self.commit(next)?;
        Ok(true)
    }

    /// Remove every entry. Returns how many were removed.
    pub fn clear(&mut self) -> Result<usize, WorkoutError> {
        let removed = self.entries.len();
        self.commit(Vec::new())?;
        Ok(removed)
    }

    pub fn is_selected(&self, exercise_id: DbId) -> bool {
        self.entries.iter().any(|e| e.exercise.id == exercise_id)
    }

    pub fn entries(&self) -> &[WorkoutEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Release the underlying storage.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Write `next` to storage, then adopt it. On failure the plan keeps
    /// its previous entries so it still matches what storage holds.
    fn commit(&mut self, next: Vec<WorkoutEntry>) -> Result<(), WorkoutError> {
        if next.is_empty() {
            self.storage.remove(STORAGE_KEY)?;
        } else {
            let json = serde_json::to_string(&next)?;
            self.storage.save(STORAGE_KEY, &json)?;
        }
        self.entries = next;
        Ok(())
    }
}
