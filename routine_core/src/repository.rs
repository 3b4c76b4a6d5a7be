//! Routine persistence with file locking.
//!
//! The engine only ever hands the repository a fully invariant-valid
//! snapshot; the repository assigns identity and timestamps on first save
//! and never inspects routine structure beyond that.
//!
//! Writes go through a temp file in the target directory, synced and
//! atomically renamed over the destination, with an exclusive lock
//! serializing concurrent writers. Reads take a shared lock.

use crate::types::Routine;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Persistence contract for routines
pub trait RoutineRepository {
    /// Fetch a routine by id; `Ok(None)` when it doesn't exist
    fn load(&self, id: Uuid) -> Result<Option<Routine>>;

    /// Persist a snapshot, assigning id and created_at on first save and
    /// bumping updated_at every time; returns the stored routine
    fn save(&self, routine: Routine) -> Result<Routine>;

    /// Summaries of every stored routine
    fn list(&self) -> Result<Vec<RoutineSummary>>;
}

/// Listing row for a stored routine
#[derive(Clone, Debug)]
pub struct RoutineSummary {
    pub id: Uuid,
    pub name: String,
    pub rest_day: bool,
    pub exercise_count: usize,
    pub updated_at: Option<DateTime<Utc>>,
}

/// One pretty-printed JSON file per routine under a data directory
pub struct JsonDirRepository {
    dir: PathBuf,
}

impl JsonDirRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    fn read_routine(path: &Path) -> Result<Routine> {
        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read = reader.read_to_string(&mut contents);
        file.unlock()?;
        read?;

        Ok(serde_json::from_str(&contents)?)
    }
}

impl RoutineRepository for JsonDirRepository {
    fn load(&self, id: Uuid) -> Result<Option<Routine>> {
        let path = self.path_for(id);
        if !path.exists() {
            tracing::debug!("No routine file at {:?}", path);
            return Ok(None);
        }
        let routine = Self::read_routine(&path)?;
        tracing::debug!("Loaded routine {} from {:?}", id, path);
        Ok(Some(routine))
    }

    fn save(&self, mut routine: Routine) -> Result<Routine> {
        std::fs::create_dir_all(&self.dir)?;

        let now = Utc::now();
        let id = match routine.id {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4();
                routine.id = Some(id);
                routine.created_at = Some(now);
                id
            }
        };
        routine.updated_at = Some(now);

        let path = self.path_for(id);
        let temp = NamedTempFile::new_in(&self.dir)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string_pretty(&routine)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved routine {} to {:?}", id, path);
        Ok(routine)
    }

    fn list(&self) -> Result<Vec<RoutineSummary>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut summaries = Vec::new();
        for dir_entry in std::fs::read_dir(&self.dir)? {
            let path = dir_entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read_routine(&path) {
                Ok(routine) => {
                    if let Some(id) = routine.id {
                        summaries.push(RoutineSummary {
                            id,
                            name: routine.name,
                            rest_day: routine.rest_day,
                            exercise_count: routine.entries.len(),
                            updated_at: routine.updated_at,
                        });
                    }
                }
                Err(e) => {
                    tracing::warn!("Skipping unreadable routine file {:?}: {}", path, e);
                    // Keep listing the others
                }
            }
        }

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }
}
