//! Bounded undo/redo history of routine snapshots.
//!
//! Each entry is a structurally independent deep copy of the routine at the
//! moment a mutation was accepted. Later mutation of the live routine can
//! never retroactively alter a stored entry; the model holds no back-
//! references, so a plain `clone` is a full snapshot.

use crate::types::Routine;
use crate::{Error, Result};

/// One recorded edit: the routine after the edit, plus a short label
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    pub snapshot: Routine,
    pub description: String,
}

/// Bounded undo/redo/restore stack of routine snapshots
///
/// Holds an ordered list of entries plus a pointer at the current one. The
/// baseline occupies slot 0 on construction, so `can_undo` is false until
/// the first recorded mutation.
#[derive(Clone, Debug)]
pub struct EditHistory {
    entries: Vec<HistoryEntry>,
    pointer: usize,
    max_entries: usize,
}

impl EditHistory {
    /// Start a history at the given baseline
    pub fn new(baseline: Routine, max_entries: usize) -> Self {
        Self {
            entries: vec![HistoryEntry {
                snapshot: baseline,
                description: "initial".into(),
            }],
            pointer: 0,
            // A zero cap would evict the entry just recorded
            max_entries: max_entries.max(2),
        }
    }

    /// Record an accepted mutation.
    ///
    /// If the pointer is not at the end, the stale redo branch is discarded
    /// first. When the list exceeds capacity the oldest entry is evicted and
    /// the pointer compensates.
    pub fn record(&mut self, snapshot: Routine, description: impl Into<String>) {
        self.entries.truncate(self.pointer + 1);
        self.entries.push(HistoryEntry {
            snapshot,
            description: description.into(),
        });
        self.pointer += 1;

        if self.entries.len() > self.max_entries {
            self.entries.remove(0);
            self.pointer -= 1;
        }
    }

    /// Step back one edit and return the snapshot to replay.
    ///
    /// The caller replaces the live routine with this snapshot without
    /// recording again.
    pub fn undo(&mut self) -> Result<&Routine> {
        if !self.can_undo() {
            return Err(Error::HistoryBounds { op: "undo" });
        }
        self.pointer -= 1;
        tracing::debug!(
            "Undo to '{}' ({}/{})",
            self.entries[self.pointer].description,
            self.pointer + 1,
            self.entries.len()
        );
        Ok(&self.entries[self.pointer].snapshot)
    }

    /// Step forward one edit and return the snapshot to replay
    pub fn redo(&mut self) -> Result<&Routine> {
        if !self.can_redo() {
            return Err(Error::HistoryBounds { op: "redo" });
        }
        self.pointer += 1;
        tracing::debug!(
            "Redo to '{}' ({}/{})",
            self.entries[self.pointer].description,
            self.pointer + 1,
            self.entries.len()
        );
        Ok(&self.entries[self.pointer].snapshot)
    }

    /// Reset to a single baseline entry, discarding all other history
    pub fn restore_original(&mut self, baseline: Routine) {
        self.entries = vec![HistoryEntry {
            snapshot: baseline,
            description: "initial".into(),
        }];
        self.pointer = 0;
    }

    pub fn can_undo(&self) -> bool {
        self.pointer > 0
    }

    pub fn can_redo(&self) -> bool {
        self.pointer + 1 < self.entries.len()
    }

    /// The snapshot at the pointer
    pub fn current(&self) -> &Routine {
        &self.entries[self.pointer].snapshot
    }

    /// Label of the entry at the pointer
    pub fn current_description(&self) -> &str {
        &self.entries[self.pointer].description
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
