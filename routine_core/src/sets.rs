//! Ordered set collections.
//!
//! Every exercise entry owns a `SetCollection`: the ordered sequence of
//! metric-target sets it prescribes. A collection never goes below one set
//! through its own operations; the removal that would empty it is refused
//! with `Error::OrphanSet` so the caller can decide whether to drop the
//! whole exercise instead.

use crate::types::{MetricTarget, Set};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Ordered sequence of sets belonging to one exercise entry
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SetCollection(Vec<Set>);

impl SetCollection {
    /// Start a collection from its first set
    pub fn from_set(set: Set) -> Self {
        Self(vec![set])
    }

    /// Build `rounds` identical sets from one seed target list.
    ///
    /// Used when a group is formed: every member starts with the group's
    /// round count, seeded from its per-member targets.
    pub fn seeded(seed: &[MetricTarget], rounds: usize) -> Self {
        let set = Set::new(seed.to_vec());
        Self(vec![set; rounds.max(1)])
    }

    /// Append a set.
    ///
    /// With a template, the new set copies the template's targets. Without
    /// one, the last set is continued (the convenience continuation rule);
    /// an empty collection falls back to a blank set.
    pub fn append_set(&mut self, template: Option<&Set>) {
        let set = template
            .or_else(|| self.0.last())
            .cloned()
            .unwrap_or_default();
        self.0.push(set);
    }

    /// Remove the set at `index`.
    ///
    /// Refuses with `OrphanSet` when this would leave the collection empty.
    /// `exercise_index` is only used to address the error at the owning
    /// entry's position.
    pub fn remove_set(&mut self, index: usize, exercise_index: usize) -> Result<Set> {
        if index >= self.0.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                len: self.0.len(),
            });
        }
        if self.0.len() == 1 {
            return Err(Error::OrphanSet { exercise_index });
        }
        Ok(self.0.remove(index))
    }

    /// Remove the last set, with the same orphan protection
    pub fn remove_last(&mut self, exercise_index: usize) -> Result<Set> {
        self.remove_set(self.0.len().saturating_sub(1), exercise_index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Set> {
        self.0.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Set> {
        self.0.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Set> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Set> {
        self.0.iter_mut()
    }
}
