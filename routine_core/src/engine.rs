//! The composition engine: the single mutation surface for a routine.
//!
//! One engine owns one routine for the length of an edit session. Every
//! command is validated against a scratch copy first; only an accepted
//! result replaces the live routine and lands in the edit history, so a
//! rejected command provably leaves no partial mutation behind.
//!
//! Execution is single-threaded and synchronous. Callers serialize commands
//! against an engine instance; there is no internal locking.

use crate::catalog::ExerciseDefinition;
use crate::config::{Config, PolicyConfig};
use crate::groups::GroupManager;
use crate::history::EditHistory;
use crate::repository::RoutineRepository;
use crate::sets::SetCollection;
use crate::types::{
    ExerciseEntry, GroupKind, Metric, MetricTarget, Routine, Set, TargetValue,
};
use crate::{Error, Result};
use uuid::Uuid;

/// Validates commands, delegates grouping to `GroupManager`, and records
/// accepted results into `EditHistory`
pub struct CompositionEngine {
    routine: Routine,
    baseline: Routine,
    history: EditHistory,
    groups: GroupManager,
    policy: PolicyConfig,
}

impl CompositionEngine {
    /// Start an edit session over a routine (blank or repository-loaded)
    pub fn new(routine: Routine, config: &Config) -> Self {
        let baseline = routine.clone();
        let history = EditHistory::new(routine.clone(), config.history.max_entries);
        Self {
            routine,
            baseline,
            history,
            groups: GroupManager::new(&config.policy),
            policy: config.policy.clone(),
        }
    }

    /// The live routine
    pub fn routine(&self) -> &Routine {
        &self.routine
    }

    // ========================================================================
    // Structural mutations
    // ========================================================================

    /// Insert an ungrouped exercise with one default set.
    ///
    /// The catalog's cardio flag picks the seed metrics: duration for cardio,
    /// reps and rest for strength.
    pub fn insert_exercise(
        &mut self,
        definition: &ExerciseDefinition,
        at_index: usize,
    ) -> Result<&Routine> {
        let entry = ExerciseEntry::new(
            definition.id.clone(),
            SetCollection::from_set(self.default_set(definition.cardio)),
        );
        let description = format!("insert {}", definition.id);
        self.commit(&description, |_, routine| {
            if at_index > routine.entries.len() {
                return Err(Error::IndexOutOfBounds {
                    index: at_index,
                    len: routine.entries.len(),
                });
            }
            routine.entries.insert(at_index, entry);
            Ok(())
        })
    }

    /// Remove the entry at `index`; siblings of a group it belonged to may
    /// cascade-ungroup during the invariant sweep
    pub fn remove_exercise(&mut self, index: usize) -> Result<&Routine> {
        self.commit("remove exercise", |_, routine| {
            if index >= routine.entries.len() {
                return Err(Error::IndexOutOfBounds {
                    index,
                    len: routine.entries.len(),
                });
            }
            routine.entries.remove(index);
            Ok(())
        })
    }

    /// Move an entry to a new position.
    ///
    /// A group the move tears apart is ungrouped outright rather than left
    /// half-intact; a group that stays contiguous survives with renumbered
    /// order and reassigned rest.
    pub fn reorder_exercise(&mut self, from: usize, to: usize) -> Result<&Routine> {
        let len = self.routine.entries.len();
        if from >= len {
            return Err(Error::IndexOutOfBounds { index: from, len });
        }
        if to >= len {
            return Err(Error::IndexOutOfBounds { index: to, len });
        }
        if from == to {
            return Ok(&self.routine);
        }
        self.commit("reorder exercise", |_, routine| {
            let entry = routine.entries.remove(from);
            routine.entries.insert(to, entry);
            Ok(())
        })
    }

    /// Group a contiguous selection into a superset or timed circuit
    pub fn group_selection(
        &mut self,
        indices: &[usize],
        kind: GroupKind,
        seeds: &[Vec<MetricTarget>],
        round_count: usize,
    ) -> Result<&Routine> {
        let description = match kind {
            GroupKind::Standard => "form superset",
            GroupKind::CircuitTimed { .. } => "form circuit",
        };
        self.commit(description, |groups, routine| {
            groups
                .form_group(routine, indices, kind, seeds, round_count)
                .map(|_| ())
        })
    }

    /// Dissolve a group, keeping every member's targets as they are
    pub fn ungroup(&mut self, group_id: Uuid) -> Result<&Routine> {
        self.commit("ungroup", |groups, routine| groups.ungroup(routine, group_id))
    }

    /// Append one round to every member of a group
    pub fn add_round(&mut self, group_id: Uuid) -> Result<&Routine> {
        self.commit("add round", |groups, routine| {
            groups.add_round(routine, group_id)
        })
    }

    /// Remove the last round from every member of a group
    pub fn remove_round(&mut self, group_id: Uuid) -> Result<&Routine> {
        self.commit("remove round", |groups, routine| {
            groups.remove_round(routine, group_id)
        })
    }

    /// Switch a group between superset and circuit pacing
    pub fn change_group_type(&mut self, group_id: Uuid, kind: GroupKind) -> Result<&Routine> {
        self.commit("change group type", |groups, routine| {
            groups.change_group_type(routine, group_id, kind)
        })
    }

    // ========================================================================
    // Set-level mutations
    // ========================================================================

    /// Append a set to an ungrouped exercise, continuing its last set.
    ///
    /// Grouped entries keep their round counts in lockstep, so their sets
    /// are edited through the round operations instead.
    pub fn append_set(&mut self, exercise_index: usize) -> Result<&Routine> {
        self.commit("append set", |_, routine| {
            let entry = ungrouped_entry_mut(routine, exercise_index)?;
            entry.sets.append_set(None);
            Ok(())
        })
    }

    /// Remove one set from an ungrouped exercise.
    ///
    /// Removing the only set is refused with `OrphanSet`; the caller decides
    /// whether to remove the whole exercise instead.
    pub fn remove_set(&mut self, exercise_index: usize, set_index: usize) -> Result<&Routine> {
        self.commit("remove set", |_, routine| {
            let entry = ungrouped_entry_mut(routine, exercise_index)?;
            entry.sets.remove_set(set_index, exercise_index)?;
            Ok(())
        })
    }

    /// Write one metric target onto every set of one exercise.
    ///
    /// Grouping state is never touched; rest normalization still applies to
    /// grouped members during the invariant sweep.
    pub fn bulk_apply_metric(
        &mut self,
        exercise_index: usize,
        metric: Metric,
        value: TargetValue,
    ) -> Result<&Routine> {
        self.commit("apply metric", |_, routine| {
            let entry = entry_mut(routine, exercise_index)?;
            for set in entry.sets.iter_mut() {
                set.set_target(metric, value.clone());
            }
            Ok(())
        })
    }

    /// Nudge one numeric target by `steps` times the configured step size
    /// for its metric, clamped at zero
    pub fn adjust_metric(
        &mut self,
        exercise_index: usize,
        set_index: usize,
        metric: Metric,
        steps: i32,
    ) -> Result<&Routine> {
        let delta = f64::from(steps) * self.policy.steps.for_metric(metric);
        self.commit("adjust metric", |_, routine| {
            let entry = entry_mut(routine, exercise_index)?;
            let len = entry.sets.len();
            let set = entry
                .sets
                .get_mut(set_index)
                .ok_or(Error::IndexOutOfBounds {
                    index: set_index,
                    len,
                })?;
            let current = set.target(metric).ok_or_else(|| {
                Error::InvalidCommand(format!("{:?} is not active on this set", metric))
            })?;
            let adjusted = current.shifted(delta);
            set.set_target(metric, adjusted);
            Ok(())
        })
    }

    // ========================================================================
    // Metadata mutations
    // ========================================================================

    pub fn rename(&mut self, name: impl Into<String>) -> Result<&Routine> {
        let name = name.into();
        self.commit("rename", |_, routine| {
            routine.name = name;
            Ok(())
        })
    }

    pub fn set_notes(&mut self, notes: Option<String>) -> Result<&Routine> {
        self.commit("edit notes", |_, routine| {
            routine.notes = notes;
            Ok(())
        })
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Step back one accepted mutation, replaying the stored snapshot.
    ///
    /// The replay never records; check `can_undo` first.
    pub fn undo(&mut self) -> Result<&Routine> {
        let snapshot = self.history.undo()?.clone();
        self.routine = snapshot;
        Ok(&self.routine)
    }

    /// Step forward one undone mutation
    pub fn redo(&mut self) -> Result<&Routine> {
        let snapshot = self.history.redo()?.clone();
        self.routine = snapshot;
        Ok(&self.routine)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Throw away every edit of this session, returning to the routine the
    /// engine was opened with
    pub fn restore_original(&mut self) -> &Routine {
        self.routine = self.baseline.clone();
        self.history.restore_original(self.baseline.clone());
        &self.routine
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Advisory total duration in seconds. Deterministic over the current
    /// routine; no correctness contract beyond that.
    ///
    /// A superset of k members and n rounds costs, per round, the members'
    /// work plus the final member's rest. A circuit costs cadence seconds
    /// per member slot per round, regardless of individual work.
    pub fn estimate_duration(&self) -> u32 {
        let entries = &self.routine.entries;
        let mut total = 0.0;
        let mut i = 0;

        while i < entries.len() {
            let entry = &entries[i];
            let Some(membership) = entry.group.as_ref() else {
                total += entry
                    .sets
                    .iter()
                    .map(|s| self.work_seconds(s) + s.rest_seconds())
                    .sum::<f64>();
                i += 1;
                continue;
            };

            // Members are contiguous, so the whole group starts here
            let group_id = membership.group_id;
            let members: Vec<usize> = self.routine.group_positions(group_id);
            let rounds = entry.sets.len();

            match membership.kind {
                GroupKind::CircuitTimed { cadence_seconds } => {
                    total += (rounds * members.len() * cadence_seconds as usize) as f64;
                }
                GroupKind::Standard => {
                    for round in 0..rounds {
                        for &member in &members {
                            if let Some(set) = entries[member].sets.get(round) {
                                total += self.work_seconds(set);
                            }
                        }
                        if let Some(&last) = members.last() {
                            if let Some(set) = entries[last].sets.get(round) {
                                total += set.rest_seconds();
                            }
                        }
                    }
                }
            }
            i += members.len();
        }

        total.round() as u32
    }

    /// Validate and hand a snapshot to the repository.
    ///
    /// A non-rest-day routine with zero exercises is refused with
    /// `EmptyRoutine`. The returned routine carries the id and timestamps
    /// the repository assigned.
    pub fn save_to(&self, repository: &impl RoutineRepository) -> Result<Routine> {
        if self.routine.entries.is_empty() && !self.routine.rest_day {
            return Err(Error::EmptyRoutine);
        }
        repository.save(self.routine.clone())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Run one atomic mutation: validate against a scratch copy, sweep the
    /// grouping invariants, then swap in the result and record it
    fn commit<F>(&mut self, description: &str, mutate: F) -> Result<&Routine>
    where
        F: FnOnce(&GroupManager, &mut Routine) -> Result<()>,
    {
        let mut draft = self.routine.clone();
        mutate(&self.groups, &mut draft)?;
        self.groups.recalc_ordering(&mut draft);
        self.routine = draft;
        self.history.record(self.routine.clone(), description);
        tracing::debug!("Committed '{}'", description);
        Ok(&self.routine)
    }

    fn default_set(&self, cardio: bool) -> Set {
        if cardio {
            Set::new(vec![MetricTarget::new(
                Metric::Duration,
                TargetValue::exact(f64::from(self.policy.cardio_default_duration_seconds)),
            )])
        } else {
            Set::new(vec![
                MetricTarget::new(
                    Metric::Reps,
                    TargetValue::exact(f64::from(self.policy.strength_default_reps)),
                ),
                MetricTarget::new(
                    Metric::Rest,
                    TargetValue::exact(f64::from(self.policy.default_rest_seconds)),
                ),
            ])
        }
    }

    fn work_seconds(&self, set: &Set) -> f64 {
        if let Some(duration) = set.target(Metric::Duration) {
            return duration.representative();
        }
        if let Some(reps) = set.target(Metric::Reps) {
            return reps.representative() * f64::from(self.policy.seconds_per_rep);
        }
        f64::from(self.policy.default_set_seconds)
    }
}

fn entry_mut(routine: &mut Routine, index: usize) -> Result<&mut ExerciseEntry> {
    let len = routine.entries.len();
    routine
        .entries
        .get_mut(index)
        .ok_or(Error::IndexOutOfBounds { index, len })
}

fn ungrouped_entry_mut(routine: &mut Routine, index: usize) -> Result<&mut ExerciseEntry> {
    let entry = entry_mut(routine, index)?;
    if entry.group.is_some() {
        return Err(Error::InvalidCommand(
            "grouped exercises edit sets through the round operations".into(),
        ));
    }
    Ok(entry)
}
