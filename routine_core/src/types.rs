//! Core domain types for the routine composition engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Routines and the exercise entries they order
//! - Group membership (supersets and timed circuits)
//! - Sets and their per-metric targets
//!
//! Grouping state is a single `Option<GroupMembership>` per entry: an
//! exercise either carries a group id, a 0-based order and a group kind all
//! together, or none of them. The id/order/kind can never disagree.

use crate::sets::SetCollection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Metric Types
// ============================================================================

/// The prescribable metrics of one set
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Reps,
    Weight,
    Duration,
    Distance,
    Rest,
    Tempo,
}

/// Target value for one metric, with type-safe variants
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TargetValue {
    /// A single prescribed value (e.g. 8 reps, 60 kg)
    Exact { value: f64 },
    /// A closed range (e.g. 8-12 reps)
    Range { min: f64, max: f64 },
    /// At least this much (e.g. 5+ pullups)
    MinPlus { min: f64 },
    /// Percentage of the lifter's known max (e.g. 75% of 1RM)
    PercentOfMax { percent: f64 },
}

impl TargetValue {
    pub fn exact(value: f64) -> Self {
        TargetValue::Exact { value }
    }

    /// Collapse any variant to a single advisory number.
    ///
    /// Used for duration estimates and display; ranges take their midpoint,
    /// min-plus its floor.
    pub fn representative(&self) -> f64 {
        match self {
            TargetValue::Exact { value } => *value,
            TargetValue::Range { min, max } => (min + max) / 2.0,
            TargetValue::MinPlus { min } => *min,
            TargetValue::PercentOfMax { percent } => *percent,
        }
    }

    /// Shift the target by a delta, clamping every bound at zero
    pub fn shifted(&self, delta: f64) -> Self {
        let clamp = |v: f64| (v + delta).max(0.0);
        match self {
            TargetValue::Exact { value } => TargetValue::Exact { value: clamp(*value) },
            TargetValue::Range { min, max } => TargetValue::Range {
                min: clamp(*min),
                max: clamp(*max),
            },
            TargetValue::MinPlus { min } => TargetValue::MinPlus { min: clamp(*min) },
            TargetValue::PercentOfMax { percent } => TargetValue::PercentOfMax {
                percent: clamp(*percent),
            },
        }
    }
}

/// One active metric of a set, paired with its target
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MetricTarget {
    pub metric: Metric,
    pub value: TargetValue,
}

impl MetricTarget {
    pub fn new(metric: Metric, value: TargetValue) -> Self {
        Self { metric, value }
    }
}

// ============================================================================
// Set Type
// ============================================================================

/// One unit of prescribed work ("round" when discussing grouped exercises)
///
/// `targets` is the explicit ordered list of active metrics; a metric absent
/// from the list is not prescribed for this set.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Set {
    pub targets: Vec<MetricTarget>,
}

impl Set {
    pub fn new(targets: Vec<MetricTarget>) -> Self {
        Self { targets }
    }

    pub fn target(&self, metric: Metric) -> Option<&TargetValue> {
        self.targets
            .iter()
            .find(|t| t.metric == metric)
            .map(|t| &t.value)
    }

    /// Write a target, replacing an existing one in place (keeping its
    /// position in the active-metric order) or appending a new one
    pub fn set_target(&mut self, metric: Metric, value: TargetValue) {
        match self.targets.iter_mut().find(|t| t.metric == metric) {
            Some(existing) => existing.value = value,
            None => self.targets.push(MetricTarget::new(metric, value)),
        }
    }

    /// Advisory rest for this set, in seconds (0 when no Rest target is set)
    pub fn rest_seconds(&self) -> f64 {
        self.target(Metric::Rest)
            .map(|v| v.representative())
            .unwrap_or(0.0)
    }
}

// ============================================================================
// Grouping Types
// ============================================================================

/// How a group paces its members
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GroupKind {
    /// Superset: members performed back-to-back each round, rest concentrated
    /// on the last member
    Standard,
    /// Timed circuit: a fixed cadence per member slot replaces discrete rest
    CircuitTimed { cadence_seconds: u32 },
}

/// Membership of one exercise entry in a group
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GroupMembership {
    pub group_id: Uuid,
    /// 0-based position within the group, matching routine order
    pub order: usize,
    pub kind: GroupKind,
}

// ============================================================================
// Routine Types
// ============================================================================

/// One exercise occurrence within a routine, owning its own ordered sets
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseEntry {
    pub id: Uuid,
    /// Reference into the exercise catalog
    pub exercise_id: String,
    pub sets: SetCollection,
    pub group: Option<GroupMembership>,
}

impl ExerciseEntry {
    pub fn new(exercise_id: impl Into<String>, sets: SetCollection) -> Self {
        Self {
            id: Uuid::new_v4(),
            exercise_id: exercise_id.into(),
            sets,
            group: None,
        }
    }

    pub fn group_id(&self) -> Option<Uuid> {
        self.group.as_ref().map(|g| g.group_id)
    }
}

/// The editable ordered collection of exercises being composed
///
/// `id` and the timestamps stay `None` until the repository assigns them on
/// first save.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Routine {
    pub id: Option<Uuid>,
    pub name: String,
    pub notes: Option<String>,
    pub rest_day: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub entries: Vec<ExerciseEntry>,
}

impl Routine {
    /// Create a blank, unsaved routine
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            notes: None,
            rest_day: false,
            created_at: None,
            updated_at: None,
            entries: Vec::new(),
        }
    }

    /// Positions of all members of a group, in routine order
    pub fn group_positions(&self, group_id: Uuid) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.group_id() == Some(group_id))
            .map(|(i, _)| i)
            .collect()
    }

    /// The group id of the entry at `index`, if it belongs to one
    pub fn group_at(&self, index: usize) -> Option<Uuid> {
        self.entries.get(index).and_then(|e| e.group_id())
    }
}
