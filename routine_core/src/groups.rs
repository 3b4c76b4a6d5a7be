//! Group management: supersets and timed circuits.
//!
//! `GroupManager` is the one place that creates, dissolves and repairs
//! grouping state on a routine. After any membership or order change it
//! re-derives the structural invariants:
//!
//! - members of a group occupy contiguous routine positions, with `order`
//!   forming an unbroken 0..n-1 sequence matching those positions
//! - a superset has at least 2 members; a circuit at least 1
//! - all members of a group have the same set count (the round count)
//! - in a superset only the last member carries nonzero rest; in a circuit
//!   nobody does (the cadence replaces rest)

use crate::config::PolicyConfig;
use crate::sets::SetCollection;
use crate::types::{GroupKind, GroupMembership, Metric, MetricTarget, Routine, TargetValue};
use crate::{Error, Result};
use uuid::Uuid;

/// Enforces grouping invariants whenever membership or order changes
#[derive(Clone, Debug)]
pub struct GroupManager {
    default_rest_seconds: u32,
}

impl GroupManager {
    pub fn new(policy: &PolicyConfig) -> Self {
        Self {
            default_rest_seconds: policy.default_rest_seconds,
        }
    }

    /// Form a group over a contiguous ascending run of entry positions.
    ///
    /// Each member's set collection is rebuilt as `round_count` sets seeded
    /// from its entry in `seeds`, then the rest policy is applied. Fails
    /// without touching the routine when the selection is not adjacent, a
    /// superset has fewer than two members, a member already belongs to a
    /// group, or the seed list doesn't line up.
    pub fn form_group(
        &self,
        routine: &mut Routine,
        indices: &[usize],
        kind: GroupKind,
        seeds: &[Vec<MetricTarget>],
        round_count: usize,
    ) -> Result<Uuid> {
        if round_count == 0 {
            return Err(Error::InvalidCommand("round count must be at least 1".into()));
        }
        if indices.is_empty() {
            return Err(Error::GroupSize { members: 0 });
        }
        if matches!(kind, GroupKind::Standard) && indices.len() < 2 {
            return Err(Error::GroupSize {
                members: indices.len(),
            });
        }
        if !indices.windows(2).all(|w| w[1] == w[0] + 1) {
            return Err(Error::NonContiguousSelection {
                indices: indices.to_vec(),
            });
        }
        if let Some(&last) = indices.last() {
            if last >= routine.entries.len() {
                return Err(Error::IndexOutOfBounds {
                    index: last,
                    len: routine.entries.len(),
                });
            }
        }
        if seeds.len() != indices.len() {
            return Err(Error::InvalidCommand(format!(
                "{} seed target lists for {} selected exercises",
                seeds.len(),
                indices.len()
            )));
        }
        if indices.iter().any(|&i| routine.entries[i].group.is_some()) {
            return Err(Error::InvalidCommand(
                "selection overlaps an existing group; ungroup it first".into(),
            ));
        }

        let group_id = Uuid::new_v4();
        for (order, (&index, seed)) in indices.iter().zip(seeds).enumerate() {
            let entry = &mut routine.entries[index];
            entry.group = Some(GroupMembership {
                group_id,
                order,
                kind,
            });
            entry.sets = SetCollection::seeded(seed, round_count);
        }
        self.apply_rest_policy(routine, group_id);

        tracing::info!(
            "Formed {:?} group {} over positions {:?} with {} rounds",
            kind,
            group_id,
            indices,
            round_count
        );
        Ok(group_id)
    }

    /// Dissolve a group, clearing membership on all members.
    ///
    /// Target values are left as they are; the zeros written by earlier rest
    /// normalization stay in place.
    pub fn ungroup(&self, routine: &mut Routine, group_id: Uuid) -> Result<()> {
        let positions = routine.group_positions(group_id);
        if positions.is_empty() {
            return Err(Error::UnknownGroup(group_id));
        }
        for index in positions {
            routine.entries[index].group = None;
        }
        tracing::info!("Ungrouped {}", group_id);
        Ok(())
    }

    /// Append one round (set) to every member simultaneously.
    ///
    /// New sets continue each member's last set, so targets and the rest
    /// pattern carry forward.
    pub fn add_round(&self, routine: &mut Routine, group_id: Uuid) -> Result<()> {
        let positions = routine.group_positions(group_id);
        if positions.is_empty() {
            return Err(Error::UnknownGroup(group_id));
        }
        for index in positions {
            routine.entries[index].sets.append_set(None);
        }
        self.apply_rest_policy(routine, group_id);
        Ok(())
    }

    /// Remove the last round from every member simultaneously.
    ///
    /// Rejected with `OrphanSet` if any member would drop to zero sets;
    /// nothing is removed in that case.
    pub fn remove_round(&self, routine: &mut Routine, group_id: Uuid) -> Result<()> {
        let positions = routine.group_positions(group_id);
        if positions.is_empty() {
            return Err(Error::UnknownGroup(group_id));
        }
        if let Some(&index) = positions
            .iter()
            .find(|&&i| routine.entries[i].sets.len() <= 1)
        {
            return Err(Error::OrphanSet {
                exercise_index: index,
            });
        }
        for index in positions {
            routine.entries[index].sets.remove_last(index)?;
        }
        Ok(())
    }

    /// Switch a group between superset and circuit pacing.
    ///
    /// Rest is re-normalized across all members: a circuit zeroes every
    /// member, a superset concentrates rest on the last one. Converting a
    /// singleton circuit to a superset is rejected.
    pub fn change_group_type(
        &self,
        routine: &mut Routine,
        group_id: Uuid,
        kind: GroupKind,
    ) -> Result<()> {
        let positions = routine.group_positions(group_id);
        if positions.is_empty() {
            return Err(Error::UnknownGroup(group_id));
        }
        if matches!(kind, GroupKind::Standard) && positions.len() < 2 {
            return Err(Error::GroupSize {
                members: positions.len(),
            });
        }
        for &index in &positions {
            if let Some(membership) = routine.entries[index].group.as_mut() {
                membership.kind = kind;
            }
        }
        self.apply_rest_policy(routine, group_id);
        Ok(())
    }

    /// Re-derive grouping invariants after any reorder, insertion or
    /// deletion.
    ///
    /// Groups whose members are no longer contiguous are force-ungrouped;
    /// survivors get `order` renumbered 0..n-1 by position; a superset
    /// reduced to a single member is auto-ungrouped (singleton circuits
    /// survive); the rest policy is re-applied since the last member may
    /// have changed. Running this twice is the same as running it once.
    pub fn recalc_ordering(&self, routine: &mut Routine) {
        // First occurrence order keeps the sweep deterministic
        let mut group_ids: Vec<Uuid> = Vec::new();
        for entry in &routine.entries {
            if let Some(id) = entry.group_id() {
                if !group_ids.contains(&id) {
                    group_ids.push(id);
                }
            }
        }

        for group_id in group_ids {
            let positions = routine.group_positions(group_id);

            let contiguous = positions
                .windows(2)
                .all(|w| w[1] == w[0] + 1);
            if !contiguous {
                tracing::info!(
                    "Group {} no longer contiguous at {:?}, force-ungrouping",
                    group_id,
                    positions
                );
                for index in positions {
                    routine.entries[index].group = None;
                }
                continue;
            }

            let is_standard = positions.first().is_some_and(|&i| {
                matches!(
                    routine.entries[i].group.as_ref().map(|g| g.kind),
                    Some(GroupKind::Standard)
                )
            });
            if is_standard && positions.len() == 1 {
                tracing::info!("Superset {} reduced to one member, ungrouping", group_id);
                routine.entries[positions[0]].group = None;
                continue;
            }

            for (order, &index) in positions.iter().enumerate() {
                if let Some(membership) = routine.entries[index].group.as_mut() {
                    membership.order = order;
                }
            }
            self.apply_rest_policy(routine, group_id);
        }
    }

    /// Normalize rest targets across a group's members.
    ///
    /// Supersets: every non-final member gets an explicit zero-rest target on
    /// each set; the final member keeps any nonzero rest it already has, and
    /// gets the policy default where rest is absent or zero. Circuits: every
    /// member is zeroed, cadence paces the rounds instead.
    fn apply_rest_policy(&self, routine: &mut Routine, group_id: Uuid) {
        let positions = routine.group_positions(group_id);
        let Some((&last, rest_of)) = positions.split_last() else {
            return;
        };

        let Some(kind) = routine.entries[last].group.as_ref().map(|g| g.kind) else {
            return;
        };

        for &index in rest_of {
            zero_rest(&mut routine.entries[index].sets);
        }

        match kind {
            GroupKind::CircuitTimed { .. } => zero_rest(&mut routine.entries[last].sets),
            GroupKind::Standard => {
                let default = f64::from(self.default_rest_seconds);
                for set in routine.entries[last].sets.iter_mut() {
                    if set.rest_seconds() == 0.0 {
                        set.set_target(Metric::Rest, TargetValue::exact(default));
                    }
                }
            }
        }
    }
}

fn zero_rest(sets: &mut SetCollection) {
    for set in sets.iter_mut() {
        set.set_target(Metric::Rest, TargetValue::exact(0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExerciseEntry, Set};

    fn manager() -> GroupManager {
        GroupManager::new(&PolicyConfig::default())
    }

    fn reps_seed(reps: f64) -> Vec<MetricTarget> {
        vec![MetricTarget::new(Metric::Reps, TargetValue::exact(reps))]
    }

    fn routine_with(exercises: &[&str]) -> Routine {
        let mut routine = Routine::new("push day");
        for id in exercises {
            let sets = SetCollection::from_set(Set::new(reps_seed(10.0)));
            routine.entries.push(ExerciseEntry::new(*id, sets));
        }
        routine
    }

    fn assert_invariants(routine: &Routine) {
        let mut seen: Vec<Uuid> = Vec::new();
        for entry in &routine.entries {
            if let Some(id) = entry.group_id() {
                if !seen.contains(&id) {
                    seen.push(id);
                }
            }
        }
        for group_id in seen {
            let positions = routine.group_positions(group_id);
            assert!(
                positions.windows(2).all(|w| w[1] == w[0] + 1),
                "group {} not contiguous: {:?}",
                group_id,
                positions
            );
            let kind = routine.entries[positions[0]].group.as_ref().unwrap().kind;
            if matches!(kind, GroupKind::Standard) {
                assert!(positions.len() >= 2, "singleton superset {}", group_id);
            }
            let rounds = routine.entries[positions[0]].sets.len();
            for (order, &index) in positions.iter().enumerate() {
                let membership = routine.entries[index].group.as_ref().unwrap();
                assert_eq!(membership.order, order);
                assert_eq!(membership.kind, kind);
                assert_eq!(routine.entries[index].sets.len(), rounds);

                let is_last = order == positions.len() - 1;
                for set in routine.entries[index].sets.iter() {
                    let allows_rest = is_last && matches!(kind, GroupKind::Standard);
                    if !allows_rest {
                        assert_eq!(set.rest_seconds(), 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_form_superset_assigns_order_rounds_and_rest() {
        let mut routine = routine_with(&["bench_press", "barbell_row"]);
        let group_id = manager()
            .form_group(
                &mut routine,
                &[0, 1],
                GroupKind::Standard,
                &[reps_seed(8.0), reps_seed(8.0)],
                3,
            )
            .unwrap();

        assert_invariants(&routine);
        assert_eq!(routine.group_positions(group_id), vec![0, 1]);
        assert_eq!(routine.entries[0].sets.len(), 3);
        assert_eq!(routine.entries[1].sets.len(), 3);

        for set in routine.entries[0].sets.iter() {
            assert_eq!(set.rest_seconds(), 0.0);
        }
        for set in routine.entries[1].sets.iter() {
            assert_eq!(set.rest_seconds(), 60.0);
        }
    }

    #[test]
    fn test_form_group_rejects_non_contiguous() {
        let mut routine = routine_with(&["bench_press", "pullup", "barbell_row"]);
        let before = routine.clone();

        let err = manager()
            .form_group(
                &mut routine,
                &[0, 2],
                GroupKind::Standard,
                &[reps_seed(8.0), reps_seed(8.0)],
                3,
            )
            .unwrap_err();

        assert!(matches!(err, Error::NonContiguousSelection { .. }));
        assert_eq!(routine, before);
    }

    #[test]
    fn test_form_superset_rejects_single_member() {
        let mut routine = routine_with(&["bench_press"]);
        let err = manager()
            .form_group(
                &mut routine,
                &[0],
                GroupKind::Standard,
                &[reps_seed(8.0)],
                3,
            )
            .unwrap_err();

        assert!(matches!(err, Error::GroupSize { members: 1 }));
    }

    #[test]
    fn test_singleton_circuit_is_allowed() {
        let mut routine = routine_with(&["jump_rope"]);
        manager()
            .form_group(
                &mut routine,
                &[0],
                GroupKind::CircuitTimed { cadence_seconds: 30 },
                &[reps_seed(20.0)],
                5,
            )
            .unwrap();

        assert_invariants(&routine);
        assert_eq!(routine.entries[0].sets.len(), 5);
    }

    #[test]
    fn test_form_group_rejects_overlap_with_existing_group() {
        let mut routine = routine_with(&["bench_press", "barbell_row", "pullup"]);
        let mgr = manager();
        mgr.form_group(
            &mut routine,
            &[0, 1],
            GroupKind::Standard,
            &[reps_seed(8.0), reps_seed(8.0)],
            3,
        )
        .unwrap();

        let err = mgr
            .form_group(
                &mut routine,
                &[1, 2],
                GroupKind::Standard,
                &[reps_seed(8.0), reps_seed(8.0)],
                3,
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCommand(_)));
        assert_invariants(&routine);
    }

    #[test]
    fn test_circuit_zeroes_rest_on_every_member() {
        let mut routine = routine_with(&["kettlebell_swing", "pushup"]);
        manager()
            .form_group(
                &mut routine,
                &[0, 1],
                GroupKind::CircuitTimed { cadence_seconds: 45 },
                &[reps_seed(15.0), reps_seed(10.0)],
                4,
            )
            .unwrap();

        for entry in &routine.entries {
            for set in entry.sets.iter() {
                assert_eq!(set.rest_seconds(), 0.0);
            }
        }
    }

    #[test]
    fn test_ungroup_clears_membership_keeps_targets() {
        let mut routine = routine_with(&["bench_press", "barbell_row"]);
        let mgr = manager();
        let group_id = mgr
            .form_group(
                &mut routine,
                &[0, 1],
                GroupKind::Standard,
                &[reps_seed(8.0), reps_seed(8.0)],
                3,
            )
            .unwrap();

        mgr.ungroup(&mut routine, group_id).unwrap();

        assert!(routine.entries.iter().all(|e| e.group.is_none()));
        // Normalized rest values survive the ungroup untouched
        assert_eq!(routine.entries[0].sets.get(0).unwrap().rest_seconds(), 0.0);
        assert_eq!(routine.entries[1].sets.get(0).unwrap().rest_seconds(), 60.0);
    }

    #[test]
    fn test_add_round_extends_every_member() {
        let mut routine = routine_with(&["bench_press", "barbell_row"]);
        let mgr = manager();
        let group_id = mgr
            .form_group(
                &mut routine,
                &[0, 1],
                GroupKind::Standard,
                &[reps_seed(8.0), reps_seed(8.0)],
                2,
            )
            .unwrap();

        mgr.add_round(&mut routine, group_id).unwrap();

        assert_invariants(&routine);
        assert_eq!(routine.entries[0].sets.len(), 3);
        assert_eq!(routine.entries[1].sets.len(), 3);
        // Continuation carries the rest pattern onto the new round
        assert_eq!(routine.entries[1].sets.get(2).unwrap().rest_seconds(), 60.0);
    }

    #[test]
    fn test_remove_round_rejects_orphan() {
        let mut routine = routine_with(&["bench_press", "barbell_row"]);
        let mgr = manager();
        let group_id = mgr
            .form_group(
                &mut routine,
                &[0, 1],
                GroupKind::Standard,
                &[reps_seed(8.0), reps_seed(8.0)],
                1,
            )
            .unwrap();
        let before = routine.clone();

        let err = mgr.remove_round(&mut routine, group_id).unwrap_err();
        assert!(matches!(err, Error::OrphanSet { .. }));
        assert_eq!(routine, before);
    }

    #[test]
    fn test_change_type_superset_to_circuit() {
        let mut routine = routine_with(&["bench_press", "barbell_row"]);
        let mgr = manager();
        let group_id = mgr
            .form_group(
                &mut routine,
                &[0, 1],
                GroupKind::Standard,
                &[reps_seed(8.0), reps_seed(8.0)],
                3,
            )
            .unwrap();

        mgr.change_group_type(
            &mut routine,
            group_id,
            GroupKind::CircuitTimed { cadence_seconds: 40 },
        )
        .unwrap();

        assert_invariants(&routine);
        // Former last member's rest is gone, cadence paces rounds now
        for set in routine.entries[1].sets.iter() {
            assert_eq!(set.rest_seconds(), 0.0);
        }
    }

    #[test]
    fn test_change_type_rejects_singleton_superset() {
        let mut routine = routine_with(&["jump_rope"]);
        let mgr = manager();
        let group_id = mgr
            .form_group(
                &mut routine,
                &[0],
                GroupKind::CircuitTimed { cadence_seconds: 30 },
                &[reps_seed(20.0)],
                3,
            )
            .unwrap();

        let err = mgr
            .change_group_type(&mut routine, group_id, GroupKind::Standard)
            .unwrap_err();
        assert!(matches!(err, Error::GroupSize { members: 1 }));
    }

    #[test]
    fn test_recalc_force_ungroups_split_group() {
        let mut routine = routine_with(&["bench_press", "barbell_row", "pullup"]);
        let mgr = manager();
        mgr.form_group(
            &mut routine,
            &[0, 1],
            GroupKind::Standard,
            &[reps_seed(8.0), reps_seed(8.0)],
            3,
        )
        .unwrap();

        // Simulate an insertion splitting the pair apart
        let outsider = routine.entries.remove(2);
        routine.entries.insert(1, outsider);

        mgr.recalc_ordering(&mut routine);

        assert!(routine.entries.iter().all(|e| e.group.is_none()));
        assert_invariants(&routine);
    }

    #[test]
    fn test_recalc_renumbers_and_moves_rest_after_swap() {
        let mut routine = routine_with(&["bench_press", "barbell_row"]);
        let mgr = manager();
        mgr.form_group(
            &mut routine,
            &[0, 1],
            GroupKind::Standard,
            &[reps_seed(8.0), reps_seed(8.0)],
            3,
        )
        .unwrap();

        routine.entries.swap(0, 1);
        mgr.recalc_ordering(&mut routine);

        assert_invariants(&routine);
        // barbell_row now leads, bench_press trails and owns the rest
        assert_eq!(routine.entries[0].exercise_id, "barbell_row");
        assert_eq!(routine.entries[0].group.as_ref().unwrap().order, 0);
        assert_eq!(routine.entries[1].group.as_ref().unwrap().order, 1);
        for set in routine.entries[0].sets.iter() {
            assert_eq!(set.rest_seconds(), 0.0);
        }
        for set in routine.entries[1].sets.iter() {
            assert_eq!(set.rest_seconds(), 60.0);
        }
    }

    #[test]
    fn test_recalc_ungroups_singleton_superset() {
        let mut routine = routine_with(&["bench_press", "barbell_row"]);
        let mgr = manager();
        mgr.form_group(
            &mut routine,
            &[0, 1],
            GroupKind::Standard,
            &[reps_seed(8.0), reps_seed(8.0)],
            3,
        )
        .unwrap();

        routine.entries.remove(0);
        mgr.recalc_ordering(&mut routine);

        assert!(routine.entries[0].group.is_none());
    }

    #[test]
    fn test_recalc_keeps_singleton_circuit() {
        let mut routine = routine_with(&["jump_rope", "pushup"]);
        let mgr = manager();
        mgr.form_group(
            &mut routine,
            &[0, 1],
            GroupKind::CircuitTimed { cadence_seconds: 30 },
            &[reps_seed(20.0), reps_seed(10.0)],
            3,
        )
        .unwrap();

        routine.entries.remove(1);
        mgr.recalc_ordering(&mut routine);

        assert!(routine.entries[0].group.is_some());
        assert_eq!(routine.entries[0].group.as_ref().unwrap().order, 0);
    }

    #[test]
    fn test_recalc_is_idempotent() {
        let mut routine = routine_with(&["bench_press", "barbell_row", "pullup"]);
        let mgr = manager();
        mgr.form_group(
            &mut routine,
            &[0, 1],
            GroupKind::Standard,
            &[reps_seed(8.0), reps_seed(8.0)],
            3,
        )
        .unwrap();
        routine.entries.swap(0, 1);

        mgr.recalc_ordering(&mut routine);
        let once = routine.clone();
        mgr.recalc_ordering(&mut routine);

        assert_eq!(routine, once);
    }

    #[test]
    fn test_rest_policy_keeps_custom_rest_on_last_member() {
        let mut routine = routine_with(&["bench_press", "barbell_row"]);
        let mgr = manager();
        let group_id = mgr
            .form_group(
                &mut routine,
                &[0, 1],
                GroupKind::Standard,
                &[reps_seed(8.0), reps_seed(8.0)],
                2,
            )
            .unwrap();

        // User bumps the last member's rest to 90s
        for set in routine.entries[1].sets.iter_mut() {
            set.set_target(Metric::Rest, TargetValue::exact(90.0));
        }

        mgr.add_round(&mut routine, group_id).unwrap();

        for set in routine.entries[1].sets.iter() {
            assert_eq!(set.rest_seconds(), 90.0);
        }
    }
}
