#![forbid(unsafe_code)]

//! Milestone eligibility gate.
//!
//! Both rules work on bindings fetched in bulk for the whole candidate set;
//! nothing here performs I/O.

use crate::ids::MilestoneId;
use crate::model::MilestoneStatus;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Binding {
    pub entity_id: i64,
    pub milestone_id: MilestoneId,
    pub status: MilestoneStatus,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Verdict {
    pub allowed: BTreeSet<i64>,
    pub forbidden: BTreeSet<i64>,
}

impl Verdict {
    fn decide(&mut self, entity_id: i64, allowed: bool) {
        if allowed {
            self.allowed.insert(entity_id);
        } else {
            self.forbidden.insert(entity_id);
        }
    }
}

fn group_by_entity(bindings: &[Binding]) -> BTreeMap<i64, Vec<&Binding>> {
    let mut grouped = BTreeMap::<i64, Vec<&Binding>>::new();
    for binding in bindings {
        grouped.entry(binding.entity_id).or_default().push(binding);
    }
    grouped
}

/// An entity is forbidden iff one of its milestones is PLANNED or LOCKED.
/// Entities without bindings are allowed.
pub fn deletable(candidates: &BTreeSet<i64>, bindings: &[Binding]) -> Verdict {
    let grouped = group_by_entity(bindings);
    let mut verdict = Verdict::default();
    for entity_id in candidates {
        let locked = grouped.get(entity_id).is_some_and(|bindings| {
            bindings
                .iter()
                .any(|binding| binding.status.forbids_mutation())
        });
        verdict.decide(*entity_id, !locked);
    }
    verdict
}

/// An entity may be unbound from `milestone_id` iff it is bound to it, it is
/// bound to more than one milestone, and none of its milestones forbids
/// mutation.
///
/// An entity whose only binding is `milestone_id` is forbidden here; removing
/// its last binding goes through the deletion path instead.
pub fn unbindable(
    candidates: &BTreeSet<i64>,
    milestone_id: MilestoneId,
    bindings: &[Binding],
) -> Verdict {
    let grouped = group_by_entity(bindings);
    let mut verdict = Verdict::default();
    for entity_id in candidates {
        let eligible = grouped.get(entity_id).is_some_and(|bindings| {
            let bound_to_target = bindings
                .iter()
                .any(|binding| binding.milestone_id == milestone_id);
            let distinct = bindings
                .iter()
                .map(|binding| binding.milestone_id)
                .collect::<BTreeSet<_>>();
            let locked = bindings
                .iter()
                .any(|binding| binding.status.forbids_mutation());
            bound_to_target && distinct.len() > 1 && !locked
        });
        verdict.decide(*entity_id, eligible);
    }
    verdict
}

/// Lifts a verdict over owned entities to their owners: an owner is forbidden
/// as soon as one of its owned entities is. Owners without owned entities are
/// allowed.
pub fn roll_up(owners: &BTreeMap<i64, BTreeSet<i64>>, owned: &Verdict) -> Verdict {
    let mut verdict = Verdict::default();
    for (owner_id, owned_ids) in owners {
        let locked = owned_ids.iter().any(|id| owned.forbidden.contains(id));
        verdict.decide(*owner_id, !locked);
    }
    verdict
}

#[cfg(test)]
mod tests;
