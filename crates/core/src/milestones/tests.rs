use super::*;

const TC9: i64 = 9;
const M1: i64 = 1;
const M2: i64 = 2;
const M3: i64 = 3;

fn bind(entity_id: i64, milestone_id: i64, status: MilestoneStatus) -> Binding {
    Binding {
        entity_id,
        milestone_id,
        status,
    }
}

#[test]
fn unbound_entities_are_deletable() {
    let verdict = deletable(&BTreeSet::from([1, 2]), &[]);
    assert_eq!(verdict.allowed, BTreeSet::from([1, 2]));
    assert!(verdict.forbidden.is_empty());
}

#[test]
fn finished_milestones_do_not_block_deletion() {
    let bindings = [
        bind(TC9, M1, MilestoneStatus::Finished),
        bind(TC9, M2, MilestoneStatus::Deprecated),
    ];
    let verdict = deletable(&BTreeSet::from([TC9]), &bindings);
    assert_eq!(verdict.allowed, BTreeSet::from([TC9]));
}

#[test]
fn locked_or_planned_milestone_blocks_deletion() {
    let bindings = [
        bind(TC9, M1, MilestoneStatus::Locked),
        bind(10, M2, MilestoneStatus::Finished),
        bind(10, M3, MilestoneStatus::Planned),
        bind(11, M2, MilestoneStatus::Finished),
    ];
    let verdict = deletable(&BTreeSet::from([TC9, 10, 11]), &bindings);
    assert_eq!(verdict.forbidden, BTreeSet::from([TC9, 10]));
    assert_eq!(verdict.allowed, BTreeSet::from([11]));
}

#[test]
fn bindings_of_non_candidates_are_ignored() {
    let bindings = [bind(42, M1, MilestoneStatus::Locked)];
    let verdict = deletable(&BTreeSet::from([TC9]), &bindings);
    assert_eq!(verdict.allowed, BTreeSet::from([TC9]));
    assert!(verdict.forbidden.is_empty());
}

#[test]
fn unbind_requires_binding_to_target() {
    let bindings = [
        bind(TC9, M1, MilestoneStatus::Finished),
        bind(TC9, M2, MilestoneStatus::InProgress),
    ];
    let verdict = unbindable(&BTreeSet::from([TC9]), M3, &bindings);
    assert_eq!(verdict.forbidden, BTreeSet::from([TC9]));
}

#[test]
fn unbind_of_last_binding_is_refused() {
    let bindings = [bind(TC9, M1, MilestoneStatus::Finished)];
    let verdict = unbindable(&BTreeSet::from([TC9]), M1, &bindings);
    assert_eq!(verdict.forbidden, BTreeSet::from([TC9]));
}

#[test]
fn unbind_with_locking_binding_is_refused_from_any_milestone() {
    // Bound to M1 (FINISHED) and M2 (PLANNED).
    let bindings = [
        bind(TC9, M1, MilestoneStatus::Finished),
        bind(TC9, M2, MilestoneStatus::Planned),
    ];
    let from_m2 = unbindable(&BTreeSet::from([TC9]), M2, &bindings);
    assert_eq!(from_m2.forbidden, BTreeSet::from([TC9]));

    let from_m1 = unbindable(&BTreeSet::from([TC9]), M1, &bindings);
    assert_eq!(from_m1.forbidden, BTreeSet::from([TC9]));
}

#[test]
fn unbind_with_three_open_bindings_is_allowed() {
    let bindings = [
        bind(TC9, M1, MilestoneStatus::Finished),
        bind(TC9, M2, MilestoneStatus::InProgress),
        bind(TC9, M3, MilestoneStatus::Deprecated),
    ];
    let verdict = unbindable(&BTreeSet::from([TC9]), M2, &bindings);
    assert_eq!(verdict.allowed, BTreeSet::from([TC9]));
}

#[test]
fn roll_up_forbids_owner_of_any_forbidden_entity() {
    let owners = BTreeMap::from([
        (100, BTreeSet::from([1, 2])),
        (200, BTreeSet::from([3])),
        (300, BTreeSet::new()),
    ]);
    let owned = Verdict {
        allowed: BTreeSet::from([1, 3]),
        forbidden: BTreeSet::from([2]),
    };
    let verdict = roll_up(&owners, &owned);
    assert_eq!(verdict.forbidden, BTreeSet::from([100]));
    assert_eq!(verdict.allowed, BTreeSet::from([200, 300]));
}
