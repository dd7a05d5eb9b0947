#![forbid(unsafe_code)]

use std::collections::BTreeSet;
use tm_core::ids::NodeId;
use tm_core::model::{EntityKind, MilestoneStatus, NodeKind, TreeKind};
use tm_storage::{NewNode, ParentRef, SqliteStore, StoreConfig, StoreError};

fn store_with_test_cases(batch_size: usize, count: usize) -> (SqliteStore, Vec<NodeId>) {
    let config = StoreConfig {
        batch_size,
        ..StoreConfig::default()
    };
    let mut store = SqliteStore::open_in_memory(config).expect("open store");
    let test_cases = store
        .write(|work| {
            let project = work.create_project("Acme")?;
            let library_id = work.library_of(project.project_id, TreeKind::TestCase)?;
            let mut ids = Vec::new();
            for idx in 0..count {
                let node = work.insert_node(NewNode {
                    tree_kind: TreeKind::TestCase,
                    parent: ParentRef::Library(library_id),
                    name: format!("TC#{idx}"),
                    kind: NodeKind::Leaf,
                })?;
                ids.push(node.node_id);
            }
            Ok(ids)
        })
        .expect("test cases");
    (store, test_cases)
}

fn milestone(store: &mut SqliteStore, label: &str, status: MilestoneStatus) -> i64 {
    store
        .write(|work| work.create_milestone(label, status))
        .expect("create milestone")
        .milestone_id
}

fn bind(store: &mut SqliteStore, milestone_id: i64, ids: &BTreeSet<NodeId>) {
    store
        .write(|work| work.bind_to_milestone(milestone_id, EntityKind::TestCase, ids))
        .expect("bind");
}

#[test]
fn locked_milestone_forbids_deletion() {
    let (mut store, test_cases) = store_with_test_cases(50, 1);
    let tc9 = BTreeSet::from([test_cases[0]]);
    let m1 = milestone(&mut store, "M1", MilestoneStatus::InProgress);
    bind(&mut store, m1, &tc9);
    store
        .write(|work| work.set_milestone_status(m1, MilestoneStatus::Locked))
        .expect("lock milestone");

    let verdict = store
        .deletable_ids(EntityKind::TestCase, &tc9)
        .expect("deletable");
    assert_eq!(verdict.forbidden, tc9);
    assert!(verdict.allowed.is_empty());

    let result = store
        .delete_nodes(TreeKind::TestCase, &tc9)
        .expect("delete");
    assert!(result.deleted.is_empty());
    assert_eq!(result.skipped_milestone_locked, tc9);
}

#[test]
fn finished_milestones_do_not_block_deletion() {
    let (mut store, test_cases) = store_with_test_cases(50, 1);
    let ids = BTreeSet::from([test_cases[0]]);
    let done = milestone(&mut store, "done", MilestoneStatus::Finished);
    bind(&mut store, done, &ids);

    let verdict = store
        .deletable_ids(EntityKind::TestCase, &ids)
        .expect("deletable");
    assert_eq!(verdict.allowed, ids);

    let result = store
        .delete_nodes(TreeKind::TestCase, &ids)
        .expect("delete");
    assert_eq!(result.deleted, ids);
    assert!(
        store
            .milestones_of(EntityKind::TestCase, test_cases[0])
            .expect("bindings")
            .is_empty()
    );
}

#[test]
fn planned_binding_blocks_unbinding_from_any_milestone() {
    let (mut store, test_cases) = store_with_test_cases(50, 1);
    let tc9 = BTreeSet::from([test_cases[0]]);
    let m1 = milestone(&mut store, "M1", MilestoneStatus::Finished);
    let m2 = milestone(&mut store, "M2", MilestoneStatus::Planned);
    bind(&mut store, m1, &tc9);
    bind(&mut store, m2, &tc9);

    for target in [m1, m2] {
        let verdict = store
            .unbindable_ids(target, EntityKind::TestCase, &tc9)
            .expect("unbindable");
        assert_eq!(verdict.forbidden, tc9, "milestone {target}");
    }

    store
        .write(|work| work.set_milestone_status(m2, MilestoneStatus::InProgress))
        .expect("reopen M2");
    let verdict = store
        .unbindable_ids(m1, EntityKind::TestCase, &tc9)
        .expect("unbindable");
    assert_eq!(verdict.allowed, tc9);

    let result = store
        .write(|work| work.unbind_from_milestone(m1, EntityKind::TestCase, &tc9))
        .expect("unbind");
    assert_eq!(result.unbound, tc9);
    assert_eq!(
        store
            .milestones_of(EntityKind::TestCase, test_cases[0])
            .expect("bindings"),
        BTreeSet::from([m2])
    );

    // The last binding only goes away through deletion.
    let result = store
        .write(|work| work.unbind_from_milestone(m2, EntityKind::TestCase, &tc9))
        .expect("unbind last");
    assert_eq!(result.rejected, tc9);
}

#[test]
fn locked_milestones_refuse_new_bindings() {
    let (mut store, test_cases) = store_with_test_cases(50, 1);
    let locked = milestone(&mut store, "frozen", MilestoneStatus::Locked);
    let err = store
        .write(|work| {
            work.bind_to_milestone(
                locked,
                EntityKind::TestCase,
                &BTreeSet::from([test_cases[0]]),
            )
        })
        .expect_err("locked milestone");
    assert!(
        matches!(err, StoreError::MilestoneLocked { milestone_id } if milestone_id == locked),
        "{err:?}"
    );
}

#[test]
fn bulk_bind_and_unbind_run_in_batches() {
    let (mut store, test_cases) = store_with_test_cases(2, 5);
    let ids = test_cases.iter().copied().collect::<BTreeSet<_>>();
    let first = milestone(&mut store, "first", MilestoneStatus::InProgress);
    let second = milestone(&mut store, "second", MilestoneStatus::Draft);

    let mut requested = ids.clone();
    requested.insert(987_654);
    let result = store
        .write(|work| work.bind_to_milestone(first, EntityKind::TestCase, &requested))
        .expect("bind");
    assert_eq!(result.bound, ids);
    assert_eq!(result.unknown, BTreeSet::from([987_654]));

    let again = store
        .write(|work| work.bind_to_milestone(first, EntityKind::TestCase, &ids))
        .expect("rebind");
    assert!(again.bound.is_empty());
    assert_eq!(again.already_bound, ids);

    bind(&mut store, second, &ids);
    let result = store
        .write(|work| work.unbind_from_milestone(first, EntityKind::TestCase, &ids))
        .expect("unbind");
    assert_eq!(result.unbound, ids);
    assert!(result.rejected.is_empty());
    for test_case in &test_cases {
        assert_eq!(
            store
                .milestones_of(EntityKind::TestCase, *test_case)
                .expect("bindings"),
            BTreeSet::from([second])
        );
    }
}

#[test]
fn requirement_is_locked_by_any_of_its_versions() {
    let mut store = SqliteStore::open_in_memory(StoreConfig::default()).expect("open store");
    let (requirement, locked_version) = store
        .write(|work| {
            let project = work.create_project("Acme")?;
            let library_id = work.library_of(project.project_id, TreeKind::Requirement)?;
            let requirement = work
                .insert_node(NewNode {
                    tree_kind: TreeKind::Requirement,
                    parent: ParentRef::Library(library_id),
                    name: "REQ-1".to_string(),
                    kind: NodeKind::Leaf,
                })?
                .node_id;
            let locked_version = work.add_requirement_version(requirement)?;
            work.add_requirement_version(requirement)?;
            let planned = work.create_milestone("release", MilestoneStatus::Planned)?;
            work.bind_to_milestone(
                planned.milestone_id,
                EntityKind::RequirementVersion,
                &BTreeSet::from([locked_version]),
            )?;
            Ok((requirement, locked_version))
        })
        .expect("requirement");

    assert_eq!(
        store.requirement_versions(requirement).expect("versions").len(),
        2
    );
    let verdict = store
        .deletable_leaves(TreeKind::Requirement, &BTreeSet::from([requirement]))
        .expect("deletable leaves");
    assert_eq!(verdict.forbidden, BTreeSet::from([requirement]));
    assert_eq!(
        store
            .deletable_ids(
                EntityKind::RequirementVersion,
                &BTreeSet::from([locked_version])
            )
            .expect("deletable versions")
            .forbidden,
        BTreeSet::from([locked_version])
    );
}
