#![forbid(unsafe_code)]

use std::collections::BTreeSet;
use tm_core::ids::{IterationId, LibraryId, NodeId, TestPlanItemId, TestSuiteId};
use tm_core::model::{EntityKind, MilestoneStatus, NodeKind, Scope, ScopeKind, TreeKind};
use tm_core::ordering::Placement;
use tm_storage::{NewNode, ParentRef, SqliteStore};

fn open_store() -> (tempfile::TempDir, SqliteStore) {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = SqliteStore::open(dir.path()).expect("open store");
    (dir, store)
}

fn libraries(store: &mut SqliteStore) -> (LibraryId, LibraryId, LibraryId) {
    store
        .write(|work| {
            let project = work.create_project("Acme")?;
            Ok((
                work.library_of(project.project_id, TreeKind::TestCase)?,
                work.library_of(project.project_id, TreeKind::Requirement)?,
                work.library_of(project.project_id, TreeKind::Campaign)?,
            ))
        })
        .expect("libraries")
}

fn insert(
    store: &mut SqliteStore,
    tree_kind: TreeKind,
    parent: ParentRef,
    name: &str,
    kind: NodeKind,
) -> NodeId {
    store
        .write(|work| {
            work.insert_node(NewNode {
                tree_kind,
                parent,
                name: name.to_string(),
                kind,
            })
        })
        .expect("insert node")
        .node_id
}

fn item_ids(placements: Vec<Placement>) -> Vec<i64> {
    placements
        .into_iter()
        .map(|placement| placement.item_id)
        .collect()
}

/// Folder F holding TC1..TC3, planned in campaign C1 and in iteration I1,
/// whose items all sit in suite S1.
struct Planned {
    folder: NodeId,
    test_cases: [NodeId; 3],
    campaign: NodeId,
    iteration: IterationId,
    suite: TestSuiteId,
    campaign_items: [TestPlanItemId; 3],
    iteration_items: [TestPlanItemId; 3],
}

fn planned(store: &mut SqliteStore) -> Planned {
    let (test_lib, _, campaign_lib) = libraries(store);
    let folder = insert(
        store,
        TreeKind::TestCase,
        ParentRef::Library(test_lib),
        "F",
        NodeKind::Folder,
    );
    let test_cases = ["TC1", "TC2", "TC3"].map(|name| {
        insert(
            store,
            TreeKind::TestCase,
            ParentRef::Folder(folder),
            name,
            NodeKind::Leaf,
        )
    });
    let campaign = insert(
        store,
        TreeKind::Campaign,
        ParentRef::Library(campaign_lib),
        "C1",
        NodeKind::Leaf,
    );

    store
        .write(|work| {
            let iteration = work.add_iteration(campaign, "I1")?.iteration_id;
            let suite = work.add_test_suite(iteration, "S1")?.suite_id;
            let mut campaign_items = [0; 3];
            let mut iteration_items = [0; 3];
            for (idx, test_case) in test_cases.iter().enumerate() {
                campaign_items[idx] = work
                    .add_campaign_test_plan_item(campaign, *test_case)?
                    .item_id;
                let item = work.add_iteration_test_plan_item(
                    iteration,
                    *test_case,
                    &format!("run {idx}"),
                )?;
                work.bind_item_to_suite(suite, item.item_id)?;
                iteration_items[idx] = item.item_id;
            }
            Ok(Planned {
                folder,
                test_cases,
                campaign,
                iteration,
                suite,
                campaign_items,
                iteration_items,
            })
        })
        .expect("plan test cases")
}

#[test]
fn executed_items_survive_with_a_null_test_case() {
    let (_dir, mut store) = open_store();
    let plan = planned(&mut store);
    let [tc1, tc2, tc3] = plan.test_cases;
    let executed = plan.iteration_items[1];
    store
        .write(|work| work.record_execution(executed, "PASSED"))
        .expect("record execution");

    let result = store
        .delete_nodes(TreeKind::TestCase, &BTreeSet::from([tc2]))
        .expect("delete test case");
    assert_eq!(result.deleted, BTreeSet::from([tc2]));
    assert_eq!(result.detached_test_plan_items, BTreeSet::from([executed]));

    let item = store
        .get_iteration_test_plan_item(executed)
        .expect("get item")
        .expect("executed item kept");
    assert_eq!(item.test_case_id, None);
    assert_eq!(store.execution_count(executed).expect("executions"), 1);

    assert_eq!(
        item_ids(
            store
                .list_scope(Scope::new(ScopeKind::IterationTestPlan, plan.iteration))
                .expect("iteration plan")
        ),
        plan.iteration_items.to_vec()
    );
    assert_eq!(
        item_ids(
            store
                .list_scope(Scope::new(ScopeKind::CampaignTestPlan, plan.campaign))
                .expect("campaign plan")
        ),
        vec![plan.campaign_items[0], plan.campaign_items[2]]
    );
    assert_eq!(
        store
            .list_scope(Scope::new(ScopeKind::FolderContent, plan.folder))
            .expect("folder content"),
        vec![Placement::new(tc1, 0), Placement::new(tc3, 1)]
    );
}

#[test]
fn unexecuted_items_leave_every_test_plan() {
    let (_dir, mut store) = open_store();
    let plan = planned(&mut store);
    let doomed = plan.test_cases[0];

    let result = store
        .delete_nodes(TreeKind::TestCase, &BTreeSet::from([doomed]))
        .expect("delete test case");
    assert!(result.detached_test_plan_items.is_empty());
    assert!(
        store
            .get_iteration_test_plan_item(plan.iteration_items[0])
            .expect("get item")
            .is_none()
    );

    let survivors = plan.iteration_items[1..].to_vec();
    for scope in [
        Scope::new(ScopeKind::IterationTestPlan, plan.iteration),
        Scope::new(ScopeKind::TestSuiteTestPlan, plan.suite),
    ] {
        let placements = store.list_scope(scope).expect("list scope");
        assert_eq!(
            placements,
            vec![
                Placement::new(survivors[0], 0),
                Placement::new(survivors[1], 1)
            ],
            "{scope:?}"
        );
    }
}

#[test]
fn deleting_a_folder_cascades_to_its_subtree() {
    let (_dir, mut store) = open_store();
    let (_, req_lib, _) = libraries(&mut store);
    let root = insert(
        &mut store,
        TreeKind::Requirement,
        ParentRef::Library(req_lib),
        "Root",
        NodeKind::Folder,
    );
    let folder_x = insert(
        &mut store,
        TreeKind::Requirement,
        ParentRef::Folder(root),
        "FolderX",
        NodeKind::Folder,
    );
    let req_y = insert(
        &mut store,
        TreeKind::Requirement,
        ParentRef::Folder(folder_x),
        "ReqY",
        NodeKind::Leaf,
    );
    let version = store
        .write(|work| work.add_requirement_version(req_y))
        .expect("version");

    let result = store
        .delete_nodes(TreeKind::Requirement, &BTreeSet::from([folder_x]))
        .expect("delete folder");
    assert_eq!(result.deleted, BTreeSet::from([folder_x, req_y]));
    assert!(result.skipped_milestone_locked.is_empty());

    assert!(store.get_node(TreeKind::Requirement, req_y).expect("get").is_none());
    assert!(store.requirement_versions(req_y).expect("versions").is_empty());
    assert!(
        store
            .milestones_of(EntityKind::RequirementVersion, version)
            .expect("bindings")
            .is_empty()
    );
    let edges = store.closure_edges(TreeKind::Requirement).expect("edges");
    assert!(edges.iter().all(|edge| edge.ancestor_id == root && edge.descendant_id == root));
    assert!(
        store
            .list_scope(Scope::new(ScopeKind::FolderContent, root))
            .expect("root content")
            .is_empty()
    );
}

#[test]
fn locked_leaves_keep_their_folders() {
    let (_dir, mut store) = open_store();
    let (_, req_lib, _) = libraries(&mut store);
    let root = insert(
        &mut store,
        TreeKind::Requirement,
        ParentRef::Library(req_lib),
        "Root",
        NodeKind::Folder,
    );
    let folder_x = insert(
        &mut store,
        TreeKind::Requirement,
        ParentRef::Folder(root),
        "FolderX",
        NodeKind::Folder,
    );
    let req_y = insert(
        &mut store,
        TreeKind::Requirement,
        ParentRef::Folder(folder_x),
        "ReqY",
        NodeKind::Leaf,
    );
    let req_z = insert(
        &mut store,
        TreeKind::Requirement,
        ParentRef::Folder(folder_x),
        "ReqZ",
        NodeKind::Leaf,
    );

    store
        .write(|work| {
            let version = work.add_requirement_version(req_y)?;
            work.add_requirement_version(req_z)?;
            let milestone = work.create_milestone("R1", MilestoneStatus::InProgress)?;
            work.bind_to_milestone(
                milestone.milestone_id,
                EntityKind::RequirementVersion,
                &BTreeSet::from([version]),
            )?;
            work.set_milestone_status(milestone.milestone_id, MilestoneStatus::Locked)
        })
        .expect("lock requirement");

    let result = store
        .delete_nodes(TreeKind::Requirement, &BTreeSet::from([folder_x]))
        .expect("delete folder");
    assert_eq!(result.deleted, BTreeSet::from([req_z]));
    assert_eq!(result.skipped_milestone_locked, BTreeSet::from([req_y]));
    assert_eq!(result.retained_ancestors, BTreeSet::from([folder_x]));

    assert_eq!(
        store.ancestors_of(TreeKind::Requirement, req_y).expect("ancestors"),
        vec![root, folder_x]
    );
    assert_eq!(
        store
            .list_scope(Scope::new(ScopeKind::FolderContent, folder_x))
            .expect("folder content"),
        vec![Placement::new(req_y, 0)]
    );
}

#[test]
fn repeated_deletion_is_a_noop() {
    let (_dir, mut store) = open_store();
    let plan = planned(&mut store);
    let ids = BTreeSet::from([plan.folder]);

    let first = store
        .delete_nodes(TreeKind::TestCase, &ids)
        .expect("first delete");
    let mut expected = BTreeSet::from(plan.test_cases);
    expected.insert(plan.folder);
    assert_eq!(first.deleted, expected);
    let events = store.list_events(10).expect("events");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, "nodes_deleted");

    let second = store
        .delete_nodes(TreeKind::TestCase, &ids)
        .expect("second delete");
    assert!(second.is_noop());
    assert_eq!(second.not_found, ids);
    assert_eq!(store.list_events(10).expect("events").len(), 1);
}

#[test]
fn deleting_a_campaign_purges_its_test_plans() {
    let (_dir, mut store) = open_store();
    let plan = planned(&mut store);
    store
        .write(|work| work.record_execution(plan.iteration_items[0], "FAILED"))
        .expect("record execution");

    let result = store
        .delete_nodes(TreeKind::Campaign, &BTreeSet::from([plan.campaign]))
        .expect("delete campaign");
    assert_eq!(result.deleted, BTreeSet::from([plan.campaign]));

    for item_id in plan.iteration_items {
        assert!(
            store
                .get_iteration_test_plan_item(item_id)
                .expect("get item")
                .is_none()
        );
        assert_eq!(store.execution_count(item_id).expect("executions"), 0);
    }
    for scope in [
        Scope::new(ScopeKind::CampaignTestPlan, plan.campaign),
        Scope::new(ScopeKind::IterationTestPlan, plan.iteration),
        Scope::new(ScopeKind::TestSuiteTestPlan, plan.suite),
    ] {
        assert!(store.list_scope(scope).expect("list").is_empty(), "{scope:?}");
    }
    for test_case in plan.test_cases {
        assert!(
            store
                .get_node(TreeKind::TestCase, test_case)
                .expect("get")
                .is_some()
        );
    }
}

#[test]
fn unknown_ids_are_reported_not_raised() {
    let (_dir, mut store) = open_store();
    let plan = planned(&mut store);
    let doomed = plan.test_cases[2];

    let result = store
        .delete_nodes(TreeKind::TestCase, &BTreeSet::from([doomed, 424_242]))
        .expect("delete");
    assert_eq!(result.deleted, BTreeSet::from([doomed]));
    assert_eq!(result.not_found, BTreeSet::from([424_242]));

    // Ids of another tree are unknown to this one.
    let result = store
        .delete_nodes(TreeKind::Requirement, &BTreeSet::from([plan.folder]))
        .expect("delete across trees");
    assert!(result.is_noop());
    assert_eq!(result.not_found, BTreeSet::from([plan.folder]));
}
