#![forbid(unsafe_code)]

use tm_core::model::{NodeKind, TreeKind};
use tm_storage::{NewNode, ParentRef, SqliteStore, StoreError};

fn insert(store: &mut SqliteStore, parent: ParentRef, name: &str, kind: NodeKind) -> i64 {
    store
        .write(|work| {
            work.insert_node(NewNode {
                tree_kind: TreeKind::Requirement,
                parent,
                name: name.to_string(),
                kind,
            })
        })
        .expect("insert node")
        .node_id
}

#[test]
fn rendered_paths_resolve_back_to_their_node() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut store = SqliteStore::open(dir.path()).expect("open store");
    let library_id = store
        .write(|work| {
            let project = work.create_project("Acme")?;
            work.library_of(project.project_id, TreeKind::Requirement)
        })
        .expect("library");

    let root = insert(&mut store, ParentRef::Library(library_id), "Root", NodeKind::Folder);
    let odd = insert(&mut store, ParentRef::Folder(root), "In/Out", NodeKind::Folder);
    let req = insert(&mut store, ParentRef::Folder(odd), "ReqY", NodeKind::Leaf);

    let path = store.path_of(TreeKind::Requirement, req).expect("path");
    assert_eq!(path.segments(), ["Acme", "Root", "In/Out", "ReqY"]);
    assert_eq!(path.render(), "/Acme/Root/In\\/Out/ReqY");

    assert_eq!(
        store
            .find_node_id_by_path(TreeKind::Requirement, &path.render())
            .expect("lookup"),
        Some(req)
    );
    assert_eq!(
        store
            .find_node_id_by_path(TreeKind::Requirement, "/Acme/Root")
            .expect("lookup folder"),
        Some(root)
    );
    assert_eq!(
        store
            .find_node_id_by_path(TreeKind::TestCase, &path.render())
            .expect("lookup in another tree"),
        None
    );
    assert_eq!(
        store
            .find_node_id_by_path(TreeKind::Requirement, "/Acme/Root/Missing")
            .expect("lookup missing"),
        None
    );
}

#[test]
fn names_ending_in_a_backslash_resolve_back() {
    let mut store = SqliteStore::open_in_memory(Default::default()).expect("open store");
    let library_id = store
        .write(|work| {
            let project = work.create_project("Acme")?;
            work.library_of(project.project_id, TreeKind::Requirement)
        })
        .expect("library");

    let dir = insert(&mut store, ParentRef::Library(library_id), r"dir\", NodeKind::Folder);
    let req = insert(&mut store, ParentRef::Folder(dir), "ReqY", NodeKind::Leaf);

    let rendered = store.path_of(TreeKind::Requirement, req).expect("path").render();
    assert_eq!(rendered, r"/Acme/dir\\/ReqY");
    assert_eq!(
        store
            .find_node_id_by_path(TreeKind::Requirement, &rendered)
            .expect("lookup"),
        Some(req)
    );
    assert_eq!(
        store
            .find_node_id_by_path(TreeKind::Requirement, r"/Acme/dir\\")
            .expect("lookup folder"),
        Some(dir)
    );
}

#[test]
fn malformed_paths_are_rejected() {
    let mut store = SqliteStore::open_in_memory(Default::default()).expect("open store");
    store
        .write(|work| work.create_project("Acme"))
        .expect("project");

    for raw in ["Acme/Root", "/Acme//Root", ""] {
        let err = store
            .find_node_id_by_path(TreeKind::TestCase, raw)
            .expect_err("malformed path");
        assert!(matches!(err, StoreError::InvalidInput(_)), "{raw}: {err:?}");
    }
}
