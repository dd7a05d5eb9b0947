#![forbid(unsafe_code)]

use super::support::*;
use super::{
    ClosureEdge, LibraryRow, NewNode, NodeRow, ParentRef, ProjectRow, SqliteStore, StoreError,
    UnitOfWork,
};
use rusqlite::types::Value;
use rusqlite::{Connection, params};
use std::collections::BTreeSet;
use tm_core::ids::{LibraryId, NodeId, ProjectId};
use tm_core::model::TreeKind;
use tm_core::paths::NodePath;

/// Library and parent id a new child of `parent` gets.
fn resolve_parent(
    conn: &Connection,
    tree_kind: TreeKind,
    parent: ParentRef,
) -> Result<(LibraryId, Option<NodeId>), StoreError> {
    match parent {
        ParentRef::Library(library_id) => {
            let library = load_library(conn, library_id)?
                .ok_or(StoreError::not_found("library", library_id))?;
            if library.tree_kind != tree_kind {
                return Err(StoreError::InvalidInput(
                    "library belongs to another tree kind",
                ));
            }
            Ok((library_id, None))
        }
        ParentRef::Folder(folder_id) => {
            let folder = require_node(conn, tree_kind, folder_id)?;
            if !folder.is_folder() {
                return Err(StoreError::InvalidInput("parent is not a folder"));
            }
            Ok((folder.library_id, Some(folder_id)))
        }
    }
}

impl UnitOfWork<'_> {
    pub fn create_project(&mut self, name: &str) -> Result<ProjectRow, StoreError> {
        let name = validate_name(name)?;
        if find_project_by_name(&self.tx, &name)?.is_some() {
            return Err(StoreError::DuplicateName { name });
        }
        self.tx.execute(
            "INSERT INTO projects(name, created_at_ms) VALUES (?1, ?2)",
            params![name, now_ms()],
        )?;
        Ok(ProjectRow {
            project_id: self.tx.last_insert_rowid(),
            name,
        })
    }

    /// The project's library for `tree_kind`, created on first use.
    pub fn library_of(
        &mut self,
        project_id: ProjectId,
        tree_kind: TreeKind,
    ) -> Result<LibraryId, StoreError> {
        if load_project(&self.tx, project_id)?.is_none() {
            return Err(StoreError::not_found("project", project_id));
        }
        if let Some(library_id) = find_library(&self.tx, project_id, tree_kind)? {
            return Ok(library_id);
        }
        self.tx.execute(
            "INSERT INTO libraries(project_id, tree_kind) VALUES (?1, ?2)",
            params![project_id, tree_kind.as_str()],
        )?;
        Ok(self.tx.last_insert_rowid())
    }

    pub fn insert_node(&mut self, request: NewNode) -> Result<NodeRow, StoreError> {
        let name = validate_name(&request.name)?;
        let (library_id, parent_id) = resolve_parent(&self.tx, request.tree_kind, request.parent)?;
        ensure_name_free(&self.tx, library_id, parent_id, &name, None)?;

        self.tx.execute(
            "INSERT INTO nodes(tree_kind, library_id, parent_id, name, kind, created_at_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                request.tree_kind.as_str(),
                library_id,
                parent_id,
                name,
                request.kind.as_str(),
                now_ms(),
            ],
        )?;
        let node_id = self.tx.last_insert_rowid();
        closure_on_node_inserted_tx(&self.tx, request.tree_kind, node_id, parent_id)?;
        append_tx(&self.tx, request.parent.content_scope(), node_id)?;

        Ok(NodeRow {
            node_id,
            tree_kind: request.tree_kind,
            library_id,
            parent_id,
            name,
            kind: request.kind,
        })
    }

    pub fn rename_node(
        &mut self,
        tree_kind: TreeKind,
        node_id: NodeId,
        name: &str,
    ) -> Result<NodeRow, StoreError> {
        let mut node = require_node(&self.tx, tree_kind, node_id)?;
        let name = validate_name(name)?;
        if node.name == name {
            return Ok(node);
        }
        ensure_name_free(&self.tx, node.library_id, node.parent_id, &name, Some(node_id))?;
        self.tx.execute(
            "UPDATE nodes SET name=?2 WHERE node_id=?1",
            params![node_id, name],
        )?;
        node.name = name;
        Ok(node)
    }

    /// Moves `node_id` with its whole subtree under `new_parent`, appending it
    /// to the target container and compacting the one it left.
    pub fn move_node(
        &mut self,
        tree_kind: TreeKind,
        node_id: NodeId,
        new_parent: ParentRef,
    ) -> Result<NodeRow, StoreError> {
        let mut node = require_node(&self.tx, tree_kind, node_id)?;
        let (library_id, parent_id) = resolve_parent(&self.tx, tree_kind, new_parent)?;
        if node.parent_ref() == new_parent {
            return Ok(node);
        }

        let subtree = subtree_of(&self.tx, tree_kind, node_id)?;
        if parent_id.is_some_and(|parent_id| subtree.contains(&parent_id)) {
            return Err(StoreError::InvalidInput(
                "cannot move a node into its own subtree",
            ));
        }
        ensure_name_free(&self.tx, library_id, parent_id, &node.name, Some(node_id))?;

        let source = node.parent_ref().content_scope();
        reorder_after_removal_tx(
            &self.tx,
            source.kind,
            &BTreeSet::from([source.id]),
            &BTreeSet::from([node_id]),
        )?;

        self.tx.execute(
            "UPDATE nodes SET parent_id=?2, library_id=?3 WHERE node_id=?1",
            params![node_id, parent_id, library_id],
        )?;
        if library_id != node.library_id {
            execute_in(
                &self.tx,
                "UPDATE nodes SET library_id=? WHERE node_id IN ({ids})",
                &[Value::Integer(library_id)],
                &subtree,
            )?;
        }
        closure_reattach_subtree_tx(&self.tx, tree_kind, node_id, parent_id)?;
        append_tx(&self.tx, new_parent.content_scope(), node_id)?;

        tracing::debug!(
            tree_kind = tree_kind.as_str(),
            node_id,
            subtree = subtree.len(),
            "moved node"
        );
        node.library_id = library_id;
        node.parent_id = parent_id;
        Ok(node)
    }
}

impl SqliteStore {
    pub fn get_project(&self, project_id: ProjectId) -> Result<Option<ProjectRow>, StoreError> {
        load_project(&self.conn, project_id)
    }

    pub fn get_library(&self, library_id: LibraryId) -> Result<Option<LibraryRow>, StoreError> {
        load_library(&self.conn, library_id)
    }

    pub fn get_node(
        &self,
        tree_kind: TreeKind,
        node_id: NodeId,
    ) -> Result<Option<NodeRow>, StoreError> {
        load_node(&self.conn, tree_kind, node_id)
    }

    /// Proper ancestors of `node_id`, root first.
    pub fn ancestors_of(
        &self,
        tree_kind: TreeKind,
        node_id: NodeId,
    ) -> Result<Vec<NodeId>, StoreError> {
        require_node(&self.conn, tree_kind, node_id)?;
        ancestors_of(&self.conn, tree_kind, node_id)
    }

    /// Every node below any of `node_ids`.
    pub fn descendants_of(
        &self,
        tree_kind: TreeKind,
        node_ids: &BTreeSet<NodeId>,
    ) -> Result<BTreeSet<NodeId>, StoreError> {
        descendants_of(&self.conn, tree_kind, node_ids)
    }

    pub fn first_level_descendants_of(
        &self,
        tree_kind: TreeKind,
        node_ids: &BTreeSet<NodeId>,
    ) -> Result<BTreeSet<NodeId>, StoreError> {
        first_level_descendants_of(&self.conn, tree_kind, node_ids)
    }

    /// Project name followed by the names from the top-level node down to
    /// `node_id`.
    pub fn path_of(&self, tree_kind: TreeKind, node_id: NodeId) -> Result<NodePath, StoreError> {
        let node = require_node(&self.conn, tree_kind, node_id)?;
        let ancestors = ancestors_of(&self.conn, tree_kind, node_id)?;
        let mut named = load_nodes(
            &self.conn,
            tree_kind,
            &ancestors.iter().copied().collect::<BTreeSet<_>>(),
        )?;

        let library = load_library(&self.conn, node.library_id)?
            .ok_or(StoreError::not_found("library", node.library_id))?;
        let project = load_project(&self.conn, library.project_id)?
            .ok_or(StoreError::not_found("project", library.project_id))?;

        let mut segments = Vec::with_capacity(ancestors.len() + 2);
        segments.push(project.name);
        for ancestor_id in &ancestors {
            let ancestor = named
                .remove(ancestor_id)
                .ok_or(StoreError::not_found("node", *ancestor_id))?;
            segments.push(ancestor.name);
        }
        segments.push(node.name);
        NodePath::new(segments).map_err(|_| StoreError::InvalidInput("stored names form no path"))
    }

    /// Resolves a rendered path (`/Project/Folder/Leaf`) back to its node.
    pub fn find_node_id_by_path(
        &self,
        tree_kind: TreeKind,
        path: &str,
    ) -> Result<Option<NodeId>, StoreError> {
        let path = NodePath::parse(path).map_err(|_| StoreError::InvalidInput("malformed path"))?;
        if path.node_segments().is_empty() {
            return Ok(None);
        }
        let Some(project) = find_project_by_name(&self.conn, path.project())? else {
            return Ok(None);
        };
        let Some(library_id) = find_library(&self.conn, project.project_id, tree_kind)? else {
            return Ok(None);
        };

        let mut parent_id = None;
        for segment in path.node_segments() {
            match child_named(&self.conn, library_id, parent_id, segment)? {
                Some(node_id) => parent_id = Some(node_id),
                None => return Ok(None),
            }
        }
        Ok(parent_id)
    }

    pub fn closure_edges(&self, tree_kind: TreeKind) -> Result<Vec<ClosureEdge>, StoreError> {
        closure_edges(&self.conn, tree_kind)
    }
}
