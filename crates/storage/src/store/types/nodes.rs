#![forbid(unsafe_code)]

use tm_core::ids::{LibraryId, NodeId, ProjectId};
use tm_core::model::{NodeKind, Scope, ScopeKind, TreeKind};

/// Container a node hangs from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParentRef {
    Library(LibraryId),
    Folder(NodeId),
}

impl ParentRef {
    /// Content collection of this container.
    pub fn content_scope(self) -> Scope {
        match self {
            ParentRef::Library(library_id) => Scope::new(ScopeKind::LibraryContent, library_id),
            ParentRef::Folder(folder_id) => Scope::new(ScopeKind::FolderContent, folder_id),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewNode {
    pub tree_kind: TreeKind,
    pub parent: ParentRef,
    pub name: String,
    pub kind: NodeKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeRow {
    pub node_id: NodeId,
    pub tree_kind: TreeKind,
    pub library_id: LibraryId,
    pub parent_id: Option<NodeId>,
    pub name: String,
    pub kind: NodeKind,
}

impl NodeRow {
    pub fn parent_ref(&self) -> ParentRef {
        match self.parent_id {
            Some(folder_id) => ParentRef::Folder(folder_id),
            None => ParentRef::Library(self.library_id),
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectRow {
    pub project_id: ProjectId,
    pub name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LibraryRow {
    pub library_id: LibraryId,
    pub project_id: ProjectId,
    pub tree_kind: TreeKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClosureEdge {
    pub ancestor_id: NodeId,
    pub descendant_id: NodeId,
    pub depth: i64,
}
