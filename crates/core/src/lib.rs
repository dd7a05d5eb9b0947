#![forbid(unsafe_code)]

pub mod milestones;
pub mod ordering;

pub mod ids {
    pub type ProjectId = i64;
    pub type LibraryId = i64;
    pub type NodeId = i64;
    pub type MilestoneId = i64;
    pub type IterationId = i64;
    pub type TestSuiteId = i64;
    pub type TestPlanItemId = i64;
    pub type RequirementVersionId = i64;
    pub type ExecutionId = i64;
}

pub mod model {
    use thiserror::Error;

    #[derive(Clone, Debug, PartialEq, Eq, Error)]
    #[error("unknown {tag}: {value:?}")]
    pub struct UnknownTag {
        pub tag: &'static str,
        pub value: String,
    }

    impl UnknownTag {
        fn new(tag: &'static str, value: &str) -> Self {
            Self {
                tag,
                value: value.to_string(),
            }
        }
    }

    /// The three hierarchical domains, each with its own closure relation.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum TreeKind {
        TestCase,
        Requirement,
        Campaign,
    }

    impl TreeKind {
        pub const ALL: [TreeKind; 3] = [
            TreeKind::TestCase,
            TreeKind::Requirement,
            TreeKind::Campaign,
        ];

        pub fn as_str(self) -> &'static str {
            match self {
                TreeKind::TestCase => "test_case",
                TreeKind::Requirement => "requirement",
                TreeKind::Campaign => "campaign",
            }
        }

        pub fn parse(value: &str) -> Result<Self, UnknownTag> {
            match value {
                "test_case" => Ok(TreeKind::TestCase),
                "requirement" => Ok(TreeKind::Requirement),
                "campaign" => Ok(TreeKind::Campaign),
                other => Err(UnknownTag::new("tree kind", other)),
            }
        }

        /// Milestone-bound entity carried by the leaves of this tree.
        pub fn leaf_entity(self) -> EntityKind {
            match self {
                TreeKind::TestCase => EntityKind::TestCase,
                TreeKind::Requirement => EntityKind::RequirementVersion,
                TreeKind::Campaign => EntityKind::Campaign,
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub enum NodeKind {
        Folder,
        Leaf,
    }

    impl NodeKind {
        pub fn as_str(self) -> &'static str {
            match self {
                NodeKind::Folder => "folder",
                NodeKind::Leaf => "leaf",
            }
        }

        pub fn parse(value: &str) -> Result<Self, UnknownTag> {
            match value {
                "folder" => Ok(NodeKind::Folder),
                "leaf" => Ok(NodeKind::Leaf),
                other => Err(UnknownTag::new("node kind", other)),
            }
        }
    }

    /// Kind of parent context owning an ordered collection.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum ScopeKind {
        /// Top-level nodes of a library; scope id is the library id.
        LibraryContent,
        /// Children of a folder node; scope id is the folder node id.
        FolderContent,
        /// Scope id is the campaign node id.
        CampaignTestPlan,
        IterationTestPlan,
        /// Ordering over iteration test-plan items; scope id is the suite id.
        TestSuiteTestPlan,
    }

    impl ScopeKind {
        pub fn as_str(self) -> &'static str {
            match self {
                ScopeKind::LibraryContent => "library_content",
                ScopeKind::FolderContent => "folder_content",
                ScopeKind::CampaignTestPlan => "campaign_test_plan",
                ScopeKind::IterationTestPlan => "iteration_test_plan",
                ScopeKind::TestSuiteTestPlan => "test_suite_test_plan",
            }
        }

        pub fn parse(value: &str) -> Result<Self, UnknownTag> {
            match value {
                "library_content" => Ok(ScopeKind::LibraryContent),
                "folder_content" => Ok(ScopeKind::FolderContent),
                "campaign_test_plan" => Ok(ScopeKind::CampaignTestPlan),
                "iteration_test_plan" => Ok(ScopeKind::IterationTestPlan),
                "test_suite_test_plan" => Ok(ScopeKind::TestSuiteTestPlan),
                other => Err(UnknownTag::new("scope kind", other)),
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Scope {
        pub kind: ScopeKind,
        pub id: i64,
    }

    impl Scope {
        pub fn new(kind: ScopeKind, id: i64) -> Self {
            Self { kind, id }
        }
    }

    /// Versioned entity that can be bound to milestones.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum EntityKind {
        TestCase,
        RequirementVersion,
        Campaign,
    }

    impl EntityKind {
        pub fn as_str(self) -> &'static str {
            match self {
                EntityKind::TestCase => "test_case",
                EntityKind::RequirementVersion => "requirement_version",
                EntityKind::Campaign => "campaign",
            }
        }

        pub fn parse(value: &str) -> Result<Self, UnknownTag> {
            match value {
                "test_case" => Ok(EntityKind::TestCase),
                "requirement_version" => Ok(EntityKind::RequirementVersion),
                "campaign" => Ok(EntityKind::Campaign),
                other => Err(UnknownTag::new("entity kind", other)),
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub enum MilestoneStatus {
        Draft,
        InProgress,
        Planned,
        Locked,
        Finished,
        Deprecated,
    }

    impl MilestoneStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                MilestoneStatus::Draft => "DRAFT",
                MilestoneStatus::InProgress => "IN_PROGRESS",
                MilestoneStatus::Planned => "PLANNED",
                MilestoneStatus::Locked => "LOCKED",
                MilestoneStatus::Finished => "FINISHED",
                MilestoneStatus::Deprecated => "DEPRECATED",
            }
        }

        pub fn parse(value: &str) -> Result<Self, UnknownTag> {
            match value {
                "DRAFT" => Ok(MilestoneStatus::Draft),
                "IN_PROGRESS" => Ok(MilestoneStatus::InProgress),
                "PLANNED" => Ok(MilestoneStatus::Planned),
                "LOCKED" => Ok(MilestoneStatus::Locked),
                "FINISHED" => Ok(MilestoneStatus::Finished),
                "DEPRECATED" => Ok(MilestoneStatus::Deprecated),
                other => Err(UnknownTag::new("milestone status", other)),
            }
        }

        /// Bound entities may be neither deleted nor unbound while a milestone
        /// is in this status.
        pub fn forbids_mutation(self) -> bool {
            matches!(self, MilestoneStatus::Planned | MilestoneStatus::Locked)
        }

        pub fn accepts_bindings(self) -> bool {
            !matches!(self, MilestoneStatus::Locked)
        }
    }
}

pub mod paths {
    use thiserror::Error;

    const SEPARATOR: char = '/';
    const ESCAPE: char = '\\';

    /// Display path of a node: project name first, node name last.
    ///
    /// Rendered as `/Project/Folder/Leaf`; a `/` inside a name is written `\/`
    /// and a `\` is written `\\`.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct NodePath {
        segments: Vec<String>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Error)]
    pub enum NodePathError {
        #[error("path is empty")]
        Empty,
        #[error("path must start with '/'")]
        MissingLeadingSeparator,
        #[error("path contains an empty segment")]
        EmptySegment,
    }

    impl NodePath {
        pub fn new(segments: Vec<String>) -> Result<Self, NodePathError> {
            if segments.is_empty() {
                return Err(NodePathError::Empty);
            }
            if segments.iter().any(|segment| segment.is_empty()) {
                return Err(NodePathError::EmptySegment);
            }
            Ok(Self { segments })
        }

        pub fn segments(&self) -> &[String] {
            &self.segments
        }

        pub fn project(&self) -> &str {
            &self.segments[0]
        }

        /// Segments below the project name.
        pub fn node_segments(&self) -> &[String] {
            &self.segments[1..]
        }

        pub fn parse(value: &str) -> Result<Self, NodePathError> {
            let value = value.trim();
            if value.is_empty() {
                return Err(NodePathError::Empty);
            }
            let Some(rest) = value.strip_prefix(SEPARATOR) else {
                return Err(NodePathError::MissingLeadingSeparator);
            };

            let mut segments = Vec::new();
            let mut current = String::new();
            let mut chars = rest.chars().peekable();
            while let Some(ch) = chars.next() {
                match ch {
                    ESCAPE if matches!(chars.peek(), Some(&(SEPARATOR | ESCAPE))) => {
                        if let Some(escaped) = chars.next() {
                            current.push(escaped);
                        }
                    }
                    SEPARATOR => segments.push(std::mem::take(&mut current)),
                    other => current.push(other),
                }
            }
            segments.push(current);

            Self::new(segments)
        }

        pub fn render(&self) -> String {
            let mut out = String::new();
            for segment in &self.segments {
                out.push(SEPARATOR);
                for ch in segment.chars() {
                    if ch == SEPARATOR || ch == ESCAPE {
                        out.push(ESCAPE);
                    }
                    out.push(ch);
                }
            }
            out
        }
    }

    impl std::fmt::Display for NodePath {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.render())
        }
    }
}
