#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE TABLE IF NOT EXISTS libraries (
          library_id INTEGER PRIMARY KEY AUTOINCREMENT,
          project_id INTEGER NOT NULL REFERENCES projects(project_id),
          tree_kind TEXT NOT NULL,
          UNIQUE (project_id, tree_kind)
        );

        -- parent_id NULL means the node sits at the root of its library.
        CREATE TABLE IF NOT EXISTS nodes (
          node_id INTEGER PRIMARY KEY AUTOINCREMENT,
          tree_kind TEXT NOT NULL,
          library_id INTEGER NOT NULL REFERENCES libraries(library_id),
          parent_id INTEGER REFERENCES nodes(node_id),
          name TEXT NOT NULL,
          kind TEXT NOT NULL CHECK (kind IN ('folder', 'leaf')),
          created_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS node_closure (
          tree_kind TEXT NOT NULL,
          ancestor_id INTEGER NOT NULL REFERENCES nodes(node_id),
          descendant_id INTEGER NOT NULL REFERENCES nodes(node_id),
          depth INTEGER NOT NULL CHECK (depth >= 0),
          PRIMARY KEY (ancestor_id, descendant_id)
        );

        CREATE TABLE IF NOT EXISTS requirement_versions (
          version_id INTEGER PRIMARY KEY AUTOINCREMENT,
          requirement_id INTEGER NOT NULL REFERENCES nodes(node_id),
          version_number INTEGER NOT NULL,
          UNIQUE (requirement_id, version_number)
        );
"#;
