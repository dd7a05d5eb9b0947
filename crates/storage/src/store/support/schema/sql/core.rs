#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE TABLE IF NOT EXISTS meta (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        -- Append-only audit trail of structural operations.
        CREATE TABLE IF NOT EXISTS events (
          seq INTEGER PRIMARY KEY AUTOINCREMENT,
          ts_ms INTEGER NOT NULL,
          type TEXT NOT NULL,
          payload_json TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS projects (
          project_id INTEGER PRIMARY KEY AUTOINCREMENT,
          name TEXT NOT NULL UNIQUE,
          created_at_ms INTEGER NOT NULL
        );

        -- Every ordered collection lives here. Positions are dense per scope.
        CREATE TABLE IF NOT EXISTS ordered_items (
          scope_kind TEXT NOT NULL,
          scope_id INTEGER NOT NULL,
          item_id INTEGER NOT NULL,
          position INTEGER NOT NULL CHECK (position >= 0),
          PRIMARY KEY (scope_kind, scope_id, item_id),
          UNIQUE (scope_kind, scope_id, position)
        );
"#;
