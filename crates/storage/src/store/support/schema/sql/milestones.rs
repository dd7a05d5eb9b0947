#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE TABLE IF NOT EXISTS milestones (
          milestone_id INTEGER PRIMARY KEY AUTOINCREMENT,
          label TEXT NOT NULL UNIQUE,
          status TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS milestone_bindings (
          milestone_id INTEGER NOT NULL REFERENCES milestones(milestone_id),
          entity_kind TEXT NOT NULL,
          entity_id INTEGER NOT NULL,
          PRIMARY KEY (milestone_id, entity_kind, entity_id)
        );
"#;
