#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE TABLE IF NOT EXISTS campaign_test_plan_items (
          item_id INTEGER PRIMARY KEY AUTOINCREMENT,
          campaign_id INTEGER NOT NULL REFERENCES nodes(node_id),
          test_case_id INTEGER NOT NULL REFERENCES nodes(node_id)
        );

        CREATE TABLE IF NOT EXISTS iterations (
          iteration_id INTEGER PRIMARY KEY AUTOINCREMENT,
          campaign_id INTEGER NOT NULL REFERENCES nodes(node_id),
          name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS test_suites (
          suite_id INTEGER PRIMARY KEY AUTOINCREMENT,
          iteration_id INTEGER NOT NULL REFERENCES iterations(iteration_id),
          name TEXT NOT NULL
        );

        -- test_case_id is nulled, not deleted, once the test case is gone and
        -- executions exist for the item.
        CREATE TABLE IF NOT EXISTS iteration_test_plan_items (
          item_id INTEGER PRIMARY KEY AUTOINCREMENT,
          iteration_id INTEGER NOT NULL REFERENCES iterations(iteration_id),
          test_case_id INTEGER REFERENCES nodes(node_id),
          label TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS executions (
          execution_id INTEGER PRIMARY KEY AUTOINCREMENT,
          item_id INTEGER NOT NULL REFERENCES iteration_test_plan_items(item_id),
          status TEXT NOT NULL,
          executed_at_ms INTEGER NOT NULL
        );
"#;
