#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE UNIQUE INDEX IF NOT EXISTS idx_nodes_sibling_name ON nodes(library_id, COALESCE(parent_id, 0), name);
        CREATE INDEX IF NOT EXISTS idx_nodes_parent ON nodes(parent_id);
        CREATE INDEX IF NOT EXISTS idx_node_closure_descendant ON node_closure(descendant_id, depth);
        CREATE INDEX IF NOT EXISTS idx_node_closure_ancestor ON node_closure(tree_kind, ancestor_id, depth);
        CREATE INDEX IF NOT EXISTS idx_ordered_items_item ON ordered_items(scope_kind, item_id);
        CREATE INDEX IF NOT EXISTS idx_requirement_versions_owner ON requirement_versions(requirement_id);
        CREATE INDEX IF NOT EXISTS idx_ctpi_test_case ON campaign_test_plan_items(test_case_id);
        CREATE INDEX IF NOT EXISTS idx_ctpi_campaign ON campaign_test_plan_items(campaign_id);
        CREATE INDEX IF NOT EXISTS idx_iterations_campaign ON iterations(campaign_id);
        CREATE INDEX IF NOT EXISTS idx_test_suites_iteration ON test_suites(iteration_id);
        CREATE INDEX IF NOT EXISTS idx_itpi_test_case ON iteration_test_plan_items(test_case_id);
        CREATE INDEX IF NOT EXISTS idx_itpi_iteration ON iteration_test_plan_items(iteration_id);
        CREATE INDEX IF NOT EXISTS idx_executions_item ON executions(item_id);
        CREATE INDEX IF NOT EXISTS idx_milestone_bindings_entity ON milestone_bindings(entity_kind, entity_id);
"#;
