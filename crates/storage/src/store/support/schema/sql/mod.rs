#![forbid(unsafe_code)]

mod core;
mod indexes;
mod milestones;
mod pragmas;
mod test_plans;
mod trees;

pub(super) fn full_schema_sql() -> String {
    let mut sql = String::new();
    sql.push_str(pragmas::SQL);
    sql.push_str(core::SQL);
    sql.push_str(trees::SQL);
    sql.push_str(test_plans::SQL);
    sql.push_str(milestones::SQL);
    sql.push_str(indexes::SQL);
    sql
}
