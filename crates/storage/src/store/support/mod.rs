#![forbid(unsafe_code)]

mod closure_tx;
mod events_tx;
mod milestone_tx;
mod nodes_tx;
mod ordered_tx;
mod reorder_tx;
mod schema;
mod sql;
mod test_plan_tx;
mod time;

pub(super) use closure_tx::*;
pub(super) use events_tx::*;
pub(super) use milestone_tx::*;
pub(super) use nodes_tx::*;
pub(super) use ordered_tx::*;
pub(super) use reorder_tx::*;
pub(super) use schema::install_sqlite_schema;
pub(super) use sql::*;
pub(super) use test_plan_tx::*;
pub(super) use time::now_ms;
