#![forbid(unsafe_code)]

use std::collections::BTreeSet;
use tm_core::ids::MilestoneId;
use tm_core::model::MilestoneStatus;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MilestoneRow {
    pub milestone_id: MilestoneId,
    pub label: String,
    pub status: MilestoneStatus,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BindResult {
    pub bound: BTreeSet<i64>,
    pub already_bound: BTreeSet<i64>,
    pub unknown: BTreeSet<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnbindResult {
    pub unbound: BTreeSet<i64>,
    pub rejected: BTreeSet<i64>,
}
