#![forbid(unsafe_code)]

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventRow {
    pub seq: i64,
    pub ts_ms: i64,
    pub event_type: String,
    pub payload_json: String,
}
