use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type DayRecord = BTreeMap<String, bool>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Routine {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LedgerData {
    pub routines: Vec<Routine>,
    pub records: BTreeMap<String, DayRecord>,
}

#[derive(Debug, Deserialize)]
pub struct RoutineNameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub routine_id: String,
    pub done: bool,
}

#[derive(Debug, Deserialize)]
pub struct SelectDateRequest {
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct EndpointRequest {
    pub endpoint: String,
}

#[derive(Debug, Deserialize)]
pub struct GridQuery {
    pub anchor: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DayEntry {
    pub id: String,
    pub name: String,
    pub done: bool,
}

#[derive(Debug, Serialize)]
pub struct DayResponse {
    pub date: String,
    pub label: String,
    pub progress: u8,
    pub entries: Vec<DayEntry>,
}

#[derive(Debug, Serialize)]
pub struct GridCell {
    pub date: String,
    pub label: String,
    pub progress: u8,
    pub level: u8,
    pub future: bool,
}

#[derive(Debug, Serialize)]
pub struct MonthSpan {
    pub label: String,
    pub weeks: usize,
}

#[derive(Debug, Serialize)]
pub struct GridResponse {
    pub cells: Vec<GridCell>,
    pub months: Vec<MonthSpan>,
}
