use crate::models::LedgerData;
use crate::storage::DataPaths;
use crate::sync::SyncCoordinator;
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<DataPaths>,
    pub data: Arc<Mutex<LedgerData>>,
    pub view_date: Arc<Mutex<NaiveDate>>,
    pub sync: SyncCoordinator,
}

impl AppState {
    pub fn new(paths: DataPaths, data: LedgerData, endpoint: Option<String>) -> Self {
        Self {
            paths: Arc::new(paths),
            data: Arc::new(Mutex::new(data)),
            view_date: Arc::new(Mutex::new(Local::now().date_naive())),
            sync: SyncCoordinator::new(endpoint),
        }
    }
}
