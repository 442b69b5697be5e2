use crate::errors::AppError;
use crate::models::{DayRecord, LedgerData, Routine};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::error;

#[derive(Debug, Clone)]
pub struct DataPaths {
    pub routines: PathBuf,
    pub records: PathBuf,
    pub endpoint: PathBuf,
}

impl DataPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            routines: dir.join("routines.json"),
            records: dir.join("records.json"),
            endpoint: dir.join("endpoint.txt"),
        }
    }
}

pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = env::var("APP_DATA_DIR") {
        return PathBuf::from(dir);
    }

    PathBuf::from("data")
}

pub async fn load_ledger(paths: &DataPaths) -> LedgerData {
    LedgerData {
        routines: load_blob(&paths.routines).await,
        records: load_blob(&paths.records).await,
    }
}

async fn load_blob<T: DeserializeOwned + Default>(path: &Path) -> T {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(err) => {
                error!("failed to parse {}: {err}", path.display());
                T::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => T::default(),
        Err(err) => {
            error!("failed to read {}: {err}", path.display());
            T::default()
        }
    }
}

async fn persist_blob<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(value).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}

pub async fn persist_routines(paths: &DataPaths, routines: &[Routine]) -> Result<(), AppError> {
    persist_blob(&paths.routines, &routines).await
}

pub async fn persist_records(
    paths: &DataPaths,
    records: &BTreeMap<String, DayRecord>,
) -> Result<(), AppError> {
    persist_blob(&paths.records, records).await
}

pub async fn persist_ledger(paths: &DataPaths, data: &LedgerData) -> Result<(), AppError> {
    persist_routines(paths, &data.routines).await?;
    persist_records(paths, &data.records).await?;
    Ok(())
}

pub async fn load_endpoint(paths: &DataPaths) -> Option<String> {
    match fs::read_to_string(&paths.endpoint).await {
        Ok(contents) => {
            let endpoint = contents.trim();
            if endpoint.is_empty() {
                None
            } else {
                Some(endpoint.to_string())
            }
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => {
            error!("failed to read {}: {err}", paths.endpoint.display());
            None
        }
    }
}

pub async fn persist_endpoint(paths: &DataPaths, endpoint: Option<&str>) -> Result<(), AppError> {
    match endpoint {
        Some(endpoint) => fs::write(&paths.endpoint, endpoint)
            .await
            .map_err(AppError::internal),
        None => match fs::remove_file(&paths.endpoint).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AppError::internal(err)),
        },
    }
}
