use crate::errors::AppError;
use crate::models::{DayRecord, LedgerData, Routine};
use crate::state::AppState;
use crate::storage;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub const PUSH_DEBOUNCE: Duration = Duration::from_secs(2);

const DEFAULT_ENDPOINT_PREFIX: &str = "https://script.google.com/macros/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    Idle,
    Syncing,
    Synced,
    Error,
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Done,
    Skipped,
    Failed,
}

#[derive(Debug, Deserialize)]
pub struct RemoteSnapshot {
    pub success: bool,
    #[serde(default)]
    pub routines: Vec<Routine>,
    #[serde(default)]
    pub records: BTreeMap<String, DayRecord>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PushAck {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct PushPayload<'a> {
    routines: &'a [Routine],
    records: &'a BTreeMap<String, DayRecord>,
}

#[derive(Debug, Serialize)]
pub struct SyncStatusResponse {
    pub state: SyncState,
    pub endpoint: Option<String>,
}

#[derive(Clone)]
pub struct SyncCoordinator {
    client: reqwest::Client,
    shared: Arc<SyncShared>,
}

struct SyncShared {
    endpoint: Mutex<Option<String>>,
    status: Mutex<SyncState>,
    busy: AtomicBool,
    debounce: Mutex<Option<JoinHandle<()>>>,
}

impl SyncCoordinator {
    pub fn new(endpoint: Option<String>) -> Self {
        let status = match endpoint {
            Some(_) => SyncState::Idle,
            None => SyncState::Disconnected,
        };
        Self {
            client: reqwest::Client::new(),
            shared: Arc::new(SyncShared {
                endpoint: Mutex::new(endpoint),
                status: Mutex::new(status),
                busy: AtomicBool::new(false),
                debounce: Mutex::new(None),
            }),
        }
    }

    pub async fn status(&self) -> SyncState {
        *self.shared.status.lock().await
    }

    pub async fn endpoint(&self) -> Option<String> {
        self.shared.endpoint.lock().await.clone()
    }

    async fn set_status(&self, status: SyncState) {
        *self.shared.status.lock().await = status;
    }

    fn try_begin(&self) -> bool {
        self.shared
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn end(&self) {
        self.shared.busy.store(false, Ordering::SeqCst);
    }
}

pub fn required_prefix() -> String {
    env::var("SYNC_ENDPOINT_PREFIX").unwrap_or_else(|_| DEFAULT_ENDPOINT_PREFIX.to_string())
}

/// Stores a validated endpoint, or clears the configuration when the
/// candidate is blank. A rejected candidate leaves the stored value alone.
pub async fn configure_endpoint(
    state: &AppState,
    candidate: &str,
) -> Result<Option<String>, AppError> {
    let candidate = candidate.trim();

    if candidate.is_empty() {
        storage::persist_endpoint(&state.paths, None).await?;
        *state.sync.shared.endpoint.lock().await = None;
        state.sync.set_status(SyncState::Disconnected).await;
        return Ok(None);
    }

    let prefix = required_prefix();
    if !candidate.starts_with(&prefix) {
        return Err(AppError::bad_request(format!(
            "sync endpoint must start with {prefix}"
        )));
    }

    storage::persist_endpoint(&state.paths, Some(candidate)).await?;
    *state.sync.shared.endpoint.lock().await = Some(candidate.to_string());
    state.sync.set_status(SyncState::Idle).await;
    Ok(Some(candidate.to_string()))
}

/// Remote routines replace the local collection wholesale when non-empty;
/// remote day records overwrite local ones per date key, local-only keys
/// are kept.
pub fn merge_remote(
    data: &mut LedgerData,
    routines: Vec<Routine>,
    records: BTreeMap<String, DayRecord>,
) {
    if !routines.is_empty() {
        data.routines = routines;
    }
    for (date_key, record) in records {
        data.records.insert(date_key, record);
    }
}

pub async fn pull(state: &AppState) -> SyncOutcome {
    let Some(endpoint) = state.sync.endpoint().await else {
        state.sync.set_status(SyncState::Disconnected).await;
        return SyncOutcome::Skipped;
    };
    if !state.sync.try_begin() {
        return SyncOutcome::Skipped;
    }
    state.sync.set_status(SyncState::Syncing).await;

    let outcome = match fetch_snapshot(&state.sync.client, &endpoint).await {
        Ok(snapshot) => {
            let mut data = state.data.lock().await;
            merge_remote(&mut data, snapshot.routines, snapshot.records);
            match storage::persist_ledger(&state.paths, &data).await {
                Ok(()) => SyncOutcome::Done,
                Err(err) => {
                    warn!("failed to persist pulled state: {}", err.message);
                    SyncOutcome::Failed
                }
            }
        }
        Err(reason) => {
            warn!("sync pull failed: {reason}");
            SyncOutcome::Failed
        }
    };

    state
        .sync
        .set_status(match outcome {
            SyncOutcome::Done => SyncState::Synced,
            _ => SyncState::Error,
        })
        .await;
    state.sync.end();

    if outcome == SyncOutcome::Done {
        info!("pulled remote state from {endpoint}");
    }
    outcome
}

pub async fn push(state: &AppState) -> SyncOutcome {
    let Some(endpoint) = state.sync.endpoint().await else {
        state.sync.set_status(SyncState::Disconnected).await;
        return SyncOutcome::Skipped;
    };
    if !state.sync.try_begin() {
        return SyncOutcome::Skipped;
    }
    state.sync.set_status(SyncState::Syncing).await;

    let body = {
        let data = state.data.lock().await;
        serde_json::to_string(&PushPayload {
            routines: &data.routines,
            records: &data.records,
        })
    };

    let outcome = match body {
        Ok(body) => match send_snapshot(&state.sync.client, &endpoint, body).await {
            Ok(()) => SyncOutcome::Done,
            Err(reason) => {
                warn!("sync push failed: {reason}");
                SyncOutcome::Failed
            }
        },
        Err(err) => {
            warn!("failed to serialize push payload: {err}");
            SyncOutcome::Failed
        }
    };

    state
        .sync
        .set_status(match outcome {
            SyncOutcome::Done => SyncState::Synced,
            _ => SyncState::Error,
        })
        .await;
    state.sync.end();
    outcome
}

/// Resets the 2s timer on every mutation, so only the last write of a burst
/// triggers an actual push.
pub async fn schedule_debounced_push(state: &AppState) {
    if state.sync.endpoint().await.is_none() {
        return;
    }

    let mut pending = state.sync.shared.debounce.lock().await;
    if let Some(task) = pending.take() {
        task.abort();
    }

    let state = state.clone();
    *pending = Some(tokio::spawn(async move {
        tokio::time::sleep(PUSH_DEBOUNCE).await;
        push(&state).await;
    }));
}

async fn fetch_snapshot(client: &reqwest::Client, endpoint: &str) -> Result<RemoteSnapshot, String> {
    let response = client
        .get(endpoint)
        .send()
        .await
        .map_err(|err| err.to_string())?;
    let snapshot: RemoteSnapshot = response.json().await.map_err(|err| err.to_string())?;
    if !snapshot.success {
        return Err(snapshot
            .error
            .unwrap_or_else(|| "remote reported failure".to_string()));
    }
    Ok(snapshot)
}

async fn send_snapshot(
    client: &reqwest::Client,
    endpoint: &str,
    body: String,
) -> Result<(), String> {
    let response = client
        .post(endpoint)
        .header(CONTENT_TYPE, "text/plain")
        .body(body)
        .send()
        .await
        .map_err(|err| err.to_string())?;
    let ack: PushAck = response.json().await.map_err(|err| err.to_string())?;
    if !ack.success {
        return Err(ack
            .error
            .unwrap_or_else(|| "remote reported failure".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use crate::storage::DataPaths;
    use chrono::Utc;
    use std::path::PathBuf;

    fn routine(id: &str, name: &str) -> Routine {
        Routine {
            id: id.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }

    fn record(entries: &[(&str, bool)]) -> DayRecord {
        entries
            .iter()
            .map(|(id, done)| (id.to_string(), *done))
            .collect()
    }

    async fn test_state() -> (AppState, PathBuf) {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut dir = std::env::temp_dir();
        dir.push(format!("habit_sync_{}_{}", std::process::id(), nanos));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let state = AppState::new(DataPaths::in_dir(&dir), LedgerData::default(), None);
        (state, dir)
    }

    #[test]
    fn merge_keeps_local_only_date_keys() {
        let mut data = LedgerData::default();
        data.records.insert("2024-01-01".to_string(), record(&[("r1", true)]));

        let mut remote = BTreeMap::new();
        remote.insert("2024-01-02".to_string(), record(&[("r1", false)]));
        merge_remote(&mut data, Vec::new(), remote);

        assert_eq!(data.records.len(), 2);
        assert_eq!(data.records["2024-01-01"]["r1"], true);
        assert_eq!(data.records["2024-01-02"]["r1"], false);
    }

    #[test]
    fn merge_overwrites_matching_date_keys_wholesale() {
        let mut data = LedgerData::default();
        data.records
            .insert("2024-01-01".to_string(), record(&[("r1", true), ("r2", true)]));

        let mut remote = BTreeMap::new();
        remote.insert("2024-01-01".to_string(), record(&[("r1", false)]));
        merge_remote(&mut data, Vec::new(), remote);

        let merged = &data.records["2024-01-01"];
        assert_eq!(merged["r1"], false);
        assert!(!merged.contains_key("r2"));
    }

    #[test]
    fn merge_replaces_routines_only_when_remote_has_some() {
        let mut data = LedgerData::default();
        data.routines.push(routine("local", "Local"));

        merge_remote(&mut data, Vec::new(), BTreeMap::new());
        assert_eq!(data.routines[0].id, "local");

        merge_remote(
            &mut data,
            vec![routine("remote-a", "A"), routine("remote-b", "B")],
            BTreeMap::new(),
        );
        let ids: Vec<&str> = data.routines.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["remote-a", "remote-b"]);
    }

    #[tokio::test]
    async fn configure_rejects_foreign_prefix_and_keeps_stored_value() {
        let (state, dir) = test_state().await;

        let valid = "https://script.google.com/macros/s/abc/exec";
        configure_endpoint(&state, valid).await.unwrap();
        assert_eq!(state.sync.endpoint().await.as_deref(), Some(valid));
        assert_eq!(state.sync.status().await, SyncState::Idle);

        let rejected = configure_endpoint(&state, "https://example.com/sync").await;
        assert!(rejected.is_err());
        assert_eq!(state.sync.endpoint().await.as_deref(), Some(valid));
        assert_eq!(storage::load_endpoint(&state.paths).await.as_deref(), Some(valid));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn blank_candidate_clears_configuration() {
        let (state, dir) = test_state().await;

        configure_endpoint(&state, "https://script.google.com/macros/s/abc/exec")
            .await
            .unwrap();
        let cleared = configure_endpoint(&state, "   ").await.unwrap();
        assert_eq!(cleared, None);
        assert_eq!(state.sync.endpoint().await, None);
        assert_eq!(state.sync.status().await, SyncState::Disconnected);
        assert_eq!(storage::load_endpoint(&state.paths).await, None);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn pull_without_endpoint_is_skipped() {
        let (state, dir) = test_state().await;

        assert_eq!(pull(&state).await, SyncOutcome::Skipped);
        assert_eq!(state.sync.status().await, SyncState::Disconnected);
        assert!(state.data.lock().await.routines.is_empty());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn second_sync_while_busy_is_dropped() {
        let (state, dir) = test_state().await;
        configure_endpoint(&state, "https://script.google.com/macros/s/abc/exec")
            .await
            .unwrap();

        assert!(state.sync.try_begin());
        assert_eq!(pull(&state).await, SyncOutcome::Skipped);
        assert_eq!(push(&state).await, SyncOutcome::Skipped);
        state.sync.end();

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
