use crate::dates::{canonical_key, display_label};
use crate::errors::AppError;
use crate::models::{
    DayEntry, DayResponse, EndpointRequest, GridQuery, GridResponse, LedgerData, Routine,
    RoutineNameRequest, SelectDateRequest, ToggleRequest,
};
use crate::progress::{build_year_grid, day_progress, month_spans};
use crate::state::AppState;
use crate::storage;
use crate::sync::{self, SyncStatusResponse};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{Duration, Local, NaiveDate};

pub async fn list_routines(State(state): State<AppState>) -> Json<Vec<Routine>> {
    let data = state.data.lock().await;
    Json(data.routines.clone())
}

pub async fn add_routine(
    State(state): State<AppState>,
    Json(payload): Json<RoutineNameRequest>,
) -> Result<Json<Routine>, AppError> {
    let mut data = state.data.lock().await;
    let Some(routine) = data.add_routine(&payload.name) else {
        return Err(AppError::bad_request("routine name must not be empty"));
    };
    storage::persist_routines(&state.paths, &data.routines).await?;
    drop(data);

    sync::schedule_debounced_push(&state).await;
    Ok(Json(routine))
}

pub async fn rename_routine(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<RoutineNameRequest>,
) -> Result<Json<Vec<Routine>>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::bad_request("routine name must not be empty"));
    }

    let mut data = state.data.lock().await;
    let renamed = data.rename_routine(&id, &payload.name);
    if renamed {
        storage::persist_routines(&state.paths, &data.routines).await?;
    }
    let routines = data.routines.clone();
    drop(data);

    if renamed {
        sync::schedule_debounced_push(&state).await;
    }
    Ok(Json(routines))
}

pub async fn delete_routine(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Routine>>, AppError> {
    let mut data = state.data.lock().await;
    let deleted = data.delete_routine(&id);
    if deleted {
        storage::persist_ledger(&state.paths, &data).await?;
    }
    let routines = data.routines.clone();
    drop(data);

    if deleted {
        sync::schedule_debounced_push(&state).await;
    }
    Ok(Json(routines))
}

pub async fn get_day(State(state): State<AppState>) -> Json<DayResponse> {
    let date = *state.view_date.lock().await;
    let data = state.data.lock().await;
    Json(day_response(&data, date))
}

pub async fn toggle_completion(
    State(state): State<AppState>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<DayResponse>, AppError> {
    let date = *state.view_date.lock().await;
    let mut data = state.data.lock().await;
    data.set_completion(date, &payload.routine_id, payload.done);
    storage::persist_records(&state.paths, &data.records).await?;
    let response = day_response(&data, date);
    drop(data);

    sync::schedule_debounced_push(&state).await;
    Ok(Json(response))
}

pub async fn view_prev(State(state): State<AppState>) -> Json<DayResponse> {
    shift_view(&state, -1).await
}

pub async fn view_next(State(state): State<AppState>) -> Json<DayResponse> {
    shift_view(&state, 1).await
}

pub async fn view_select(
    State(state): State<AppState>,
    Json(payload): Json<SelectDateRequest>,
) -> Result<Json<DayResponse>, AppError> {
    let date = parse_date_key(&payload.date)?;
    *state.view_date.lock().await = date;

    let data = state.data.lock().await;
    Ok(Json(day_response(&data, date)))
}

pub async fn get_grid(
    State(state): State<AppState>,
    Query(query): Query<GridQuery>,
) -> Result<Json<GridResponse>, AppError> {
    let today = Local::now().date_naive();
    let anchor = match query.anchor.as_deref() {
        Some(raw) => parse_date_key(raw)?,
        None => today - Duration::days(364),
    };

    let data = state.data.lock().await;
    Ok(Json(GridResponse {
        cells: build_year_grid(&data, anchor, today),
        months: month_spans(anchor, today),
    }))
}

pub async fn sync_status(State(state): State<AppState>) -> Json<SyncStatusResponse> {
    Json(status_response(&state).await)
}

pub async fn sync_pull(State(state): State<AppState>) -> Json<SyncStatusResponse> {
    sync::pull(&state).await;
    Json(status_response(&state).await)
}

pub async fn sync_push(State(state): State<AppState>) -> Json<SyncStatusResponse> {
    sync::push(&state).await;
    Json(status_response(&state).await)
}

pub async fn set_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<EndpointRequest>,
) -> Result<Json<SyncStatusResponse>, AppError> {
    sync::configure_endpoint(&state, &payload.endpoint).await?;
    Ok(Json(status_response(&state).await))
}

async fn status_response(state: &AppState) -> SyncStatusResponse {
    SyncStatusResponse {
        state: state.sync.status().await,
        endpoint: state.sync.endpoint().await,
    }
}

async fn shift_view(state: &AppState, days: i64) -> Json<DayResponse> {
    let mut view = state.view_date.lock().await;
    *view += Duration::days(days);
    let date = *view;
    drop(view);

    let data = state.data.lock().await;
    Json(day_response(&data, date))
}

fn day_response(data: &LedgerData, date: NaiveDate) -> DayResponse {
    let entries = data
        .routines
        .iter()
        .map(|routine| DayEntry {
            id: routine.id.clone(),
            name: routine.name.clone(),
            done: data.get_completion(date, &routine.id),
        })
        .collect();

    DayResponse {
        date: canonical_key(date),
        label: display_label(date),
        progress: day_progress(data, date),
        entries,
    }
}

fn parse_date_key(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::bad_request("date must be formatted as YYYY-MM-DD"))
}
