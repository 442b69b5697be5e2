use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/routines",
            get(handlers::list_routines).post(handlers::add_routine),
        )
        .route(
            "/api/routines/:id",
            put(handlers::rename_routine).delete(handlers::delete_routine),
        )
        .route("/api/day", get(handlers::get_day))
        .route("/api/day/toggle", post(handlers::toggle_completion))
        .route("/api/view/prev", post(handlers::view_prev))
        .route("/api/view/next", post(handlers::view_next))
        .route("/api/view/select", post(handlers::view_select))
        .route("/api/grid", get(handlers::get_grid))
        .route("/api/sync/status", get(handlers::sync_status))
        .route("/api/sync/pull", post(handlers::sync_pull))
        .route("/api/sync/push", post(handlers::sync_push))
        .route("/api/sync/endpoint", put(handlers::set_endpoint))
        .with_state(state)
}
