use habit_tracker::storage::{self, DataPaths};
use habit_tracker::{AppState, router, sync};
use std::{env, net::SocketAddr};
use tokio::fs;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let data_dir = storage::resolve_data_dir();
    fs::create_dir_all(&data_dir).await?;
    let paths = DataPaths::in_dir(&data_dir);

    let data = storage::load_ledger(&paths).await;
    let endpoint = storage::load_endpoint(&paths).await;
    let state = AppState::new(paths, data, endpoint);

    // Best-effort: remote state may overwrite local blobs before serving.
    sync::pull(&state).await;

    let app = router(state);

    let port = env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
