pub mod app;
pub mod dates;
pub mod errors;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod progress;
pub mod state;
pub mod storage;
pub mod sync;

pub use app::router;
pub use state::AppState;
pub use storage::{DataPaths, load_ledger, resolve_data_dir};
