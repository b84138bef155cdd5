pub mod aggregate;
pub mod app;
pub mod config;
pub mod errors;
pub mod forecast;
pub mod format;
pub mod handlers;
pub mod loader;
pub mod models;
pub mod state;
pub mod stats;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
