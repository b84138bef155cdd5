use crate::config::Config;
use reqwest::Client;
use std::sync::Arc;

/// Shared across requests: configuration and the HTTP connection pool.
/// Source tables are never stored here; each render loads its own.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: Client,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }
}
