//! Application context - dependency injection container

use std::sync::Arc;

use tempolink_core::engine::SyncEngine;
use tempolink_core::ports::{CalendarApi, CredentialStore, TokenClient};
use tempolink_domain::{Config, Result};
use tempolink_infra::{
    GraphCalendarClient, HttpClientBuilder, IdentityClient, SqliteCredentialStore,
};

/// Application context holding the engine and configuration.
pub struct AppContext {
    pub config: Config,
    pub engine: Arc<SyncEngine>,
}

impl AppContext {
    /// Wire the production implementations: SQLite store, identity client,
    /// and Graph calendar client over one shared HTTP client.
    pub fn new(config: Config) -> Result<Arc<Self>> {
        let http = HttpClientBuilder::new().build()?;

        let store = Arc::new(SqliteCredentialStore::new(&config.database)?);
        let tokens = Arc::new(IdentityClient::new(http.clone(), config.oauth.clone()));
        let calendar = Arc::new(GraphCalendarClient::new(http));

        Ok(Self::from_parts(config, store, tokens, calendar))
    }

    /// Assemble a context from explicit port implementations. Tests use this
    /// to swap in mock servers or in-memory stores.
    pub fn from_parts(
        config: Config,
        store: Arc<dyn CredentialStore>,
        tokens: Arc<dyn TokenClient>,
        calendar: Arc<dyn CalendarApi>,
    ) -> Arc<Self> {
        let engine = Arc::new(SyncEngine::new(store, tokens, calendar));
        Arc::new(Self { config, engine })
    }
}
