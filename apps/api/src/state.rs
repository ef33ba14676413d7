use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::ChatCompletion;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Chat-completion seam. Production wires `ChatClient`; tests can inject
    /// a scripted fake.
    pub chat: Arc<dyn ChatCompletion>,
    pub config: Config,
}
