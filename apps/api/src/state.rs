use std::sync::Arc;

use sqlx::PgPool;

use crate::cache::SessionCache;
use crate::catalog::UniversityCatalog;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Refresh tokens and login throttling. Redis by default, `DisabledCache` when unreachable.
    pub cache: Arc<dyn SessionCache>,
    pub config: Config,
    /// Static establishment/department/program data, parsed once at startup.
    pub catalog: Arc<UniversityCatalog>,
}
