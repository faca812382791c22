//! Elidune Admin Console
//!
//! Server tier of the library administration console. It owns the session
//! cookies and forwards every operator action to the library REST backend,
//! then invalidates the cached views the action made stale.

use std::sync::Arc;

pub mod actions;
pub mod api;
pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod realtime;
pub mod selection;
pub mod session;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use actions::ActionContext;
use backend::{ApiClient, ApiError};
use cache::PageCache;
use session::{SessionAccessor, TokenRefresher};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub backend: ApiClient,
    pub cache: Arc<PageCache>,
    pub refresher: TokenRefresher,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, ApiError> {
        let backend = ApiClient::new(&config.backend)?;
        let refresher = TokenRefresher::new(backend.clone(), config.session.refresh_threshold_seconds);
        let cache = PageCache::new(config.cache.max_entries);

        Ok(Self {
            config: Arc::new(config),
            backend,
            cache,
            refresher,
        })
    }

    /// Action context bound to the caller's session
    pub fn action_context(&self, session: &SessionAccessor) -> ActionContext {
        ActionContext::new(self.backend.clone(), self.cache.clone(), session.access_token())
            .with_locale(session.locale())
    }
}
