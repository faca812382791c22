//! Request-driven token rotation
//!
//! Runs on every hit of the token route. There is no timer: a pair is only
//! rotated when a caller asks for it and the access token is close to expiry.

use std::sync::Arc;

use crate::backend::{ApiClient, CacheMode, RequestBody, RequestOptions};

use super::token::{token_state, Clock, SystemClock, TokenPair, TokenState};

const REFRESH_PATH: &str = "/api/auth/refresh-token";

/// Outcome of a successful freshness check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refreshed {
    /// Far enough from expiry, passed through as-is
    Unchanged(TokenPair),
    /// Rotated by the backend; cookies must be overwritten
    Rotated(TokenPair),
}

#[derive(Clone)]
pub struct TokenRefresher {
    backend: ApiClient,
    threshold_seconds: i64,
    clock: Arc<dyn Clock>,
}

impl TokenRefresher {
    pub fn new(backend: ApiClient, threshold_seconds: i64) -> Self {
        Self {
            backend,
            threshold_seconds,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self, pair: &TokenPair) -> TokenState {
        token_state(&pair.access_token, self.clock.now_epoch_seconds(), self.threshold_seconds)
    }

    /// Pass the pair through, or rotate it if it is about to expire.
    ///
    /// `None` means the session is gone: the backend refused or could not
    /// be reached.
    pub async fn ensure_fresh(&self, pair: TokenPair) -> Option<Refreshed> {
        if self.state(&pair) == TokenState::Valid {
            return Some(Refreshed::Unchanged(pair));
        }

        tracing::debug!("Access token expiring soon, rotating");

        let body = match RequestBody::json(&pair) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Failed to encode refresh request: {}", e);
                return None;
            }
        };

        match self
            .backend
            .post::<TokenPair>(REFRESH_PATH, body, RequestOptions::new().cache(CacheMode::NoStore))
            .await
        {
            Ok(rotated) => {
                tracing::info!("Token pair rotated");
                Some(Refreshed::Rotated(rotated))
            }
            Err(e) => {
                tracing::warn!(kind = %e.kind(), "Token refresh failed: {}", e);
                None
            }
        }
    }
}
