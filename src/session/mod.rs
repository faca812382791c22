//! Session accessor: bearer token for outgoing calls and permission gating

pub mod cookies;
pub mod refresh;
pub mod token;

use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    backend::{ApiClient, CacheMode, RequestOptions},
    cache::CacheScope,
    config::SessionConfig,
    error::{AppError, AppResult},
    models::user::{Feature, UserProfile},
    AppState,
};

pub use refresh::{Refreshed, TokenRefresher};
pub use token::{TokenPair, TokenState};

const WHO_AM_I_PATH: &str = "/api/auth/me";

/// Request-scoped view of the caller's session cookies
#[derive(Clone)]
pub struct SessionAccessor {
    jar: CookieJar,
    backend: ApiClient,
    login_path: String,
    forbidden_path: String,
}

#[async_trait]
impl FromRequestParts<AppState> for SessionAccessor {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(SessionAccessor::new(jar, state.backend.clone(), &state.config.session))
    }
}

impl SessionAccessor {
    pub fn new(jar: CookieJar, backend: ApiClient, config: &SessionConfig) -> Self {
        Self {
            jar,
            backend,
            login_path: config.login_path.clone(),
            forbidden_path: config.forbidden_path.clone(),
        }
    }

    pub fn jar(&self) -> &CookieJar {
        &self.jar
    }

    /// Current access token, or an empty string for anonymous callers
    pub fn access_token(&self) -> String {
        cookies::access_token(&self.jar).unwrap_or_default()
    }

    pub fn tokens(&self) -> Option<TokenPair> {
        cookies::read_pair(&self.jar)
    }

    pub fn locale(&self) -> Option<String> {
        cookies::locale(&self.jar)
    }

    pub fn scope(&self) -> CacheScope {
        CacheScope::for_token(&self.access_token())
    }

    /// Options carrying this session's bearer token and locale
    pub fn request_options(&self) -> RequestOptions {
        RequestOptions::new()
            .bearer(self.access_token())
            .locale(self.locale())
    }

    /// Fetch the signed-in profile; any failure reads as anonymous
    pub async fn who_am_i(&self) -> Option<UserProfile> {
        if self.access_token().is_empty() {
            return None;
        }

        match self
            .backend
            .get::<UserProfile>(WHO_AM_I_PATH, self.request_options().cache(CacheMode::NoStore))
            .await
        {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::debug!(kind = %e.kind(), "whoami failed, treating caller as anonymous: {}", e);
                None
            }
        }
    }

    /// Gate a privileged read.
    ///
    /// Without a required feature this never fails. With one, anonymous
    /// callers are sent to the login page and callers lacking the feature
    /// to the forbidden page.
    pub async fn protect(&self, required: Option<Feature>) -> AppResult<Option<UserProfile>> {
        let Some(feature) = required else {
            return Ok(self.who_am_i().await);
        };

        let profile = self.who_am_i().await.ok_or_else(|| AppError::Unauthenticated {
            redirect: self.login_path.clone(),
        })?;

        if !profile.has_feature(&feature) {
            tracing::info!(user = %profile.id, %feature, "Access denied");
            return Err(AppError::Forbidden {
                redirect: self.forbidden_path.clone(),
                reason: format!("Missing permission for {}", feature),
            });
        }

        Ok(Some(profile))
    }
}
