//! Session endpoints: token rotation, sign-in, sign-out and own account

use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    actions::{auth, ActionResult},
    error::{AppError, AppResult},
    models::user::{ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, UpdateProfile, UserProfile},
    session::{cookies, Refreshed, SessionAccessor, TokenPair},
    AppState,
};

/// Current token pair, rotated when the access token is about to expire
///
/// Answers `null` when there is no session or the backend refused to
/// rotate it. A rotated pair also overwrites the session cookies.
#[utoipa::path(
    get,
    path = "/api/auth/token",
    tag = "auth",
    responses(
        (status = 200, description = "Current or rotated pair, null without a session", body = Option<TokenPair>)
    )
)]
pub async fn token(
    State(state): State<AppState>,
    session: SessionAccessor,
) -> (CookieJar, Json<Option<TokenPair>>) {
    let jar = session.jar().clone();

    let Some(pair) = session.tokens() else {
        return (jar, Json(None));
    };

    match state.refresher.ensure_fresh(pair).await {
        Some(Refreshed::Rotated(pair)) => {
            // reads cached under the old access token are unreachable now
            state.cache.evict_scope(&session.scope());
            let jar = cookies::store_pair(jar, &pair, state.config.session.secure_cookies);
            (jar, Json(Some(pair)))
        }
        Some(Refreshed::Unchanged(pair)) => (jar, Json(Some(pair))),
        None => (jar, Json(None)),
    }
}

/// Sign in; the token pair lands in http-only cookies, never in the body
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses((status = 200, description = "Action result without data"))
)]
pub async fn login(
    State(state): State<AppState>,
    session: SessionAccessor,
    Json(request): Json<LoginRequest>,
) -> (CookieJar, Json<ActionResult<()>>) {
    let ctx = state.action_context(&session);
    let jar = session.jar().clone();

    match auth::login(&ctx, &request).await {
        ActionResult::Success { data: Some(pair) } => {
            tracing::info!(account = request.account.as_str(), "Signed in");
            let jar = cookies::store_pair(jar, &pair, state.config.session.secure_cookies);
            (jar, Json(ActionResult::done()))
        }
        other => (jar, Json(other.discard())),
    }
}

/// Sign out: revoke on the backend when possible, always drop the cookies
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses((status = 200, description = "Signed out"))
)]
pub async fn logout(State(state): State<AppState>, session: SessionAccessor) -> (CookieJar, Json<ActionResult<()>>) {
    let ctx = state.action_context(&session);
    let refresh_token = session.tokens().map(|pair| pair.refresh_token);

    if let Some(failure) = auth::logout(&ctx, refresh_token.as_deref()).await.failure() {
        tracing::debug!(kind = %failure.error_kind, "Backend logout failed: {}", failure.message);
    }

    state.cache.evict_scope(&session.scope());
    (cookies::clear_pair(session.jar().clone()), Json(ActionResult::done()))
}

/// Signed-in profile
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = UserProfile),
        (status = 303, description = "Not signed in, redirected to the login page")
    )
)]
pub async fn me(State(state): State<AppState>, session: SessionAccessor) -> AppResult<Json<UserProfile>> {
    session.who_am_i().await.map(Json).ok_or_else(|| AppError::Unauthenticated {
        redirect: state.config.session.login_path.clone(),
    })
}

/// Update own profile
#[utoipa::path(
    put,
    path = "/api/auth/me",
    tag = "auth",
    request_body = UpdateProfile,
    responses((status = 200, description = "Action result carrying the updated profile"))
)]
pub async fn update_profile(
    State(state): State<AppState>,
    session: SessionAccessor,
    Json(update): Json<UpdateProfile>,
) -> Json<ActionResult<UserProfile>> {
    let ctx = state.action_context(&session);
    Json(auth::update_profile(&ctx, &update).await)
}

/// Set a new password with a reset token
#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    tag = "auth",
    request_body = ChangePasswordRequest,
    responses((status = 200, description = "Action result carrying the backend message"))
)]
pub async fn change_password(
    State(state): State<AppState>,
    session: SessionAccessor,
    Json(request): Json<ChangePasswordRequest>,
) -> Json<ActionResult<String>> {
    let ctx = state.action_context(&session);
    Json(auth::change_password(&ctx, &request).await)
}

/// Request a password reset link
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    tag = "auth",
    request_body = ForgotPasswordRequest,
    responses((status = 200, description = "Action result carrying the backend message"))
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    session: SessionAccessor,
    Json(request): Json<ForgotPasswordRequest>,
) -> Json<ActionResult<String>> {
    let ctx = state.action_context(&session);
    Json(auth::forgot_password(&ctx, &request).await)
}
