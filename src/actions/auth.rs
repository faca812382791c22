//! Account actions: sign-in, sign-out, passwords and own profile

use crate::{
    cache::CacheTag,
    models::user::{ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, UpdateProfile, UserProfile},
    session::TokenPair,
};

use super::{validate, ActionContext, ActionResult, MessageResponse, Stale};

const LOGIN_PATH: &str = "/api/auth/login";
const LOGOUT_PATH: &str = "/api/auth/logout";
const CHANGE_PASSWORD_PATH: &str = "/api/auth/change-password";
const FORGOT_PASSWORD_PATH: &str = "/api/auth/forgot-password";
const PROFILE_PATH: &str = "/api/auth/me";

pub const PROFILE_VIEW: &str = "/views/profile";

/// Exchange credentials for a token pair. Storing it is the caller's job.
pub async fn login(ctx: &ActionContext, request: &LoginRequest) -> ActionResult<TokenPair> {
    if let Err(failure) = validate(request) {
        return failure.into();
    }
    let body = match ctx.json(request) {
        Ok(body) => body,
        Err(failure) => return failure.into(),
    };

    ctx.run(
        "auth.login",
        &[],
        ctx.backend().post::<TokenPair>(LOGIN_PATH, body, ctx.options()),
    )
    .await
}

/// Revoke the refresh token on the backend
pub async fn logout(ctx: &ActionContext, refresh_token: Option<&str>) -> ActionResult<()> {
    let body = match ctx.json(&serde_json::json!({ "refreshToken": refresh_token })) {
        Ok(body) => body,
        Err(failure) => return failure.into(),
    };

    ctx.run(
        "auth.logout",
        &[],
        ctx.backend()
            .post::<Option<MessageResponse>>(LOGOUT_PATH, body, ctx.options()),
    )
    .await
    .discard()
}

/// Set a new password with a reset token; answers the backend's message
pub async fn change_password(ctx: &ActionContext, request: &ChangePasswordRequest) -> ActionResult<String> {
    if let Err(failure) = validate(request) {
        return failure.into();
    }
    let body = match ctx.json(request) {
        Ok(body) => body,
        Err(failure) => return failure.into(),
    };

    ctx.run(
        "auth.change_password",
        &[],
        ctx.backend()
            .post::<Option<MessageResponse>>(CHANGE_PASSWORD_PATH, body, ctx.options()),
    )
    .await
    .map(|response| response.unwrap_or_default().message_or("Password changed"))
}

pub async fn forgot_password(ctx: &ActionContext, request: &ForgotPasswordRequest) -> ActionResult<String> {
    if let Err(failure) = validate(request) {
        return failure.into();
    }
    let body = match ctx.json(request) {
        Ok(body) => body,
        Err(failure) => return failure.into(),
    };

    ctx.run(
        "auth.forgot_password",
        &[],
        ctx.backend()
            .post::<Option<MessageResponse>>(FORGOT_PASSWORD_PATH, body, ctx.options()),
    )
    .await
    .map(|response| response.unwrap_or_default().message_or("Reset link sent"))
}

pub async fn update_profile(ctx: &ActionContext, update: &UpdateProfile) -> ActionResult<UserProfile> {
    if let Err(failure) = validate(update) {
        return failure.into();
    }
    let body = match ctx.json(update) {
        Ok(body) => body,
        Err(failure) => return failure.into(),
    };

    ctx.run(
        "auth.update_profile",
        &[Stale::Tag(CacheTag::Users), Stale::path(PROFILE_VIEW)],
        ctx.backend().put::<UserProfile>(PROFILE_PATH, body, ctx.options()),
    )
    .await
}
