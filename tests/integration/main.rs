//! Router-level tests against a mocked library backend

mod api_tests;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response},
    Router,
};
use chrono::Utc;
use elidune_admin::{
    api,
    config::{AppConfig, BackendConfig},
    AppState,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::MockServer;

/// State wired to `server` as its backend
pub fn state(server: &MockServer) -> AppState {
    let config = AppConfig {
        backend: BackendConfig {
            base_url: server.uri(),
            ..BackendConfig::default()
        },
        ..AppConfig::default()
    };
    AppState::new(config).unwrap()
}

/// Router wired to `server` as its backend
pub fn app(server: &MockServer) -> Router {
    api::router(state(server))
}

/// Signed access token expiring `seconds` from now
pub fn access_token(seconds: i64) -> String {
    encode(
        &Header::default(),
        &json!({ "sub": "u1", "exp": Utc::now().timestamp() + seconds }),
        &EncodingKey::from_secret(b"backend-secret"),
    )
    .unwrap()
}

pub fn session_cookie(access_token: &str) -> String {
    format!("accessToken={}; refreshToken=refresh-1", access_token)
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}
