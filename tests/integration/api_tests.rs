//! API integration tests

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use elidune_admin::api;
use serde_json::json;
use wiremock::matchers::{body_json, header as header_is, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::{access_token, app, get, json_body, post_json, send, session_cookie, set_cookies, state};

fn profile(features: &[&str]) -> serde_json::Value {
    json!({
        "id": "u1",
        "email": "ana@library.test",
        "firstName": "Ana",
        "role": "Employee",
        "features": features
    })
}

async fn mount_profile(server: &MockServer, features: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile(features)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_health_check() {
    let server = MockServer::start().await;
    let response = send(&app(&server), get("/health", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_token_route_without_session_is_null() {
    let server = MockServer::start().await;
    let response = send(&app(&server), get("/api/auth/token", Some("accessToken=only-access"))).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookies(&response).is_empty());
    assert_eq!(json_body(response).await, json!(null));
}

#[tokio::test]
async fn test_token_route_passes_fresh_pair_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let token = access_token(3600);
    let response = send(&app(&server), get("/api/auth/token", Some(&session_cookie(&token)))).await;

    assert!(set_cookies(&response).is_empty());
    assert_eq!(
        json_body(response).await,
        json!({ "accessToken": token, "refreshToken": "refresh-1" })
    );
}

#[tokio::test]
async fn test_token_route_rotates_expiring_pair() {
    let server = MockServer::start().await;
    let token = access_token(60);

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh-token"))
        .and(body_json(json!({ "accessToken": token, "refreshToken": "refresh-1" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "new-a", "refreshToken": "new-r" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = send(&app(&server), get("/api/auth/token", Some(&session_cookie(&token)))).await;

    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("accessToken=new-a")));
    assert!(cookies.iter().any(|c| c.starts_with("refreshToken=new-r")));
    assert!(cookies.iter().all(|c| c.contains("HttpOnly")));
    assert_eq!(
        json_body(response).await,
        json!({ "accessToken": "new-a", "refreshToken": "new-r" })
    );
}

#[tokio::test]
async fn test_token_route_refresh_refused_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Refresh token revoked" })))
        .mount(&server)
        .await;

    let token = access_token(10);
    let response = send(&app(&server), get("/api/auth/token", Some(&session_cookie(&token)))).await;

    assert!(set_cookies(&response).is_empty());
    assert_eq!(json_body(response).await, json!(null));
}

#[tokio::test]
async fn test_login_sets_cookies_not_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "acc", "refreshToken": "ref" })),
        )
        .mount(&server)
        .await;

    let response = send(
        &app(&server),
        post_json(
            "/api/auth/login",
            None,
            json!({ "email": "ana@library.test", "password": "secret" }),
        ),
    )
    .await;

    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("accessToken=acc")));
    assert!(cookies.iter().any(|c| c.starts_with("refreshToken=ref")));
    assert_eq!(json_body(response).await, json!({ "isSuccess": true }));
}

#[tokio::test]
async fn test_logout_clears_cookies_even_if_backend_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let token = access_token(3600);
    let response = send(
        &app(&server),
        post_json("/api/auth/logout", Some(&session_cookie(&token)), json!({})),
    )
    .await;

    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
    assert_eq!(json_body(response).await, json!({ "isSuccess": true }));
}

#[tokio::test]
async fn test_view_redirects_anonymous_caller_to_login() {
    let server = MockServer::start().await;
    let response = send(&app(&server), get("/views/authors", None)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn test_view_redirects_caller_without_feature() {
    let server = MockServer::start().await;
    mount_profile(&server, &["Book"]).await;
    Mock::given(method("GET"))
        .and(path("/api/fines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let token = access_token(3600);
    let response = send(&app(&server), get("/views/fines", Some(&session_cookie(&token)))).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/forbidden");
}

#[tokio::test]
async fn test_unknown_view_is_not_found() {
    let server = MockServer::start().await;
    let response = send(&app(&server), get("/views/reports", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_action_invalidates_cached_view() {
    let server = MockServer::start().await;
    mount_profile(&server, &["Category"]).await;

    let token = access_token(3600);
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .and(header_is("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1, "name": "Novels" }])))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/categories"))
        .and(body_json(json!({ "name": "Poetry" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 7 })))
        .expect(1)
        .mount(&server)
        .await;

    let app = app(&server);
    let cookie = session_cookie(&token);

    // second read is a cache hit
    for _ in 0..2 {
        let response = send(&app, get("/views/categories", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await[0]["name"], "Novels");
    }

    let response = send(&app, post_json("/actions/categories", Some(&cookie), json!({ "name": "Poetry" }))).await;
    assert_eq!(
        json_body(response).await,
        json!({ "isSuccess": true, "data": { "id": "7" } })
    );

    // invalidated by the action, fetched again
    let response = send(&app, get("/views/categories", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_empty_bulk_selection_never_reaches_backend() {
    let server = MockServer::start().await;
    let token = access_token(3600);

    let response = send(
        &app(&server),
        post_json("/actions/authors/delete-range", Some(&session_cookie(&token)), json!({ "ids": [] })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["isSuccess"], false);
    assert_eq!(body["errorKind"], "validation-failure");
    assert!(body["fieldErrors"]["ids"].is_array());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_backend_refusal_is_an_action_failure() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/notifications/n-1/read"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "message": "Not your notification" })))
        .mount(&server)
        .await;

    let token = access_token(3600);
    let response = send(
        &app(&server),
        post_json("/actions/notifications/n-1/read", Some(&session_cookie(&token)), json!({})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "isSuccess": false,
            "errorKind": "authorization-failure",
            "message": "Not your notification"
        })
    );
}

#[tokio::test]
async fn test_export_is_an_attachment() {
    let server = MockServer::start().await;
    mount_profile(&server, &["Book"]).await;
    Mock::given(method("GET"))
        .and(path("/api/books/export"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-disposition", "attachment; filename=\"books-2026.csv\"")
                .set_body_raw(b"isbn,title\n".to_vec(), "text/csv"),
        )
        .mount(&server)
        .await;

    let token = access_token(3600);
    let response = send(&app(&server), get("/exports/books", Some(&session_cookie(&token)))).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"books-2026.csv\""
    );
}

#[tokio::test]
async fn test_events_require_a_session() {
    let server = MockServer::start().await;
    let response = send(&app(&server), get("/events", None)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn test_token_rotation_drops_reads_cached_under_old_token() {
    let server = MockServer::start().await;
    mount_profile(&server, &["Category"]).await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "new-a", "refreshToken": "new-r" })),
        )
        .mount(&server)
        .await;

    let state = state(&server);
    let app = api::router(state.clone());
    let cookie = session_cookie(&access_token(60));

    let response = send(&app, get("/views/categories", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.cache.len(), 1);

    let response = send(&app, get("/api/auth/token", Some(&cookie))).await;
    assert_eq!(json_body(response).await["accessToken"], "new-a");
    assert!(state.cache.is_empty());
}

#[tokio::test]
async fn test_large_import_upload_reaches_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/authors/import"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Imported" })))
        .expect(1)
        .mount(&server)
        .await;

    let boundary = "elidune-upload";
    let mut body = format!(
        "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"authors.csv\"\r\nContent-Type: text/csv\r\n\r\n",
        boundary
    )
    .into_bytes();
    body.extend(std::iter::repeat(b'a').take(3 * 1024 * 1024));
    body.extend(format!("\r\n--{}--\r\n", boundary).into_bytes());

    let request = Request::post("/actions/authors/import")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
        .header(header::COOKIE, session_cookie(&access_token(3600)))
        .body(Body::from(body))
        .unwrap();
    let response = send(&app(&server), request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "isSuccess": true, "data": { "status": "completed", "message": "Imported" } })
    );
}
