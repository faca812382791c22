//! Thin client for the library REST backend
//!
//! Adds the base URL, bearer token, locale and request id to every call,
//! and normalizes non-2xx responses into [`ApiError`]. It never caches:
//! staleness is the action layer's business.

pub mod error;
pub mod request;

use reqwest::{
    header::{ACCEPT_LANGUAGE, CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE},
    Client, Method, Response,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::BackendConfig;

pub use error::{ApiError, ErrorKind, FieldErrors, ResultCode};
pub use request::{
    CacheMode, Download, FormPayload, RequestBody, RequestOptions, ResponseType,
};

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ApiError::Encode(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<T, ApiError> {
        self.execute(Method::GET, path, RequestBody::Empty, options).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.execute(Method::POST, path, body, options).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.execute(Method::PUT, path, body, options).await
    }

    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.execute(Method::PATCH, path, body, options).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<T, ApiError> {
        self.execute(Method::DELETE, path, RequestBody::Empty, options).await
    }

    /// DELETE carrying `{ "ids": [...] }` in the body
    pub async fn delete_many<T: DeserializeOwned>(
        &self,
        path: &str,
        ids: &[String],
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.execute(Method::DELETE, path, RequestBody::Json(json!({ "ids": ids })), options)
            .await
    }

    /// Fetch a binary payload (exports)
    pub async fn download(&self, path: &str, options: RequestOptions) -> Result<Download, ApiError> {
        let response = self.send(Method::GET, path, RequestBody::Empty, options).await?;

        let headers = response.headers();
        let file_name = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(request::parse_content_disposition);
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        let bytes = response.bytes().await.map_err(ApiError::Network)?;

        Ok(Download {
            file_name,
            content_type,
            bytes,
        })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let response_type = options.response_type;
        let response = self.send(method, path, body, options).await?;
        let bytes = response.bytes().await.map_err(ApiError::Network)?;
        decode_body(&bytes, response_type)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> Result<Response, ApiError> {
        let url = self.url(path);
        let request_id = Uuid::new_v4();

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header("x-request-id", request_id.to_string());

        if let Some(token) = options.bearer.as_deref() {
            request = request.bearer_auth(token);
        }
        if let Some(locale) = options.locale.as_deref() {
            request = request.header(ACCEPT_LANGUAGE, locale);
        }
        if let Some(directive) = options.cache.header_value() {
            request = request.header(CACHE_CONTROL, directive);
        }
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }

        request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Multipart(payload) => request.multipart(payload.into_form()?),
        };

        tracing::debug!(%method, %url, %request_id, "Backend request");

        let response = request.send().await.map_err(|e| {
            tracing::warn!(%method, %url, %request_id, "Backend unreachable: {}", e);
            ApiError::Network(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let error = ApiError::from_response(status, &body);
        tracing::debug!(%method, %url, %request_id, kind = %error.kind(), "Backend error: {}", error);
        Err(error)
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn decode_body<T: DeserializeOwned>(bytes: &[u8], response_type: ResponseType) -> Result<T, ApiError> {
    let value = match response_type {
        ResponseType::Text => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ResponseType::Json if bytes.iter().all(u8::is_ascii_whitespace) => Value::Null,
        ResponseType::Json => {
            serde_json::from_slice(bytes).map_err(|e| ApiError::Decode(e.to_string()))?
        }
    };
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::IgnoredAny;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Created {
        id: String,
    }

    #[test]
    fn test_decode_empty_body_as_null() {
        let unit: () = decode_body(b"", ResponseType::Json).unwrap();
        assert_eq!(unit, ());
        let missing: Option<Created> = decode_body(b"  ", ResponseType::Json).unwrap();
        assert!(missing.is_none());
        let _: IgnoredAny = decode_body(b"", ResponseType::Json).unwrap();
    }

    #[test]
    fn test_decode_text_and_json() {
        let text: String = decode_body(b"Imported 3 rows", ResponseType::Text).unwrap();
        assert_eq!(text, "Imported 3 rows");
        let created: Created = decode_body(br#"{"id":"42"}"#, ResponseType::Json).unwrap();
        assert_eq!(created, Created { id: "42".to_string() });
        let err = decode_body::<Created>(b"<html>", ResponseType::Json).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownFailure);
    }

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new(&BackendConfig {
            base_url: "http://backend:8080/".to_string(),
            ..BackendConfig::default()
        })
        .unwrap();
        assert_eq!(client.url("/api/authors"), "http://backend:8080/api/authors");
        assert_eq!(client.url("api/authors"), "http://backend:8080/api/authors");
    }
}
