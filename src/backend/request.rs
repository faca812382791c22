//! Request bodies and per-call options for the backend client

use axum::body::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;

use super::error::ApiError;

/// Body sent with a backend request
#[derive(Debug)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(FormPayload),
}

impl RequestBody {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ApiError> {
        serde_json::to_value(value)
            .map(RequestBody::Json)
            .map_err(|e| ApiError::Encode(e.to_string()))
    }
}

/// Owned multipart form, buffered so it can be inspected and forwarded
#[derive(Debug, Clone, Default)]
pub struct FormPayload {
    pub fields: Vec<FormField>,
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub value: FormValue,
}

#[derive(Debug, Clone)]
pub enum FormValue {
    Text(String),
    File {
        file_name: String,
        content_type: Option<String>,
        bytes: Bytes,
    },
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(FormField {
            name: name.into(),
            value: FormValue::Text(value.into()),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: Option<String>,
        bytes: Bytes,
    ) -> Self {
        self.fields.push(FormField {
            name: name.into(),
            value: FormValue::File {
                file_name: file_name.into(),
                content_type,
                bytes,
            },
        });
        self
    }

    /// Text value of the first field with this name
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|field| match &field.value {
            FormValue::Text(value) if field.name == name => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.fields
            .iter()
            .any(|field| field.name == name && matches!(field.value, FormValue::File { .. }))
    }

    pub fn into_form(self) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for field in self.fields {
            form = match field.value {
                FormValue::Text(value) => form.text(field.name, value),
                FormValue::File {
                    file_name,
                    content_type,
                    bytes,
                } => {
                    let mut part = Part::bytes(bytes.to_vec()).file_name(file_name);
                    if let Some(mime) = content_type {
                        part = part
                            .mime_str(&mime)
                            .map_err(|e| ApiError::Encode(format!("invalid content type {}: {}", mime, e)))?;
                    }
                    form.part(field.name, part)
                }
            };
        }
        Ok(form)
    }
}

/// How a successful body is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseType {
    #[default]
    Json,
    Text,
}

/// Cache directive forwarded to the backend; the client never caches itself
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheMode {
    #[default]
    Default,
    NoStore,
}

impl CacheMode {
    pub fn header_value(&self) -> Option<&'static str> {
        match self {
            CacheMode::Default => None,
            CacheMode::NoStore => Some("no-store"),
        }
    }
}

/// Per-request options bag
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub bearer: Option<String>,
    pub locale: Option<String>,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub response_type: ResponseType,
    pub cache: CacheMode,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a bearer token; empty tokens are ignored
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.bearer = (!token.is_empty()).then_some(token);
        self
    }

    pub fn locale(mut self, locale: Option<String>) -> Self {
        self.locale = locale;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    pub fn cache(mut self, cache: CacheMode) -> Self {
        self.cache = cache;
        self
    }
}

/// Binary payload fetched for an export
#[derive(Debug, Clone)]
pub struct Download {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Extract the file name from a `Content-Disposition` header value
pub fn parse_content_disposition(value: &str) -> Option<String> {
    let mut plain = None;
    for param in value.split(';').map(str::trim) {
        if let Some(encoded) = param.strip_prefix("filename*=") {
            // RFC 5987: charset'lang'value
            let name = encoded.splitn(3, '\'').nth(2).unwrap_or(encoded);
            return Some(percent_decode(name.trim_matches('"')));
        }
        if let Some(name) = param.strip_prefix("filename=") {
            plain = Some(name.trim_matches('"').to_string());
        }
    }
    plain.filter(|name| !name.is_empty())
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = |b: u8| (b as char).to_digit(16);
            if let (Some(hi), Some(lo)) = (hex(bytes[i + 1]), hex(bytes[i + 2])) {
                out.push((hi * 16 + lo) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_variants() {
        assert_eq!(
            parse_content_disposition(r#"attachment; filename="books.xlsx""#),
            Some("books.xlsx".to_string())
        );
        assert_eq!(
            parse_content_disposition("attachment; filename=a.csv; filename*=UTF-8''auteurs%20fran%C3%A7ais.csv"),
            Some("auteurs français.csv".to_string())
        );
        assert_eq!(parse_content_disposition("inline"), None);
    }

    #[test]
    fn test_bearer_ignores_empty_token() {
        assert!(RequestOptions::new().bearer("").bearer.is_none());
        assert_eq!(RequestOptions::new().bearer("tok").bearer.as_deref(), Some("tok"));
    }

    #[test]
    fn test_form_payload_lookup() {
        let form = FormPayload::new()
            .text("title", "Dune")
            .file("cover", "dune.png", Some("image/png".to_string()), Bytes::from_static(b"png"));
        assert_eq!(form.text_value("title"), Some("Dune"));
        assert!(form.has_file("cover"));
        assert!(!form.has_file("title"));
        assert!(form.into_form().is_ok());
    }
}
