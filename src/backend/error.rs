//! Error types for calls to the library backend

use indexmap::IndexMap;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DefaultOnError};
use thiserror::Error;
use utoipa::ToSchema;

/// Field name -> validation messages, in the order the backend reported them
pub type FieldErrors = IndexMap<String, Vec<String>>;

/// Failure taxonomy shared by the client and the action layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    ValidationFailure,
    PartialFailure,
    AuthorizationFailure,
    NetworkFailure,
    UnknownFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationFailure => "validation-failure",
            ErrorKind::PartialFailure => "partial-failure",
            ErrorKind::AuthorizationFailure => "authorization-failure",
            ErrorKind::NetworkFailure => "network-failure",
            ErrorKind::UnknownFailure => "unknown-failure",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Machine-readable result code carried by backend responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResultCode {
    Success,
    /// Bulk operation finished with per-row failures
    PartialSuccess,
    ValidationFailed,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    /// Any code this console does not branch on
    Other(String),
}

impl ResultCode {
    pub fn as_str(&self) -> &str {
        match self {
            ResultCode::Success => "SUCCESS",
            ResultCode::PartialSuccess => "PARTIAL_SUCCESS",
            ResultCode::ValidationFailed => "VALIDATION_FAILED",
            ResultCode::Unauthorized => "UNAUTHORIZED",
            ResultCode::Forbidden => "FORBIDDEN",
            ResultCode::NotFound => "NOT_FOUND",
            ResultCode::Conflict => "CONFLICT",
            ResultCode::Other(s) => s.as_str(),
        }
    }

    /// Best guess when the backend sent no code at all
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => ResultCode::Unauthorized,
            StatusCode::FORBIDDEN => ResultCode::Forbidden,
            StatusCode::NOT_FOUND => ResultCode::NotFound,
            StatusCode::CONFLICT => ResultCode::Conflict,
            s if s.is_success() => ResultCode::Success,
            s => ResultCode::Other(s.as_u16().to_string()),
        }
    }
}

impl std::fmt::Display for ResultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ResultCode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Ok(match normalized.as_str() {
            "SUCCESS" | "OK" => ResultCode::Success,
            "PARTIAL_SUCCESS" => ResultCode::PartialSuccess,
            "VALIDATION_FAILED" => ResultCode::ValidationFailed,
            "UNAUTHORIZED" => ResultCode::Unauthorized,
            "FORBIDDEN" => ResultCode::Forbidden,
            "NOT_FOUND" => ResultCode::NotFound,
            "CONFLICT" => ResultCode::Conflict,
            _ => ResultCode::Other(s.to_string()),
        })
    }
}

impl From<String> for ResultCode {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(code) => code,
            Err(never) => match never {},
        }
    }
}

impl From<ResultCode> for String {
    fn from(code: ResultCode) -> Self {
        code.as_str().to_string()
    }
}

/// Error body as sent by the backend (plain or problem-details flavoured)
///
/// Each field is read on its own: one oddly shaped member does not cost
/// the others.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    result_code: Option<ResultCode>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    message: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    detail: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    title: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    errors: Option<FieldErrors>,
    #[serde(default)]
    data: Option<Value>,
}

/// Error raised by [`super::ApiClient`]
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("backend unreachable: {0}")]
    Network(#[source] reqwest::Error),

    #[error("backend responded {status}: {message}")]
    Response {
        status: StatusCode,
        code: ResultCode,
        message: String,
        field_errors: Option<FieldErrors>,
        data: Option<Value>,
    },

    #[error("could not encode request: {0}")]
    Encode(String),

    #[error("could not decode backend response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Normalize a non-2xx response body into a structured error
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();

        let message = parsed
            .message
            .or(parsed.detail)
            .or(parsed.title)
            .filter(|m| !m.trim().is_empty())
            .or_else(|| {
                // Some endpoints answer errors as bare text
                std::str::from_utf8(body)
                    .ok()
                    .map(str::trim)
                    .filter(|t| !t.is_empty() && !t.starts_with('{'))
                    .map(str::to_string)
            })
            .unwrap_or_else(|| match status.canonical_reason() {
                Some(reason) => reason.to_string(),
                None => format!("Request failed with status {}", status.as_u16()),
            });

        let field_errors = parsed.errors.filter(|errors| !errors.is_empty());
        let code = match parsed.result_code {
            Some(code) => code,
            None if field_errors.is_some() => ResultCode::ValidationFailed,
            None => ResultCode::from_status(status),
        };

        ApiError::Response {
            status,
            code,
            message,
            field_errors,
            data: parsed.data,
        }
    }

    /// Classify the error into the console-wide taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(_) => ErrorKind::NetworkFailure,
            ApiError::Encode(_) | ApiError::Decode(_) => ErrorKind::UnknownFailure,
            ApiError::Response {
                status,
                code,
                field_errors,
                ..
            } => {
                if *code == ResultCode::PartialSuccess {
                    ErrorKind::PartialFailure
                } else if matches!(*status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
                    || matches!(code, ResultCode::Unauthorized | ResultCode::Forbidden)
                {
                    ErrorKind::AuthorizationFailure
                } else if *code == ResultCode::ValidationFailed
                    || (matches!(*status, StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY)
                        && field_errors.is_some())
                {
                    ErrorKind::ValidationFailure
                } else {
                    ErrorKind::UnknownFailure
                }
            }
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Response { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn result_code(&self) -> Option<&ResultCode> {
        match self {
            ApiError::Response { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Message suitable for a toast
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => "The library server could not be reached".to_string(),
            ApiError::Response { message, .. } => message.clone(),
            ApiError::Encode(_) => "The request could not be prepared".to_string(),
            ApiError::Decode(_) => "The library server sent an unexpected response".to_string(),
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ApiError::Response { field_errors, .. } => field_errors.as_ref(),
            _ => None,
        }
    }

    /// Payload attached to the error (per-row failures for partial imports)
    pub fn into_data(self) -> Option<Value> {
        match self {
            ApiError::Response { data, .. } => data,
            _ => None,
        }
    }
}
