//! Server actions
//!
//! Every operator-triggered mutation goes through an [`ActionContext`]: the
//! backend call carries the session's bearer token, failures are folded
//! into an [`ActionResult`] and cache invalidation fires only once the call
//! has succeeded.

pub mod auth;
pub mod authors;
pub mod books;
pub mod borrowing;
pub mod categories;
pub mod employees;
pub mod fines;
pub mod imports;
pub mod notifications;
pub mod patrons;
pub mod soft_delete;
pub mod warehouse;

use std::{future::Future, sync::Arc};

use serde::{
    ser::{SerializeStruct, Serializer},
    Deserialize, Serialize,
};
use validator::{Validate, ValidationErrors};

use crate::{
    backend::{ApiClient, ApiError, ErrorKind, FieldErrors, RequestBody, RequestOptions, ResponseType},
    cache::{CacheTag, Revalidator},
    models::Created,
};

pub use imports::{ImportOutcome, ImportRowFailure};

/// Outcome of a server action, as returned to the console UI
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult<T> {
    Success { data: Option<T> },
    Failure(ActionFailure),
}

/// Failure half of [`ActionResult`]
#[derive(Debug, Clone, PartialEq)]
pub struct ActionFailure {
    pub error_kind: ErrorKind,
    pub message: String,
    /// Only set for validation failures
    pub field_errors: Option<FieldErrors>,
}

impl<T> ActionResult<T> {
    pub fn ok(data: T) -> Self {
        ActionResult::Success { data: Some(data) }
    }

    pub fn done() -> Self {
        ActionResult::Success { data: None }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ActionResult::Success { data } => data.as_ref(),
            ActionResult::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ActionFailure> {
        match self {
            ActionResult::Success { .. } => None,
            ActionResult::Failure(failure) => Some(failure),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ActionResult<U> {
        match self {
            ActionResult::Success { data } => ActionResult::Success { data: data.map(f) },
            ActionResult::Failure(failure) => ActionResult::Failure(failure),
        }
    }

    /// Keep the outcome, drop the payload
    pub fn discard(self) -> ActionResult<()> {
        match self {
            ActionResult::Success { .. } => ActionResult::done(),
            ActionResult::Failure(failure) => ActionResult::Failure(failure),
        }
    }
}

impl<T> From<ActionFailure> for ActionResult<T> {
    fn from(failure: ActionFailure) -> Self {
        ActionResult::Failure(failure)
    }
}

impl<T: Serialize> Serialize for ActionResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ActionResult::Success { data } => {
                let mut state = serializer.serialize_struct("ActionResult", 2)?;
                state.serialize_field("isSuccess", &true)?;
                match data {
                    Some(data) => state.serialize_field("data", data)?,
                    None => state.skip_field("data")?,
                }
                state.end()
            }
            ActionResult::Failure(failure) => {
                let mut state = serializer.serialize_struct("ActionResult", 4)?;
                state.serialize_field("isSuccess", &false)?;
                state.serialize_field("errorKind", &failure.error_kind)?;
                state.serialize_field("message", &failure.message)?;
                match &failure.field_errors {
                    Some(errors) => state.serialize_field("fieldErrors", errors)?,
                    None => state.skip_field("fieldErrors")?,
                }
                state.end()
            }
        }
    }
}

impl ActionFailure {
    pub fn new(error_kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            error_kind,
            message: message.into(),
            field_errors: None,
        }
    }

    /// Validation failure on a single field, raised before any backend call
    pub fn invalid_field(field: &str, message: &str) -> Self {
        let mut field_errors = FieldErrors::new();
        field_errors.insert(field.to_string(), vec![message.to_string()]);
        Self {
            error_kind: ErrorKind::ValidationFailure,
            message: message.to_string(),
            field_errors: Some(field_errors),
        }
    }
}

impl From<ApiError> for ActionFailure {
    fn from(err: ApiError) -> Self {
        let error_kind = err.kind();
        let field_errors = match error_kind {
            ErrorKind::ValidationFailure => err.field_errors().cloned(),
            _ => None,
        };

        Self {
            error_kind,
            message: err.user_message(),
            field_errors,
        }
    }
}

impl From<ValidationErrors> for ActionFailure {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<(String, Vec<String>)> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let messages = errors
                    .iter()
                    .map(|error| match &error.message {
                        Some(message) => message.to_string(),
                        None => format!("Invalid value ({})", error.code),
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let message = fields
            .first()
            .and_then(|(_, messages)| messages.first().cloned())
            .unwrap_or_else(|| "Invalid input".to_string());

        Self {
            error_kind: ErrorKind::ValidationFailure,
            message,
            field_errors: Some(fields.into_iter().collect()),
        }
    }
}

/// Validate a payload before it leaves the console
pub fn validate<P: Validate>(payload: &P) -> Result<(), ActionFailure> {
    payload.validate().map_err(ActionFailure::from)
}

/// Something an action makes stale once it succeeds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stale {
    Path(String),
    Tag(CacheTag),
}

impl Stale {
    pub fn path(path: impl Into<String>) -> Self {
        Stale::Path(path.into())
    }
}

/// Body of backend responses that only carry a message
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

impl MessageResponse {
    pub fn message_or(self, fallback: &str) -> String {
        self.message.unwrap_or_else(|| fallback.to_string())
    }
}

/// Request-scoped action dependencies
#[derive(Clone)]
pub struct ActionContext {
    backend: ApiClient,
    revalidator: Arc<dyn Revalidator>,
    token: String,
    locale: Option<String>,
}

impl ActionContext {
    pub fn new(backend: ApiClient, revalidator: Arc<dyn Revalidator>, token: impl Into<String>) -> Self {
        Self {
            backend,
            revalidator,
            token: token.into(),
            locale: None,
        }
    }

    pub fn with_locale(mut self, locale: Option<String>) -> Self {
        self.locale = locale;
        self
    }

    pub fn backend(&self) -> &ApiClient {
        &self.backend
    }

    /// Options carrying the session's bearer token and locale
    pub fn options(&self) -> RequestOptions {
        RequestOptions::new()
            .bearer(self.token.clone())
            .locale(self.locale.clone())
    }

    /// Encode a JSON body, reporting failure as an action failure
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<RequestBody, ActionFailure> {
        RequestBody::json(value).map_err(ActionFailure::from)
    }

    /// Validate, then encode a JSON body
    pub fn prepare<P: Validate + Serialize>(&self, payload: &P) -> Result<RequestBody, ActionFailure> {
        validate(payload)?;
        self.json(payload)
    }

    /// Await the backend call and settle it
    pub async fn run<T, Fut>(&self, action: &str, stale: &[Stale], call: Fut) -> ActionResult<T>
    where
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let result = call.await;
        self.settle(action, stale, result)
    }

    /// POST a new resource. Any 2xx settles as success and invalidates;
    /// `data` carries the new id only when the body has one.
    pub async fn create(&self, action: &str, stale: &[Stale], path: &str, body: RequestBody) -> ActionResult<Created> {
        let options = self.options().response_type(ResponseType::Text);
        let result = self.backend.post::<String>(path, body, options).await;

        match self.settle(action, stale, result) {
            ActionResult::Success { data } => ActionResult::Success {
                data: data.as_deref().and_then(Created::from_body),
            },
            ActionResult::Failure(failure) => ActionResult::Failure(failure),
        }
    }

    /// Fold a backend result into an action result.
    ///
    /// Invalidation happens here and only on `Ok`.
    pub fn settle<T>(&self, action: &str, stale: &[Stale], result: Result<T, ApiError>) -> ActionResult<T> {
        match result {
            Ok(data) => {
                self.invalidate(stale);
                tracing::info!(action, "Action succeeded");
                ActionResult::ok(data)
            }
            Err(e) => {
                let failure = ActionFailure::from(e);
                tracing::warn!(action, kind = %failure.error_kind, "Action failed: {}", failure.message);
                ActionResult::Failure(failure)
            }
        }
    }

    fn invalidate(&self, stale: &[Stale]) {
        for entry in stale {
            match entry {
                Stale::Path(path) => self.revalidator.revalidate_path(path),
                Stale::Tag(tag) => self.revalidator.revalidate_tag(*tag),
            }
        }
    }
}
