//! Bulk imports with per-row diagnostics

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::{ApiError, ErrorKind, FormPayload, RequestBody, ResultCode};

use super::{ActionContext, ActionFailure, ActionResult, Stale};

pub const IMPORT_FILE_FIELD: &str = "file";

/// What a bulk import produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ImportOutcome {
    Completed { message: String },
    /// Some rows were rejected; the rest went in
    PartiallyFailed { failures: Vec<ImportRowFailure> },
}

/// One rejected row, passed through exactly as the backend described it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImportRowFailure(pub Value);

impl ImportRowFailure {
    /// Spreadsheet row, when the backend numbered it
    pub fn row_number(&self) -> Option<u64> {
        match self.0.get("rowNumber")? {
            Value::Number(number) => number.as_u64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// Messages for the row, whether `errors` is a list or a field map
    pub fn messages(&self) -> Vec<String> {
        fn collect(value: &Value, into: &mut Vec<String>) {
            match value {
                Value::String(message) => into.push(message.clone()),
                Value::Array(items) => items.iter().for_each(|item| collect(item, into)),
                Value::Object(fields) => fields.values().for_each(|item| collect(item, into)),
                _ => {}
            }
        }

        let mut messages = Vec::new();
        if let Some(errors) = self.0.get("errors") {
            collect(errors, &mut messages);
        }
        messages
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportResponse {
    result_code: Option<ResultCode>,
    message: Option<String>,
    data: Option<Value>,
}

fn row_failures(data: Option<Value>) -> Result<ImportOutcome, ApiError> {
    match data {
        Some(Value::Array(rows)) => Ok(ImportOutcome::PartiallyFailed {
            failures: rows.into_iter().map(ImportRowFailure).collect(),
        }),
        _ => Err(ApiError::Decode(
            "partial import result without row diagnostics".to_string(),
        )),
    }
}

/// Upload an import file and report per-row failures when the backend
/// answers with a partial success.
pub async fn import(
    ctx: &ActionContext,
    action: &str,
    path: &str,
    form: FormPayload,
    stale: &[Stale],
) -> ActionResult<ImportOutcome> {
    if !form.has_file(IMPORT_FILE_FIELD) {
        return ActionFailure::invalid_field(IMPORT_FILE_FIELD, "Choose a file to import").into();
    }

    let response = ctx
        .backend()
        .post::<Option<ImportResponse>>(path, RequestBody::Multipart(form), ctx.options())
        .await;

    let result = match response {
        Ok(Some(body)) if body.result_code == Some(ResultCode::PartialSuccess) => row_failures(body.data),
        Ok(body) => Ok(ImportOutcome::Completed {
            message: body
                .and_then(|b| b.message)
                .unwrap_or_else(|| "Import completed".to_string()),
        }),
        Err(e) if e.kind() == ErrorKind::PartialFailure => row_failures(e.into_data()),
        Err(e) => Err(e),
    };

    if let Ok(ImportOutcome::PartiallyFailed { failures }) = &result {
        tracing::info!(action, rejected = failures.len(), "Import partially failed");
        for failure in failures {
            tracing::debug!(action, row = ?failure.row_number(), "Rejected row: {}", failure.messages().join("; "));
        }
    }

    ctx.settle(action, stale, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::*;
    use crate::cache::{CacheTag, MockRevalidator};
    use axum::body::Bytes;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn csv() -> FormPayload {
        FormPayload::new().file(
            IMPORT_FILE_FIELD,
            "authors.csv",
            Some("text/csv".to_string()),
            Bytes::from_static(b"fullName\nAda\n"),
        )
    }

    #[tokio::test]
    async fn test_partial_failure_rows_are_returned() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/authors/import"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "resultCode": "PARTIAL_SUCCESS",
                "message": "2 rows failed",
                "data": [
                    { "rowNumber": 3, "errors": ["Full name is required"] },
                    { "rowNumber": 7, "errors": ["Duplicate author"], "authorCode": "A-7" }
                ]
            })))
            .mount(&server)
            .await;

        let ctx = context(&server, permissive());
        let result = import(
            &ctx,
            "authors.import",
            "/api/authors/import",
            csv(),
            &[Stale::Tag(CacheTag::Authors)],
        )
        .await;

        let Some(ImportOutcome::PartiallyFailed { failures }) = result.data() else {
            panic!("expected partial failure, got {:?}", result);
        };
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].row_number(), Some(3));
        assert_eq!(failures[1].0["authorCode"], json!("A-7"));

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["isSuccess"], json!(true));
        assert_eq!(value["data"]["status"], json!("partiallyFailed"));
        assert_eq!(value["data"]["failures"][1]["authorCode"], json!("A-7"));
    }

    #[tokio::test]
    async fn test_partial_code_on_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "resultCode": "PARTIAL_SUCCESS",
                "data": [{ "rowNumber": 1, "errors": ["bad isbn"] }]
            })))
            .mount(&server)
            .await;

        let ctx = context(&server, permissive());
        let result = import(&ctx, "books.import", "/api/books/import", csv(), &[]).await;

        assert!(matches!(result.data(), Some(ImportOutcome::PartiallyFailed { failures }) if failures.len() == 1));
    }

    #[tokio::test]
    async fn test_irregular_rows_are_passed_through_as_is() {
        let server = MockServer::start().await;
        let rows = json!([
            { "rowNumber": 3, "errors": { "fullName": ["required"], "email": ["taken", "invalid"] } },
            { "rowNumber": "8", "errors": "Duplicate author" },
            "row 9 is empty"
        ]);
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "resultCode": "PARTIAL_SUCCESS",
                "data": rows.clone()
            })))
            .mount(&server)
            .await;

        let ctx = context(&server, permissive());
        let result = import(&ctx, "authors.import", "/api/authors/import", csv(), &[]).await;

        let Some(ImportOutcome::PartiallyFailed { failures }) = result.data() else {
            panic!("expected partial failure, got {:?}", result);
        };
        assert_eq!(failures[0].row_number(), Some(3));
        let mut messages = failures[0].messages();
        messages.sort();
        assert_eq!(messages, vec!["invalid", "required", "taken"]);
        assert_eq!(failures[1].row_number(), Some(8));
        assert_eq!(failures[1].messages(), vec!["Duplicate author"]);
        assert_eq!(failures[2].row_number(), None);

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["data"]["failures"], rows);
    }

    #[tokio::test]
    async fn test_partial_code_without_rows_is_unknown_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "resultCode": "PARTIAL_SUCCESS",
                "data": { "failed": 2 }
            })))
            .mount(&server)
            .await;

        let ctx = context(&server, silent());
        let result = import(
            &ctx,
            "authors.import",
            "/api/authors/import",
            csv(),
            &[Stale::Tag(CacheTag::Authors)],
        )
        .await;

        assert_eq!(result.failure().unwrap().error_kind, ErrorKind::UnknownFailure);
    }

    #[tokio::test]
    async fn test_completed_import_invalidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "12 authors imported" })))
            .mount(&server)
            .await;

        let mut revalidator = MockRevalidator::new();
        revalidator
            .expect_revalidate_tag()
            .with(mockall::predicate::eq(CacheTag::Authors))
            .times(1)
            .return_const(());

        let ctx = context(&server, revalidator);
        let result = import(
            &ctx,
            "authors.import",
            "/api/authors/import",
            csv(),
            &[Stale::Tag(CacheTag::Authors)],
        )
        .await;

        assert_eq!(
            result.data(),
            Some(&ImportOutcome::Completed {
                message: "12 authors imported".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_rejected_locally() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let ctx = context(&server, silent());
        let result = import(
            &ctx,
            "authors.import",
            "/api/authors/import",
            FormPayload::new().text("note", "no file"),
            &[],
        )
        .await;

        let failure = result.failure().unwrap();
        assert_eq!(failure.error_kind, ErrorKind::ValidationFailure);
        assert!(failure.field_errors.as_ref().unwrap().contains_key("file"));
    }
}
