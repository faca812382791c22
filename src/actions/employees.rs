//! Employee actions

use serde::de::IgnoredAny;

use crate::{
    backend::FormPayload,
    cache::CacheTag,
    models::{employee::EmployeePayload, Created},
    selection::SelectionSet,
};

use super::{
    imports::{self, ImportOutcome},
    soft_delete::EMPLOYEES,
    ActionContext, ActionResult, Stale,
};

const RESOURCE: &str = "/api/employees";
pub const LIST_VIEW: &str = "/views/employees";

pub async fn create(ctx: &ActionContext, payload: &EmployeePayload) -> ActionResult<Created> {
    let body = match ctx.prepare(payload) {
        Ok(body) => body,
        Err(failure) => return failure.into(),
    };

    ctx.create(
        "employees.create",
        &[Stale::Tag(CacheTag::Employees), Stale::path(LIST_VIEW)],
        RESOURCE,
        body,
    )
    .await
}

pub async fn update(ctx: &ActionContext, id: &str, payload: &EmployeePayload) -> ActionResult<()> {
    let body = match ctx.prepare(payload) {
        Ok(body) => body,
        Err(failure) => return failure.into(),
    };

    ctx.run(
        "employees.update",
        &[
            Stale::Tag(CacheTag::Employees),
            Stale::path(LIST_VIEW),
            Stale::path(format!("{}/{}", LIST_VIEW, id)),
        ],
        ctx.backend()
            .put::<IgnoredAny>(&format!("{}/{}", RESOURCE, id), body, ctx.options()),
    )
    .await
    .discard()
}

pub async fn delete_range(ctx: &ActionContext, ids: &SelectionSet) -> ActionResult<()> {
    EMPLOYEES.delete_range(ctx, ids).await
}

pub async fn restore_range(ctx: &ActionContext, ids: &SelectionSet) -> ActionResult<()> {
    EMPLOYEES.restore_range(ctx, ids).await
}

pub async fn delete_permanently(ctx: &ActionContext, ids: &SelectionSet) -> ActionResult<()> {
    EMPLOYEES.delete_permanently(ctx, ids).await
}

/// Goes through the shared client like every other import
pub async fn import(ctx: &ActionContext, form: FormPayload) -> ActionResult<ImportOutcome> {
    imports::import(
        ctx,
        "employees.import",
        "/api/employees/import",
        form,
        &[Stale::Tag(CacheTag::Employees), Stale::path(LIST_VIEW)],
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::*;
    use axum::body::Bytes;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_import_uses_configured_backend_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/employees/import"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "3 employees imported" })))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = context(&server, permissive());
        let form = FormPayload::new().file("file", "staff.xlsx", None, Bytes::from_static(b"PK"));
        let result = import(&ctx, form).await;

        assert_eq!(
            result.data(),
            Some(&ImportOutcome::Completed {
                message: "3 employees imported".to_string()
            })
        );
    }
}
