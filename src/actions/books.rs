//! Book edition actions

use serde::de::IgnoredAny;

use crate::{
    backend::{FormPayload, RequestBody},
    cache::CacheTag,
    models::{
        book::{is_valid_isbn, missing_field},
        Created,
    },
    selection::SelectionSet,
};

use super::{
    imports::{self, ImportOutcome},
    ActionContext, ActionFailure, ActionResult, Stale,
};

const RESOURCE: &str = "/api/books";
pub const EXPORT_PATH: &str = "/api/books/export";
pub const LIST_VIEW: &str = "/views/books";

fn check_form(form: &FormPayload) -> Result<(), ActionFailure> {
    if let Some((field, message)) = missing_field(form) {
        return Err(ActionFailure::invalid_field(field, message));
    }
    match form.text_value("isbn") {
        Some(isbn) if !is_valid_isbn(isbn) => Err(ActionFailure::invalid_field("isbn", "Invalid ISBN")),
        _ => Ok(()),
    }
}

fn stale(id: Option<&str>) -> Vec<Stale> {
    let mut stale = vec![Stale::Tag(CacheTag::Books), Stale::path(LIST_VIEW)];
    if let Some(id) = id {
        stale.push(Stale::path(format!("{}/{}", LIST_VIEW, id)));
    }
    stale
}

/// Create an edition; the form may carry a cover image
pub async fn create(ctx: &ActionContext, form: FormPayload) -> ActionResult<Created> {
    if let Err(failure) = check_form(&form) {
        return failure.into();
    }

    ctx.create("books.create", &stale(None), RESOURCE, RequestBody::Multipart(form)).await
}

pub async fn update(ctx: &ActionContext, id: &str, form: FormPayload) -> ActionResult<()> {
    if let Err(failure) = check_form(&form) {
        return failure.into();
    }

    ctx.run(
        "books.update",
        &stale(Some(id)),
        ctx.backend().put::<IgnoredAny>(
            &format!("{}/{}", RESOURCE, id),
            RequestBody::Multipart(form),
            ctx.options(),
        ),
    )
    .await
    .discard()
}

pub async fn delete_range(ctx: &ActionContext, ids: &SelectionSet) -> ActionResult<()> {
    if ids.is_empty() {
        return ActionFailure::invalid_field("ids", "Select at least one row").into();
    }

    ctx.run(
        "books.delete_range",
        &stale(None),
        ctx.backend()
            .delete_many::<IgnoredAny>(&format!("{}/range", RESOURCE), ids.ids(), ctx.options()),
    )
    .await
    .discard()
}

pub async fn import(ctx: &ActionContext, form: FormPayload) -> ActionResult<ImportOutcome> {
    imports::import(ctx, "books.import", "/api/books/import", form, &stale(None)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::*;
    use crate::backend::ErrorKind;
    use axum::body::Bytes;
    use serde_json::json;
    use wiremock::matchers::{header_regex, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn form(isbn: &str) -> FormPayload {
        FormPayload::new()
            .text("title", "Truyen Kieu")
            .text("isbn", isbn)
            .text("categoryId", "poetry")
            .file("coverImage", "cover.png", Some("image/png".to_string()), Bytes::from_static(b"\x89PNG"))
    }

    #[tokio::test]
    async fn test_create_sends_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(RESOURCE))
            .and(header_regex("content-type", "^multipart/form-data; boundary="))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "b-1" })))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = context(&server, permissive());
        let result = create(&ctx, form("978-0-306-40615-7")).await;
        assert_eq!(result.data().unwrap().id, "b-1");

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("name=\"coverImage\"; filename=\"cover.png\""));
        assert!(body.contains("Truyen Kieu"));
    }

    #[tokio::test]
    async fn test_bad_isbn_rejected_locally() {
        let server = MockServer::start().await;
        let ctx = context(&server, silent());

        let result = create(&ctx, form("978-0-306-40615-8")).await;
        let failure = result.failure().unwrap();
        assert_eq!(failure.error_kind, ErrorKind::ValidationFailure);
        assert!(failure.field_errors.as_ref().unwrap().contains_key("isbn"));
    }

    #[tokio::test]
    async fn test_server_error_on_delete() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/books/range"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let ctx = context(&server, silent());
        let ids: SelectionSet = vec!["b-1".to_string()].into();
        let result = delete_range(&ctx, &ids).await;
        assert_eq!(result.failure().unwrap().error_kind, ErrorKind::UnknownFailure);
    }
}
