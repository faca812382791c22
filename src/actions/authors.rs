//! Author actions

use crate::{
    backend::FormPayload,
    cache::CacheTag,
    models::{author::AuthorPayload, Created},
    selection::SelectionSet,
};

use super::{
    imports::{self, ImportOutcome},
    soft_delete::AUTHORS,
    ActionContext, ActionResult, Stale,
};

const RESOURCE: &str = "/api/authors";
pub const EXPORT_PATH: &str = "/api/authors/export";
pub const LIST_VIEW: &str = "/views/authors";

fn detail_view(id: &str) -> String {
    format!("{}/{}", LIST_VIEW, id)
}

pub async fn create(ctx: &ActionContext, payload: &AuthorPayload) -> ActionResult<Created> {
    let body = match ctx.prepare(payload) {
        Ok(body) => body,
        Err(failure) => return failure.into(),
    };

    ctx.create(
        "authors.create",
        &[Stale::Tag(CacheTag::Authors), Stale::path(LIST_VIEW)],
        RESOURCE,
        body,
    )
    .await
}

pub async fn update(ctx: &ActionContext, id: &str, payload: &AuthorPayload) -> ActionResult<()> {
    let body = match ctx.prepare(payload) {
        Ok(body) => body,
        Err(failure) => return failure.into(),
    };

    ctx.run(
        "authors.update",
        &[
            Stale::Tag(CacheTag::Authors),
            Stale::path(LIST_VIEW),
            Stale::path(detail_view(id)),
        ],
        ctx.backend()
            .put::<serde::de::IgnoredAny>(&format!("{}/{}", RESOURCE, id), body, ctx.options()),
    )
    .await
    .discard()
}

pub async fn delete_range(ctx: &ActionContext, ids: &SelectionSet) -> ActionResult<()> {
    AUTHORS.delete_range(ctx, ids).await
}

pub async fn restore_range(ctx: &ActionContext, ids: &SelectionSet) -> ActionResult<()> {
    AUTHORS.restore_range(ctx, ids).await
}

pub async fn delete_permanently(ctx: &ActionContext, ids: &SelectionSet) -> ActionResult<()> {
    AUTHORS.delete_permanently(ctx, ids).await
}

pub async fn import(ctx: &ActionContext, form: FormPayload) -> ActionResult<ImportOutcome> {
    imports::import(
        ctx,
        "authors.import",
        "/api/authors/import",
        form,
        &[Stale::Tag(CacheTag::Authors), Stale::path(LIST_VIEW)],
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::*;
    use crate::backend::ErrorKind;
    use crate::cache::MockRevalidator;
    use mockall::predicate::eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn payload() -> AuthorPayload {
        AuthorPayload {
            full_name: "Xuan Dieu".to_string(),
            author_code: None,
            biography: None,
            nationality: None,
            dob: None,
            dod: None,
        }
    }

    #[tokio::test]
    async fn test_delete_range_forbidden() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let ctx = context(&server, silent());
        let ids: SelectionSet = vec!["1".to_string(), "2".to_string()].into();
        let result = delete_range(&ctx, &ids).await;

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["isSuccess"], json!(false));
        assert_eq!(value["errorKind"], json!("authorization-failure"));
    }

    #[tokio::test]
    async fn test_create_returns_new_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(RESOURCE))
            .and(body_json(json!({ "fullName": "Xuan Dieu" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 17, "fullName": "Xuan Dieu" })))
            .mount(&server)
            .await;

        let mut revalidator = MockRevalidator::new();
        revalidator
            .expect_revalidate_tag()
            .with(eq(CacheTag::Authors))
            .times(1)
            .return_const(());
        revalidator
            .expect_revalidate_path()
            .withf(|path| path == LIST_VIEW)
            .times(1)
            .return_const(());

        let ctx = context(&server, revalidator);
        let result = create(&ctx, &payload()).await;
        assert_eq!(result.data().map(|created| created.id.as_str()), Some("17"));
    }

    #[tokio::test]
    async fn test_create_with_empty_body_still_succeeds_and_invalidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(RESOURCE))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let mut revalidator = MockRevalidator::new();
        revalidator
            .expect_revalidate_tag()
            .with(eq(CacheTag::Authors))
            .times(1)
            .return_const(());
        revalidator
            .expect_revalidate_path()
            .withf(|path| path == LIST_VIEW)
            .times(1)
            .return_const(());

        let ctx = context(&server, revalidator);
        let result = create(&ctx, &payload()).await;

        assert!(result.is_success());
        assert!(result.data().is_none());
        assert_eq!(serde_json::to_value(&result).unwrap(), json!({ "isSuccess": true }));
    }

    #[tokio::test]
    async fn test_update_conflict_is_unknown_failure() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/authors/9"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(json!({ "resultCode": "CONFLICT", "message": "Author code already used" })),
            )
            .mount(&server)
            .await;

        let ctx = context(&server, silent());
        let result = update(&ctx, "9", &payload()).await;

        let failure = result.failure().unwrap();
        assert_eq!(failure.error_kind, ErrorKind::UnknownFailure);
        assert_eq!(failure.message, "Author code already used");
    }
}
