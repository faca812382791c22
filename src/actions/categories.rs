//! Category actions. Categories are shown on book screens too.

use serde::de::IgnoredAny;

use crate::{
    cache::CacheTag,
    models::{category::CategoryPayload, Created},
    selection::SelectionSet,
};

use super::{ActionContext, ActionFailure, ActionResult, Stale};

const RESOURCE: &str = "/api/categories";
pub const LIST_VIEW: &str = "/views/categories";

fn stale() -> [Stale; 3] {
    [
        Stale::Tag(CacheTag::Categories),
        Stale::Tag(CacheTag::Books),
        Stale::path(LIST_VIEW),
    ]
}

pub async fn create(ctx: &ActionContext, payload: &CategoryPayload) -> ActionResult<Created> {
    let body = match ctx.prepare(payload) {
        Ok(body) => body,
        Err(failure) => return failure.into(),
    };

    ctx.create("categories.create", &stale(), RESOURCE, body).await
}

pub async fn update(ctx: &ActionContext, id: &str, payload: &CategoryPayload) -> ActionResult<()> {
    let body = match ctx.prepare(payload) {
        Ok(body) => body,
        Err(failure) => return failure.into(),
    };

    ctx.run(
        "categories.update",
        &stale(),
        ctx.backend()
            .put::<IgnoredAny>(&format!("{}/{}", RESOURCE, id), body, ctx.options()),
    )
    .await
    .discard()
}

pub async fn delete_range(ctx: &ActionContext, ids: &SelectionSet) -> ActionResult<()> {
    if ids.is_empty() {
        return ActionFailure::invalid_field("ids", "Select at least one row").into();
    }

    ctx.run(
        "categories.delete_range",
        &stale(),
        ctx.backend()
            .delete_many::<IgnoredAny>(&format!("{}/range", RESOURCE), ids.ids(), ctx.options()),
    )
    .await
    .discard()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::*;
    use crate::cache::MockRevalidator;
    use mockall::predicate::eq;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_category_change_marks_books_stale() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/categories/c1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "c1" })))
            .mount(&server)
            .await;

        let mut revalidator = MockRevalidator::new();
        revalidator
            .expect_revalidate_tag()
            .with(eq(CacheTag::Categories))
            .times(1)
            .return_const(());
        revalidator
            .expect_revalidate_tag()
            .with(eq(CacheTag::Books))
            .times(1)
            .return_const(());
        revalidator.expect_revalidate_path().times(1).return_const(());

        let ctx = context(&server, revalidator);
        let payload = CategoryPayload {
            name: "Poetry".to_string(),
            description: None,
            parent_id: None,
        };
        assert!(update(&ctx, "c1", &payload).await.is_success());
    }
}
