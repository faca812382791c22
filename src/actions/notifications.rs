//! Notification actions

use serde::de::IgnoredAny;

use crate::{
    backend::RequestBody,
    cache::CacheTag,
    models::{notification::SendNotification, Created},
    selection::SelectionSet,
};

use super::{ActionContext, ActionFailure, ActionResult, Stale};

const RESOURCE: &str = "/api/notifications";
pub const LIST_VIEW: &str = "/views/notifications";

fn stale() -> [Stale; 2] {
    [Stale::Tag(CacheTag::Notifications), Stale::path(LIST_VIEW)]
}

pub async fn send(ctx: &ActionContext, notification: &SendNotification) -> ActionResult<Created> {
    let body = match ctx.prepare(notification) {
        Ok(body) => body,
        Err(failure) => return failure.into(),
    };

    ctx.create("notifications.send", &stale(), RESOURCE, body).await
}

pub async fn mark_read(ctx: &ActionContext, id: &str) -> ActionResult<()> {
    ctx.run(
        "notifications.mark_read",
        &stale(),
        ctx.backend().patch::<IgnoredAny>(
            &format!("{}/{}/read", RESOURCE, id),
            RequestBody::Empty,
            ctx.options(),
        ),
    )
    .await
    .discard()
}

pub async fn mark_all_read(ctx: &ActionContext) -> ActionResult<()> {
    ctx.run(
        "notifications.mark_all_read",
        &stale(),
        ctx.backend().patch::<IgnoredAny>(
            &format!("{}/read-all", RESOURCE),
            RequestBody::Empty,
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
        "notifications.delete_range",
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
    use crate::backend::ErrorKind;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_mark_all_read_expired_session() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/notifications/read-all"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let ctx = context(&server, silent());
        let result = mark_all_read(&ctx).await;
        assert_eq!(result.failure().unwrap().error_kind, ErrorKind::AuthorizationFailure);
    }
}
