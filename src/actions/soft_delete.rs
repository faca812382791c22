//! Soft-delete, restore and permanent delete, shared by every entity that
//! lives in a recycle bin (authors, patrons, employees).

use serde::de::IgnoredAny;

use crate::{cache::CacheTag, selection::SelectionSet};

use super::{ActionContext, ActionFailure, ActionResult, Stale};

/// An entity family exposing the recycle-bin endpoints
#[derive(Debug, Clone, Copy)]
pub struct SoftDeleteFamily {
    pub name: &'static str,
    /// Backend collection, e.g. `/api/authors`
    pub resource: &'static str,
    pub tag: CacheTag,
    pub list_view: &'static str,
    pub trash_view: &'static str,
}

pub const AUTHORS: SoftDeleteFamily = SoftDeleteFamily {
    name: "authors",
    resource: "/api/authors",
    tag: CacheTag::Authors,
    list_view: "/views/authors",
    trash_view: "/views/authors/trash",
};

pub const PATRONS: SoftDeleteFamily = SoftDeleteFamily {
    name: "patrons",
    resource: "/api/users",
    tag: CacheTag::Users,
    list_view: "/views/patrons",
    trash_view: "/views/patrons/trash",
};

pub const EMPLOYEES: SoftDeleteFamily = SoftDeleteFamily {
    name: "employees",
    resource: "/api/employees",
    tag: CacheTag::Employees,
    list_view: "/views/employees",
    trash_view: "/views/employees/trash",
};

fn require_selection(ids: &SelectionSet) -> Result<(), ActionFailure> {
    if ids.is_empty() {
        return Err(ActionFailure::invalid_field("ids", "Select at least one row"));
    }
    Ok(())
}

impl SoftDeleteFamily {
    fn stale(&self) -> [Stale; 3] {
        [
            Stale::Tag(self.tag),
            Stale::path(self.list_view),
            Stale::path(self.trash_view),
        ]
    }

    /// Move the selected rows to the recycle bin
    pub async fn delete_range(&self, ctx: &ActionContext, ids: &SelectionSet) -> ActionResult<()> {
        if let Err(failure) = require_selection(ids) {
            return failure.into();
        }

        let path = format!("{}/soft-delete-range", self.resource);
        ctx.run(
            &format!("{}.delete_range", self.name),
            &self.stale(),
            ctx.backend().delete_many::<IgnoredAny>(&path, ids.ids(), ctx.options()),
        )
        .await
        .discard()
    }

    /// Bring the selected rows back from the recycle bin
    pub async fn restore_range(&self, ctx: &ActionContext, ids: &SelectionSet) -> ActionResult<()> {
        if let Err(failure) = require_selection(ids) {
            return failure.into();
        }

        let body = match ctx.json(&serde_json::json!({ "ids": ids })) {
            Ok(body) => body,
            Err(failure) => return failure.into(),
        };
        let path = format!("{}/restore-range", self.resource);
        ctx.run(
            &format!("{}.restore_range", self.name),
            &self.stale(),
            ctx.backend().patch::<IgnoredAny>(&path, body, ctx.options()),
        )
        .await
        .discard()
    }

    /// Remove the selected rows for good
    pub async fn delete_permanently(&self, ctx: &ActionContext, ids: &SelectionSet) -> ActionResult<()> {
        if let Err(failure) = require_selection(ids) {
            return failure.into();
        }

        let path = format!("{}/range", self.resource);
        ctx.run(
            &format!("{}.delete_permanently", self.name),
            &self.stale(),
            ctx.backend().delete_many::<IgnoredAny>(&path, ids.ids(), ctx.options()),
        )
        .await
        .discard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::*;
    use crate::backend::ErrorKind;
    use crate::cache::MockRevalidator;
    use mockall::predicate::eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn selection(ids: &[&str]) -> SelectionSet {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[tokio::test]
    async fn test_forbidden_soft_delete_leaves_cache_alone() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/authors/soft-delete-range"))
            .and(body_json(json!({ "ids": ["1", "2"] })))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "message": "Forbidden" })))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = context(&server, silent());
        let result = AUTHORS.delete_range(&ctx, &selection(&["1", "2"])).await;

        let failure = result.failure().unwrap();
        assert_eq!(failure.error_kind, ErrorKind::AuthorizationFailure);
        assert_eq!(failure.message, "Forbidden");
    }

    #[tokio::test]
    async fn test_restore_invalidates_family() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/employees/restore-range"))
            .and(header("authorization", "Bearer tok"))
            .and(body_json(json!({ "ids": ["e1"] })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let mut revalidator = MockRevalidator::new();
        revalidator
            .expect_revalidate_tag()
            .with(eq(CacheTag::Employees))
            .times(1)
            .return_const(());
        revalidator.expect_revalidate_path().times(2).return_const(());

        let ctx = context(&server, revalidator);
        let result = EMPLOYEES.restore_range(&ctx, &selection(&["e1"])).await;
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_permanent_delete_hits_range_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/users/range"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "deleted" })))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = context(&server, permissive());
        assert!(PATRONS.delete_permanently(&ctx, &selection(&["u1", "u2"])).await.is_success());
    }

    #[tokio::test]
    async fn test_empty_selection_is_rejected_locally() {
        let server = MockServer::start().await;
        let ctx = context(&server, silent());

        let result = AUTHORS.delete_range(&ctx, &SelectionSet::new()).await;
        assert_eq!(result.failure().unwrap().error_kind, ErrorKind::ValidationFailure);
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
