//! Patron actions (backend `users` collection)

use serde::de::IgnoredAny;

use crate::{
    backend::FormPayload,
    cache::CacheTag,
    models::{patron::PatronPayload, Created},
    selection::SelectionSet,
};

use super::{
    imports::{self, ImportOutcome},
    soft_delete::PATRONS,
    ActionContext, ActionResult, Stale,
};

const RESOURCE: &str = "/api/users";
pub const EXPORT_PATH: &str = "/api/users/export";
pub const LIST_VIEW: &str = "/views/patrons";

pub async fn create(ctx: &ActionContext, payload: &PatronPayload) -> ActionResult<Created> {
    let body = match ctx.prepare(payload) {
        Ok(body) => body,
        Err(failure) => return failure.into(),
    };

    ctx.create("patrons.create", &[Stale::Tag(CacheTag::Users), Stale::path(LIST_VIEW)], RESOURCE, body).await
}

pub async fn update(ctx: &ActionContext, id: &str, payload: &PatronPayload) -> ActionResult<()> {
    let body = match ctx.prepare(payload) {
        Ok(body) => body,
        Err(failure) => return failure.into(),
    };

    ctx.run(
        "patrons.update",
        &[
            Stale::Tag(CacheTag::Users),
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
    PATRONS.delete_range(ctx, ids).await
}

pub async fn restore_range(ctx: &ActionContext, ids: &SelectionSet) -> ActionResult<()> {
    PATRONS.restore_range(ctx, ids).await
}

pub async fn delete_permanently(ctx: &ActionContext, ids: &SelectionSet) -> ActionResult<()> {
    PATRONS.delete_permanently(ctx, ids).await
}

pub async fn import(ctx: &ActionContext, form: FormPayload) -> ActionResult<ImportOutcome> {
    imports::import(
        ctx,
        "patrons.import",
        "/api/users/import",
        form,
        &[Stale::Tag(CacheTag::Users), Stale::path(LIST_VIEW)],
    )
    .await
}
