//! Warehouse tracking actions. Stock movements change book availability.

use serde::de::IgnoredAny;

use crate::{
    backend::FormPayload,
    cache::CacheTag,
    models::{
        warehouse::{CreateTracking, UpdateTrackingStatus},
        Created,
    },
    selection::SelectionSet,
};

use super::{
    imports::{self, ImportOutcome},
    ActionContext, ActionFailure, ActionResult, Stale,
};

const RESOURCE: &str = "/api/warehouse-trackings";
pub const LIST_VIEW: &str = "/views/warehouse";

fn stale(id: Option<&str>) -> Vec<Stale> {
    let mut stale = vec![
        Stale::Tag(CacheTag::Warehouse),
        Stale::Tag(CacheTag::Books),
        Stale::path(LIST_VIEW),
    ];
    if let Some(id) = id {
        stale.push(Stale::path(format!("{}/{}", LIST_VIEW, id)));
    }
    stale
}

pub async fn create_tracking(ctx: &ActionContext, tracking: &CreateTracking) -> ActionResult<Created> {
    let body = match ctx.prepare(tracking) {
        Ok(body) => body,
        Err(failure) => return failure.into(),
    };

    tracing::debug!(lines = tracking.lines.len(), total = %tracking.total(), "Creating warehouse tracking");

    ctx.create("warehouse.create_tracking", &stale(None), RESOURCE, body).await
}

pub async fn update_status(ctx: &ActionContext, id: &str, update: &UpdateTrackingStatus) -> ActionResult<()> {
    let body = match ctx.json(update) {
        Ok(body) => body,
        Err(failure) => return failure.into(),
    };

    ctx.run(
        "warehouse.update_status",
        &stale(Some(id)),
        ctx.backend()
            .patch::<IgnoredAny>(&format!("{}/{}/status", RESOURCE, id), body, ctx.options()),
    )
    .await
    .discard()
}

/// Upload the line items of an existing tracking from a spreadsheet
pub async fn import_details(ctx: &ActionContext, id: &str, form: FormPayload) -> ActionResult<ImportOutcome> {
    imports::import(
        ctx,
        "warehouse.import_details",
        &format!("{}/{}/details/import", RESOURCE, id),
        form,
        &stale(Some(id)),
    )
    .await
}

pub async fn delete_range(ctx: &ActionContext, ids: &SelectionSet) -> ActionResult<()> {
    if ids.is_empty() {
        return ActionFailure::invalid_field("ids", "Select at least one row").into();
    }

    ctx.run(
        "warehouse.delete_range",
        &stale(None),
        ctx.backend()
            .delete_many::<IgnoredAny>(&format!("{}/range", RESOURCE), ids.ids(), ctx.options()),
    )
    .await
    .discard()
}
