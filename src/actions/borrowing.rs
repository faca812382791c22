//! Borrowing lifecycle: request, approve or reject, return, extend.
//!
//! Every step changes copy availability, so book views go stale as well.

use serde::de::IgnoredAny;

use crate::{
    backend::RequestBody,
    cache::CacheTag,
    models::{
        borrowing::{CreateBorrowRequest, ExtendBorrow, RejectBorrowRequest, ReturnBooks},
        Created,
    },
};

use super::{ActionContext, ActionResult, MessageResponse, Stale};

const REQUESTS: &str = "/api/borrow-requests";
const RECORDS: &str = "/api/borrow-records";
pub const REQUESTS_VIEW: &str = "/views/borrowing/requests";
pub const RECORDS_VIEW: &str = "/views/borrowing/records";

fn stale() -> [Stale; 4] {
    [
        Stale::Tag(CacheTag::Borrowing),
        Stale::Tag(CacheTag::Books),
        Stale::path(REQUESTS_VIEW),
        Stale::path(RECORDS_VIEW),
    ]
}

pub async fn create_request(ctx: &ActionContext, request: &CreateBorrowRequest) -> ActionResult<Created> {
    let body = match ctx.prepare(request) {
        Ok(body) => body,
        Err(failure) => return failure.into(),
    };

    ctx.create("borrowing.create_request", &stale(), REQUESTS, body).await
}

pub async fn approve(ctx: &ActionContext, request_id: &str) -> ActionResult<()> {
    ctx.run(
        "borrowing.approve",
        &stale(),
        ctx.backend().patch::<IgnoredAny>(
            &format!("{}/{}/approve", REQUESTS, request_id),
            RequestBody::Empty,
            ctx.options(),
        ),
    )
    .await
    .discard()
}

pub async fn reject(ctx: &ActionContext, request_id: &str, rejection: &RejectBorrowRequest) -> ActionResult<()> {
    let body = match ctx.prepare(rejection) {
        Ok(body) => body,
        Err(failure) => return failure.into(),
    };

    ctx.run(
        "borrowing.reject",
        &stale(),
        ctx.backend()
            .patch::<IgnoredAny>(&format!("{}/{}/reject", REQUESTS, request_id), body, ctx.options()),
    )
    .await
    .discard()
}

/// Check copies of a borrow record back in; answers the backend's summary
pub async fn return_books(ctx: &ActionContext, record_id: &str, returned: &ReturnBooks) -> ActionResult<String> {
    let body = match ctx.prepare(returned) {
        Ok(body) => body,
        Err(failure) => return failure.into(),
    };

    let finable = returned.copies.iter().filter(|copy| copy.condition.is_finable()).count();
    let mut stale = stale().to_vec();
    if finable > 0 {
        stale.push(Stale::Tag(CacheTag::Fines));
    }

    ctx.run(
        "borrowing.return_books",
        &stale,
        ctx.backend().post::<Option<MessageResponse>>(
            &format!("{}/{}/return", RECORDS, record_id),
            body,
            ctx.options(),
        ),
    )
    .await
    .map(|response| response.unwrap_or_default().message_or("Books returned"))
}

pub async fn extend(ctx: &ActionContext, record_id: &str, extension: &ExtendBorrow) -> ActionResult<()> {
    let body = match ctx.prepare(extension) {
        Ok(body) => body,
        Err(failure) => return failure.into(),
    };

    ctx.run(
        "borrowing.extend",
        &stale(),
        ctx.backend()
            .patch::<IgnoredAny>(&format!("{}/{}/extend", RECORDS, record_id), body, ctx.options()),
    )
    .await
    .discard()
}
