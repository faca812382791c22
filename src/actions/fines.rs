//! Fine actions

use serde::de::IgnoredAny;

use crate::{
    cache::CacheTag,
    models::{
        fine::{CreateFine, PayFine, WaiveFine},
        Created,
    },
    selection::SelectionSet,
};

use super::{ActionContext, ActionFailure, ActionResult, Stale};

const RESOURCE: &str = "/api/fines";
pub const LIST_VIEW: &str = "/views/fines";

fn stale(id: Option<&str>) -> Vec<Stale> {
    let mut stale = vec![Stale::Tag(CacheTag::Fines), Stale::path(LIST_VIEW)];
    if let Some(id) = id {
        stale.push(Stale::path(format!("{}/{}", LIST_VIEW, id)));
    }
    stale
}

pub async fn create(ctx: &ActionContext, fine: &CreateFine) -> ActionResult<Created> {
    let body = match ctx.prepare(fine) {
        Ok(body) => body,
        Err(failure) => return failure.into(),
    };

    ctx.create("fines.create", &stale(None), RESOURCE, body).await
}

pub async fn pay(ctx: &ActionContext, id: &str, payment: &PayFine) -> ActionResult<()> {
    let body = match ctx.prepare(payment) {
        Ok(body) => body,
        Err(failure) => return failure.into(),
    };

    ctx.run(
        "fines.pay",
        &stale(Some(id)),
        ctx.backend()
            .post::<IgnoredAny>(&format!("{}/{}/pay", RESOURCE, id), body, ctx.options()),
    )
    .await
    .discard()
}

pub async fn waive(ctx: &ActionContext, id: &str, waiver: &WaiveFine) -> ActionResult<()> {
    let body = match ctx.prepare(waiver) {
        Ok(body) => body,
        Err(failure) => return failure.into(),
    };

    ctx.run(
        "fines.waive",
        &stale(Some(id)),
        ctx.backend()
            .patch::<IgnoredAny>(&format!("{}/{}/waive", RESOURCE, id), body, ctx.options()),
    )
    .await
    .discard()
}

pub async fn delete_range(ctx: &ActionContext, ids: &SelectionSet) -> ActionResult<()> {
    if ids.is_empty() {
        return ActionFailure::invalid_field("ids", "Select at least one row").into();
    }

    ctx.run(
        "fines.delete_range",
        &stale(None),
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
    use crate::models::fine::PaymentMethod;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_pay_sends_amount_as_number() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/fines/f1/pay"))
            .and(body_json(json!({ "amount": 25000.0, "paymentMethod": "Card" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Paid" })))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = context(&server, permissive());
        let payment = PayFine {
            amount: "25000".parse().unwrap(),
            payment_method: PaymentMethod::Card,
            note: None,
        };
        assert!(pay(&ctx, "f1", &payment).await.is_success());
    }
}
