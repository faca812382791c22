//! Fines and payments

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum FineType {
    LateReturn,
    Damaged,
    Lost,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    BankTransfer,
}

pub(crate) fn positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() || amount.is_zero() {
        let mut error = ValidationError::new("positive_amount");
        error.message = Some("Amount must be greater than zero".into());
        return Err(error);
    }
    if amount.scale() > 2 {
        let mut error = ValidationError::new("amount_precision");
        error.message = Some("Amount cannot have more than two decimals".into());
        return Err(error);
    }
    Ok(())
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFine {
    #[validate(length(min = 1, message = "Borrow record is required"))]
    pub borrow_record_id: String,
    pub fine_type: FineType,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    #[validate(custom(function = "positive_amount"))]
    pub amount: Decimal,
    pub reason: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayFine {
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    #[validate(custom(function = "positive_amount"))]
    pub amount: Decimal,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WaiveFine {
    #[validate(length(min = 1, max = 500, message = "A reason is required"))]
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn pay(amount: Decimal) -> PayFine {
        PayFine {
            amount,
            payment_method: PaymentMethod::Cash,
            note: None,
        }
    }

    #[test]
    fn test_amount_bounds() {
        assert!(pay(dec("15000")).validate().is_ok());
        assert!(pay(dec("12.50")).validate().is_ok());
        assert!(pay(dec("0")).validate().is_err());
        assert!(pay(dec("-1")).validate().is_err());
        assert!(pay(dec("1.005")).validate().is_err());
    }

    #[test]
    fn test_amount_wire_format() {
        let fine: PayFine = serde_json::from_value(serde_json::json!({ "amount": 12.5 })).unwrap();
        assert_eq!(fine.amount, dec("12.5"));
        assert_eq!(fine.payment_method, PaymentMethod::Cash);
        assert_eq!(serde_json::to_value(&fine).unwrap()["amount"], serde_json::json!(12.5));
    }
}
