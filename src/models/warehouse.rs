//! Warehouse stock tracking

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use validator::Validate;

use super::fine::positive_amount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TrackingType {
    StockIn,
    StockOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TrackingStatus {
    Pending,
    Completed,
    Cancelled,
}

impl TrackingStatus {
    /// Completed and cancelled receipts are frozen
    pub fn can_become(&self, next: TrackingStatus) -> bool {
        matches!(
            (self, next),
            (TrackingStatus::Pending, TrackingStatus::Completed) | (TrackingStatus::Pending, TrackingStatus::Cancelled)
        )
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackingLine {
    #[validate(length(min = 1, message = "Book edition is required"))]
    pub book_edition_id: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    #[validate(custom(function = "positive_amount"))]
    pub unit_price: Decimal,
    pub note: Option<String>,
}

/// Stock receipt or dispatch
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTracking {
    pub tracking_type: TrackingType,
    #[validate(length(min = 1, message = "Supplier is required"))]
    pub supplier_id: String,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Add at least one line"), nested)]
    pub lines: Vec<TrackingLine>,
}

impl CreateTracking {
    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .map(|line| line.unit_price * Decimal::from(line.quantity))
            .sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTrackingStatus {
    pub status: TrackingStatus,
}
