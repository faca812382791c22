//! Borrow requests and their lifecycle payloads

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Condition of a copy when it comes back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BookCondition {
    #[default]
    Good,
    Worn,
    Damaged,
    Lost,
}

impl BookCondition {
    /// Returns in this condition usually end up with a fine
    pub fn is_finable(&self) -> bool {
        matches!(self, BookCondition::Damaged | BookCondition::Lost)
    }
}

/// Open a borrow request on behalf of a patron
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_borrow_window", skip_on_field_errors = true))]
pub struct CreateBorrowRequest {
    #[validate(length(min = 1, message = "Library card is required"))]
    pub library_card_id: String,
    #[validate(length(min = 1, max = 10, message = "Pick between 1 and 10 books"))]
    pub book_copy_ids: Vec<String>,
    pub borrow_date: Option<NaiveDate>,
    pub due_date: NaiveDate,
    pub note: Option<String>,
}

fn validate_borrow_window(request: &CreateBorrowRequest) -> Result<(), ValidationError> {
    match request.borrow_date {
        Some(borrowed) if request.due_date <= borrowed => {
            let mut error = ValidationError::new("borrow_window");
            error.message = Some("Due date must be after the borrow date".into());
            Err(error)
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectBorrowRequest {
    #[validate(length(min = 1, max = 500, message = "A reason is required"))]
    pub reason: String,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnedCopy {
    #[validate(length(min = 1))]
    pub book_copy_id: String,
    #[serde(default)]
    pub condition: BookCondition,
    pub note: Option<String>,
}

/// Check copies back in
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnBooks {
    #[validate(length(min = 1, message = "Select at least one copy to return"), nested)]
    pub copies: Vec<ReturnedCopy>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtendBorrow {
    pub new_due_date: NaiveDate,
}
