//! Patron (library member) payloads

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Membership tier printed on the library card
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PatronType {
    #[default]
    Standard,
    Student,
    Staff,
    Vip,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatronPayload {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, max = 50, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name is required"))]
    pub last_name: String,
    #[validate(length(min = 6, max = 20, message = "Phone number must be 6-20 characters"))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<Gender>,
    #[serde(default)]
    pub patron_type: PatronType,
    /// Card expiry, defaults to the backend's policy when absent
    pub card_expiry_date: Option<NaiveDate>,
}
