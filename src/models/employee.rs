//! Employee payloads

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use validator::Validate;

use super::patron::Gender;

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePayload {
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
    /// Backend role the account is granted
    #[validate(length(min = 1, message = "Role is required"))]
    pub role_id: String,
    pub hire_date: Option<NaiveDate>,
    pub job_title: Option<String>,
}
