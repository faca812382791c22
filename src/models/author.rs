//! Author payloads

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Create or update an author
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_life_span", skip_on_field_errors = true))]
pub struct AuthorPayload {
    #[validate(length(min = 1, max = 255, message = "Full name is required"))]
    pub full_name: String,
    #[validate(length(max = 50))]
    pub author_code: Option<String>,
    pub biography: Option<String>,
    pub nationality: Option<String>,
    /// Date of birth
    pub dob: Option<NaiveDate>,
    /// Date of death
    pub dod: Option<NaiveDate>,
}

fn validate_life_span(payload: &AuthorPayload) -> Result<(), ValidationError> {
    match (payload.dob, payload.dod) {
        (Some(born), Some(died)) if died < born => {
            let mut error = ValidationError::new("life_span");
            error.message = Some("Date of death cannot precede date of birth".into());
            Err(error)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(dob: &str, dod: &str) -> AuthorPayload {
        AuthorPayload {
            full_name: "Nguyen Du".to_string(),
            author_code: None,
            biography: None,
            nationality: Some("Vietnamese".to_string()),
            dob: Some(dob.parse().unwrap()),
            dod: Some(dod.parse().unwrap()),
        }
    }

    #[test]
    fn test_life_span_order() {
        assert!(author("1765-01-03", "1820-09-16").validate().is_ok());
        assert!(author("1820-09-16", "1765-01-03").validate().is_err());
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut payload = author("1765-01-03", "1820-09-16");
        payload.full_name.clear();
        assert!(payload.validate().unwrap_err().field_errors().contains_key("full_name"));
    }
}
