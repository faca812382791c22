//! Signed-in user profile and permission model

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use validator::Validate;

/// Role held by an account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Employee,
    #[default]
    User,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "Admin",
            Role::Employee => "Employee",
            Role::User => "User",
            Role::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "admin" | "administrator" => Role::Admin,
            "employee" | "librarian" => Role::Employee,
            "user" | "patron" | "reader" => Role::User,
            _ => Role::Other(s),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

/// Console areas gated by permission
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Feature {
    Book,
    Author,
    Category,
    User,
    Employee,
    Borrowing,
    Fine,
    Warehouse,
    Notification,
    SystemConfiguration,
    Other(String),
}

impl Feature {
    pub fn as_str(&self) -> &str {
        match self {
            Feature::Book => "Book",
            Feature::Author => "Author",
            Feature::Category => "Category",
            Feature::User => "User",
            Feature::Employee => "Employee",
            Feature::Borrowing => "Borrowing",
            Feature::Fine => "Fine",
            Feature::Warehouse => "Warehouse",
            Feature::Notification => "Notification",
            Feature::SystemConfiguration => "SystemConfiguration",
            Feature::Other(s) => s.as_str(),
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for Feature {
    fn from(s: String) -> Self {
        match s.to_lowercase().replace(['_', '-', ' '], "").as_str() {
            "book" => Feature::Book,
            "author" => Feature::Author,
            "category" => Feature::Category,
            "user" => Feature::User,
            "employee" => Feature::Employee,
            "borrowing" | "borrow" => Feature::Borrowing,
            "fine" => Feature::Fine,
            "warehouse" | "warehousetracking" => Feature::Warehouse,
            "notification" => Feature::Notification,
            "systemconfiguration" => Feature::SystemConfiguration,
            _ => Feature::Other(s),
        }
    }
}

impl From<Feature> for String {
    fn from(feature: Feature) -> Self {
        feature.as_str().to_string()
    }
}

/// Current user as returned by the backend `me` endpoint
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
    #[serde(default)]
    #[schema(value_type = String)]
    pub role: Role,
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub features: Vec<Feature>,
}

impl UserProfile {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins hold every feature
    pub fn has_feature(&self, feature: &Feature) -> bool {
        self.is_admin() || self.features.contains(feature)
    }
}

/// Which account family a credential flow targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    User,
    Employee,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::User => "user",
            AccountKind::Employee => "employee",
        }
    }
}

impl std::str::FromStr for AccountKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(AccountKind::User),
            "employee" => Ok(AccountKind::Employee),
            _ => Err(format!("Invalid account kind: {}", s)),
        }
    }
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[serde(default = "default_account_kind")]
    pub account: AccountKind,
}

fn default_account_kind() -> AccountKind {
    AccountKind::Employee
}

/// Set a new password using a reset token
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub new_password: String,
    pub token: String,
    #[serde(rename = "type")]
    pub account: AccountKind,
}

/// Ask for a password reset link
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[serde(rename = "type")]
    pub account: AccountKind,
}

/// Update own profile
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(length(min = 6, max = 20, message = "Phone number must be 6-20 characters"))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub dob: Option<chrono::NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_features() {
        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "email": "ana@library.test",
            "firstName": "Ana",
            "role": "Employee",
            "features": ["Author", "warehouse_tracking", "Reports"]
        }))
        .unwrap();

        assert!(profile.has_feature(&Feature::Author));
        assert!(profile.has_feature(&Feature::Warehouse));
        assert!(!profile.has_feature(&Feature::Fine));
        assert!(profile.features.contains(&Feature::Other("Reports".to_string())));
    }

    #[test]
    fn test_admin_holds_every_feature() {
        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "id": "u0",
            "email": "root@library.test",
            "role": "admin"
        }))
        .unwrap();
        assert!(profile.has_feature(&Feature::SystemConfiguration));
        assert_eq!(serde_json::to_value(&profile.role).unwrap(), "Admin");
    }
}
