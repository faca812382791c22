//! Notifications sent to patrons and staff

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum NotificationType {
    #[default]
    Notice,
    Reminder,
    Warning,
    Event,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendNotification {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 5000, message = "Content is required"))]
    pub content: String,
    #[serde(default)]
    pub notification_type: NotificationType,
    /// Empty means everyone
    #[serde(default)]
    pub recipient_ids: Vec<String>,
}
