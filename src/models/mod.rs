//! Request and response payloads exchanged with the console and the backend

pub mod author;
pub mod book;
pub mod borrowing;
pub mod category;
pub mod employee;
pub mod fine;
pub mod notification;
pub mod patron;
pub mod user;
pub mod warehouse;

use serde::{Deserialize, Deserializer, Serialize};
use serde_with::skip_serializing_none;
use utoipa::{IntoParams, ToSchema};

use crate::selection::SelectionSet;

// Re-export commonly used types
pub use user::{Feature, Role, UserProfile};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

/// Backend ids arrive as strings or numbers; the console treats them as text
pub fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}

/// Id of a resource the backend just created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Created {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
}

impl Created {
    /// Read `{ "id": ... }` out of a create response body, if it has one
    pub fn from_body(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }
}

/// Ids checked on a management screen, deduplicated on the way in
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BulkIds {
    #[schema(value_type = Vec<String>)]
    pub ids: SelectionSet,
}

/// Paging and search parameters forwarded to list endpoints
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Page number (1-based)
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ListQuery {
    /// Canonical query string, used as the cache variant of a view
    pub fn cache_variant(&self) -> String {
        self.pairs()
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Pairs for the backend query string
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(size) = self.page_size {
            pairs.push(("pageSize", size.to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(sort_by) = &self.sort_by {
            pairs.push(("sortBy", sort_by.clone()));
        }
        if let Some(sort_order) = &self.sort_order {
            pairs.push(("sortOrder", sort_order.clone()));
        }
        pairs
    }
}
