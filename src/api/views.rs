//! Cached read models behind the management screens
//!
//! `GET /views/<name>` lists, `GET /views/<name>/<id>` shows one record.
//! Reads are gated by the screen's feature, then served through the page
//! cache that actions invalidate.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use crate::{
    cache::CacheTag,
    error::{AppError, AppResult},
    models::{Feature, ListQuery},
    session::SessionAccessor,
    AppState,
};

pub const VIEW_PREFIX: &str = "/views";

struct ViewEntry {
    feature: Option<Feature>,
    resource: &'static str,
    tags: &'static [CacheTag],
    detail: bool,
}

impl ViewEntry {
    fn list(feature: Feature, resource: &'static str, tags: &'static [CacheTag]) -> Self {
        Self {
            feature: Some(feature),
            resource,
            tags,
            detail: true,
        }
    }

    fn trash(feature: Feature, resource: &'static str, tags: &'static [CacheTag]) -> Self {
        Self {
            detail: false,
            ..Self::list(feature, resource, tags)
        }
    }
}

fn view_entry(name: &str) -> Option<ViewEntry> {
    let entry = match name {
        "authors" => ViewEntry::list(Feature::Author, "/api/authors", &[CacheTag::Authors]),
        "authors/trash" => ViewEntry::trash(Feature::Author, "/api/authors/trash", &[CacheTag::Authors]),
        "books" => ViewEntry::list(Feature::Book, "/api/books", &[CacheTag::Books, CacheTag::Categories]),
        "categories" => ViewEntry::list(Feature::Category, "/api/categories", &[CacheTag::Categories]),
        "patrons" => ViewEntry::list(Feature::User, "/api/users", &[CacheTag::Users]),
        "patrons/trash" => ViewEntry::trash(Feature::User, "/api/users/trash", &[CacheTag::Users]),
        "employees" => ViewEntry::list(Feature::Employee, "/api/employees", &[CacheTag::Employees]),
        "employees/trash" => ViewEntry::trash(Feature::Employee, "/api/employees/trash", &[CacheTag::Employees]),
        "borrowing/requests" => ViewEntry::list(Feature::Borrowing, "/api/borrow-requests", &[CacheTag::Borrowing]),
        "borrowing/records" => ViewEntry::list(
            Feature::Borrowing,
            "/api/borrow-records",
            &[CacheTag::Borrowing, CacheTag::Fines],
        ),
        "fines" => ViewEntry::list(Feature::Fine, "/api/fines", &[CacheTag::Fines]),
        "warehouse" => ViewEntry::list(Feature::Warehouse, "/api/warehouse-trackings", &[CacheTag::Warehouse]),
        "notifications" => ViewEntry::list(Feature::Notification, "/api/notifications", &[CacheTag::Notifications]),
        "profile" => ViewEntry {
            feature: None,
            resource: "/api/auth/me",
            tags: &[CacheTag::Users],
            detail: false,
        },
        _ => return None,
    };
    Some(entry)
}

/// A view name resolved to what it reads
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedView {
    pub feature: Option<Feature>,
    pub backend_path: String,
    pub tags: &'static [CacheTag],
}

/// Map `authors`, `authors/<id>`, `borrowing/records/<id>`... to a backend read
pub fn resolve(view: &str) -> Option<ResolvedView> {
    let view = view.trim_matches('/');

    if let Some(entry) = view_entry(view) {
        return Some(ResolvedView {
            feature: entry.feature,
            backend_path: entry.resource.to_string(),
            tags: entry.tags,
        });
    }

    let (base, id) = view.rsplit_once('/')?;
    if id.is_empty() {
        return None;
    }
    let entry = view_entry(base).filter(|entry| entry.detail)?;

    Some(ResolvedView {
        feature: entry.feature,
        backend_path: format!("{}/{}", entry.resource, id),
        tags: entry.tags,
    })
}

/// Render a view's data
#[utoipa::path(
    get,
    path = "/views/{view}",
    tag = "views",
    params(
        ("view" = String, Path, description = "View name, optionally followed by a record id"),
        ListQuery
    ),
    responses(
        (status = 200, description = "Backend data for the view"),
        (status = 303, description = "Not signed in or missing permission"),
        (status = 404, description = "Unknown view", body = crate::error::ErrorResponse)
    )
)]
pub async fn render(
    State(state): State<AppState>,
    session: SessionAccessor,
    Path(view): Path<String>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Value>> {
    let resolved = resolve(&view).ok_or_else(|| AppError::NotFound(format!("Unknown view: {}", view)))?;

    session.protect(resolved.feature.clone()).await?;

    let cache_path = format!("{}/{}", VIEW_PREFIX, view.trim_matches('/'));
    let options = query
        .pairs()
        .into_iter()
        .fold(session.request_options(), |options, (key, value)| options.query(key, value));

    let data = state
        .cache
        .read(
            &session.scope(),
            &cache_path,
            &query.cache_variant(),
            resolved.tags,
            || state.backend.get::<Value>(&resolved.backend_path, options),
        )
        .await?;

    Ok(Json(data))
}
