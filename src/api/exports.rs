//! Spreadsheet exports, streamed back as attachments

use axum::{
    extract::{Path, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderValue,
    },
    response::{IntoResponse, Response},
};

use crate::{
    actions::{authors, books, patrons},
    backend::{CacheMode, Download},
    error::{AppError, AppResult},
    models::Feature,
    session::SessionAccessor,
    AppState,
};

fn export_source(domain: &str) -> Option<(Feature, &'static str)> {
    match domain {
        "authors" => Some((Feature::Author, authors::EXPORT_PATH)),
        "books" => Some((Feature::Book, books::EXPORT_PATH)),
        "patrons" => Some((Feature::User, patrons::EXPORT_PATH)),
        _ => None,
    }
}

/// `attachment; filename="..."`, with quotes and control characters stripped
pub fn attachment_header(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .filter(|c| *c != '"' && *c != '\\' && !c.is_control())
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}

fn into_attachment(download: Download, fallback_name: &str) -> AppResult<Response> {
    let file_name = download.file_name.unwrap_or_else(|| fallback_name.to_string());

    let disposition = HeaderValue::from_str(&attachment_header(&file_name))
        .or_else(|_| HeaderValue::from_str(&attachment_header(fallback_name)))
        .map_err(|e| AppError::Internal(format!("Invalid export file name: {}", e)))?;
    let content_type = HeaderValue::from_str(&download.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

    Ok((
        [(CONTENT_TYPE, content_type), (CONTENT_DISPOSITION, disposition)],
        download.bytes,
    )
        .into_response())
}

/// Download a domain export
#[utoipa::path(
    get,
    path = "/exports/{domain}",
    tag = "exports",
    params(("domain" = String, Path, description = "authors, books or patrons")),
    responses(
        (status = 200, description = "Export file as an attachment"),
        (status = 303, description = "Not signed in or missing permission"),
        (status = 404, description = "Unknown export", body = crate::error::ErrorResponse)
    )
)]
pub async fn export(
    State(state): State<AppState>,
    session: SessionAccessor,
    Path(domain): Path<String>,
) -> AppResult<Response> {
    let (feature, source) =
        export_source(&domain).ok_or_else(|| AppError::NotFound(format!("Unknown export: {}", domain)))?;

    session.protect(Some(feature)).await?;

    let download = state
        .backend
        .download(source, session.request_options().cache(CacheMode::NoStore))
        .await?;

    tracing::info!(domain = %domain, bytes = download.bytes.len(), "Export downloaded");

    into_attachment(download, &format!("{}-export.xlsx", domain))
}
