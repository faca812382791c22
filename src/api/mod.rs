//! HTTP routes of the admin console

pub mod actions;
pub mod auth;
pub mod events;
pub mod exports;
pub mod health;
pub mod openapi;
pub mod views;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use axum_extra::extract::Multipart;

use crate::{backend::FormPayload, error::AppError, AppState};

/// Buffer a browser multipart upload so it can be validated and forwarded
pub async fn read_form(mut multipart: Multipart) -> Result<FormPayload, AppError> {
    let mut form = FormPayload::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);

        form = match file_name {
            Some(file_name) => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read upload {}: {}", name, e)))?;
                form.file(name, file_name, content_type, bytes)
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read field {}: {}", name, e)))?;
                form.text(name, value)
            }
        };
    }

    Ok(form)
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let session_routes = Router::new()
        .route("/token", get(auth::token))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me).put(auth::update_profile))
        .route("/change-password", post(auth::change_password))
        .route("/forgot-password", post(auth::forgot_password));

    let action_routes = Router::new()
        // Authors
        .route("/authors", post(actions::create_author))
        .route("/authors/:id", put(actions::update_author))
        .route("/authors/delete-range", post(actions::delete_authors))
        .route("/authors/restore-range", post(actions::restore_authors))
        .route("/authors/delete-permanently", post(actions::purge_authors))
        // Books
        .route("/books/delete-range", post(actions::delete_books))
        // Categories
        .route("/categories", post(actions::create_category))
        .route("/categories/:id", put(actions::update_category))
        .route("/categories/delete-range", post(actions::delete_categories))
        // Patrons
        .route("/patrons", post(actions::create_patron))
        .route("/patrons/:id", put(actions::update_patron))
        .route("/patrons/delete-range", post(actions::delete_patrons))
        .route("/patrons/restore-range", post(actions::restore_patrons))
        .route("/patrons/delete-permanently", post(actions::purge_patrons))
        // Employees
        .route("/employees", post(actions::create_employee))
        .route("/employees/:id", put(actions::update_employee))
        .route("/employees/delete-range", post(actions::delete_employees))
        .route("/employees/restore-range", post(actions::restore_employees))
        .route("/employees/delete-permanently", post(actions::purge_employees))
        // Borrowing
        .route("/borrowing/requests", post(actions::create_borrow_request))
        .route("/borrowing/requests/:id/approve", post(actions::approve_borrow_request))
        .route("/borrowing/requests/:id/reject", post(actions::reject_borrow_request))
        .route("/borrowing/records/:id/return", post(actions::return_books))
        .route("/borrowing/records/:id/extend", post(actions::extend_borrow))
        // Fines
        .route("/fines", post(actions::create_fine))
        .route("/fines/:id/pay", post(actions::pay_fine))
        .route("/fines/:id/waive", post(actions::waive_fine))
        .route("/fines/delete-range", post(actions::delete_fines))
        // Warehouse
        .route("/warehouse", post(actions::create_tracking))
        .route("/warehouse/:id/status", put(actions::update_tracking_status))
        .route("/warehouse/delete-range", post(actions::delete_trackings))
        // Notifications
        .route("/notifications", post(actions::send_notification))
        .route("/notifications/:id/read", post(actions::mark_notification_read))
        .route("/notifications/read-all", post(actions::mark_all_notifications_read))
        .route("/notifications/delete-range", post(actions::delete_notifications));

    // spreadsheets and cover images
    let upload_routes = Router::new()
        .route("/authors/import", post(actions::import_authors))
        .route("/books", post(actions::create_book))
        .route("/books/:id", put(actions::update_book))
        .route("/books/import", post(actions::import_books))
        .route("/patrons/import", post(actions::import_patrons))
        .route("/employees/import", post(actions::import_employees))
        .route("/warehouse/:id/import", post(actions::import_tracking_details))
        .layer(DefaultBodyLimit::max(state.config.server.max_upload_bytes));

    let app = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/api/auth", session_routes)
        .nest("/actions", action_routes.merge(upload_routes))
        .route("/views/*view", get(views::render))
        .route("/exports/:domain", get(exports::export))
        .route("/events", get(events::stream))
        .with_state(state);

    app.merge(openapi::create_openapi_router())
}
