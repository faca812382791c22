//! Action endpoints
//!
//! Every handler answers `200` with an action result, successful or not.
//! Only a malformed request body is rejected before the action runs.

use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::Multipart;

use crate::{
    actions::{
        authors, books, borrowing, categories, employees, fines, notifications, patrons, warehouse, ActionResult,
        ImportOutcome,
    },
    error::AppResult,
    models::{
        author::AuthorPayload,
        borrowing::{CreateBorrowRequest, ExtendBorrow, RejectBorrowRequest, ReturnBooks},
        category::CategoryPayload,
        employee::EmployeePayload,
        fine::{CreateFine, PayFine, WaiveFine},
        notification::SendNotification,
        patron::PatronPayload,
        warehouse::{CreateTracking, UpdateTrackingStatus},
        BulkIds, Created,
    },
    session::SessionAccessor,
    AppState,
};

use super::read_form;

// Authors

/// Create an author
#[utoipa::path(
    post,
    path = "/actions/authors",
    tag = "authors",
    request_body = AuthorPayload,
    responses((status = 200, description = "Action result carrying the new id"))
)]
pub async fn create_author(
    State(state): State<AppState>,
    session: SessionAccessor,
    Json(payload): Json<AuthorPayload>,
) -> Json<ActionResult<Created>> {
    let ctx = state.action_context(&session);
    Json(authors::create(&ctx, &payload).await)
}

/// Update an author
#[utoipa::path(
    put,
    path = "/actions/authors/{id}",
    tag = "authors",
    params(("id" = String, Path, description = "Author ID")),
    request_body = AuthorPayload,
    responses((status = 200, description = "Action result"))
)]
pub async fn update_author(
    State(state): State<AppState>,
    session: SessionAccessor,
    Path(id): Path<String>,
    Json(payload): Json<AuthorPayload>,
) -> Json<ActionResult<()>> {
    let ctx = state.action_context(&session);
    Json(authors::update(&ctx, &id, &payload).await)
}

/// Move authors to the recycle bin
#[utoipa::path(
    post,
    path = "/actions/authors/delete-range",
    tag = "authors",
    request_body = BulkIds,
    responses((status = 200, description = "Action result"))
)]
pub async fn delete_authors(
    State(state): State<AppState>,
    session: SessionAccessor,
    Json(bulk): Json<BulkIds>,
) -> Json<ActionResult<()>> {
    let ctx = state.action_context(&session);
    Json(authors::delete_range(&ctx, &bulk.ids).await)
}

/// Restore authors from the recycle bin
#[utoipa::path(
    post,
    path = "/actions/authors/restore-range",
    tag = "authors",
    request_body = BulkIds,
    responses((status = 200, description = "Action result"))
)]
pub async fn restore_authors(
    State(state): State<AppState>,
    session: SessionAccessor,
    Json(bulk): Json<BulkIds>,
) -> Json<ActionResult<()>> {
    let ctx = state.action_context(&session);
    Json(authors::restore_range(&ctx, &bulk.ids).await)
}

/// Delete authors for good
#[utoipa::path(
    post,
    path = "/actions/authors/delete-permanently",
    tag = "authors",
    request_body = BulkIds,
    responses((status = 200, description = "Action result"))
)]
pub async fn purge_authors(
    State(state): State<AppState>,
    session: SessionAccessor,
    Json(bulk): Json<BulkIds>,
) -> Json<ActionResult<()>> {
    let ctx = state.action_context(&session);
    Json(authors::delete_permanently(&ctx, &bulk.ids).await)
}

/// Import authors from a spreadsheet
#[utoipa::path(
    post,
    path = "/actions/authors/import",
    tag = "authors",
    request_body(content_type = "multipart/form-data", description = "`file` field with the spreadsheet"),
    responses(
        (status = 200, description = "Completed or per-row diagnostics"),
        (status = 400, description = "Malformed multipart body")
    )
)]
pub async fn import_authors(
    State(state): State<AppState>,
    session: SessionAccessor,
    multipart: Multipart,
) -> AppResult<Json<ActionResult<ImportOutcome>>> {
    let form = read_form(multipart).await?;
    let ctx = state.action_context(&session);
    Ok(Json(authors::import(&ctx, form).await))
}

// Books

/// Create a book edition (multipart, optional `coverImage`)
#[utoipa::path(
    post,
    path = "/actions/books",
    tag = "books",
    request_body(content_type = "multipart/form-data", description = "Edition fields and optional cover"),
    responses((status = 200, description = "Action result carrying the new id"))
)]
pub async fn create_book(
    State(state): State<AppState>,
    session: SessionAccessor,
    multipart: Multipart,
) -> AppResult<Json<ActionResult<Created>>> {
    let form = read_form(multipart).await?;
    let ctx = state.action_context(&session);
    Ok(Json(books::create(&ctx, form).await))
}

/// Update a book edition
#[utoipa::path(
    put,
    path = "/actions/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book edition ID")),
    request_body(content_type = "multipart/form-data", description = "Edition fields and optional cover"),
    responses((status = 200, description = "Action result"))
)]
pub async fn update_book(
    State(state): State<AppState>,
    session: SessionAccessor,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<ActionResult<()>>> {
    let form = read_form(multipart).await?;
    let ctx = state.action_context(&session);
    Ok(Json(books::update(&ctx, &id, form).await))
}

#[utoipa::path(
    post,
    path = "/actions/books/delete-range",
    tag = "books",
    request_body = BulkIds,
    responses((status = 200, description = "Action result"))
)]
pub async fn delete_books(
    State(state): State<AppState>,
    session: SessionAccessor,
    Json(bulk): Json<BulkIds>,
) -> Json<ActionResult<()>> {
    let ctx = state.action_context(&session);
    Json(books::delete_range(&ctx, &bulk.ids).await)
}

#[utoipa::path(
    post,
    path = "/actions/books/import",
    tag = "books",
    request_body(content_type = "multipart/form-data", description = "`file` field with the spreadsheet"),
    responses((status = 200, description = "Completed or per-row diagnostics"))
)]
pub async fn import_books(
    State(state): State<AppState>,
    session: SessionAccessor,
    multipart: Multipart,
) -> AppResult<Json<ActionResult<ImportOutcome>>> {
    let form = read_form(multipart).await?;
    let ctx = state.action_context(&session);
    Ok(Json(books::import(&ctx, form).await))
}

// Categories

#[utoipa::path(
    post,
    path = "/actions/categories",
    tag = "categories",
    request_body = CategoryPayload,
    responses((status = 200, description = "Action result carrying the new id"))
)]
pub async fn create_category(
    State(state): State<AppState>,
    session: SessionAccessor,
    Json(payload): Json<CategoryPayload>,
) -> Json<ActionResult<Created>> {
    let ctx = state.action_context(&session);
    Json(categories::create(&ctx, &payload).await)
}

#[utoipa::path(
    put,
    path = "/actions/categories/{id}",
    tag = "categories",
    params(("id" = String, Path, description = "Category ID")),
    request_body = CategoryPayload,
    responses((status = 200, description = "Action result"))
)]
pub async fn update_category(
    State(state): State<AppState>,
    session: SessionAccessor,
    Path(id): Path<String>,
    Json(payload): Json<CategoryPayload>,
) -> Json<ActionResult<()>> {
    let ctx = state.action_context(&session);
    Json(categories::update(&ctx, &id, &payload).await)
}

#[utoipa::path(
    post,
    path = "/actions/categories/delete-range",
    tag = "categories",
    request_body = BulkIds,
    responses((status = 200, description = "Action result"))
)]
pub async fn delete_categories(
    State(state): State<AppState>,
    session: SessionAccessor,
    Json(bulk): Json<BulkIds>,
) -> Json<ActionResult<()>> {
    let ctx = state.action_context(&session);
    Json(categories::delete_range(&ctx, &bulk.ids).await)
}

// Patrons

#[utoipa::path(
    post,
    path = "/actions/patrons",
    tag = "patrons",
    request_body = PatronPayload,
    responses((status = 200, description = "Action result carrying the new id"))
)]
pub async fn create_patron(
    State(state): State<AppState>,
    session: SessionAccessor,
    Json(payload): Json<PatronPayload>,
) -> Json<ActionResult<Created>> {
    let ctx = state.action_context(&session);
    Json(patrons::create(&ctx, &payload).await)
}

#[utoipa::path(
    put,
    path = "/actions/patrons/{id}",
    tag = "patrons",
    params(("id" = String, Path, description = "Patron ID")),
    request_body = PatronPayload,
    responses((status = 200, description = "Action result"))
)]
pub async fn update_patron(
    State(state): State<AppState>,
    session: SessionAccessor,
    Path(id): Path<String>,
    Json(payload): Json<PatronPayload>,
) -> Json<ActionResult<()>> {
    let ctx = state.action_context(&session);
    Json(patrons::update(&ctx, &id, &payload).await)
}

#[utoipa::path(
    post,
    path = "/actions/patrons/delete-range",
    tag = "patrons",
    request_body = BulkIds,
    responses((status = 200, description = "Action result"))
)]
pub async fn delete_patrons(
    State(state): State<AppState>,
    session: SessionAccessor,
    Json(bulk): Json<BulkIds>,
) -> Json<ActionResult<()>> {
    let ctx = state.action_context(&session);
    Json(patrons::delete_range(&ctx, &bulk.ids).await)
}

#[utoipa::path(
    post,
    path = "/actions/patrons/restore-range",
    tag = "patrons",
    request_body = BulkIds,
    responses((status = 200, description = "Action result"))
)]
pub async fn restore_patrons(
    State(state): State<AppState>,
    session: SessionAccessor,
    Json(bulk): Json<BulkIds>,
) -> Json<ActionResult<()>> {
    let ctx = state.action_context(&session);
    Json(patrons::restore_range(&ctx, &bulk.ids).await)
}

#[utoipa::path(
    post,
    path = "/actions/patrons/delete-permanently",
    tag = "patrons",
    request_body = BulkIds,
    responses((status = 200, description = "Action result"))
)]
pub async fn purge_patrons(
    State(state): State<AppState>,
    session: SessionAccessor,
    Json(bulk): Json<BulkIds>,
) -> Json<ActionResult<()>> {
    let ctx = state.action_context(&session);
    Json(patrons::delete_permanently(&ctx, &bulk.ids).await)
}

#[utoipa::path(
    post,
    path = "/actions/patrons/import",
    tag = "patrons",
    request_body(content_type = "multipart/form-data", description = "`file` field with the spreadsheet"),
    responses((status = 200, description = "Completed or per-row diagnostics"))
)]
pub async fn import_patrons(
    State(state): State<AppState>,
    session: SessionAccessor,
    multipart: Multipart,
) -> AppResult<Json<ActionResult<ImportOutcome>>> {
    let form = read_form(multipart).await?;
    let ctx = state.action_context(&session);
    Ok(Json(patrons::import(&ctx, form).await))
}

// Employees

#[utoipa::path(
    post,
    path = "/actions/employees",
    tag = "employees",
    request_body = EmployeePayload,
    responses((status = 200, description = "Action result carrying the new id"))
)]
pub async fn create_employee(
    State(state): State<AppState>,
    session: SessionAccessor,
    Json(payload): Json<EmployeePayload>,
) -> Json<ActionResult<Created>> {
    let ctx = state.action_context(&session);
    Json(employees::create(&ctx, &payload).await)
}

#[utoipa::path(
    put,
    path = "/actions/employees/{id}",
    tag = "employees",
    params(("id" = String, Path, description = "Employee ID")),
    request_body = EmployeePayload,
    responses((status = 200, description = "Action result"))
)]
pub async fn update_employee(
    State(state): State<AppState>,
    session: SessionAccessor,
    Path(id): Path<String>,
    Json(payload): Json<EmployeePayload>,
) -> Json<ActionResult<()>> {
    let ctx = state.action_context(&session);
    Json(employees::update(&ctx, &id, &payload).await)
}

#[utoipa::path(
    post,
    path = "/actions/employees/delete-range",
    tag = "employees",
    request_body = BulkIds,
    responses((status = 200, description = "Action result"))
)]
pub async fn delete_employees(
    State(state): State<AppState>,
    session: SessionAccessor,
    Json(bulk): Json<BulkIds>,
) -> Json<ActionResult<()>> {
    let ctx = state.action_context(&session);
    Json(employees::delete_range(&ctx, &bulk.ids).await)
}

#[utoipa::path(
    post,
    path = "/actions/employees/restore-range",
    tag = "employees",
    request_body = BulkIds,
    responses((status = 200, description = "Action result"))
)]
pub async fn restore_employees(
    State(state): State<AppState>,
    session: SessionAccessor,
    Json(bulk): Json<BulkIds>,
) -> Json<ActionResult<()>> {
    let ctx = state.action_context(&session);
    Json(employees::restore_range(&ctx, &bulk.ids).await)
}

#[utoipa::path(
    post,
    path = "/actions/employees/delete-permanently",
    tag = "employees",
    request_body = BulkIds,
    responses((status = 200, description = "Action result"))
)]
pub async fn purge_employees(
    State(state): State<AppState>,
    session: SessionAccessor,
    Json(bulk): Json<BulkIds>,
) -> Json<ActionResult<()>> {
    let ctx = state.action_context(&session);
    Json(employees::delete_permanently(&ctx, &bulk.ids).await)
}

#[utoipa::path(
    post,
    path = "/actions/employees/import",
    tag = "employees",
    request_body(content_type = "multipart/form-data", description = "`file` field with the spreadsheet"),
    responses((status = 200, description = "Completed or per-row diagnostics"))
)]
pub async fn import_employees(
    State(state): State<AppState>,
    session: SessionAccessor,
    multipart: Multipart,
) -> AppResult<Json<ActionResult<ImportOutcome>>> {
    let form = read_form(multipart).await?;
    let ctx = state.action_context(&session);
    Ok(Json(employees::import(&ctx, form).await))
}

// Borrowing

#[utoipa::path(
    post,
    path = "/actions/borrowing/requests",
    tag = "borrowing",
    request_body = CreateBorrowRequest,
    responses((status = 200, description = "Action result carrying the request id"))
)]
pub async fn create_borrow_request(
    State(state): State<AppState>,
    session: SessionAccessor,
    Json(request): Json<CreateBorrowRequest>,
) -> Json<ActionResult<Created>> {
    let ctx = state.action_context(&session);
    Json(borrowing::create_request(&ctx, &request).await)
}

#[utoipa::path(
    post,
    path = "/actions/borrowing/requests/{id}/approve",
    tag = "borrowing",
    params(("id" = String, Path, description = "Borrow request ID")),
    responses((status = 200, description = "Action result"))
)]
pub async fn approve_borrow_request(
    State(state): State<AppState>,
    session: SessionAccessor,
    Path(id): Path<String>,
) -> Json<ActionResult<()>> {
    let ctx = state.action_context(&session);
    Json(borrowing::approve(&ctx, &id).await)
}

#[utoipa::path(
    post,
    path = "/actions/borrowing/requests/{id}/reject",
    tag = "borrowing",
    params(("id" = String, Path, description = "Borrow request ID")),
    request_body = RejectBorrowRequest,
    responses((status = 200, description = "Action result"))
)]
pub async fn reject_borrow_request(
    State(state): State<AppState>,
    session: SessionAccessor,
    Path(id): Path<String>,
    Json(rejection): Json<RejectBorrowRequest>,
) -> Json<ActionResult<()>> {
    let ctx = state.action_context(&session);
    Json(borrowing::reject(&ctx, &id, &rejection).await)
}

#[utoipa::path(
    post,
    path = "/actions/borrowing/records/{id}/return",
    tag = "borrowing",
    params(("id" = String, Path, description = "Borrow record ID")),
    request_body = ReturnBooks,
    responses((status = 200, description = "Action result carrying the backend summary"))
)]
pub async fn return_books(
    State(state): State<AppState>,
    session: SessionAccessor,
    Path(id): Path<String>,
    Json(returned): Json<ReturnBooks>,
) -> Json<ActionResult<String>> {
    let ctx = state.action_context(&session);
    Json(borrowing::return_books(&ctx, &id, &returned).await)
}

#[utoipa::path(
    post,
    path = "/actions/borrowing/records/{id}/extend",
    tag = "borrowing",
    params(("id" = String, Path, description = "Borrow record ID")),
    request_body = ExtendBorrow,
    responses((status = 200, description = "Action result"))
)]
pub async fn extend_borrow(
    State(state): State<AppState>,
    session: SessionAccessor,
    Path(id): Path<String>,
    Json(extension): Json<ExtendBorrow>,
) -> Json<ActionResult<()>> {
    let ctx = state.action_context(&session);
    Json(borrowing::extend(&ctx, &id, &extension).await)
}

// Fines

#[utoipa::path(
    post,
    path = "/actions/fines",
    tag = "fines",
    request_body = CreateFine,
    responses((status = 200, description = "Action result carrying the new id"))
)]
pub async fn create_fine(
    State(state): State<AppState>,
    session: SessionAccessor,
    Json(fine): Json<CreateFine>,
) -> Json<ActionResult<Created>> {
    let ctx = state.action_context(&session);
    Json(fines::create(&ctx, &fine).await)
}

#[utoipa::path(
    post,
    path = "/actions/fines/{id}/pay",
    tag = "fines",
    params(("id" = String, Path, description = "Fine ID")),
    request_body = PayFine,
    responses((status = 200, description = "Action result"))
)]
pub async fn pay_fine(
    State(state): State<AppState>,
    session: SessionAccessor,
    Path(id): Path<String>,
    Json(payment): Json<PayFine>,
) -> Json<ActionResult<()>> {
    let ctx = state.action_context(&session);
    Json(fines::pay(&ctx, &id, &payment).await)
}

#[utoipa::path(
    post,
    path = "/actions/fines/{id}/waive",
    tag = "fines",
    params(("id" = String, Path, description = "Fine ID")),
    request_body = WaiveFine,
    responses((status = 200, description = "Action result"))
)]
pub async fn waive_fine(
    State(state): State<AppState>,
    session: SessionAccessor,
    Path(id): Path<String>,
    Json(waiver): Json<WaiveFine>,
) -> Json<ActionResult<()>> {
    let ctx = state.action_context(&session);
    Json(fines::waive(&ctx, &id, &waiver).await)
}

#[utoipa::path(
    post,
    path = "/actions/fines/delete-range",
    tag = "fines",
    request_body = BulkIds,
    responses((status = 200, description = "Action result"))
)]
pub async fn delete_fines(
    State(state): State<AppState>,
    session: SessionAccessor,
    Json(bulk): Json<BulkIds>,
) -> Json<ActionResult<()>> {
    let ctx = state.action_context(&session);
    Json(fines::delete_range(&ctx, &bulk.ids).await)
}

// Warehouse

#[utoipa::path(
    post,
    path = "/actions/warehouse",
    tag = "warehouse",
    request_body = CreateTracking,
    responses((status = 200, description = "Action result carrying the new id"))
)]
pub async fn create_tracking(
    State(state): State<AppState>,
    session: SessionAccessor,
    Json(tracking): Json<CreateTracking>,
) -> Json<ActionResult<Created>> {
    let ctx = state.action_context(&session);
    Json(warehouse::create_tracking(&ctx, &tracking).await)
}

#[utoipa::path(
    put,
    path = "/actions/warehouse/{id}/status",
    tag = "warehouse",
    params(("id" = String, Path, description = "Tracking ID")),
    request_body = UpdateTrackingStatus,
    responses((status = 200, description = "Action result"))
)]
pub async fn update_tracking_status(
    State(state): State<AppState>,
    session: SessionAccessor,
    Path(id): Path<String>,
    Json(update): Json<UpdateTrackingStatus>,
) -> Json<ActionResult<()>> {
    let ctx = state.action_context(&session);
    Json(warehouse::update_status(&ctx, &id, &update).await)
}

#[utoipa::path(
    post,
    path = "/actions/warehouse/{id}/import",
    tag = "warehouse",
    params(("id" = String, Path, description = "Tracking ID")),
    request_body(content_type = "multipart/form-data", description = "`file` field with the line items"),
    responses((status = 200, description = "Completed or per-row diagnostics"))
)]
pub async fn import_tracking_details(
    State(state): State<AppState>,
    session: SessionAccessor,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<ActionResult<ImportOutcome>>> {
    let form = read_form(multipart).await?;
    let ctx = state.action_context(&session);
    Ok(Json(warehouse::import_details(&ctx, &id, form).await))
}

#[utoipa::path(
    post,
    path = "/actions/warehouse/delete-range",
    tag = "warehouse",
    request_body = BulkIds,
    responses((status = 200, description = "Action result"))
)]
pub async fn delete_trackings(
    State(state): State<AppState>,
    session: SessionAccessor,
    Json(bulk): Json<BulkIds>,
) -> Json<ActionResult<()>> {
    let ctx = state.action_context(&session);
    Json(warehouse::delete_range(&ctx, &bulk.ids).await)
}

// Notifications

#[utoipa::path(
    post,
    path = "/actions/notifications",
    tag = "notifications",
    request_body = SendNotification,
    responses((status = 200, description = "Action result carrying the new id"))
)]
pub async fn send_notification(
    State(state): State<AppState>,
    session: SessionAccessor,
    Json(notification): Json<SendNotification>,
) -> Json<ActionResult<Created>> {
    let ctx = state.action_context(&session);
    Json(notifications::send(&ctx, &notification).await)
}

#[utoipa::path(
    post,
    path = "/actions/notifications/{id}/read",
    tag = "notifications",
    params(("id" = String, Path, description = "Notification ID")),
    responses((status = 200, description = "Action result"))
)]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    session: SessionAccessor,
    Path(id): Path<String>,
) -> Json<ActionResult<()>> {
    let ctx = state.action_context(&session);
    Json(notifications::mark_read(&ctx, &id).await)
}

#[utoipa::path(
    post,
    path = "/actions/notifications/read-all",
    tag = "notifications",
    responses((status = 200, description = "Action result"))
)]
pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
    session: SessionAccessor,
) -> Json<ActionResult<()>> {
    let ctx = state.action_context(&session);
    Json(notifications::mark_all_read(&ctx).await)
}

#[utoipa::path(
    post,
    path = "/actions/notifications/delete-range",
    tag = "notifications",
    request_body = BulkIds,
    responses((status = 200, description = "Action result"))
)]
pub async fn delete_notifications(
    State(state): State<AppState>,
    session: SessionAccessor,
    Json(bulk): Json<BulkIds>,
) -> Json<ActionResult<()>> {
    let ctx = state.action_context(&session);
    Json(notifications::delete_range(&ctx, &bulk.ids).await)
}
