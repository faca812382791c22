//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{actions, auth, events, exports, health, views};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Elidune Admin Console",
        version = "1.0.0",
        description = "Server tier of the library administration console",
        license(name = "GPL-2.0", url = "https://www.gnu.org/licenses/gpl-2.0.html"),
        contact(name = "Elidune Team", email = "contact@elidune.org")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Session
        auth::token,
        auth::login,
        auth::logout,
        auth::me,
        auth::update_profile,
        auth::change_password,
        auth::forgot_password,
        // Authors
        actions::create_author,
        actions::update_author,
        actions::delete_authors,
        actions::restore_authors,
        actions::purge_authors,
        actions::import_authors,
        // Books
        actions::create_book,
        actions::update_book,
        actions::delete_books,
        actions::import_books,
        // Categories
        actions::create_category,
        actions::update_category,
        actions::delete_categories,
        // Patrons
        actions::create_patron,
        actions::update_patron,
        actions::delete_patrons,
        actions::restore_patrons,
        actions::purge_patrons,
        actions::import_patrons,
        // Employees
        actions::create_employee,
        actions::update_employee,
        actions::delete_employees,
        actions::restore_employees,
        actions::purge_employees,
        actions::import_employees,
        // Borrowing
        actions::create_borrow_request,
        actions::approve_borrow_request,
        actions::reject_borrow_request,
        actions::return_books,
        actions::extend_borrow,
        // Fines
        actions::create_fine,
        actions::pay_fine,
        actions::waive_fine,
        actions::delete_fines,
        // Warehouse
        actions::create_tracking,
        actions::update_tracking_status,
        actions::import_tracking_details,
        actions::delete_trackings,
        // Notifications
        actions::send_notification,
        actions::mark_notification_read,
        actions::mark_all_notifications_read,
        actions::delete_notifications,
        // Reads
        views::render,
        exports::export,
        events::stream,
    ),
    components(
        schemas(
            // Session
            crate::session::TokenPair,
            crate::models::user::LoginRequest,
            crate::models::user::AccountKind,
            crate::models::user::ChangePasswordRequest,
            crate::models::user::ForgotPasswordRequest,
            crate::models::user::UpdateProfile,
            crate::models::user::UserProfile,
            // Shared
            crate::models::Created,
            crate::models::BulkIds,
            crate::models::ListQuery,
            crate::backend::ErrorKind,
            // Catalog
            crate::models::author::AuthorPayload,
            crate::models::category::CategoryPayload,
            // People
            crate::models::patron::PatronPayload,
            crate::models::patron::Gender,
            crate::models::patron::PatronType,
            crate::models::employee::EmployeePayload,
            // Borrowing
            crate::models::borrowing::CreateBorrowRequest,
            crate::models::borrowing::RejectBorrowRequest,
            crate::models::borrowing::ReturnBooks,
            crate::models::borrowing::ReturnedCopy,
            crate::models::borrowing::BookCondition,
            crate::models::borrowing::ExtendBorrow,
            // Fines
            crate::models::fine::CreateFine,
            crate::models::fine::PayFine,
            crate::models::fine::WaiveFine,
            crate::models::fine::FineType,
            crate::models::fine::PaymentMethod,
            // Warehouse
            crate::models::warehouse::CreateTracking,
            crate::models::warehouse::TrackingLine,
            crate::models::warehouse::TrackingType,
            crate::models::warehouse::TrackingStatus,
            crate::models::warehouse::UpdateTrackingStatus,
            // Notifications
            crate::models::notification::SendNotification,
            crate::models::notification::NotificationType,
            // Realtime
            crate::realtime::HubEvent,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Session and own account"),
        (name = "authors", description = "Author management"),
        (name = "books", description = "Book edition management"),
        (name = "categories", description = "Category management"),
        (name = "patrons", description = "Patron management"),
        (name = "employees", description = "Employee management"),
        (name = "borrowing", description = "Borrow requests and records"),
        (name = "fines", description = "Fines"),
        (name = "warehouse", description = "Warehouse trackings"),
        (name = "notifications", description = "Notifications"),
        (name = "views", description = "Cached screen data"),
        (name = "exports", description = "Spreadsheet exports"),
        (name = "events", description = "Realtime notifications")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
