//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, borrowings, health, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library Service API",
        version = "0.1.0",
        description = "Library Rental Service REST API",
        license(name = "MIT")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Users
        users::register,
        users::update_my_profile,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Borrowings
        borrowings::list_borrowings,
        borrowings::get_borrowing,
        borrowings::create_borrowing,
        borrowings::return_borrowing,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            // Users
            crate::models::user::CreateUser,
            crate::models::user::UpdateProfile,
            crate::models::user::UserSummary,
            // Books
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::BookQuery,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::CoverType,
            // Borrowings
            crate::models::borrowing::Borrowing,
            crate::models::borrowing::BorrowingDetails,
            crate::models::borrowing::BorrowingSummary,
            crate::models::borrowing::BorrowingQuery,
            crate::models::borrowing::CreateBorrowing,
            borrowings::ReturnResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User registration and profiles"),
        (name = "books", description = "Book catalog management"),
        (name = "borrowings", description = "Borrowing and return workflows")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
