//! Borrowing endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::borrowing::{BorrowingDetails, BorrowingQuery, BorrowingSummary, CreateBorrowing},
};

use super::{AuthenticatedUser, PaginatedResponse};

/// Return response with borrowing details
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    /// Return status
    pub status: String,
    /// Borrowing details after the return
    pub borrowing: BorrowingDetails,
}

/// List borrowings visible to the caller
#[utoipa::path(
    get,
    path = "/borrowings",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(
        ("user_id" = Option<i32>, Query, description = "Filter by user (staff only)"),
        ("is_active" = Option<bool>, Query, description = "Filter on open/closed borrowings"),
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("per_page" = Option<i64>, Query, description = "Items per page (default: 20)")
    ),
    responses(
        (status = 200, description = "List of borrowings", body = PaginatedResponse<BorrowingSummary>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_borrowings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BorrowingQuery>,
) -> AppResult<Json<PaginatedResponse<BorrowingSummary>>> {
    let (items, total) = state
        .services
        .borrowings
        .list_borrowings(&claims, &query)
        .await?;

    Ok(Json(PaginatedResponse {
        items,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}

/// Get borrowing details by ID
#[utoipa::path(
    get,
    path = "/borrowings/{id}",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Borrowing ID")
    ),
    responses(
        (status = 200, description = "Borrowing details", body = BorrowingDetails),
        (status = 404, description = "Borrowing not found")
    )
)]
pub async fn get_borrowing(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowingDetails>> {
    let borrowing = state.services.borrowings.get_borrowing(&claims, id).await?;
    Ok(Json(borrowing))
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/borrowings",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    request_body = CreateBorrowing,
    responses(
        (status = 201, description = "Borrowing created", body = BorrowingDetails),
        (status = 400, description = "Invalid date range"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "No copies available")
    )
)]
pub async fn create_borrowing(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBorrowing>,
) -> AppResult<(StatusCode, Json<BorrowingDetails>)> {
    let borrowing = state
        .services
        .borrowings
        .create_borrowing(&claims, &request)
        .await?;

    Ok((StatusCode::CREATED, Json(borrowing)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/borrowings/{id}/return",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Borrowing ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = ReturnResponse),
        (status = 404, description = "Borrowing not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_borrowing(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ReturnResponse>> {
    let borrowing = state
        .services
        .borrowings
        .return_borrowing(&claims, id)
        .await?;

    Ok(Json(ReturnResponse {
        status: "returned".to_string(),
        borrowing,
    }))
}
