//! User registration and profile endpoints

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateProfile},
};

use super::{auth::UserInfo, AuthenticatedUser};

/// Register a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserInfo),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<UserInfo>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = state.services.users.register(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserInfo {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_staff: user.is_staff,
        }),
    ))
}

/// Update the authenticated user's own profile
#[utoipa::path(
    put,
    path = "/auth/profile",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = UserInfo),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated or wrong current password"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn update_my_profile(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<UpdateProfile>,
) -> AppResult<Json<UserInfo>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = state
        .services
        .users
        .update_profile(claims.user_id, &request)
        .await?;

    Ok(Json(UserInfo {
        id: user.id,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        is_staff: user.is_staff,
    }))
}
