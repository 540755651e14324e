//! Handlers for the `/users` resource.
//!
//! Anyone may read and edit their own profile. Listing and looking up other
//! users needs a manager role; changing roles needs `admin`.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use taskforge_core::account::validate_name;
use taskforge_core::error::CoreError;
use taskforge_core::pagination::{
    clamp_limit, clamp_offset, next_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
use taskforge_core::roles::validate_role;
use taskforge_core::types::DbId;
use taskforge_db::models::user::{UpdateProfile, UserResponse};
use taskforge_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireManager};
use crate::query::OffsetPageParams;
use crate::response::{DataResponse, PageResponse};
use crate::state::AppState;

/// Request body for `PATCH /users/me`. Omitted fields are left unchanged.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

/// Request body for `PATCH /users/{id}/role`.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

/// GET /api/v1/users
pub async fn list(
    State(state): State<AppState>,
    RequireManager(_user): RequireManager,
    Query(params): Query<OffsetPageParams>,
) -> AppResult<Json<PageResponse<UserResponse, i64>>> {
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.cursor);

    let users = UserRepo::list(&state.pool, limit, offset).await?;
    let next_cursor = next_offset(offset, limit, users.len());

    Ok(Json(PageResponse {
        data: users.iter().map(UserResponse::from).collect(),
        limit,
        next_cursor,
    }))
}

/// GET /api/v1/users/me
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    find_user(&state, user.user_id).await
}

/// PATCH /api/v1/users/me
///
/// A blank `name` or `avatarUrl` counts as "unchanged"; `bio` may be cleared.
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<UpdateProfileRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let name = non_blank(input.name);
    if let Some(name) = &name {
        validate_name(name)?;
    }

    let changes = UpdateProfile {
        name,
        bio: input.bio.map(|b| b.trim().to_string()),
        avatar_url: non_blank(input.avatar_url),
    };

    let updated = UserRepo::update_profile(&state.pool, user.user_id, &changes)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user.user_id,
        }))?;

    tracing::info!(user_id = user.user_id, "Profile updated");
    Ok(Json(DataResponse {
        data: UserResponse::from(&updated),
    }))
}

/// GET /api/v1/users/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireManager(_user): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    find_user(&state, id).await
}

/// PATCH /api/v1/users/{id}/role
///
/// The new role shows up in the user's next access token.
pub async fn update_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRoleRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    validate_role(&input.role)?;

    let updated = UserRepo::update_role(&state.pool, id, &input.role)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    tracing::info!(
        user_id = id,
        role = %updated.role,
        changed_by = admin.user_id,
        "User role changed"
    );
    Ok(Json(DataResponse {
        data: UserResponse::from(&updated),
    }))
}

async fn find_user(state: &AppState, id: DbId) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
