//! Handlers for the `/projects` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use taskforge_core::error::CoreError;
use taskforge_core::types::DbId;
use taskforge_db::models::project::{CreateProject, Project};
use taskforge_db::repositories::ProjectRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireManager;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/projects
///
/// Admins and project managers only. The caller becomes the owner.
pub async fn create(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Json(mut input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    input.name = input.name.trim().to_string();
    if input.name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "project name is required".into(),
        )));
    }

    let project = ProjectRepo::create(&state.pool, user.user_id, &input).await?;
    tracing::info!(project_id = project.id, owner_id = user.user_id, "Project created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// GET /api/v1/projects
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = ProjectRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    Ok(Json(DataResponse { data: project }))
}
