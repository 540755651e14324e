//! Handlers for the `/auth` resource: register, login, token refresh, logout,
//! the current user and password changes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use taskforge_core::account::{validate_name, validate_username};
use taskforge_core::error::CoreError;
use taskforge_core::roles::{validate_role, DEFAULT_ROLE};
use taskforge_db::models::user::{CreateUser, User, UserResponse};
use taskforge_db::repositories::{RefreshTokenRepo, UserRepo, XpLedgerRepo};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::auth::refresh_token::{issue_refresh_token, rotate_refresh_token};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Request body for `POST /auth/change-password`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Successful authentication response returned by register, login and refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Access token (JWT).
    pub token: String,
    /// Single-use `<id>.<secret>` refresh token.
    pub refresh_token: String,
    pub user: UserResponse,
    pub email_verified: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create a user and return a token pair. The role defaults to `developer`.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let name = input.name.trim().to_string();
    let username = input.username.trim().to_string();
    validate_name(&name)?;
    validate_username(&username)?;
    validate_password_strength(&input.password)?;

    let role = input.role.unwrap_or_else(|| DEFAULT_ROLE.to_string());
    validate_role(&role)?;

    if UserRepo::username_exists(&state.pool, &username).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "username '{username}' is already taken"
        ))));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let email = input
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name,
            username,
            email,
            password_hash,
            role,
        },
    )
    .await?;

    if let Err(e) = XpLedgerRepo::ensure_user(&state.pool, user.id).await {
        tracing::warn!(user_id = user.id, error = %e, "Failed to create gamification stats");
    }

    tracing::info!(user_id = user.id, role = %user.role, "User registered");

    let response = create_auth_response(&state, &user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
///
/// Authenticate with username + password. Unknown user and wrong password
/// are indistinguishable to the caller.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = UserRepo::find_by_username(&state.pool, input.username.trim())
        .await?
        .ok_or(AppError::Core(CoreError::InvalidCredentials))?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        tracing::debug!(user_id = user.id, "Login rejected");
        return Err(AppError::Core(CoreError::InvalidCredentials));
    }

    let response = create_auth_response(&state, &user).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a refresh token for a new access token and a new refresh token.
/// The presented token cannot be used again.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let (user, refresh_token) =
        rotate_refresh_token(&state.pool, &input.refresh_token, &state.config.jwt).await?;

    let token = generate_access_token(user.id, &user.name, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(Json(AuthResponse {
        token,
        refresh_token,
        user: UserResponse::from(&user),
        email_verified: user.email_verified,
    }))
}

/// POST /api/v1/auth/logout
///
/// Revoke all of the caller's refresh tokens. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    let revoked = RefreshTokenRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    tracing::info!(user_id = auth_user.user_id, revoked, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth_user.user_id,
        }))?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// POST /api/v1/auth/change-password
///
/// Requires the current password. On success every refresh token the user
/// holds is revoked, so other sessions must log in again. Returns 204.
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::InvalidCredentials))?;

    let current_valid = verify_password(&input.current_password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !current_valid {
        return Err(AppError::Core(CoreError::InvalidCredentials));
    }

    validate_password_strength(&input.new_password)?;
    let password_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    UserRepo::update_password(&state.pool, user.id, &password_hash).await?;
    let revoked = RefreshTokenRepo::revoke_all_for_user(&state.pool, user.id).await?;

    tracing::info!(user_id = user.id, revoked, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Generate an access token, persist a fresh refresh token, and build the response.
async fn create_auth_response(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let token = generate_access_token(user.id, &user.name, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let refresh_token = issue_refresh_token(&state.pool, user.id, &state.config.jwt).await?;

    Ok(AuthResponse {
        token,
        refresh_token,
        user: UserResponse::from(user),
        email_verified: user.email_verified,
    })
}
