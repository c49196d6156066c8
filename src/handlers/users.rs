use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::password;
use crate::config;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::user::{RegisterRequest, UpdateUserRequest};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, FromRow)]
struct PublicUserRow {
    id: Uuid,
    username: String,
    email: String,
    profile_image_url: String,
    age: i32,
}

#[derive(Debug, FromRow)]
struct UpdatedUserRow {
    id: Uuid,
    username: String,
    email: String,
    profile_image_url: String,
    age: i32,
    updated_at: DateTime<Utc>,
}

/// POST /users/register - Create an account
///
/// Validates the fixed rule set, hashes the password, and stores the user.
/// The plaintext password is replaced by its digest before the INSERT and is
/// never logged.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<Value> {
    let new_user = payload.validate()?;

    let digest = password::hash_password(&new_user.password, config::config().security.bcrypt_cost)
        .map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            ApiError::internal_server_error("Failed to process credentials")
        })?;

    let user = sqlx::query_as::<_, PublicUserRow>(
        r#"
        INSERT INTO users (username, email, password, profile_image_url, age)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, username, email, profile_image_url, age
        "#,
    )
    .bind(&new_user.username)
    .bind(&new_user.email)
    .bind(&digest)
    .bind(&new_user.profile_image_url)
    .bind(new_user.age)
    .fetch_one(&state.pool)
    .await
    .map_err(map_unique_violation)?;

    Ok(ApiResponse::created(json!({
        "id": user.id,
        "email": user.email,
        "username": user.username,
        "age": user.age,
        "profile_image_url": user.profile_image_url,
    })))
}

/// POST /users/login - Verify credentials and issue a bearer token
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Value> {
    let email = payload.email.unwrap_or_default();
    let plain = payload.password.unwrap_or_default();

    let row = sqlx::query_as::<_, (Uuid, String, String)>(
        "SELECT id, email, password FROM users WHERE email = $1",
    )
    .bind(&email)
    .fetch_optional(&state.pool)
    .await?;

    let (id, email, digest) = row.ok_or_else(|| ApiError::not_found("User not found"))?;

    if !password::verify_password(&plain, &digest) {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let token = state.tokens.issue(id, &email)?;

    Ok(ApiResponse::success(json!({ "token": token })))
}

/// PUT /users/:user_id - Update email and/or username
///
/// The profile authorizer has already established that the path id is the
/// authenticated identity.
pub async fn update(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Value> {
    let (email, username) = payload.validate()?;

    let user = sqlx::query_as::<_, UpdatedUserRow>(
        r#"
        UPDATE users
        SET email = COALESCE($1, email),
            username = COALESCE($2, username),
            updated_at = NOW()
        WHERE id = $3
        RETURNING id, username, email, profile_image_url, age, updated_at
        "#,
    )
    .bind(email)
    .bind(username)
    .bind(user_id)
    .fetch_optional(&state.pool)
    .await
    .map_err(map_unique_violation)?
    .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::success(json!({
        "id": user.id,
        "email": user.email,
        "username": user.username,
        "age": user.age,
        "profile_image_url": user.profile_image_url,
        "updated_at": user.updated_at,
    })))
}

/// DELETE /users - Delete the authenticated account
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Value> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(auth.id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("User not found"));
    }

    Ok(ApiResponse::success(json!({
        "message": "Your account has been successfully deleted"
    })))
}

/// Translate unique-constraint violations on users into field-specific
/// conflicts; everything else falls back to the generic mapping.
fn map_unique_violation(err: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some("23505") {
            return match db.constraint() {
                Some("users_email_key") => ApiError::conflict("Email already exists"),
                Some("users_username_key") => ApiError::conflict("Username already exists"),
                _ => ApiError::conflict("Duplicate value violates a unique constraint"),
            };
        }
    }
    ApiError::from(err)
}
