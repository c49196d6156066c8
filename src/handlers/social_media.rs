use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::social_media::{SocialMediaPayload, UpdateSocialMediaRequest};
use crate::state::AppState;

#[derive(Debug, FromRow)]
struct SocialMediaRow {
    id: Uuid,
    name: String,
    social_media_url: String,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    user_email: String,
    user_username: String,
}

const SOCIAL_MEDIA_WITH_USER: &str = r#"
    SELECT s.id, s.name, s.social_media_url, s.user_id,
           s.created_at, s.updated_at,
           u.email AS user_email, u.username AS user_username
    FROM social_media s
    JOIN users u ON u.id = s.user_id
"#;

/// POST /socialmedias - Add a social media link for the authenticated user
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<SocialMediaPayload>,
) -> ApiResult<Value> {
    let entry = payload.validate()?;

    let row = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
        r#"
        INSERT INTO social_media (name, social_media_url, user_id)
        VALUES ($1, $2, $3)
        RETURNING id, created_at
        "#,
    )
    .bind(&entry.name)
    .bind(&entry.social_media_url)
    .bind(auth.id)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::created(json!({
        "id": row.0,
        "name": entry.name,
        "social_media_url": entry.social_media_url,
        "user_id": auth.id,
        "created_at": row.1,
    })))
}

/// GET /socialmedias - List all social media links with their owners
pub async fn list(State(state): State<AppState>) -> ApiResult<Value> {
    let rows = sqlx::query_as::<_, SocialMediaRow>(&format!(
        "{} ORDER BY s.created_at",
        SOCIAL_MEDIA_WITH_USER
    ))
    .fetch_all(&state.pool)
    .await?;

    let data: Vec<Value> = rows
        .iter()
        .map(|row| {
            json!({
                "id": row.id,
                "name": row.name,
                "social_media_url": row.social_media_url,
                "user_id": row.user_id,
                "created_at": row.created_at,
                "updated_at": row.updated_at,
                "user": {
                    "id": row.user_id,
                    "username": row.user_username,
                },
            })
        })
        .collect();

    Ok(ApiResponse::success(json!(data)))
}

/// GET /socialmedias/:social_media_id - Fetch a single social media link
pub async fn fetch(
    State(state): State<AppState>,
    Path(social_media_id): Path<Uuid>,
) -> ApiResult<Value> {
    let row = sqlx::query_as::<_, SocialMediaRow>(&format!(
        "{} WHERE s.id = $1",
        SOCIAL_MEDIA_WITH_USER
    ))
    .bind(social_media_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Social media not found"))?;

    Ok(ApiResponse::success(json!({
        "id": row.id,
        "name": row.name,
        "social_media_url": row.social_media_url,
        "user_id": row.user_id,
        "user": {
            "id": row.user_id,
            "email": row.user_email,
            "username": row.user_username,
        },
    })))
}

/// PUT /socialmedias/:social_media_id - Update an owned social media link
pub async fn update(
    State(state): State<AppState>,
    Path(social_media_id): Path<Uuid>,
    Json(payload): Json<UpdateSocialMediaRequest>,
) -> ApiResult<Value> {
    let (name, social_media_url) = payload.validate()?;

    let row = sqlx::query_as::<_, (String, String, Uuid, DateTime<Utc>)>(
        r#"
        UPDATE social_media
        SET name = COALESCE($1, name),
            social_media_url = COALESCE($2, social_media_url),
            updated_at = NOW()
        WHERE id = $3
        RETURNING name, social_media_url, user_id, updated_at
        "#,
    )
    .bind(name)
    .bind(social_media_url)
    .bind(social_media_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Social media not found"))?;

    Ok(ApiResponse::success(json!({
        "id": social_media_id,
        "name": row.0,
        "social_media_url": row.1,
        "user_id": row.2,
        "updated_at": row.3,
    })))
}

/// DELETE /socialmedias/:social_media_id - Delete an owned social media link
pub async fn remove(
    State(state): State<AppState>,
    Path(social_media_id): Path<Uuid>,
) -> ApiResult<Value> {
    let result = sqlx::query("DELETE FROM social_media WHERE id = $1")
        .bind(social_media_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Social media not found"));
    }

    Ok(ApiResponse::success(json!({
        "message": "Your social media has been successfully deleted"
    })))
}
