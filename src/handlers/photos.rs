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
use crate::models::photo::PhotoPayload;
use crate::state::AppState;

#[derive(Debug, FromRow)]
struct PhotoRow {
    id: Uuid,
    title: String,
    caption: Option<String>,
    photo_url: String,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    user_email: String,
    user_username: String,
}

const PHOTO_WITH_USER: &str = r#"
    SELECT p.id, p.title, p.caption, p.photo_url, p.user_id,
           p.created_at, p.updated_at,
           u.email AS user_email, u.username AS user_username
    FROM photos p
    JOIN users u ON u.id = p.user_id
"#;

fn photo_json(row: &PhotoRow) -> Value {
    json!({
        "id": row.id,
        "title": row.title,
        "caption": row.caption,
        "photo_url": row.photo_url,
        "user_id": row.user_id,
        "created_at": row.created_at,
        "updated_at": row.updated_at,
        "User": {
            "email": row.user_email,
            "username": row.user_username,
        },
    })
}

/// POST /photos - Create a photo owned by the authenticated user
///
/// The owner comes from the verified identity, never from the payload.
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<PhotoPayload>,
) -> ApiResult<Value> {
    let photo = payload.validate()?;

    let row = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
        r#"
        INSERT INTO photos (title, caption, photo_url, user_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id, created_at
        "#,
    )
    .bind(&photo.title)
    .bind(&photo.caption)
    .bind(&photo.photo_url)
    .bind(auth.id)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::created(json!({
        "id": row.0,
        "title": photo.title,
        "caption": photo.caption,
        "photo_url": photo.photo_url,
        "user_id": auth.id,
        "created_at": row.1,
    })))
}

/// GET /photos - List all photos with their owners
pub async fn list(State(state): State<AppState>) -> ApiResult<Value> {
    let rows = sqlx::query_as::<_, PhotoRow>(&format!("{} ORDER BY p.created_at", PHOTO_WITH_USER))
        .fetch_all(&state.pool)
        .await?;

    let data: Vec<Value> = rows.iter().map(photo_json).collect();
    Ok(ApiResponse::success(json!(data)))
}

/// GET /photos/:photo_id - Fetch a single photo. Reads are not
/// ownership-gated.
pub async fn fetch(
    State(state): State<AppState>,
    Path(photo_id): Path<Uuid>,
) -> ApiResult<Value> {
    let row = sqlx::query_as::<_, PhotoRow>(&format!("{} WHERE p.id = $1", PHOTO_WITH_USER))
        .bind(photo_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Photo not found"))?;

    Ok(ApiResponse::success(photo_json(&row)))
}

/// PUT /photos/:photo_id - Update an owned photo
pub async fn update(
    State(state): State<AppState>,
    Path(photo_id): Path<Uuid>,
    Json(payload): Json<PhotoPayload>,
) -> ApiResult<Value> {
    let photo = payload.validate()?;

    let row = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
        r#"
        UPDATE photos
        SET title = $1, caption = $2, photo_url = $3, updated_at = NOW()
        WHERE id = $4
        RETURNING user_id, updated_at
        "#,
    )
    .bind(&photo.title)
    .bind(&photo.caption)
    .bind(&photo.photo_url)
    .bind(photo_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Photo not found"))?;

    Ok(ApiResponse::success(json!({
        "id": photo_id,
        "title": photo.title,
        "caption": photo.caption,
        "photo_url": photo.photo_url,
        "user_id": row.0,
        "updated_at": row.1,
    })))
}

/// DELETE /photos/:photo_id - Delete an owned photo
pub async fn remove(
    State(state): State<AppState>,
    Path(photo_id): Path<Uuid>,
) -> ApiResult<Value> {
    let result = sqlx::query("DELETE FROM photos WHERE id = $1")
        .bind(photo_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Photo not found"));
    }

    Ok(ApiResponse::success(json!({
        "message": "Your photo has been successfully deleted"
    })))
}
