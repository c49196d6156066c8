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
use crate::models::comment::{CommentPayload, UpdateCommentRequest};
use crate::state::AppState;

#[derive(Debug, FromRow)]
struct CommentRow {
    id: Uuid,
    message: String,
    photo_id: Uuid,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    user_email: String,
    user_username: String,
    photo_title: String,
    photo_caption: Option<String>,
    photo_url: String,
    photo_owner_id: Uuid,
}

const COMMENT_WITH_RELATIONS: &str = r#"
    SELECT c.id, c.message, c.photo_id, c.user_id, c.created_at, c.updated_at,
           u.email AS user_email, u.username AS user_username,
           p.title AS photo_title, p.caption AS photo_caption,
           p.photo_url AS photo_url, p.user_id AS photo_owner_id
    FROM comments c
    JOIN users u ON u.id = c.user_id
    JOIN photos p ON p.id = c.photo_id
"#;

fn comment_json(row: &CommentRow) -> Value {
    json!({
        "id": row.id,
        "message": row.message,
        "photo_id": row.photo_id,
        "user_id": row.user_id,
        "created_at": row.created_at,
        "updated_at": row.updated_at,
        "User": {
            "id": row.user_id,
            "email": row.user_email,
            "username": row.user_username,
        },
        "Photo": {
            "id": row.photo_id,
            "title": row.photo_title,
            "caption": row.photo_caption,
            "photo_url": row.photo_url,
            "user_id": row.photo_owner_id,
        },
    })
}

/// POST /comments - Comment on a photo as the authenticated user
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CommentPayload>,
) -> ApiResult<Value> {
    let comment = payload.validate()?;

    let row = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
        r#"
        INSERT INTO comments (message, photo_id, user_id)
        VALUES ($1, $2, $3)
        RETURNING id, created_at
        "#,
    )
    .bind(&comment.message)
    .bind(comment.photo_id)
    .bind(auth.id)
    .fetch_one(&state.pool)
    .await
    .map_err(map_missing_photo)?;

    Ok(ApiResponse::created(json!({
        "id": row.0,
        "message": comment.message,
        "photo_id": comment.photo_id,
        "user_id": auth.id,
        "created_at": row.1,
    })))
}

/// GET /comments - List all comments with their authors and photos
pub async fn list(State(state): State<AppState>) -> ApiResult<Value> {
    let rows =
        sqlx::query_as::<_, CommentRow>(&format!("{} ORDER BY c.created_at", COMMENT_WITH_RELATIONS))
            .fetch_all(&state.pool)
            .await?;

    let data: Vec<Value> = rows.iter().map(comment_json).collect();
    Ok(ApiResponse::success(json!(data)))
}

/// GET /comments/:comment_id - Fetch a single comment
pub async fn fetch(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
) -> ApiResult<Value> {
    let row =
        sqlx::query_as::<_, CommentRow>(&format!("{} WHERE c.id = $1", COMMENT_WITH_RELATIONS))
            .bind(comment_id)
            .fetch_optional(&state.pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    Ok(ApiResponse::success(comment_json(&row)))
}

/// PUT /comments/:comment_id - Update an owned comment's message
pub async fn update(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    Json(payload): Json<UpdateCommentRequest>,
) -> ApiResult<Value> {
    let message = payload.validate()?;

    let row = sqlx::query_as::<_, (Uuid, Uuid, DateTime<Utc>)>(
        r#"
        UPDATE comments
        SET message = $1, updated_at = NOW()
        WHERE id = $2
        RETURNING photo_id, user_id, updated_at
        "#,
    )
    .bind(&message)
    .bind(comment_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    Ok(ApiResponse::success(json!({
        "id": comment_id,
        "message": message,
        "photo_id": row.0,
        "user_id": row.1,
        "updated_at": row.2,
    })))
}

/// DELETE /comments/:comment_id - Delete an owned comment
pub async fn remove(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
) -> ApiResult<Value> {
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Comment not found"));
    }

    Ok(ApiResponse::success(json!({
        "message": "Your comment has been successfully deleted"
    })))
}

/// A comment INSERT that trips the photo foreign key means the target photo
/// does not exist.
fn map_missing_photo(err: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some("23503")
            && db.constraint() == Some("comments_photo_id_fkey")
        {
            return ApiError::bad_request("Photo not found");
        }
    }
    ApiError::from(err)
}
