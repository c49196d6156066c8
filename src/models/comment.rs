use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::ownership::OwnedResource;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub message: String,
    pub photo_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CommentPayload {
    pub message: Option<String>,
    pub photo_id: Option<Uuid>,
}

#[derive(Debug)]
pub struct NewComment {
    pub message: String,
    pub photo_id: Uuid,
}

impl CommentPayload {
    pub fn validate(self) -> Result<NewComment, ApiError> {
        let mut field_errors = HashMap::new();

        let message = self.message.unwrap_or_default();
        if message.trim().is_empty() {
            field_errors.insert("message".to_string(), "Message is required".to_string());
        }

        if self.photo_id.is_none() {
            field_errors.insert("photo_id".to_string(), "Photo ID is required".to_string());
        }

        if !field_errors.is_empty() {
            return Err(ApiError::validation_error(
                "Invalid comment payload",
                Some(field_errors),
            ));
        }

        Ok(NewComment {
            message,
            photo_id: self.photo_id.unwrap(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub message: Option<String>,
}

impl UpdateCommentRequest {
    pub fn validate(self) -> Result<String, ApiError> {
        match self.message.filter(|m| !m.trim().is_empty()) {
            Some(message) => Ok(message),
            None => Err(ApiError::validation_error("Message is required", None)),
        }
    }
}

#[async_trait]
impl OwnedResource for Comment {
    const NOUN: &'static str = "Comment";

    async fn owner_of(pool: &PgPool, id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
        sqlx::query_scalar("SELECT user_id FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_and_photo_id_are_required() {
        let payload = CommentPayload {
            message: Some("   ".to_string()),
            photo_id: None,
        };
        match payload.validate() {
            Err(ApiError::ValidationError { field_errors, .. }) => {
                let fields = field_errors.unwrap();
                assert!(fields.contains_key("message"));
                assert!(fields.contains_key("photo_id"));
            }
            other => panic!("expected ValidationError, got {:?}", other.map(|c| c.message)),
        }
    }

    #[test]
    fn update_rejects_empty_message() {
        assert!(UpdateCommentRequest { message: None }.validate().is_err());
        assert!(UpdateCommentRequest {
            message: Some("".to_string())
        }
        .validate()
        .is_err());
        assert_eq!(
            UpdateCommentRequest {
                message: Some("nice shot".to_string())
            }
            .validate()
            .unwrap(),
            "nice shot"
        );
    }
}
