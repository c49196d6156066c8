use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::ownership::OwnedResource;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Photo {
    pub id: Uuid,
    pub title: String,
    pub caption: Option<String>,
    pub photo_url: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct PhotoPayload {
    pub title: Option<String>,
    pub caption: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug)]
pub struct NewPhoto {
    pub title: String,
    pub caption: Option<String>,
    pub photo_url: String,
}

impl PhotoPayload {
    pub fn validate(self) -> Result<NewPhoto, ApiError> {
        let mut field_errors = HashMap::new();

        let title = self.title.unwrap_or_default();
        if title.trim().is_empty() {
            field_errors.insert("title".to_string(), "Title is required".to_string());
        }

        let photo_url = self.photo_url.unwrap_or_default();
        if photo_url.trim().is_empty() {
            field_errors.insert("photo_url".to_string(), "Photo URL is required".to_string());
        }

        if !field_errors.is_empty() {
            return Err(ApiError::validation_error(
                "Invalid photo payload",
                Some(field_errors),
            ));
        }

        Ok(NewPhoto {
            title,
            caption: self.caption.filter(|c| !c.is_empty()),
            photo_url,
        })
    }
}

#[async_trait]
impl OwnedResource for Photo {
    const NOUN: &'static str = "Photo";

    async fn owner_of(pool: &PgPool, id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
        sqlx::query_scalar("SELECT user_id FROM photos WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_and_url_are_required() {
        let payload = PhotoPayload {
            title: Some("".to_string()),
            caption: None,
            photo_url: None,
        };
        match payload.validate() {
            Err(ApiError::ValidationError { field_errors, .. }) => {
                let fields = field_errors.unwrap();
                assert!(fields.contains_key("title"));
                assert!(fields.contains_key("photo_url"));
            }
            other => panic!("expected ValidationError, got {:?}", other.map(|p| p.title)),
        }
    }

    #[test]
    fn caption_is_optional() {
        let payload = PhotoPayload {
            title: Some("Sunset".to_string()),
            caption: None,
            photo_url: Some("https://img.example.com/1.jpg".to_string()),
        };
        let photo = payload.validate().unwrap();
        assert!(photo.caption.is_none());
    }
}
