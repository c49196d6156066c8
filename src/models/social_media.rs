use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::ownership::OwnedResource;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SocialMedia {
    pub id: Uuid,
    pub name: String,
    pub social_media_url: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SocialMediaPayload {
    pub name: Option<String>,
    pub social_media_url: Option<String>,
}

#[derive(Debug)]
pub struct NewSocialMedia {
    pub name: String,
    pub social_media_url: String,
}

impl SocialMediaPayload {
    pub fn validate(self) -> Result<NewSocialMedia, ApiError> {
        let mut field_errors = HashMap::new();

        let name = self.name.unwrap_or_default();
        if name.trim().is_empty() {
            field_errors.insert("name".to_string(), "Name is required".to_string());
        }

        let social_media_url = self.social_media_url.unwrap_or_default();
        if social_media_url.trim().is_empty() {
            field_errors.insert(
                "social_media_url".to_string(),
                "Social Media URL is required".to_string(),
            );
        }

        if !field_errors.is_empty() {
            return Err(ApiError::validation_error(
                "Invalid social media payload",
                Some(field_errors),
            ));
        }

        Ok(NewSocialMedia {
            name,
            social_media_url,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateSocialMediaRequest {
    pub name: Option<String>,
    pub social_media_url: Option<String>,
}

impl UpdateSocialMediaRequest {
    /// At least one field must be provided; absent fields are left untouched
    /// by the COALESCE update.
    pub fn validate(self) -> Result<(Option<String>, Option<String>), ApiError> {
        let name = self.name.filter(|v| !v.trim().is_empty());
        let social_media_url = self.social_media_url.filter(|v| !v.trim().is_empty());

        if name.is_none() && social_media_url.is_none() {
            return Err(ApiError::validation_error(
                "Name or Social Media URL is required",
                None,
            ));
        }

        Ok((name, social_media_url))
    }
}

#[async_trait]
impl OwnedResource for SocialMedia {
    const NOUN: &'static str = "Social media";

    async fn owner_of(pool: &PgPool, id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
        sqlx::query_scalar("SELECT user_id FROM social_media WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_and_url_are_required_on_create() {
        let payload = SocialMediaPayload {
            name: None,
            social_media_url: Some(" ".to_string()),
        };
        match payload.validate() {
            Err(ApiError::ValidationError { field_errors, .. }) => {
                let fields = field_errors.unwrap();
                assert!(fields.contains_key("name"));
                assert!(fields.contains_key("social_media_url"));
            }
            other => panic!("expected ValidationError, got {:?}", other.map(|s| s.name)),
        }
    }

    #[test]
    fn update_accepts_partial_payloads() {
        let (name, url) = UpdateSocialMediaRequest {
            name: Some("instagram".to_string()),
            social_media_url: None,
        }
        .validate()
        .unwrap();
        assert_eq!(name.as_deref(), Some("instagram"));
        assert!(url.is_none());

        assert!(UpdateSocialMediaRequest {
            name: None,
            social_media_url: None,
        }
        .validate()
        .is_err());
    }
}
