use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// bcrypt digest; the plaintext never reaches this struct
    #[serde(skip_serializing)]
    pub password: String,
    pub profile_image_url: String,
    pub age: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration payload as bound from the request body. All fields are
/// optional at the serde layer so that every violation can be reported in a
/// single validation pass.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile_image_url: Option<String>,
    pub age: Option<i32>,
}

/// A registration that passed the fixed rule set. The password is still
/// plaintext here; it is hashed immediately before the INSERT.
#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub profile_image_url: String,
    pub age: i32,
}

impl RegisterRequest {
    /// Validate the fixed registration rule set, collecting every violated
    /// field into one ValidationError.
    pub fn validate(self) -> Result<NewUser, ApiError> {
        let mut field_errors = HashMap::new();

        let username = self.username.unwrap_or_default();
        if username.trim().is_empty() {
            field_errors.insert("username".to_string(), "Username is required".to_string());
        }

        let email = self.email.unwrap_or_default();
        if email.trim().is_empty() {
            field_errors.insert("email".to_string(), "Email is required".to_string());
        } else if !is_valid_email(&email) {
            field_errors.insert("email".to_string(), "Email is invalid".to_string());
        }

        let password = self.password.unwrap_or_default();
        if password.is_empty() {
            field_errors.insert("password".to_string(), "Password is required".to_string());
        } else if password.len() < 6 {
            field_errors.insert(
                "password".to_string(),
                "Password must be at least 6 characters".to_string(),
            );
        }

        let profile_image_url = self.profile_image_url.unwrap_or_default();
        if profile_image_url.trim().is_empty() {
            field_errors.insert(
                "profile_image_url".to_string(),
                "Profile Image URL is required".to_string(),
            );
        } else if url::Url::parse(&profile_image_url).is_err() {
            field_errors.insert(
                "profile_image_url".to_string(),
                "Invalid URL format".to_string(),
            );
        }

        let age = match self.age {
            None => {
                field_errors.insert("age".to_string(), "Age is required".to_string());
                0
            }
            Some(age) if !(8..=100).contains(&age) => {
                field_errors.insert(
                    "age".to_string(),
                    "Age must be between 8 and 100".to_string(),
                );
                age
            }
            Some(age) => age,
        };

        if !field_errors.is_empty() {
            return Err(ApiError::validation_error(
                "Invalid user payload",
                Some(field_errors),
            ));
        }

        Ok(NewUser {
            username,
            email,
            password,
            profile_image_url,
            age,
        })
    }
}

/// Profile update payload. Only email and username are updatable; format
/// re-validation and password re-hashing are deliberately not part of the
/// update path.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub username: Option<String>,
}

impl UpdateUserRequest {
    /// At least one of email/username must be non-empty. Empty strings are
    /// treated as absent so a COALESCE update leaves the column untouched.
    pub fn validate(self) -> Result<(Option<String>, Option<String>), ApiError> {
        let email = self.email.filter(|v| !v.trim().is_empty());
        let username = self.username.filter(|v| !v.trim().is_empty());

        if email.is_none() && username.is_none() {
            return Err(ApiError::validation_error(
                "Email or Username is required",
                None,
            ));
        }

        Ok((email, username))
    }
}

fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegisterRequest {
        RegisterRequest {
            username: Some("alice".to_string()),
            email: Some("a@x.com".to_string()),
            password: Some("password1".to_string()),
            profile_image_url: Some("https://img.example.com/alice.png".to_string()),
            age: Some(25),
        }
    }

    #[test]
    fn valid_registration_passes() {
        let user = request().validate().unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "a@x.com");
    }

    #[test]
    fn short_password_is_rejected_with_length_message() {
        let mut req = request();
        req.password = Some("short".to_string());

        match req.validate() {
            Err(ApiError::ValidationError { field_errors, .. }) => {
                let fields = field_errors.unwrap();
                assert_eq!(
                    fields.get("password").unwrap(),
                    "Password must be at least 6 characters"
                );
            }
            other => panic!("expected ValidationError, got {:?}", other.map(|u| u.username)),
        }
    }

    #[test]
    fn invalid_email_is_rejected() {
        for bad in ["a", "a@", "@x.com", "a@x", "a@b@c.com", "a@.com"] {
            let mut req = request();
            req.email = Some(bad.to_string());
            let err = req.validate().unwrap_err();
            match err {
                ApiError::ValidationError { field_errors, .. } => {
                    assert!(field_errors.unwrap().contains_key("email"), "email {:?}", bad);
                }
                other => panic!("expected ValidationError for {:?}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn age_must_be_in_range() {
        for bad in [7, 101, 0, -3] {
            let mut req = request();
            req.age = Some(bad);
            assert!(req.validate().is_err(), "age {}", bad);
        }
        for ok in [8, 100] {
            let mut req = request();
            req.age = Some(ok);
            assert!(req.validate().is_ok(), "age {}", ok);
        }
    }

    #[test]
    fn profile_image_url_must_parse() {
        let mut req = request();
        req.profile_image_url = Some("not a url".to_string());
        assert!(req.validate().is_err());
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let req = RegisterRequest {
            username: None,
            email: None,
            password: None,
            profile_image_url: None,
            age: None,
        };
        match req.validate() {
            Err(ApiError::ValidationError { field_errors, .. }) => {
                let fields = field_errors.unwrap();
                for key in ["username", "email", "password", "profile_image_url", "age"] {
                    assert!(fields.contains_key(key), "missing {}", key);
                }
            }
            other => panic!("expected ValidationError, got {:?}", other.map(|u| u.username)),
        }
    }

    #[test]
    fn update_requires_email_or_username() {
        let empty = UpdateUserRequest {
            email: Some("  ".to_string()),
            username: None,
        };
        assert!(empty.validate().is_err());

        let just_email = UpdateUserRequest {
            email: Some("b@x.com".to_string()),
            username: None,
        };
        let (email, username) = just_email.validate().unwrap();
        assert_eq!(email.as_deref(), Some("b@x.com"));
        assert!(username.is_none());
    }
}
