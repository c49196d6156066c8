use async_trait::async_trait;
use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Lookup capability for resources with an owning user. One implementation
/// per resource type keeps the per-type query while the middleware itself
/// stays generic.
#[async_trait]
pub trait OwnedResource {
    /// Display name used in NotFound/Forbidden messages, e.g. "Photo"
    const NOUN: &'static str;

    /// Return the owning user id if the resource exists
    async fn owner_of(pool: &PgPool, id: Uuid) -> Result<Option<Uuid>, sqlx::Error>;
}

/// Ownership authorizer: loads the resource named by the path id and lets the
/// request through only when the authenticated identity owns it. Runs after
/// the authentication gate and before any mutating handler.
pub async fn require_ownership<R: OwnedResource>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let owner = R::owner_of(&state.pool, id).await?;
    check_owner(R::NOUN, owner, auth.id)?;

    Ok(next.run(request).await)
}

/// Profile authorizer: the path user id must be the authenticated identity.
/// The "resource" is the identity itself, so no storage lookup happens.
pub async fn require_profile_ownership(
    Path(user_id): Path<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if auth.id != user_id {
        return Err(ApiError::forbidden("Profile does not belong to you"));
    }

    Ok(next.run(request).await)
}

/// The ownership decision itself: missing resource is NotFound, a foreign
/// owner is Forbidden.
fn check_owner(noun: &str, owner: Option<Uuid>, user: Uuid) -> Result<(), ApiError> {
    match owner {
        None => Err(ApiError::not_found(format!("{} not found", noun))),
        Some(owner) if owner != user => {
            Err(ApiError::forbidden(format!("{} does not belong to you", noun)))
        }
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_resource_is_not_found() {
        let user = Uuid::new_v4();
        let err = check_owner("Photo", None, user).unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn foreign_owner_is_forbidden() {
        let user = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let err = check_owner("Photo", Some(owner), user).unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert!(err.message().contains("Photo"));
    }

    #[test]
    fn owner_passes() {
        let user = Uuid::new_v4();
        assert!(check_owner("Comment", Some(user), user).is_ok());
    }
}
