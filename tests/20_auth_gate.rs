mod common;

use anyhow::Result;
use reqwest::StatusCode;
use uuid::Uuid;

use photogram_api::auth::TokenService;

/// Requests without any Authorization header never reach a handler.
#[tokio::test]
async fn missing_token_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for path in ["/photos", "/comments", "/socialmedias"] {
        let res = client
            .get(format!("{}{}", server.base_url, path))
            .send()
            .await?;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "path {}", path);
        let body = res.json::<serde_json::Value>().await?;
        assert_eq!(body["code"], "UNAUTHORIZED", "path {}", path);
    }
    Ok(())
}

#[tokio::test]
async fn non_bearer_scheme_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/photos", server.base_url))
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn garbage_token_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/photos", server.base_url))
        .header("Authorization", "Bearer not.a.token")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Invalid token");
    Ok(())
}

#[tokio::test]
async fn expired_token_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // Same secret as the server, but a validity window that ended hours ago
    let expired = TokenService::new(common::TEST_JWT_SECRET, -2)
        .issue(Uuid::new_v4(), "alice@example.com")?;

    let res = client
        .get(format!("{}/photos", server.base_url))
        .header("Authorization", format!("Bearer {}", expired))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Token has expired");
    Ok(())
}

/// A valid token passes the gate; whatever happens next is up to storage, so
/// only the auth outcome is asserted here.
#[tokio::test]
async fn valid_token_passes_the_gate() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let token = TokenService::new(common::TEST_JWT_SECRET, 24)
        .issue(Uuid::new_v4(), "alice@example.com")?;

    let res = client
        .get(format!("{}/photos", server.base_url))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await?;

    assert_ne!(res.status(), StatusCode::UNAUTHORIZED);
    assert_ne!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

/// The profile authorizer compares identities without a storage lookup, so a
/// mismatched path id fails closed even with the database down.
#[tokio::test]
async fn profile_update_for_another_user_is_forbidden() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let token = TokenService::new(common::TEST_JWT_SECRET, 24)
        .issue(Uuid::new_v4(), "alice@example.com")?;

    let res = client
        .put(format!("{}/users/{}", server.base_url, Uuid::new_v4()))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "email": "intruder@example.com" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "FORBIDDEN");
    Ok(())
}
