use axum::{
    extract::State,
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{comments, photos, social_media, users};
use crate::middleware::auth::require_auth;
use crate::middleware::ownership::{require_ownership, require_profile_ownership};
use crate::models::{Comment, Photo, SocialMedia};
use crate::state::AppState;

/// Build the full application router. Every protected group runs the
/// authentication gate first; mutating routes additionally run the ownership
/// authorizer for their resource type.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(user_routes(&state))
        .merge(photo_routes(&state))
        .merge(comment_routes(&state))
        .merge(social_media_routes(&state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn user_routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route(
            "/users/:user_id",
            put(users::update).route_layer(from_fn(require_profile_ownership)),
        )
        .route("/users", delete(users::remove))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .merge(protected)
}

fn photo_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/photos", post(photos::create).get(photos::list))
        .route("/photos/:photo_id", get(photos::fetch))
        .route(
            "/photos/:photo_id",
            put(photos::update)
                .delete(photos::remove)
                .route_layer(from_fn_with_state(state.clone(), require_ownership::<Photo>)),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

fn comment_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/comments", post(comments::create).get(comments::list))
        .route("/comments/:comment_id", get(comments::fetch))
        .route(
            "/comments/:comment_id",
            put(comments::update)
                .delete(comments::remove)
                .route_layer(from_fn_with_state(state.clone(), require_ownership::<Comment>)),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

fn social_media_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/socialmedias",
            post(social_media::create).get(social_media::list),
        )
        .route("/socialmedias/:social_media_id", get(social_media::fetch))
        .route(
            "/socialmedias/:social_media_id",
            put(social_media::update)
                .delete(social_media::remove)
                .route_layer(from_fn_with_state(
                    state.clone(),
                    require_ownership::<SocialMedia>,
                )),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Photogram API",
            "version": version,
            "description": "Photo sharing REST API built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "register": "POST /users/register (public)",
                "login": "POST /users/login (public - token acquisition)",
                "users": "PUT /users/:user_id, DELETE /users (protected)",
                "photos": "/photos[/:photo_id] (protected)",
                "comments": "/comments[/:comment_id] (protected)",
                "socialmedias": "/socialmedias[/:social_media_id] (protected)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::health_check(&state.pool).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
