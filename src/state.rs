use sqlx::PgPool;

use crate::auth::TokenService;

/// Shared application state injected into handlers and middleware. The pool
/// and token service are constructed once at startup; nothing here is mutated
/// after that.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub tokens: TokenService,
}
