use anyhow::Context;

use photogram_api::auth::TokenService;
use photogram_api::state::AppState;
use photogram_api::{config, database, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting Photogram API in {:?} mode", config.environment);

    let pool = database::connect_pool(config).context("failed to build database pool")?;

    // The pool connects lazily; a down database at boot only degrades /health.
    if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
        tracing::warn!("Migrations not applied: {}", e);
    }

    let tokens = TokenService::from_config(&config.security)
        .context("JWT_SECRET must be set before the server can start")?;

    let app = routes::app(AppState { pool, tokens });

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    println!("🚀 Photogram API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}
