use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{routing::post, Router};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{fmt, EnvFilter};

use pantry_chef::routes::{self, AppState};
use pantry_chef::{GeminiClient, MemoryStore, RecipeService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let api_key = std::env::var("GEMINI_API_KEY").context("GEMINI_API_KEY must be set")?;

    let service = Arc::new(RecipeService::new(
        GeminiClient::new(api_key),
        Arc::new(MemoryStore::default()),
    ));
    let state = AppState { service };

    let app = Router::new()
        .route(
            "/api/ingredients/from-image",
            post(routes::ingredients_from_image),
        )
        .route("/api/recipes", post(routes::generate_recipe))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;
    Ok(())
}
