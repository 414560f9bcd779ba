use anyhow::{Context, Result};
use dotenv::dotenv;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use review_sentiment_api::{
    analyzer::SentimentAnalyzer, build_router, config::Config, inference::GroqClient, AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    // One client for the life of the process, shared read-only by every request.
    let client = GroqClient::new(config.api_key.clone())?.with_base_url(config.base_url.clone());
    info!("🔌 Completion API at {}", client.base_url());
    let analyzer = SentimentAnalyzer::new(Arc::new(client), config.model.clone());
    info!("🧠 Scoring reviews with model {}", analyzer.model());
    let state = Arc::new(AppState::new(analyzer, config.max_upload_bytes));

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("🚀 Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
