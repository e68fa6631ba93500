use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cgpa::api::router;
use cgpa::config::AppConfig;
use cgpa::insight::{GeminiConfig, GeminiHttpClient, InsightClient};
use cgpa::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "cgpa=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;
    let pool = cgpa::db::connect(&config.database_url).await?;

    let insight_client: Option<Arc<dyn InsightClient>> = match GeminiConfig::new_from_env() {
        Ok(gemini) => {
            let client: Arc<dyn InsightClient> = Arc::new(GeminiHttpClient::new(gemini)?);
            Some(client)
        }
        Err(e) => {
            warn!("AI insights disabled: {}", e);
            None
        }
    };

    let state = AppState::new(pool, &config.record_key, insight_client);
    state.records.hydrate().await;

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
