use finwise_core::{
    api::start_server, config::Settings, narrative::GeminiNarrator, rate_limit::RateLimiter,
    workflow::AdvisorWorkflow,
};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let settings = Settings::from_env()?;
    if let Err(e) = settings.validate_api_key() {
        warn!("{}", e);
        warn!("Narrative generation will fail until GEMINI_API_KEY is set");
    }

    info!("FinWise Advisor Core - API Server");
    info!("Port: {}", settings.port);

    // Create components
    let limiter = Arc::new(RateLimiter::new(settings.llm_calls_per_minute));
    let narrator = Arc::new(GeminiNarrator::new(
        settings.gemini_api_key.clone(),
        limiter,
    ));
    let workflow = Arc::new(AdvisorWorkflow::new(narrator.clone()));

    info!("Advisor workflow initialized");
    info!("Starting API server...");

    start_server(workflow, narrator, settings.port).await?;

    Ok(())
}
