use financial_literacy_arcade::{
    api::{start_server, ApiState},
    config::ArcadeConfig,
    currency::{CurrencyConverter, HttpRateSource},
    launcher::create_default_launcher,
    progress::{FileProgressStore, InMemoryProgressStore, ProgressStore},
    sessions::SessionStore,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ArcadeConfig::from_env()?;

    info!("🚀 Financial Literacy Arcade - API Server");
    info!("📍 Port: {}", config.port);

    // Create components
    let progress: Arc<dyn ProgressStore> = match &config.progress_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "Saving progress to disk");
            Arc::new(FileProgressStore::new(dir.clone()))
        }
        None => {
            info!("PROGRESS_DIR not set, keeping progress in memory");
            Arc::new(InMemoryProgressStore::new())
        }
    };
    let rates = HttpRateSource::new(config.rates_api_base_url.clone(), config.rates_timeout)?;

    let sessions = Arc::new(SessionStore::new(progress));

    // Drop abandoned game sessions
    let sweeper = sessions.clone();
    let max_idle = config.session_idle;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(max_idle.min(Duration::from_secs(60)));
        loop {
            interval.tick().await;
            sweeper.sweep_idle(max_idle).await;
        }
    });

    let state = ApiState {
        sessions,
        converter: Arc::new(CurrencyConverter::new(Arc::new(rates))),
        launcher: Arc::new(create_default_launcher(&config.launcher)),
    };

    info!("📡 Starting API server...");

    // Start API server
    start_server(state, config.port).await?;

    Ok(())
}
