use bank_churn_predictor::{
    api::{build_router, AppState},
    config::Config,
    metrics::MetricsConfig,
    ml::{ArtifactStore, PredictionService},
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        Config::default()
    });

    init_tracing(&config);

    tracing::info!(
        "Starting {} v{}",
        config.observability.service_name,
        env!("CARGO_PKG_VERSION")
    );

    // Initialize Prometheus metrics
    if config.observability.prometheus_enabled {
        if let Err(e) = bank_churn_predictor::metrics::init_metrics() {
            tracing::warn!("Failed to initialize metrics: {}", e);
            tracing::warn!("Continuing without metrics");
        } else {
            tracing::info!("✅ Prometheus metrics initialized");
        }
    } else {
        tracing::info!("⚠️  Prometheus metrics disabled in configuration");
    }

    // Artifacts: a load failure with caching enabled is fatal
    let store = ArtifactStore::from_config(&config.artifacts).map_err(|e| {
        tracing::error!("Failed to load artifacts: {}", e);
        e
    })?;
    tracing::info!(
        dir = %config.artifacts.dir.display(),
        cached = store.is_cached(),
        "✅ Artifact store ready"
    );

    let service = Arc::new(PredictionService::new(store));
    let app_state = AppState::new(service)
        .with_metrics(MetricsConfig::from(&config.observability))
        .with_request_timeout(Duration::from_secs(config.server.request_timeout_secs));

    let app = build_router(app_state);

    // Start HTTP server
    let http_addr = format!("{}:{}", config.server.host, config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("🚀 HTTP server listening on http://{}", http_addr);
    tracing::info!("   Form: http://{}/", http_addr);
    tracing::info!("   JSON API: http://{}/v1/predictions", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(http_listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down gracefully...");
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "bank_churn_predictor={},tower_http=info",
            config.observability.log_level
        )
        .into()
    });

    if config.observability.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
