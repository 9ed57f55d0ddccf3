/// Prometheus metrics for the churn predictor.
///
/// Covers:
/// - HTTP request/response tracking
/// - Prediction outcomes, latency and failures
/// - Artifact loads
/// - Build info
///
/// # Example
/// ```no_run
/// use bank_churn_predictor::metrics::PREDICTIONS_TOTAL;
///
/// PREDICTIONS_TOTAL.with_label_values(&["churn"]).inc();
/// ```

mod config;
mod middleware;

pub use config::MetricsConfig;
pub use middleware::{MetricsLayer, MetricsService};

use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Gauge, GaugeVec, Histogram, HistogramOpts, HistogramVec, Opts, Registry,
};

const NAMESPACE: &str = "bank_churn_predictor";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    // ============================================================================
    // HTTP Metrics
    // ============================================================================

    /// Total number of HTTP requests received
    ///
    /// Labels: method, path, status_code
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests")
            .namespace(NAMESPACE),
        &["method", "path", "status_code"]
    ).expect("Failed to create HTTP_REQUESTS_TOTAL metric");

    /// HTTP request duration in seconds
    ///
    /// Labels: method, path
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric");

    /// Number of in-flight HTTP requests
    pub static ref HTTP_CONNECTIONS_ACTIVE: Gauge = Gauge::with_opts(
        Opts::new("http_connections_active", "Number of active HTTP connections")
            .namespace(NAMESPACE)
    ).expect("Failed to create HTTP_CONNECTIONS_ACTIVE metric");

    // ============================================================================
    // Prediction Metrics
    // ============================================================================

    /// Total number of successful predictions
    ///
    /// Labels: outcome (stay/churn)
    pub static ref PREDICTIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("predictions_total", "Total number of predictions served")
            .namespace(NAMESPACE),
        &["outcome"]
    ).expect("Failed to create PREDICTIONS_TOTAL metric");

    /// End-to-end pipeline duration for successful predictions
    pub static ref PREDICTION_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "prediction_duration_seconds",
            "Prediction pipeline duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0])
    ).expect("Failed to create PREDICTION_DURATION_SECONDS metric");

    /// Total number of failed predictions
    ///
    /// Labels: error_code
    pub static ref PREDICTION_ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("prediction_errors_total", "Total number of failed predictions")
            .namespace(NAMESPACE),
        &["error_code"]
    ).expect("Failed to create PREDICTION_ERRORS_TOTAL metric");

    // ============================================================================
    // Artifact Metrics
    // ============================================================================

    /// Total number of artifact file reads
    ///
    /// Labels: artifact (scaler/encoder/model), status (success/failure)
    pub static ref ARTIFACT_LOADS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("artifact_loads_total", "Total number of artifact loads")
            .namespace(NAMESPACE),
        &["artifact", "status"]
    ).expect("Failed to create ARTIFACT_LOADS_TOTAL metric");

    // ============================================================================
    // Error Metrics
    // ============================================================================

    /// Total number of errors
    ///
    /// Labels: component, error_type
    pub static ref ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("errors_total", "Total number of errors")
            .namespace(NAMESPACE),
        &["component", "error_type"]
    ).expect("Failed to create ERRORS_TOTAL metric");

    // ============================================================================
    // System Metrics
    // ============================================================================

    /// Application build info
    ///
    /// Labels: version, git_commit
    pub static ref BUILD_INFO: GaugeVec = GaugeVec::new(
        Opts::new("build_info", "Application build information")
            .namespace(NAMESPACE),
        &["version", "git_commit"]
    ).expect("Failed to create BUILD_INFO metric");
}

/// Register every metric with [`PROMETHEUS_REGISTRY`].
///
/// Call once at startup. A second call fails with `AlreadyReg`.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    PROMETHEUS_REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(HTTP_CONNECTIONS_ACTIVE.clone()))?;

    PROMETHEUS_REGISTRY.register(Box::new(PREDICTIONS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(PREDICTION_DURATION_SECONDS.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(PREDICTION_ERRORS_TOTAL.clone()))?;

    PROMETHEUS_REGISTRY.register(Box::new(ARTIFACT_LOADS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(ERRORS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(BUILD_INFO.clone()))?;

    BUILD_INFO
        .with_label_values(&[
            env!("CARGO_PKG_VERSION"),
            option_env!("GIT_COMMIT").unwrap_or("unknown"),
        ])
        .set(1.0);

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Encode the registry in the Prometheus text exposition format
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}
