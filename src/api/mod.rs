pub mod handlers;
pub mod routes;
pub mod views;

pub use routes::*;

use crate::metrics::MetricsConfig;
use crate::ml::PredictionService;
use std::sync::Arc;
use std::time::Duration;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PredictionService>,
    pub metrics: MetricsConfig,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(service: Arc<PredictionService>) -> Self {
        Self {
            service,
            metrics: MetricsConfig::default(),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsConfig) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
