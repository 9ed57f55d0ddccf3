/// Configuration for HTTP metrics collection

use crate::config::ObservabilityConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable metrics collection
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Endpoint path for metrics export
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Record request duration histograms
    #[serde(default = "default_enabled")]
    pub enable_histograms: bool,

    /// Paths to exclude from HTTP metrics
    #[serde(default)]
    pub excluded_paths: Vec<String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint: default_endpoint(),
            enable_histograms: true,
            excluded_paths: vec!["/health".to_string(), "/metrics".to_string()],
        }
    }
}

impl From<&ObservabilityConfig> for MetricsConfig {
    fn from(config: &ObservabilityConfig) -> Self {
        Self {
            enabled: config.prometheus_enabled,
            ..Default::default()
        }
    }
}

impl MetricsConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Exclude a path from HTTP metrics
    pub fn exclude_path(mut self, path: impl Into<String>) -> Self {
        self.excluded_paths.push(path.into());
        self
    }

    /// Exact match or any sub-path of an excluded path
    pub fn is_path_excluded(&self, path: &str) -> bool {
        self.excluded_paths
            .iter()
            .any(|excluded| path == excluded || path.starts_with(&format!("{}/", excluded)))
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.endpoint.starts_with('/') {
            return Err("endpoint must start with '/'".to_string());
        }
        Ok(())
    }
}

fn default_enabled() -> bool {
    true
}

fn default_endpoint() -> String {
    "/metrics".to_string()
}
