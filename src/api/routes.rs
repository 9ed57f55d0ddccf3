use crate::api::{handlers, AppState};
use crate::metrics::MetricsLayer;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main router
pub fn build_router(state: AppState) -> Router {
    let metrics = MetricsLayer::new(state.metrics.clone());
    let timeout = TimeoutLayer::new(state.request_timeout);

    Router::new()
        // Form
        .route("/", get(handlers::index))
        .route("/predict", post(handlers::predict_form))
        // JSON API
        .route("/v1/predictions", post(handlers::predict_json))
        .route("/v1/model", get(handlers::model_info))
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/health/live", get(handlers::health_check))
        .route("/health/ready", get(handlers::readiness))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(metrics)
        .layer(timeout)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
