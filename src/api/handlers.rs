use crate::api::views::{self, FormValues, ResultArea};
use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::metrics::{gather_metrics, ERRORS_TOTAL};
use crate::ml::{ChurnPrediction, ModelMetadata};
use crate::models::CustomerProfile;
use crate::report::Verdict;
use axum::{
    extract::{
        rejection::{JsonRejection, RawFormRejection},
        RawForm, State,
    },
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Readiness: the artifacts a request would use can be loaded
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let service = state.service.clone();
    let ready = tokio::task::spawn_blocking(move || service.is_ready())
        .await
        .unwrap_or(false);

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadinessResponse {
            ready,
            cached: state.service.store().is_cached(),
        }),
    )
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    /// Artifacts held in memory rather than read per request
    pub cached: bool,
}

/// Description of the loaded model
pub async fn model_info(State(state): State<AppState>) -> Result<Json<ModelMetadata>> {
    let service = state.service.clone();
    let metadata = tokio::task::spawn_blocking(move || service.metadata())
        .await
        .map_err(|e| AppError::Internal(format!("model metadata task failed: {}", e)))??;

    Ok(Json(metadata))
}

/// Prediction through the JSON API
pub async fn predict_json(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CustomerProfile>, JsonRejection>,
) -> Result<Json<PredictionResponse>> {
    let Json(profile) = payload.map_err(|e| rejected("json", e.body_text()))?;

    let request_id = Uuid::new_v4();
    let prediction = run_pipeline(&state, profile.clone())
        .await
        .map_err(|e| {
            count_error("api", &e);
            e
        })?;

    tracing::info!(
        request_id = %request_id,
        outcome = %prediction.label,
        "Served JSON prediction"
    );

    Ok(Json(PredictionResponse {
        request_id,
        verdict: Verdict::from_prediction(&prediction, &profile.name),
        prediction,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub request_id: Uuid,
    pub prediction: ChurnPrediction,
    pub verdict: Verdict,
}

/// The empty form
pub async fn index() -> Html<String> {
    Html(views::render_page(&FormValues::default(), ResultArea::Empty))
}

/// Form submission; always answers with the page, verdict or error included
pub async fn predict_form(
    State(state): State<AppState>,
    payload: std::result::Result<RawForm, RawFormRejection>,
) -> (StatusCode, Html<String>) {
    let body = match payload {
        Ok(RawForm(body)) => body,
        Err(e) => {
            let error = rejected("form", e.body_text());
            let page = views::render_page(&FormValues::default(), ResultArea::Error(&error));
            return (error.status_code(), Html(page));
        }
    };

    let profile = match serde_urlencoded::from_bytes::<CustomerProfile>(&body) {
        Ok(profile) => profile,
        Err(e) => {
            let error = rejected("form", format!("Failed to deserialize form body: {}", e));
            let submitted: FormValues = serde_urlencoded::from_bytes(&body).unwrap_or_default();
            let page = views::render_page(&submitted, ResultArea::Error(&error));
            return (error.status_code(), Html(page));
        }
    };

    let values = FormValues::from(&profile);
    match run_pipeline(&state, profile.clone()).await {
        Ok(prediction) => {
            let verdict = Verdict::from_prediction(&prediction, &profile.name);
            let page = views::render_page(&values, ResultArea::Verdict(&verdict));
            (StatusCode::OK, Html(page))
        }
        Err(error) => {
            count_error("form", &error);
            tracing::warn!(error_code = error.error_code(), "Form prediction failed: {}", error);
            let page = views::render_page(&values, ResultArea::Error(&error));
            (error.status_code(), Html(page))
        }
    }
}

/// Prometheus text exposition
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        gather_metrics(),
    )
}

/// Run the synchronous pipeline on the blocking pool
async fn run_pipeline(state: &AppState, profile: CustomerProfile) -> Result<ChurnPrediction> {
    let service = state.service.clone();
    tokio::task::spawn_blocking(move || service.predict(&profile))
        .await
        .map_err(|e| AppError::Internal(format!("prediction task failed: {}", e)))?
}

fn rejected(source: &str, reason: String) -> AppError {
    ERRORS_TOTAL
        .with_label_values(&[source, "rejected_payload"])
        .inc();
    AppError::Validation(reason)
}

fn count_error(component: &str, error: &AppError) {
    ERRORS_TOTAL
        .with_label_values(&[component, error.error_code()])
        .inc();
}
