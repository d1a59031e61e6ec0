use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use stemtutor_orchestration::HealthReport;

use crate::main_lib::AppState;

/// Probe every provider; 503 when none is available.
async fn ai_health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthReport>) {
    let report = state.tutor.health().await;
    let status = if report.overall_status {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    tracing::info!(
        "Health check: {:?}, available: {:?}",
        report.status(),
        report.available_providers()
    );
    (status, Json(report))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/ai-health", get(ai_health))
}
