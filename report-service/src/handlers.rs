//! HTTP handlers.
//!
//! Handlers are stateless; all mutable shared state lives in the pool
//! manager. Error outcomes are mapped to status codes by
//! `AppError::into_response`.

use axum::extract::{Query, State};
use axum::Json;

use common::errors::AppError;
use common::models::{HealthResponse, ReportParams, ReportResponse};

use crate::state::AppState;

/// Liveness check. Answers regardless of pool state.
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Returns one page of the fund report.
#[utoipa::path(
    get,
    path = "/dados",
    tag = "report",
    params(ReportParams),
    responses(
        (status = 200, description = "Report rows", body = ReportResponse),
        (status = 500, description = "Query execution failed", body = common::errors::ErrorBody),
        (status = 503, description = "Connection pool unavailable", body = common::errors::ErrorBody)
    )
)]
pub async fn get_report(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<Json<ReportResponse>, AppError> {
    let dados = state
        .runner
        .run_report(i64::from(params.limit), i64::from(params.offset))
        .await?;
    Ok(Json(ReportResponse { dados }))
}
