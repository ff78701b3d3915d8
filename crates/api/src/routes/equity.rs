use axum::Json;
use sched_core::{equity_metrics, EquityMetrics};
use serde::Deserialize;
use std::collections::HashMap;
use types::{FacultyId, OptimizationResult};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct EquityIn {
    pub result: OptimizationResult,
    pub target_loads: HashMap<FacultyId, f64>,
}

#[utoipa::path(
    post,
    path = "/v1/equity",
    request_body = EquityIn,
    responses((status = 200, description = "Load-balance breakdown for a solved assignment", body = EquityMetrics))
)]
pub async fn equity(Json(input): Json<EquityIn>) -> Json<EquityMetrics> {
    Json(equity_metrics(&input.result, &input.target_loads))
}
