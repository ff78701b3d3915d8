use axum::Json;
use serde::Deserialize;
use timetabler::TimetableGenerator;
use types::{Instance, OptimizationResult, Timetable};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct TimetableIn {
    pub instance: Instance,
    pub result: OptimizationResult,
    #[serde(default)]
    pub seed: u64,
}

#[utoipa::path(
    post,
    path = "/v1/timetable",
    request_body = TimetableIn,
    responses((status = 200, description = "Weekly schedule built from a solved assignment", body = Timetable))
)]
pub async fn timetable(Json(input): Json<TimetableIn>) -> Json<Timetable> {
    let mut gen = TimetableGenerator::new(input.seed);
    let timetable = gen.generate(&input.instance, &input.result, None);
    Json(timetable)
}
