use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Deserialize;
use types::{Instance, SolveParams};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct SolveIn {
    pub instance: Instance,
    pub params: SolveParams,
}

#[derive(serde::Serialize, ToSchema)]
pub struct JobCreated {
    pub job_id: String,
    pub status: &'static str,
}

#[utoipa::path(
        post,
        path = "/v1/solve",
        request_body = SolveIn,
        responses((status = 200, description = "Job enqueued", body = JobCreated))
    )]
pub async fn solve(State(state): State<AppState>, Json(input): Json<SolveIn>) -> Json<JobCreated> {
    let id = state.jobs.enqueue(input.instance, input.params);
    Json(JobCreated {
        job_id: id.0,
        status: "queued",
    })
}
