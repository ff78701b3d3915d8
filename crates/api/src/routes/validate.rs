use axum::{http::StatusCode, Json};
use sched_core::{check_capacity_feasibility, validate, ValidationError};
use serde::Serialize;
use types::Instance;

#[derive(Serialize, utoipa::ToSchema)]
pub struct ValidationReport {
    pub ok: bool,
    #[serde(default)]
    pub errors: Vec<String>,
    pub capacity_feasible: bool,
    pub capacity_message: String,
}

#[utoipa::path(
    post,
    path = "/v1/validate",
    request_body = Instance,
    responses(
    (status = 200, description = "Validation result", body = ValidationReport)
    )
)]
pub async fn validate_handler(Json(inst): Json<Instance>) -> (StatusCode, Json<ValidationReport>) {
    let (capacity_feasible, capacity_message) = check_capacity_feasibility(&inst);
    match validate(&inst) {
        Ok(()) => (
            StatusCode::OK,
            Json(ValidationReport {
                ok: true,
                errors: vec![],
                capacity_feasible,
                capacity_message,
            }),
        ),
        Err(ValidationError::InstanceInvalid(msg)) => {
            let errors = msg.split(';').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
            (
                StatusCode::OK,
                Json(ValidationReport {
                    ok: false,
                    errors,
                    capacity_feasible,
                    capacity_message,
                }),
            )
        }
    }
}
