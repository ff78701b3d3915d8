use axum::Json;
use fixtures::InstanceGenerator;
use serde::Deserialize;
use types::{Instance, InstanceSize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct GenerateIn {
    pub size: InstanceSize,
    #[serde(default)]
    pub seed: u64,
}

#[utoipa::path(
    post,
    path = "/v1/generate",
    request_body = GenerateIn,
    responses((status = 200, description = "Synthetic problem instance", body = Instance))
)]
pub async fn generate(Json(input): Json<GenerateIn>) -> Json<Instance> {
    let instance = InstanceGenerator::new(input.seed).generate_instance(input.size, None);
    Json(instance)
}
