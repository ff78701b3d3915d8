mod error;
mod state;
mod telemetry;
pub mod routes {
    pub mod equity;
    pub mod generate;
    pub mod health;
    pub mod jobs;
    pub mod solve;
    pub mod timetable;
    pub mod validate;
}

use axum::{
    routing::{get, post},
    Router,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            routes::health::health,
            routes::generate::generate,
            routes::solve::solve,
            routes::jobs::status,
            routes::jobs::result,
            routes::validate::validate_handler,
            routes::timetable::timetable,
            routes::equity::equity,
        ),
        components(schemas(
            types::Instance, types::Faculty, types::CourseActivity, types::Assignment,
            types::OptimizationResult, types::SolverStatus, types::SolveParams, types::SolverKind,
            types::GaParams, types::SaParams, types::Rank, types::ActivityType, types::InstanceSize,
            types::Timetable, types::ScheduledActivity, types::Room, types::RoomType, types::DayOfWeek,
            jobs::JobId, jobs::JobStatus,
            routes::validate::ValidationReport,
            routes::solve::SolveIn,
            routes::solve::JobCreated,
            routes::generate::GenerateIn,
            routes::timetable::TimetableIn,
            routes::equity::EquityIn,
            sched_core::EquityMetrics,
        )),
        tags(
            (name = "teaching-load", description = "Teaching load distribution and timetabling API")
        )
    )]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let app_state = state::AppState::new_default();

    let app = Router::new()
        .route("/v1/health", get(routes::health::health))
        .route("/v1/generate", post(routes::generate::generate))
        .route("/v1/solve", post(routes::solve::solve))
        .route("/v1/validate", post(routes::validate::validate_handler))
        .route("/v1/timetable", post(routes::timetable::timetable))
        .route("/v1/equity", post(routes::equity::equity))
        .route("/v1/jobs/:id", get(routes::jobs::status))
        .route("/v1/jobs/:id/result", get(routes::jobs::result))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(telemetry::stack())
        .with_state(app_state);

    let port = std::env::var("TEACHING_LOAD__SERVER__PORT").unwrap_or_else(|_| "8080".into());
    let addr: std::net::SocketAddr = format!("0.0.0.0:{}", port)
        .parse()
        .expect("invalid listen addr");
    tracing::info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
