use parking_lot::RwLock;
use sched_core::Solver;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};
use types::{Instance, OptimizationResult, SolveParams, SolverKind};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
pub struct JobId(pub String);

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Completed { result: OptimizationResult },
    Failed { message: String },
}

/// In-memory job queue dispatching to whichever registered [`Solver`]
/// matches a request's [`SolverKind`]. Each `solve` call runs on its own
/// spawned task so a long MILP or GA run never blocks the next submission.
#[derive(Clone)]
pub struct InMemJobs {
    statuses: Arc<RwLock<HashMap<String, JobStatus>>>,
    solvers: Arc<HashMap<SolverKind, Arc<dyn Solver>>>,
}

impl InMemJobs {
    pub fn new(solvers: HashMap<SolverKind, Arc<dyn Solver>>) -> Self {
        Self {
            statuses: Default::default(),
            solvers: Arc::new(solvers),
        }
    }

    pub fn enqueue(&self, instance: Instance, params: SolveParams) -> JobId {
        let id = Uuid::new_v4().to_string();
        self.statuses.write().insert(id.clone(), JobStatus::Queued);

        let Some(solver) = self.solvers.get(&params.solver).cloned() else {
            self.statuses.write().insert(
                id.clone(),
                JobStatus::Failed {
                    message: format!("no solver registered for {:?}", params.solver),
                },
            );
            return JobId(id);
        };

        let statuses = self.statuses.clone();
        let id_for_task = id.clone();

        tokio::spawn(async move {
            statuses.write().insert(id_for_task.clone(), JobStatus::Running);
            info!(job_id = %id_for_task, solver = ?params.solver, "solving job");
            match solver.solve(&instance, &params).await {
                Ok(result) => {
                    statuses.write().insert(id_for_task, JobStatus::Completed { result });
                }
                Err(e) => {
                    error!(job_id = %id_for_task, error = %e, "job failed");
                    statuses.write().insert(
                        id_for_task,
                        JobStatus::Failed {
                            message: e.to_string(),
                        },
                    );
                }
            }
        });

        JobId(id)
    }

    pub fn get(&self, id: &str) -> Option<JobStatus> {
        self.statuses.read().get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use types::SolverStatus;

    struct StubSolver;

    #[async_trait]
    impl Solver for StubSolver {
        async fn solve(&self, instance: &Instance, _params: &SolveParams) -> anyhow::Result<OptimizationResult> {
            Ok(OptimizationResult {
                assignments: Vec::new(),
                objective_value: 0.0,
                total_deviation: 0.0,
                computation_time_seconds: 0.0,
                solver_name: "stub".into(),
                solver_status: SolverStatus::Completed,
                faculty_loads: Default::default(),
                unassigned_activities: instance.activities.iter().map(|a| a.id.clone()).collect(),
                is_feasible: true,
                gap: None,
            })
        }
    }

    fn empty_instance() -> Instance {
        Instance {
            faculty: Vec::new(),
            activities: Vec::new(),
            qualifications: types::QualificationMatrix::default(),
            name: "empty".into(),
        }
    }

    #[tokio::test]
    async fn enqueue_transitions_to_completed() {
        let mut solvers: HashMap<SolverKind, Arc<dyn Solver>> = HashMap::new();
        solvers.insert(SolverKind::Genetic, Arc::new(StubSolver));
        let jobs = InMemJobs::new(solvers);

        let params = SolveParams::new(SolverKind::Genetic, 1, 0);
        let id = jobs.enqueue(empty_instance(), params);

        for _ in 0..50 {
            if matches!(jobs.get(&id.0), Some(JobStatus::Completed { .. })) {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("job never completed");
    }

    #[tokio::test]
    async fn enqueue_fails_fast_for_unregistered_solver() {
        let jobs = InMemJobs::new(HashMap::new());
        let params = SolveParams::new(SolverKind::Pulp, 1, 0);
        let id = jobs.enqueue(empty_instance(), params);
        assert!(matches!(jobs.get(&id.0), Some(JobStatus::Failed { .. })));
    }
}
