use jobs::InMemJobs;
use sched_core::Solver;
use solver_heur::{GeneticSolver, SimulatedAnnealingSolver};
use solver_milp::{OrToolsSolver, PulpSolver};
use std::collections::HashMap;
use std::sync::Arc;
use types::SolverKind;

#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<InMemJobs>,
}

impl AppState {
    pub fn new_default() -> Self {
        let mut solvers: HashMap<SolverKind, Arc<dyn Solver>> = HashMap::new();
        solvers.insert(SolverKind::OrTools, Arc::new(OrToolsSolver::new()));
        solvers.insert(SolverKind::Pulp, Arc::new(PulpSolver::new()));
        solvers.insert(SolverKind::Genetic, Arc::new(GeneticSolver::default()));
        solvers.insert(SolverKind::Sa, Arc::new(SimulatedAnnealingSolver::default()));

        Self {
            jobs: Arc::new(InMemJobs::new(solvers)),
        }
    }
}
