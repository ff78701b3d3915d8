#[cfg(feature = "with-milp")]
mod milp;
#[cfg(feature = "with-cpsat")]
mod cpsat;

use async_trait::async_trait;
use sched_core::{Instance, OptimizationResult, SolveParams, Solver};
use tracing::info;

/// LP/MILP backend (`good_lp` + CBC). Scoped out entirely when the
/// `with-milp` feature is disabled, leaving only the CP-SAT backend.
pub struct PulpSolver;

impl PulpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PulpSolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Solver for PulpSolver {
    async fn solve(&self, instance: &Instance, params: &SolveParams) -> anyhow::Result<OptimizationResult> {
        info!(activities = instance.activities.len(), "solving with LP/MILP backend");
        #[cfg(feature = "with-milp")]
        {
            milp::solve(instance, params.time_limit_seconds)
        }
        #[cfg(not(feature = "with-milp"))]
        {
            anyhow::bail!("solver-milp built without the `with-milp` feature")
        }
    }
}

/// CP-SAT backend (`cp_sat`), the second required exact solver.
pub struct OrToolsSolver;

impl OrToolsSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OrToolsSolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Solver for OrToolsSolver {
    async fn solve(&self, instance: &Instance, params: &SolveParams) -> anyhow::Result<OptimizationResult> {
        info!(activities = instance.activities.len(), "solving with CP-SAT backend");
        #[cfg(feature = "with-cpsat")]
        {
            cpsat::solve(instance, params.time_limit_seconds)
        }
        #[cfg(not(feature = "with-cpsat"))]
        {
            anyhow::bail!("solver-milp built without the `with-cpsat` feature")
        }
    }
}

#[cfg(all(test, feature = "with-milp"))]
mod tests {
    use super::*;
    use types::{
        ActivityType, CourseActivity, Faculty, GaParams, QualificationMatrix, Rank, SaParams, SolverKind,
    };

    fn small_instance() -> Instance {
        let f1 = Faculty::new(types::FacultyId(1), "A", Rank::Teacher, 40.0, 60.0);
        let f2 = Faculty::new(types::FacultyId(2), "B", Rank::Teacher, 40.0, 60.0);
        let activities: Vec<CourseActivity> = (0..4)
            .map(|i| CourseActivity {
                id: types::ActivityId::from(format!("act-{i}").as_str()),
                course_id: "c1".into(),
                course_name: "Course".into(),
                activity_type: ActivityType::Lecture,
                section_number: i as u32,
                hours: 20.0,
                student_count: 30,
                required_rank: None,
            })
            .collect();
        let qualifications = QualificationMatrix(
            activities
                .iter()
                .flat_map(|a| vec![(types::FacultyId(1), a.id.clone()), (types::FacultyId(2), a.id.clone())])
                .collect(),
        );
        Instance {
            faculty: vec![f1, f2],
            activities,
            qualifications,
            name: "fixture".into(),
        }
    }

    #[tokio::test]
    async fn pulp_solver_covers_every_activity() {
        let inst = small_instance();
        let params = SolveParams {
            solver: SolverKind::Pulp,
            time_limit_seconds: 30,
            seed: 0,
            ga: GaParams::default(),
            sa: SaParams::default(),
        };
        let solver = PulpSolver::new();
        let result = solver.solve(&inst, &params).await.unwrap();
        assert!(result.is_feasible);
        assert_eq!(result.assignments.len(), inst.activities.len());
    }
}
