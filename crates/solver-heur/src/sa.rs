use async_trait::async_trait;
use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sched_core::evaluator::{Chromosome, Evaluator};
use sched_core::{Instance, OptimizationResult, QualIndex, SolveParams, Solver, SolverStatus};
use std::time::Instant;

/// Simulated-annealing metaheuristic over the same chromosome space as
/// [`crate::ga::GeneticSolver`]: single-gene mutation as the neighbor move,
/// geometric cooling, Metropolis acceptance.
pub struct SimulatedAnnealingSolver;

impl SimulatedAnnealingSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SimulatedAnnealingSolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Solver for SimulatedAnnealingSolver {
    async fn solve(&self, instance: &Instance, params: &SolveParams) -> anyhow::Result<OptimizationResult> {
        let start = Instant::now();
        let qi = QualIndex::build(instance);
        let evaluator = match Evaluator::build(instance, &qi) {
            Ok(e) => e,
            Err(idx) => {
                return Ok(uncoverable_result(
                    &instance.activities[idx].id,
                    start.elapsed().as_secs_f64(),
                ))
            }
        };

        let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
        let sa = &params.sa;

        let mut current = random_chromosome(&evaluator, &mut rng);
        let mut current_energy = evaluator.energy(&current);
        let mut best = current.clone();
        let mut best_energy = current_energy;

        let mut temp = sa.initial_temp;
        while temp > sa.min_temp {
            if start.elapsed().as_secs_f64() > params.time_limit_seconds as f64 {
                break;
            }
            for _ in 0..sa.inner_steps {
                let mut neighbor = current.clone();
                mutate(&mut neighbor, &evaluator, &mut rng);
                let neighbor_energy = evaluator.energy(&neighbor);

                let delta = neighbor_energy - current_energy;
                let accept = if delta < 0.0 {
                    true
                } else {
                    let prob = (-delta / temp).exp();
                    rng.gen::<f64>() < prob
                };

                if accept {
                    current = neighbor;
                    current_energy = neighbor_energy;
                    if current_energy < best_energy {
                        best = current.clone();
                        best_energy = current_energy;
                    }
                }
            }
            temp *= sa.cooling_rate;
        }

        let (assignments, faculty_loads) = evaluator.to_assignments(&best);
        let total_deviation = evaluator.total_deviation(&best);
        let is_feasible = evaluator.is_feasible(&best);

        Ok(OptimizationResult {
            assignments,
            objective_value: best_energy,
            total_deviation,
            computation_time_seconds: start.elapsed().as_secs_f64(),
            solver_name: "Simulated Annealing".to_string(),
            solver_status: SolverStatus::Completed,
            faculty_loads,
            unassigned_activities: Vec::new(),
            is_feasible,
            gap: None,
        })
    }
}

fn random_chromosome(evaluator: &Evaluator, rng: &mut ChaCha8Rng) -> Chromosome {
    (0..evaluator.num_activities())
        .map(|i| {
            let opts = evaluator.options_for(i);
            opts[rng.gen_range(0..opts.len())]
        })
        .collect()
}

fn mutate(chromosome: &mut Chromosome, evaluator: &Evaluator, rng: &mut ChaCha8Rng) {
    let idx = rng.gen_range(0..chromosome.len());
    let opts = evaluator.options_for(idx);
    chromosome[idx] = opts[rng.gen_range(0..opts.len())];
}

fn uncoverable_result(activity_id: &types::ActivityId, elapsed: f64) -> OptimizationResult {
    OptimizationResult {
        assignments: Vec::new(),
        objective_value: f64::INFINITY,
        total_deviation: f64::INFINITY,
        computation_time_seconds: elapsed,
        solver_name: "Simulated Annealing".to_string(),
        solver_status: SolverStatus::Infeasible,
        faculty_loads: Default::default(),
        unassigned_activities: vec![activity_id.clone()],
        is_feasible: false,
        gap: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{ActivityType, CourseActivity, Faculty, GaParams, QualificationMatrix, Rank, SaParams, SolverKind};

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
    async fn sa_solver_is_deterministic_for_a_fixed_seed() {
        let inst = small_instance();
        let params = SolveParams {
            solver: SolverKind::Sa,
            time_limit_seconds: 30,
            seed: 11,
            ga: GaParams::default(),
            sa: SaParams {
                initial_temp: 50.0,
                cooling_rate: 0.8,
                min_temp: 5.0,
                inner_steps: 10,
            },
        };
        let solver = SimulatedAnnealingSolver::new();
        let r1 = solver.solve(&inst, &params).await.unwrap();
        let r2 = solver.solve(&inst, &params).await.unwrap();
        assert_eq!(r1.objective_value, r2.objective_value);
        assert!(r1.is_feasible);
    }
}
