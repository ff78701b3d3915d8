use async_trait::async_trait;
use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sched_core::evaluator::{Chromosome, Evaluator};
use sched_core::{Instance, OptimizationResult, QualIndex, SolveParams, Solver, SolverStatus};
use std::time::Instant;

/// Genetic-algorithm metaheuristic: uniform crossover, tournament selection,
/// single-gene mutation, elitism. Population/generation defaults match the
/// distribution's reference genetic solver.
pub struct GeneticSolver;

impl GeneticSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GeneticSolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Solver for GeneticSolver {
    async fn solve(&self, instance: &Instance, params: &SolveParams) -> anyhow::Result<OptimizationResult> {
        let start = Instant::now();
        let qi = QualIndex::build(instance);
        let evaluator = match Evaluator::build(instance, &qi) {
            Ok(e) => e,
            Err(idx) => {
                return Ok(uncoverable_result(
                    instance,
                    &instance.activities[idx].id,
                    start.elapsed().as_secs_f64(),
                    "Genetic Algorithm",
                ))
            }
        };

        let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
        let ga = &params.ga;

        let mut population: Vec<Chromosome> = (0..ga.population_size)
            .map(|_| random_chromosome(&evaluator, &mut rng))
            .collect();

        let mut best: Option<(Chromosome, f64)> = None;

        for _generation in 0..ga.generations {
            if start.elapsed().as_secs_f64() > params.time_limit_seconds as f64 {
                break;
            }

            let mut fitness: Vec<f64> = population.iter().map(|c| evaluator.energy(c)).collect();
            for (chromo, &f) in population.iter().zip(fitness.iter()) {
                if best.as_ref().map(|(_, bf)| f < *bf).unwrap_or(true) {
                    best = Some((chromo.clone(), f));
                }
            }

            let mut order: Vec<usize> = (0..population.len()).collect();
            order.sort_by(|&a, &b| fitness[a].total_cmp(&fitness[b]));

            let mut next: Vec<Chromosome> = order
                .iter()
                .take(ga.elite_size)
                .map(|&i| population[i].clone())
                .collect();

            while next.len() < ga.population_size {
                let p1 = tournament(&population, &fitness, &mut rng);
                let p2 = tournament(&population, &fitness, &mut rng);

                let mut child = if rng.gen::<f64>() < ga.crossover_rate {
                    crossover(p1, p2, &mut rng)
                } else {
                    p1.clone()
                };

                if rng.gen::<f64>() < ga.mutation_rate {
                    mutate(&mut child, &evaluator, &mut rng);
                }
                next.push(child);
            }

            population = next;
            fitness.clear();
        }

        let (best_chromosome, best_fitness) = best.expect("population_size > 0 guarantees at least one candidate");
        let (assignments, faculty_loads) = evaluator.to_assignments(&best_chromosome);
        let total_deviation = evaluator.total_deviation(&best_chromosome);
        let is_feasible = evaluator.is_feasible(&best_chromosome);

        Ok(OptimizationResult {
            assignments,
            objective_value: best_fitness,
            total_deviation,
            computation_time_seconds: start.elapsed().as_secs_f64(),
            solver_name: "Genetic Algorithm".to_string(),
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

fn tournament<'a>(population: &'a [Chromosome], fitness: &[f64], rng: &mut ChaCha8Rng) -> &'a Chromosome {
    const K: usize = 3;
    let mut best_idx = rng.gen_range(0..population.len());
    for _ in 1..K {
        let i = rng.gen_range(0..population.len());
        if fitness[i] < fitness[best_idx] {
            best_idx = i;
        }
    }
    &population[best_idx]
}

fn crossover(p1: &Chromosome, p2: &Chromosome, rng: &mut ChaCha8Rng) -> Chromosome {
    p1.iter()
        .zip(p2.iter())
        .map(|(&g1, &g2)| if rng.gen::<f64>() < 0.5 { g1 } else { g2 })
        .collect()
}

fn mutate(chromosome: &mut Chromosome, evaluator: &Evaluator, rng: &mut ChaCha8Rng) {
    let idx = rng.gen_range(0..chromosome.len());
    let opts = evaluator.options_for(idx);
    chromosome[idx] = opts[rng.gen_range(0..opts.len())];
}

fn uncoverable_result(
    _instance: &Instance,
    activity_id: &types::ActivityId,
    elapsed: f64,
    solver_name: &str,
) -> OptimizationResult {
    OptimizationResult {
        assignments: Vec::new(),
        objective_value: f64::INFINITY,
        total_deviation: f64::INFINITY,
        computation_time_seconds: elapsed,
        solver_name: solver_name.to_string(),
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
    async fn genetic_solver_is_deterministic_for_a_fixed_seed() {
        let inst = small_instance();
        let params = SolveParams {
            solver: SolverKind::Genetic,
            time_limit_seconds: 30,
            seed: 7,
            ga: GaParams {
                population_size: 12,
                generations: 15,
                elite_size: 2,
                crossover_rate: 0.8,
                mutation_rate: 0.1,
            },
            sa: SaParams::default(),
        };
        let solver = GeneticSolver::new();
        let r1 = solver.solve(&inst, &params).await.unwrap();
        let r2 = solver.solve(&inst, &params).await.unwrap();
        assert_eq!(r1.objective_value, r2.objective_value);
        assert_eq!(r1.total_deviation, r2.total_deviation);
    }
}
