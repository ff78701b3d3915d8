use good_lp::{constraint, default_solver, Expression, ProblemVariables, Solution, SolverModel, Variable};
use std::collections::HashMap;
use std::time::Instant;
use types::{ActivityId, Assignment, FacultyId, Instance, OptimizationResult, SolverStatus};

use sched_core::QualIndex;

/// LP/MILP assignment model solved with `good_lp`'s CBC backend. Mirrors
/// the distribution's reference LP formulation, with one deliberate fix:
/// the reference implementation built its objective from the deviation
/// terms only and silently dropped the preference term. Preference is
/// included here, scaled the same way the exact CP-SAT model scales it, so
/// both exact backends agree on what they are optimizing.
pub(crate) const PREFERENCE_WEIGHT: f64 = 10.0;

pub fn solve(instance: &Instance, _time_limit_seconds: u64) -> anyhow::Result<OptimizationResult> {
    let start = Instant::now();
    let qi = QualIndex::build(instance);

    let mut vars = ProblemVariables::new();
    let mut x: HashMap<(FacultyId, ActivityId), Variable> = HashMap::new();
    for activity in &instance.activities {
        for &fid in qi.faculty_for(&activity.id) {
            if !rank_ok(instance, fid, activity) {
                continue;
            }
            x.insert((fid, activity.id.clone()), vars.add(good_lp::variable().binary()));
        }
    }

    let mut unassignable = None;
    for activity in &instance.activities {
        let any = instance
            .faculty
            .iter()
            .any(|f| x.contains_key(&(f.id, activity.id.clone())));
        if !any {
            unassignable = Some(activity.id.clone());
            break;
        }
    }
    if let Some(activity_id) = unassignable {
        return Ok(uncoverable(&activity_id, start.elapsed().as_secs_f64()));
    }

    let mut deviation: HashMap<FacultyId, Variable> = HashMap::new();
    for f in &instance.faculty {
        deviation.insert(f.id, vars.add(good_lp::variable().min(0.0).max(f.max_load)));
    }

    let mut objective = Expression::from(0.0);
    for f in &instance.faculty {
        let dev_var = *deviation.get(&f.id).unwrap();
        objective += Expression::from(dev_var) * f.weight;
    }
    for ((fid, aid), &var) in &x {
        let faculty = instance.faculty.iter().find(|f| f.id == *fid).unwrap();
        let pref = faculty.preferences.get(aid).copied().unwrap_or(0) as f64;
        if pref > 0.0 {
            objective -= Expression::from(var) * (pref * PREFERENCE_WEIGHT);
        }
    }

    let mut model = vars.minimise(objective.clone()).using(default_solver);

    for activity in &instance.activities {
        let terms: Vec<Variable> = instance
            .faculty
            .iter()
            .filter_map(|f| x.get(&(f.id, activity.id.clone())).copied())
            .collect();
        if terms.is_empty() {
            continue;
        }
        let sum: Expression = terms.into_iter().sum();
        model = model.with(constraint!(sum == 1.0));
    }

    for f in &instance.faculty {
        let load: Expression = instance
            .activities
            .iter()
            .filter_map(|a| {
                x.get(&(f.id, a.id.clone())).map(|&v| Expression::from(v) * a.hours)
            })
            .sum();
        let dev_var = *deviation.get(&f.id).unwrap();
        model = model.with(constraint!(load.clone() <= f.max_load));
        model = model.with(constraint!(dev_var >= load.clone() - f.target_load));
        model = model.with(constraint!(dev_var >= f.target_load - load));
    }

    match model.solve() {
        Ok(solution) => {
            let mut assignments = Vec::new();
            let mut faculty_loads = HashMap::new();
            for f in &instance.faculty {
                let mut total = 0.0;
                for a in &instance.activities {
                    if let Some(&var) = x.get(&(f.id, a.id.clone())) {
                        if solution.value(var) > 0.5 {
                            let preference = f.preferences.get(&a.id).copied().unwrap_or(0) as f64;
                            assignments.push(Assignment {
                                faculty_id: f.id,
                                activity_id: a.id.clone(),
                                preference_score: preference,
                            });
                            total += a.hours;
                        }
                    }
                }
                faculty_loads.insert(f.id, total);
            }

            let total_deviation: f64 = instance
                .faculty
                .iter()
                .map(|f| (faculty_loads.get(&f.id).copied().unwrap_or(0.0) - f.target_load).abs())
                .sum();

            Ok(OptimizationResult {
                assignments,
                objective_value: solution.eval(objective.clone()),
                total_deviation,
                computation_time_seconds: start.elapsed().as_secs_f64(),
                solver_name: "PuLP (CBC)".to_string(),
                solver_status: SolverStatus::Optimal,
                faculty_loads,
                unassigned_activities: Vec::new(),
                is_feasible: true,
                gap: None,
            })
        }
        Err(e) => {
            tracing::warn!(error = %e, "MILP model infeasible or solver error");
            Ok(OptimizationResult {
                assignments: Vec::new(),
                objective_value: f64::INFINITY,
                total_deviation: f64::INFINITY,
                computation_time_seconds: start.elapsed().as_secs_f64(),
                solver_name: "PuLP (CBC)".to_string(),
                solver_status: SolverStatus::Infeasible,
                faculty_loads: HashMap::new(),
                unassigned_activities: instance.activities.iter().map(|a| a.id.clone()).collect(),
                is_feasible: false,
                gap: None,
            })
        }
    }
}

fn rank_ok(instance: &Instance, fid: FacultyId, activity: &types::CourseActivity) -> bool {
    instance
        .faculty
        .iter()
        .find(|f| f.id == fid)
        .map(|f| activity.required_rank.map(|r| f.rank.satisfies(r)).unwrap_or(true))
        .unwrap_or(false)
}

fn uncoverable(activity_id: &ActivityId, elapsed: f64) -> OptimizationResult {
    OptimizationResult {
        assignments: Vec::new(),
        objective_value: f64::INFINITY,
        total_deviation: f64::INFINITY,
        computation_time_seconds: elapsed,
        solver_name: "PuLP (CBC)".to_string(),
        solver_status: SolverStatus::Infeasible,
        faculty_loads: HashMap::new(),
        unassigned_activities: vec![activity_id.clone()],
        is_feasible: false,
        gap: None,
    }
}
