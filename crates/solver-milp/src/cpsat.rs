use cp_sat::builder::{BoolVar, CpModelBuilder, IntVar, LinearExpr};
use cp_sat::proto::{CpSolverStatus, SatParameters};
use std::collections::HashMap;
use std::time::Instant;
use types::{ActivityId, Assignment, FacultyId, Instance, OptimizationResult, SolverStatus};

use sched_core::QualIndex;

/// Hours/targets/weights are scaled to integers the same way the reference
/// CP-SAT model scales them, so the two exact backends ([`crate::milp`] and
/// this one) agree on magnitudes even though CP-SAT only works over
/// integers.
const HOURS_SCALE: i64 = 10;
const WEIGHT_SCALE: i64 = 100;
const PREFERENCE_WEIGHT: i64 = 10;

pub fn solve(instance: &Instance, time_limit_seconds: u64) -> anyhow::Result<OptimizationResult> {
    let start = Instant::now();
    let qi = QualIndex::build(instance);

    let mut model = CpModelBuilder::default();
    let mut x: HashMap<(FacultyId, ActivityId), BoolVar> = HashMap::new();

    for activity in &instance.activities {
        for &fid in qi.faculty_for(&activity.id) {
            if !rank_ok(instance, fid, activity) {
                continue;
            }
            x.insert((fid, activity.id.clone()), model.new_bool_var());
        }
    }

    for activity in &instance.activities {
        let terms: Vec<BoolVar> = instance
            .faculty
            .iter()
            .filter_map(|f| x.get(&(f.id, activity.id.clone())).cloned())
            .collect();
        if terms.is_empty() {
            return Ok(uncoverable(&activity.id, start.elapsed().as_secs_f64()));
        }
        let sum: LinearExpr = terms.into_iter().map(|v| (1i64, v)).collect();
        model.add_eq(sum, LinearExpr::from(1));
    }

    let mut loads: HashMap<FacultyId, IntVar> = HashMap::new();
    let mut deviations: HashMap<FacultyId, IntVar> = HashMap::new();

    for f in &instance.faculty {
        let max_scaled = (f.max_load * HOURS_SCALE as f64) as i64;
        let load_var = model.new_int_var(vec![(0, max_scaled)]);
        let weighted: Vec<(i64, BoolVar)> = instance
            .activities
            .iter()
            .filter_map(|a| {
                x.get(&(f.id, a.id.clone()))
                    .map(|v| ((a.hours * HOURS_SCALE as f64) as i64, v.clone()))
            })
            .collect();
        let expr: LinearExpr = weighted.into_iter().collect();
        model.add_eq(load_var.clone(), expr);
        loads.insert(f.id, load_var);

        let dev_var = model.new_int_var(vec![(0, max_scaled)]);
        let target_scaled = (f.target_load * HOURS_SCALE as f64) as i64;
        model.add_le(
            LinearExpr::from(loads[&f.id].clone()) - target_scaled,
            LinearExpr::from(dev_var.clone()),
        );
        model.add_le(
            LinearExpr::from(target_scaled) - LinearExpr::from(loads[&f.id].clone()),
            LinearExpr::from(dev_var.clone()),
        );
        deviations.insert(f.id, dev_var);
    }

    let mut objective_terms: Vec<(i64, IntVar)> = Vec::new();
    for f in &instance.faculty {
        let weight_scaled = (f.weight * WEIGHT_SCALE as f64) as i64;
        objective_terms.push((weight_scaled, deviations[&f.id].clone()));
    }
    let deviation_expr: LinearExpr = objective_terms.into_iter().collect();

    // Negative coefficients express "subtract preference score", matching
    // the reference model's `-term` objective contribution; built as
    // weighted bool-var tuples rather than `LinearExpr * scalar`, which the
    // builder does not expose.
    let mut preference_terms: Vec<(i64, BoolVar)> = Vec::new();
    for ((fid, aid), var) in &x {
        let faculty = instance.faculty.iter().find(|f| f.id == *fid).unwrap();
        let pref = faculty.preferences.get(aid).copied().unwrap_or(0) as i64;
        if pref > 0 {
            preference_terms.push((-(pref * PREFERENCE_WEIGHT), var.clone()));
        }
    }
    let preference_expr: LinearExpr = preference_terms.into_iter().collect();

    model.minimize(deviation_expr + preference_expr);

    let mut params = SatParameters::default();
    params.max_time_in_seconds = Some(time_limit_seconds as f64);
    params.log_search_progress = Some(false);

    let response = model.solve_with_parameters(&params);
    let status = response.status();

    match status {
        CpSolverStatus::Optimal | CpSolverStatus::Feasible => {
            let mut assignments = Vec::new();
            let mut faculty_loads = HashMap::new();
            for f in &instance.faculty {
                let mut total = 0.0;
                for a in &instance.activities {
                    if let Some(var) = x.get(&(f.id, a.id.clone())) {
                        if var.solution_value(&response) {
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
                objective_value: response.objective_value() / 1000.0,
                total_deviation,
                computation_time_seconds: start.elapsed().as_secs_f64(),
                solver_name: "OR-Tools CP-SAT".to_string(),
                solver_status: if status == CpSolverStatus::Optimal {
                    SolverStatus::Optimal
                } else {
                    SolverStatus::Feasible
                },
                faculty_loads,
                unassigned_activities: Vec::new(),
                is_feasible: true,
                gap: if status == CpSolverStatus::Optimal { None } else { Some(0.0) },
            })
        }
        _ => Ok(OptimizationResult {
            assignments: Vec::new(),
            objective_value: f64::INFINITY,
            total_deviation: f64::INFINITY,
            computation_time_seconds: start.elapsed().as_secs_f64(),
            solver_name: "OR-Tools CP-SAT".to_string(),
            solver_status: match status {
                CpSolverStatus::Infeasible => SolverStatus::Infeasible,
                _ => SolverStatus::Unknown,
            },
            faculty_loads: HashMap::new(),
            unassigned_activities: instance.activities.iter().map(|a| a.id.clone()).collect(),
            is_feasible: false,
            gap: None,
        }),
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
        solver_name: "OR-Tools CP-SAT".to_string(),
        solver_status: SolverStatus::Infeasible,
        faculty_loads: HashMap::new(),
        unassigned_activities: vec![activity_id.clone()],
        is_feasible: false,
        gap: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{CourseActivity, QualificationMatrix, Rank};

    fn activity(id: &str, hours: f64) -> CourseActivity {
        CourseActivity {
            id: ActivityId::from(id),
            course_id: "c".into(),
            course_name: "course".into(),
            activity_type: types::ActivityType::Lecture,
            section_number: 0,
            hours,
            student_count: 30,
            required_rank: None,
        }
    }

    #[test]
    fn trivial_singleton_is_optimal() {
        let f = types::Faculty::new(FacultyId(1), "A", Rank::Teacher, 30.0, 60.0);
        let a = activity("a1", 20.0);
        let qualifications = QualificationMatrix(vec![(f.id, a.id.clone())]);
        let inst = Instance { faculty: vec![f], activities: vec![a], qualifications, name: "t1".into() };

        let result = solve(&inst, 30).unwrap();
        assert_eq!(result.solver_status, SolverStatus::Optimal);
        assert_eq!(result.assignments.len(), 1);
        assert_eq!(result.faculty_loads[&FacultyId(1)], 20.0);
        assert!((result.total_deviation - 10.0).abs() < 1e-6);
    }

    #[test]
    fn two_faculty_balance_splits_the_load() {
        let a_fac = types::Faculty::new(FacultyId(1), "A", Rank::Teacher, 40.0, 60.0);
        let b_fac = types::Faculty::new(FacultyId(2), "B", Rank::Teacher, 40.0, 60.0);
        let activities = vec![activity("x", 20.0), activity("y", 20.0), activity("z", 20.0)];
        let qualifications = QualificationMatrix(
            [a_fac.id, b_fac.id]
                .iter()
                .flat_map(|&fid| activities.iter().map(move |act| (fid, act.id.clone())))
                .collect(),
        );
        let inst = Instance { faculty: vec![a_fac, b_fac], activities, qualifications, name: "t2".into() };

        let result = solve(&inst, 30).unwrap();
        assert_eq!(result.solver_status, SolverStatus::Optimal);
        assert_eq!(result.assignments.len(), 3);
        assert!((result.total_deviation - 20.0).abs() < 1e-6);
        let loads: Vec<f64> = result.faculty_loads.values().copied().collect();
        assert!(loads.contains(&40.0) && loads.contains(&20.0));
    }

    #[test]
    fn capacity_tight_hits_every_bound_exactly() {
        let a_fac = types::Faculty::new(FacultyId(1), "A", Rank::Teacher, 50.0, 50.0);
        let b_fac = types::Faculty::new(FacultyId(2), "B", Rank::Teacher, 50.0, 50.0);
        let activities: Vec<_> = (0..4).map(|i| activity(&format!("a{i}"), 25.0)).collect();
        let qualifications = QualificationMatrix(
            [a_fac.id, b_fac.id]
                .iter()
                .flat_map(|&fid| activities.iter().map(move |act| (fid, act.id.clone())))
                .collect(),
        );
        let inst = Instance { faculty: vec![a_fac, b_fac], activities, qualifications, name: "t3".into() };

        let result = solve(&inst, 30).unwrap();
        assert_eq!(result.solver_status, SolverStatus::Optimal);
        assert!(result.total_deviation.abs() < 1e-6);
        for load in result.faculty_loads.values() {
            assert!((*load - 50.0).abs() < 1e-6);
        }
    }

    #[test]
    fn uncoverable_activity_is_infeasible() {
        let f = types::Faculty::new(FacultyId(1), "A", Rank::Teacher, 30.0, 60.0);
        let a = activity("a", 20.0);
        let b = activity("b", 20.0);
        let qualifications = QualificationMatrix(vec![(f.id, a.id.clone())]);
        let inst = Instance { faculty: vec![f], activities: vec![a, b.clone()], qualifications, name: "t4".into() };

        let result = solve(&inst, 30).unwrap();
        assert_eq!(result.solver_status, SolverStatus::Infeasible);
        assert!(!result.is_feasible);
        assert!(result.unassigned_activities.contains(&b.id));
    }
}
