pub mod evaluator;
pub mod qualindex;

use async_trait::async_trait;
use thiserror::Error;

pub use types::{
    Assignment, CourseActivity, Faculty, FacultyId, Instance, OptimizationResult, SolveParams, SolverStatus,
};

pub use qualindex::QualIndex;

/// Errors raised while constructing or validating an instance. These are
/// fatal at construction time — distinct from the in-result
/// [`types::SolverStatus`] variants a solver can return once it has a
/// well-formed instance in hand.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("instance is invalid: {0}")]
    InstanceInvalid(String),
}

/// Structural and referential checks on an [`Instance`] (I1-I4, T1-T2).
/// Capacity infeasibility is deliberately NOT checked here: a demand that
/// exceeds total capacity is a valid instance that a solver may report as
/// uncoverable, not a malformed one.
pub fn validate(inst: &Instance) -> Result<(), ValidationError> {
    let mut errors: Vec<String> = Vec::new();
    use std::collections::HashSet;

    if inst.faculty.is_empty() {
        errors.push("faculty is empty".into());
    }
    if inst.activities.is_empty() {
        errors.push("activities is empty".into());
    }

    let mut seen_faculty = HashSet::new();
    for f in &inst.faculty {
        if !seen_faculty.insert(f.id) {
            errors.push(format!("duplicate faculty id: {}", f.id));
        }
        if f.target_load < 0.0 || f.max_load < 0.0 {
            errors.push(format!("faculty {} has a negative load bound", f.id));
        }
        if f.target_load > f.max_load {
            errors.push(format!(
                "faculty {} target_load {} exceeds max_load {}",
                f.id, f.target_load, f.max_load
            ));
        }
    }

    let mut seen_activity = HashSet::new();
    for a in &inst.activities {
        if !seen_activity.insert(a.id.clone()) {
            errors.push(format!("duplicate activity id: {}", a.id));
        }
        if a.hours <= 0.0 {
            errors.push(format!("activity {} has non-positive hours", a.id));
        }
    }

    for (fid, aid) in &inst.qualifications.0 {
        if !seen_faculty.contains(fid) {
            errors.push(format!(
                "qualification references missing faculty {}",
                fid
            ));
        }
        if !seen_activity.contains(aid) {
            errors.push(format!(
                "qualification references missing activity {}",
                aid
            ));
        }
    }

    // I4: every activity must have at least one qualified, rank-eligible
    // faculty member, otherwise no solver could ever cover it.
    let qi = QualIndex::build(inst);
    for a in &inst.activities {
        let eligible = qi.faculty_for(&a.id).iter().any(|fid| {
            inst.faculty
                .iter()
                .find(|f| f.id == *fid)
                .map(|f| a.required_rank.map(|r| f.rank.satisfies(r)).unwrap_or(true))
                .unwrap_or(false)
        });
        if !eligible {
            errors.push(format!(
                "activity {} has no qualified, rank-eligible faculty",
                a.id
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::InstanceInvalid(errors.join("; ")))
    }
}

/// Equity metrics derived from a completed result against a target-load
/// table, mirroring the original's `get_equity_metrics`.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize, utoipa::ToSchema, schemars::JsonSchema)]
pub struct EquityMetrics {
    pub mean_deviation: f64,
    pub max_deviation: f64,
    pub std_deviation: f64,
    pub total_deviation: f64,
}

pub fn equity_metrics(result: &OptimizationResult, target_loads: &std::collections::HashMap<FacultyId, f64>) -> EquityMetrics {
    let deviations: Vec<f64> = result
        .faculty_loads
        .iter()
        .map(|(fid, actual)| (actual - target_loads.get(fid).copied().unwrap_or(0.0)).abs())
        .collect();

    if deviations.is_empty() {
        return EquityMetrics::default();
    }
    let n = deviations.len() as f64;
    let mean = deviations.iter().sum::<f64>() / n;
    let max = deviations.iter().cloned().fold(f64::MIN, f64::max);
    let variance = deviations.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n;
    EquityMetrics {
        mean_deviation: mean,
        max_deviation: max,
        std_deviation: variance.sqrt(),
        total_deviation: deviations.iter().sum(),
    }
}

/// Checks demand against capacity without touching the solver; used by
/// callers that want to short-circuit before dispatching a job.
pub fn check_capacity_feasibility(inst: &Instance) -> (bool, String) {
    let demand = inst.total_demand_hours();
    let capacity = inst.total_capacity_hours();
    if demand > capacity {
        (
            false,
            format!("insufficient capacity: {demand} hours needed, {capacity} available"),
        )
    } else {
        (true, "capacity feasible".to_string())
    }
}

#[async_trait]
pub trait Solver: Send + Sync + 'static {
    async fn solve(&self, instance: &Instance, params: &SolveParams) -> anyhow::Result<OptimizationResult>;
}
