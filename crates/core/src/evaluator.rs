use std::collections::HashMap;
use types::{ActivityId, Assignment, FacultyId, Instance};

/// A chromosome/solution vector: `genes[i]` is the index into
/// [`Evaluator::faculty_ids`] assigned to `instance.activities[i]`. Shared
/// representation consumed by both the GA and SA metaheuristics so they
/// agree on what a "solution" is and how it scores.
pub type Chromosome = Vec<usize>;

/// Precomputed qualification options and fitness/energy evaluation shared
/// by the GA and SA solvers, mirroring the single soft-score evaluator the
/// teacher's MILP/heuristic split both defer to.
#[derive(Clone, Debug)]
pub struct Evaluator {
    faculty_ids: Vec<FacultyId>,
    target_loads: Vec<f64>,
    max_loads: Vec<f64>,
    weights: Vec<f64>,
    preferences: Vec<HashMap<ActivityId, u8>>,
    activity_ids: Vec<ActivityId>,
    activity_hours: Vec<f64>,
    /// Per activity, the faculty-array indices eligible to teach it.
    options: Vec<Vec<usize>>,
}

impl Evaluator {
    /// Returns the 0-based index (into `activities`) of the first activity
    /// with no eligible faculty, if any — the caller reports this as
    /// uncoverable rather than attempting to build a chromosome space.
    pub fn build(instance: &Instance, qi: &crate::QualIndex) -> Result<Self, usize> {
        let faculty_ids: Vec<FacultyId> = instance.faculty.iter().map(|f| f.id).collect();
        let index_of: HashMap<FacultyId, usize> =
            faculty_ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let mut options = Vec::with_capacity(instance.activities.len());
        for (i, activity) in instance.activities.iter().enumerate() {
            let mut opts: Vec<usize> = qi
                .faculty_for(&activity.id)
                .iter()
                .filter(|fid| {
                    instance
                        .faculty
                        .iter()
                        .find(|f| f.id == **fid)
                        .map(|f| activity.required_rank.map(|r| f.rank.satisfies(r)).unwrap_or(true))
                        .unwrap_or(false)
                })
                .filter_map(|fid| index_of.get(fid).copied())
                .collect();
            opts.sort_unstable();
            if opts.is_empty() {
                return Err(i);
            }
            options.push(opts);
        }

        Ok(Self {
            target_loads: instance.faculty.iter().map(|f| f.target_load).collect(),
            max_loads: instance.faculty.iter().map(|f| f.max_load).collect(),
            weights: instance.faculty.iter().map(|f| f.weight).collect(),
            preferences: instance.faculty.iter().map(|f| f.preferences.clone()).collect(),
            activity_ids: instance.activities.iter().map(|a| a.id.clone()).collect(),
            activity_hours: instance.activities.iter().map(|a| a.hours).collect(),
            faculty_ids,
            options,
        })
    }

    pub fn num_activities(&self) -> usize {
        self.activity_ids.len()
    }

    pub fn options_for(&self, activity_index: usize) -> &[usize] {
        &self.options[activity_index]
    }

    pub fn faculty_ids(&self) -> &[FacultyId] {
        &self.faculty_ids
    }

    fn loads(&self, chromosome: &Chromosome) -> Vec<f64> {
        let mut loads = vec![0.0; self.faculty_ids.len()];
        for (i, &fidx) in chromosome.iter().enumerate() {
            loads[fidx] += self.activity_hours[i];
        }
        loads
    }

    /// Fitness/energy: lower is better. `total_weighted_deviation + overload
    /// penalty - preference_impact`, matching the original solvers exactly
    /// (overload penalty is a heavy 100x multiplier; preference is scaled by
    /// 0.5 so it nudges rather than dominates the deviation term).
    pub fn energy(&self, chromosome: &Chromosome) -> f64 {
        let loads = self.loads(chromosome);

        let mut total_preference = 0.0f64;
        for (i, &fidx) in chromosome.iter().enumerate() {
            total_preference += self.preferences[fidx]
                .get(&self.activity_ids[i])
                .copied()
                .unwrap_or(0) as f64;
        }

        let mut total_weighted_deviation = 0.0f64;
        let mut penalty = 0.0f64;
        for (fidx, &load) in loads.iter().enumerate() {
            let deviation = (load - self.target_loads[fidx]).abs();
            total_weighted_deviation += deviation * self.weights[fidx];
            if load > self.max_loads[fidx] {
                penalty += (load - self.max_loads[fidx]) * 100.0;
            }
        }

        total_weighted_deviation + penalty - total_preference * 0.5
    }

    pub fn is_feasible(&self, chromosome: &Chromosome) -> bool {
        let loads = self.loads(chromosome);
        loads.iter().enumerate().all(|(fidx, &load)| load <= self.max_loads[fidx])
    }

    pub fn total_deviation(&self, chromosome: &Chromosome) -> f64 {
        let loads = self.loads(chromosome);
        loads
            .iter()
            .enumerate()
            .map(|(fidx, &load)| (load - self.target_loads[fidx]).abs())
            .sum()
    }

    pub fn to_assignments(&self, chromosome: &Chromosome) -> (Vec<Assignment>, HashMap<FacultyId, f64>) {
        let loads = self.loads(chromosome);
        let mut faculty_loads = HashMap::with_capacity(self.faculty_ids.len());
        for (fidx, fid) in self.faculty_ids.iter().enumerate() {
            faculty_loads.insert(*fid, loads[fidx]);
        }

        let assignments = chromosome
            .iter()
            .enumerate()
            .map(|(i, &fidx)| {
                let preference_score = self.preferences[fidx]
                    .get(&self.activity_ids[i])
                    .copied()
                    .unwrap_or(0) as f64;
                Assignment {
                    faculty_id: self.faculty_ids[fidx],
                    activity_id: self.activity_ids[i].clone(),
                    preference_score,
                }
            })
            .collect();

        (assignments, faculty_loads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QualIndex;
    use types::{ActivityType, CourseActivity, Faculty, QualificationMatrix, Rank};

    fn fixture() -> Instance {
        let f1 = Faculty::new(FacultyId(1), "A", Rank::Teacher, 40.0, 60.0);
        let f2 = Faculty::new(FacultyId(2), "B", Rank::Professor, 40.0, 60.0);
        let a1 = CourseActivity {
            id: ActivityId::from("act-1"),
            course_id: "c1".into(),
            course_name: "Intro".into(),
            activity_type: ActivityType::Lecture,
            section_number: 1,
            hours: 40.0,
            student_count: 30,
            required_rank: None,
        };
        Instance {
            faculty: vec![f1, f2],
            activities: vec![a1],
            qualifications: QualificationMatrix(vec![
                (FacultyId(1), ActivityId::from("act-1")),
                (FacultyId(2), ActivityId::from("act-1")),
            ]),
            name: "fixture".into(),
        }
    }

    #[test]
    fn energy_rewards_hitting_target_load() {
        let inst = fixture();
        let qi = QualIndex::build(&inst);
        let ev = Evaluator::build(&inst, &qi).unwrap();
        // faculty index 0 == FacultyId(1), whose target_load is exactly the
        // activity's hours, so deviation is 0 for that faculty and 40 for
        // the idle one.
        let e0 = ev.energy(&vec![0]);
        let e1 = ev.energy(&vec![1]);
        assert!(e0 < e1);
    }

    #[test]
    fn build_fails_on_unqualified_activity() {
        let mut inst = fixture();
        inst.qualifications = QualificationMatrix(vec![]);
        let qi = QualIndex::build(&inst);
        match Evaluator::build(&inst, &qi) {
            Err(idx) => assert_eq!(idx, 0),
            Ok(_) => panic!("expected build to fail"),
        }
    }
}
