use std::collections::HashMap;
use types::{ActivityId, FacultyId, Instance};

/// Sparse bipartite adjacency over `(faculty, activity)` qualification
/// pairs, indexed both directions and kept sorted for deterministic
/// iteration order (solvers that fold over these lists must not depend on
/// `HashMap` iteration order for repeatable results).
#[derive(Clone, Debug, Default)]
pub struct QualIndex {
    by_faculty: HashMap<FacultyId, Vec<ActivityId>>,
    by_activity: HashMap<ActivityId, Vec<FacultyId>>,
}

impl QualIndex {
    pub fn build(inst: &Instance) -> Self {
        let mut by_faculty: HashMap<FacultyId, Vec<ActivityId>> = HashMap::new();
        let mut by_activity: HashMap<ActivityId, Vec<FacultyId>> = HashMap::new();

        for (fid, aid) in &inst.qualifications.0 {
            by_faculty.entry(*fid).or_default().push(aid.clone());
            by_activity.entry(aid.clone()).or_default().push(*fid);
        }
        for v in by_faculty.values_mut() {
            v.sort();
            v.dedup();
        }
        for v in by_activity.values_mut() {
            v.sort();
            v.dedup();
        }
        Self { by_faculty, by_activity }
    }

    pub fn activities_for(&self, faculty: FacultyId) -> &[ActivityId] {
        self.by_faculty.get(&faculty).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn faculty_for(&self, activity: &ActivityId) -> &[FacultyId] {
        self.by_activity.get(activity).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_qualified(&self, faculty: FacultyId, activity: &ActivityId) -> bool {
        self.by_activity
            .get(activity)
            .map(|fs| fs.binary_search(&faculty).is_ok())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{ActivityType, CourseActivity, Faculty, QualificationMatrix, Rank};

    fn fixture() -> Instance {
        let f1 = Faculty::new(FacultyId(1), "A", Rank::Teacher, 400.0, 600.0);
        let f2 = Faculty::new(FacultyId(2), "B", Rank::Professor, 400.0, 600.0);
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
            qualifications: QualificationMatrix(vec![(FacultyId(1), ActivityId::from("act-1"))]),
            name: "fixture".into(),
        }
    }

    #[test]
    fn qualified_pair_is_found_both_directions() {
        let inst = fixture();
        let qi = QualIndex::build(&inst);
        assert!(qi.is_qualified(FacultyId(1), &ActivityId::from("act-1")));
        assert!(!qi.is_qualified(FacultyId(2), &ActivityId::from("act-1")));
        assert_eq!(qi.activities_for(FacultyId(1)), &[ActivityId::from("act-1")]);
        assert_eq!(qi.faculty_for(&ActivityId::from("act-1")), &[FacultyId(1)]);
    }
}
