use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use types::{
    ActivityId, ActivityType, CourseActivity, CourseId, Faculty, FacultyId, Instance, InstanceSize, QualificationMatrix,
    Rank,
};

const FIRST_NAMES: &[&str] = &[
    "Aigerim", "Asel", "Zhanar", "Dina", "Saule", "Yerlan", "Arman", "Nurlan", "Bauyrzhan", "Marat", "Aliya",
    "Kamila", "Nazym", "Assiya", "Zhaniya",
];
const LAST_NAMES: &[&str] = &[
    "Abdullayev", "Smagulov", "Ospanova", "Zhumabayev", "Seitova", "Nurmukhanov", "Alimbetov", "Kasymova",
    "Yerlanov", "Zhaksylykov",
];
const COURSE_PREFIXES: &[&str] = &["CS", "MATH", "PHYS", "ENG", "BUS"];

fn course_names(prefix: &str) -> &'static [&'static str] {
    match prefix {
        "CS" => &["Programming I", "Data Structures", "Algorithms", "Database Systems", "Web Development"],
        "MATH" => &["Calculus", "Linear Algebra", "Discrete Mathematics", "Statistics", "Probability Theory"],
        "PHYS" => &["Physics I", "Physics II", "Thermodynamics", "Quantum Mechanics", "Optics"],
        "ENG" => &["Academic Writing", "Technical English", "Literature", "Communication", "Presentation Skills"],
        "BUS" => &["Microeconomics", "Marketing", "Accounting", "Management", "Finance"],
        _ => &["General Studies"],
    }
}

/// Annual load ceiling mandated for every rank regardless of generated target.
const MAX_ANNUAL_LOAD: f64 = 680.0;

struct SizeConfig {
    faculty_count: usize,
    course_count: usize,
    lectures_per: usize,
    practicals_per: usize,
    bachelor_students: usize,
    master_students: usize,
    nirm_projects: usize,
}

fn size_config(size: InstanceSize) -> SizeConfig {
    match size {
        InstanceSize::Small => SizeConfig {
            faculty_count: 15,
            course_count: 10,
            lectures_per: 2,
            practicals_per: 2,
            bachelor_students: 20,
            master_students: 8,
            nirm_projects: 5,
        },
        InstanceSize::Medium => SizeConfig {
            faculty_count: 35,
            course_count: 25,
            lectures_per: 2,
            practicals_per: 3,
            bachelor_students: 50,
            master_students: 20,
            nirm_projects: 12,
        },
        InstanceSize::Large => SizeConfig {
            faculty_count: 70,
            course_count: 50,
            lectures_per: 3,
            practicals_per: 4,
            bachelor_students: 100,
            master_students: 40,
            nirm_projects: 25,
        },
    }
}

/// Deterministic, seeded generator for synthetic problem instances. Mirrors
/// the reference data generator's rank distribution, load envelopes and
/// qualification-matrix construction so instances of a given size and seed
/// are reproducible across runs.
pub struct InstanceGenerator {
    rng: ChaCha8Rng,
}

impl InstanceGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn faculty_name(&mut self) -> String {
        let first = FIRST_NAMES.choose(&mut self.rng).unwrap();
        let last = LAST_NAMES.choose(&mut self.rng).unwrap();
        format!("{first} {last}")
    }

    pub fn generate_faculty(&mut self, count: usize) -> Vec<Faculty> {
        let rank_distribution: [(Rank, f64); 8] = [
            (Rank::Professor, 0.05),
            (Rank::Associate, 0.10),
            (Rank::Assistant, 0.15),
            (Rank::SeniorLecturer, 0.20),
            (Rank::SeniorTeacher, 0.20),
            (Rank::Teacher, 0.20),
            (Rank::Advisor, 0.05),
            (Rank::TeacherEnglish, 0.05),
        ];

        let mut special_roles = Vec::new();
        if count > 10 {
            special_roles.push(Rank::Dean);
        }
        if count > 15 {
            special_roles.push(Rank::Admin);
        }

        let load_constraints = |rank: Rank| -> f64 {
            match rank {
                Rank::Professor => 500.0,
                Rank::Associate => 550.0,
                Rank::Assistant => 550.0,
                Rank::SeniorLecturer => 600.0,
                Rank::SeniorTeacher => 600.0,
                Rank::Teacher => 650.0,
                Rank::Advisor => 250.0,
                Rank::TeacherEnglish => 400.0,
                Rank::Dean => 300.0,
                Rank::Admin => 300.0,
            }
        };

        let mut faculty = Vec::with_capacity(count);
        for i in 0..count {
            let selected_rank = if i < special_roles.len() {
                special_roles[i]
            } else {
                let r: f64 = self.rng.gen_range(0.0..1.0);
                let mut cumulative = 0.0;
                let mut picked = Rank::Teacher;
                for &(rank, prob) in &rank_distribution {
                    cumulative += prob;
                    if r <= cumulative {
                        picked = rank;
                        break;
                    }
                }
                picked
            };

            let (target_load, max_load) = match selected_rank {
                Rank::Admin => (self.rng.gen_range(100.0..250.0), 300.0),
                Rank::Dean => {
                    let target = self.rng.gen_range(200.0..340.0);
                    (target, (340.0_f64).min(MAX_ANNUAL_LOAD / 2.0))
                }
                other => {
                    let base = load_constraints(other);
                    let target = base + self.rng.gen_range(0.0..30.0);
                    let max = (target * self.rng.gen_range(1.1..1.15)).min(MAX_ANNUAL_LOAD);
                    (target, max)
                }
            };

            let name = self.faculty_name();
            faculty.push(Faculty::new(
                FacultyId((i + 1) as u32),
                name,
                selected_rank,
                (target_load * 10.0).round() / 10.0,
                (max_load * 10.0).round() / 10.0,
            ));
        }
        faculty
    }

    pub fn generate_courses(&mut self, count: usize, lectures_per: usize, practicals_per: usize) -> Vec<CourseActivity> {
        let mut activities = Vec::new();
        let lecture_hours = [30.0, 45.0, 60.0];
        let practical_hours = [15.0, 30.0, 45.0];

        for course_num in 1..=count {
            let dept = *COURSE_PREFIXES.choose(&mut self.rng).unwrap();
            let course_id = CourseId(format!("{dept}{}", 100 + course_num));
            let course_name = (*course_names(dept).choose(&mut self.rng).unwrap()).to_string();

            for section in 1..=lectures_per {
                let hours = *lecture_hours.choose(&mut self.rng).unwrap();
                let students = self.rng.gen_range(80..=200);
                activities.push(CourseActivity {
                    id: ActivityId(format!("{}_L{section}", course_id.0)),
                    course_id: course_id.clone(),
                    course_name: course_name.clone(),
                    activity_type: ActivityType::Lecture,
                    section_number: section as u32,
                    hours,
                    student_count: students,
                    required_rank: Some(Rank::SeniorLecturer),
                });
            }

            for section in 1..=practicals_per {
                let hours = *practical_hours.choose(&mut self.rng).unwrap();
                let students = self.rng.gen_range(20..=40);
                activities.push(CourseActivity {
                    id: ActivityId(format!("{}_P{section}", course_id.0)),
                    course_id: course_id.clone(),
                    course_name: course_name.clone(),
                    activity_type: ActivityType::Practical,
                    section_number: section as u32,
                    hours,
                    student_count: students,
                    required_rank: Some(Rank::Teacher),
                });
            }
        }
        activities
    }

    /// Thesis/NIRM supervision load, charged at a fixed hours-per-student
    /// (or hours-per-project) rate rather than the per-section hours used
    /// for classroom activities.
    pub fn generate_supervision_activities(
        &mut self,
        bachelor_students: usize,
        master_students: usize,
        nirm_projects: usize,
    ) -> Vec<CourseActivity> {
        let mut activities = Vec::new();

        for i in 0..bachelor_students {
            activities.push(CourseActivity {
                id: ActivityId(format!("THESIS_B{}", i + 1)),
                course_id: CourseId("THESIS_BACHELOR".into()),
                course_name: format!("Bachelor thesis supervision #{}", i + 1),
                activity_type: ActivityType::BachelorThesis,
                section_number: (i + 1) as u32,
                hours: 20.0,
                student_count: 1,
                required_rank: Some(Rank::SeniorLecturer),
            });
        }

        for i in 0..master_students {
            activities.push(CourseActivity {
                id: ActivityId(format!("THESIS_M{}", i + 1)),
                course_id: CourseId("THESIS_MASTER".into()),
                course_name: format!("Master thesis supervision #{}", i + 1),
                activity_type: ActivityType::MasterThesis,
                section_number: (i + 1) as u32,
                hours: 40.0,
                student_count: 1,
                required_rank: Some(Rank::Assistant),
            });
        }

        for i in 0..nirm_projects {
            activities.push(CourseActivity {
                id: ActivityId(format!("NIRM_{}", i + 1)),
                course_id: CourseId("NIRM_EIR".into()),
                course_name: format!("Research project #{}", i + 1),
                activity_type: ActivityType::ResearchNIRM,
                section_number: (i + 1) as u32,
                hours: 25.0,
                student_count: self.rng.gen_range(2..=5),
                required_rank: Some(Rank::Assistant),
            });
        }

        activities
    }

    /// Builds the sparse eligibility matrix: each faculty member is
    /// qualified for a `qualification_rate` slice of the courses (by rank),
    /// and preferences are seeded for every pair that ends up qualified.
    /// Any activity left with no qualified faculty after that pass is
    /// force-assigned to one rank-eligible faculty member, so every
    /// generated instance is solvable.
    pub fn generate_qualification_matrix(
        &mut self,
        faculty: &mut [Faculty],
        activities: &[CourseActivity],
        qualification_rate: f64,
    ) -> QualificationMatrix {
        let mut courses: Vec<CourseId> = Vec::new();
        for a in activities {
            if !courses.contains(&a.course_id) {
                courses.push(a.course_id.clone());
            }
        }

        let mut pairs: Vec<(FacultyId, ActivityId)> = Vec::new();

        for f in faculty.iter_mut() {
            let num_qualified = ((courses.len() as f64 * qualification_rate) as usize).max(2).min(courses.len());
            let mut shuffled = courses.clone();
            shuffled.shuffle(&mut self.rng);
            let qualified_courses: Vec<CourseId> = shuffled.into_iter().take(num_qualified).collect();

            for activity in activities {
                if !qualified_courses.contains(&activity.course_id) {
                    continue;
                }
                let is_qualified = match activity.required_rank {
                    Some(required) => f.rank.satisfies(required),
                    None => true,
                };
                if is_qualified {
                    pairs.push((f.id, activity.id.clone()));
                    f.preferences.insert(activity.id.clone(), self.rng.gen_range(5..=10));
                }
            }
            f.qualified_courses = qualified_courses;
        }

        for activity in activities {
            let has_qualified = pairs.iter().any(|(_, aid)| *aid == activity.id);
            if has_qualified {
                continue;
            }

            let mut potential: Vec<usize> = (0..faculty.len())
                .filter(|&i| match activity.required_rank {
                    Some(required) => faculty[i].rank.satisfies(required),
                    None => true,
                })
                .collect();
            if potential.is_empty() {
                potential = (0..faculty.len()).collect();
            }

            let &chosen = potential.choose(&mut self.rng).unwrap();
            pairs.push((faculty[chosen].id, activity.id.clone()));
            faculty[chosen].preferences.insert(activity.id.clone(), self.rng.gen_range(5..=10));
            if !faculty[chosen].qualified_courses.contains(&activity.course_id) {
                faculty[chosen].qualified_courses.push(activity.course_id.clone());
            }
        }

        QualificationMatrix(pairs)
    }

    pub fn generate_instance(&mut self, size: InstanceSize, name: Option<String>) -> Instance {
        let config = size_config(size);

        let mut faculty = self.generate_faculty(config.faculty_count);
        let mut activities = self.generate_courses(config.course_count, config.lectures_per, config.practicals_per);
        activities.extend(self.generate_supervision_activities(
            config.bachelor_students,
            config.master_students,
            config.nirm_projects,
        ));

        let qualifications = self.generate_qualification_matrix(&mut faculty, &activities, 0.4);

        let name = name.unwrap_or_else(|| format!("{size} instance ({} faculty, {} activities)", faculty.len(), activities.len()));

        Instance {
            faculty,
            activities,
            qualifications,
            name,
        }
    }
}

pub fn generate_instance(size: InstanceSize, seed: u64) -> Instance {
    InstanceGenerator::new(seed).generate_instance(size, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_instance_matches_size_config() {
        let inst = generate_instance(InstanceSize::Small, 42);
        assert_eq!(inst.faculty.len(), 15);
        // 10 courses * (2 lectures + 2 practicals) + 20 bachelor + 8 master + 5 nirm
        assert_eq!(inst.activities.len(), 10 * 4 + 20 + 8 + 5);
    }

    #[test]
    fn every_activity_has_at_least_one_qualified_faculty() {
        let inst = generate_instance(InstanceSize::Small, 7);
        for activity in &inst.activities {
            let has_qualified = inst.faculty.iter().any(|f| inst.qualifications.is_qualified(f.id, &activity.id));
            assert!(has_qualified, "activity {:?} has no qualified faculty", activity.id);
        }
    }

    #[test]
    fn same_seed_is_deterministic() {
        let a = generate_instance(InstanceSize::Medium, 99);
        let b = generate_instance(InstanceSize::Medium, 99);
        assert_eq!(a.faculty.len(), b.faculty.len());
        assert_eq!(a.faculty[0].name, b.faculty[0].name);
        assert_eq!(a.activities[0].id, b.activities[0].id);
    }
}
