use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use utoipa::ToSchema;

macro_rules! id_newtype {
    ($name:ident, $repr:ty) => {
        #[derive(
            Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash, PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(pub $repr);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}
id_newtype!(FacultyId, u32);

macro_rules! string_id_newtype {
    ($name:ident) => {
        #[derive(
            Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash, PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}
string_id_newtype!(ActivityId);
string_id_newtype!(CourseId);
string_id_newtype!(RoomId);

/// Faculty academic rank. Drives both the deviation weight and the
/// rank-indexed load targets used by the fixture generator.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    Professor,
    Associate,
    Assistant,
    SeniorLecturer,
    SeniorTeacher,
    Teacher,
    Advisor,
    TeacherEnglish,
    Dean,
    Admin,
}

impl Rank {
    /// Fixed rank -> weight table (§3).
    pub fn weight(&self) -> f64 {
        match self {
            Rank::Professor | Rank::Dean => 1.5,
            Rank::Associate => 1.4,
            Rank::Assistant => 1.3,
            Rank::SeniorLecturer => 1.2,
            Rank::SeniorTeacher | Rank::TeacherEnglish => 1.1,
            Rank::Teacher => 1.0,
            Rank::Advisor | Rank::Admin => 0.8,
        }
    }

    /// Ordering used to check whether a faculty rank satisfies an
    /// activity's `required_rank`, lowest responsibility first.
    fn hierarchy_level(&self) -> u8 {
        match self {
            Rank::Admin => 0,
            Rank::Advisor => 1,
            Rank::Teacher => 2,
            Rank::TeacherEnglish => 3,
            Rank::SeniorTeacher => 4,
            Rank::SeniorLecturer => 5,
            Rank::Assistant => 6,
            Rank::Associate => 7,
            Rank::Professor => 8,
            Rank::Dean => 9,
        }
    }

    pub fn satisfies(&self, required: Rank) -> bool {
        self.hierarchy_level() >= required.hierarchy_level()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Faculty {
    pub id: FacultyId,
    pub name: String,
    pub rank: Rank,
    pub target_load: f64,
    pub max_load: f64,
    /// Derived deterministically from `rank` via [`Rank::weight`]; kept as
    /// a field (rather than recomputed everywhere) because instances may be
    /// deserialized from a caller that has already resolved it.
    pub weight: f64,
    #[serde(default)]
    pub preferences: HashMap<ActivityId, u8>,
    /// Advisory only — solvers consult [`Instance::qualifications`], never
    /// this list. See DESIGN.md for the open-question rationale.
    #[serde(default)]
    pub qualified_courses: Vec<CourseId>,
}

impl Faculty {
    pub fn new(id: FacultyId, name: impl Into<String>, rank: Rank, target_load: f64, max_load: f64) -> Self {
        Self {
            id,
            name: name.into(),
            rank,
            target_load,
            max_load,
            weight: rank.weight(),
            preferences: HashMap::new(),
            qualified_courses: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Lecture,
    Practical,
    Lab,
    Seminar,
    BachelorThesis,
    MasterThesis,
    ResearchNIRM,
}

impl ActivityType {
    pub fn is_supervision(&self) -> bool {
        matches!(
            self,
            ActivityType::BachelorThesis | ActivityType::MasterThesis | ActivityType::ResearchNIRM
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct CourseActivity {
    pub id: ActivityId,
    pub course_id: CourseId,
    pub course_name: String,
    pub activity_type: ActivityType,
    pub section_number: u32,
    pub hours: f64,
    pub student_count: u32,
    #[serde(default)]
    pub required_rank: Option<Rank>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Assignment {
    pub faculty_id: FacultyId,
    pub activity_id: ActivityId,
    pub preference_score: f64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolverStatus {
    Optimal,
    Feasible,
    Completed,
    Infeasible,
    Unknown,
    Error,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct OptimizationResult {
    pub assignments: Vec<Assignment>,
    pub objective_value: f64,
    pub total_deviation: f64,
    pub computation_time_seconds: f64,
    pub solver_name: String,
    pub solver_status: SolverStatus,
    pub faculty_loads: HashMap<FacultyId, f64>,
    #[serde(default)]
    pub unassigned_activities: Vec<ActivityId>,
    pub is_feasible: bool,
    #[serde(default)]
    pub gap: Option<f64>,
}

/// Sparse bipartite eligibility relation: the pairs listed here are the
/// `true` entries of the (faculty, activity) Cartesian product; everything
/// absent is implicitly ineligible. Replaces a dense
/// `HashMap<(FacultyId, ActivityId), bool>` — see DESIGN.md.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Default)]
pub struct QualificationMatrix(pub Vec<(FacultyId, ActivityId)>);

impl QualificationMatrix {
    pub fn is_qualified(&self, faculty: FacultyId, activity: &ActivityId) -> bool {
        self.0.iter().any(|(f, a)| *f == faculty && a == activity)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Instance {
    pub faculty: Vec<Faculty>,
    pub activities: Vec<CourseActivity>,
    pub qualifications: QualificationMatrix,
    #[serde(default)]
    pub name: String,
}

impl Instance {
    pub fn total_demand_hours(&self) -> f64 {
        self.activities.iter().map(|a| a.hours).sum()
    }

    pub fn total_capacity_hours(&self) -> f64 {
        self.faculty.iter().map(|f| f.max_load).sum()
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InstanceSize {
    Small,
    Medium,
    Large,
}

impl fmt::Display for InstanceSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InstanceSize::Small => "small",
            InstanceSize::Medium => "medium",
            InstanceSize::Large => "large",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SolverKind {
    OrTools,
    Pulp,
    Genetic,
    Sa,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct GaParams {
    pub population_size: usize,
    pub generations: usize,
    pub elite_size: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
}

impl Default for GaParams {
    fn default() -> Self {
        Self {
            population_size: 100,
            generations: 500,
            elite_size: 5,
            crossover_rate: 0.8,
            mutation_rate: 0.1,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct SaParams {
    pub initial_temp: f64,
    pub cooling_rate: f64,
    pub min_temp: f64,
    pub inner_steps: usize,
}

impl Default for SaParams {
    fn default() -> Self {
        Self {
            initial_temp: 1000.0,
            cooling_rate: 0.95,
            min_temp: 0.1,
            inner_steps: 100,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct SolveParams {
    pub solver: SolverKind,
    pub time_limit_seconds: u64,
    pub seed: u64,
    #[serde(default)]
    pub ga: GaParams,
    #[serde(default)]
    pub sa: SaParams,
}

impl SolveParams {
    pub fn new(solver: SolverKind, time_limit_seconds: u64, seed: u64) -> Self {
        Self {
            solver,
            time_limit_seconds,
            seed,
            ga: GaParams::default(),
            sa: SaParams::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    LectureHall,
    Classroom,
    ComputerLab,
    Laboratory,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub room_type: RoomType,
    pub capacity: u32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 5] = [
        DayOfWeek::Mon,
        DayOfWeek::Tue,
        DayOfWeek::Wed,
        DayOfWeek::Thu,
        DayOfWeek::Fri,
    ];
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub u8);

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct TimeSlot {
    pub id: SlotId,
    pub start: &'static str,
    pub end: &'static str,
}

const STANDARD_SLOTS: [(u8, &str, &str); 8] = [
    (1, "08:00", "08:50"),
    (2, "09:00", "09:50"),
    (3, "10:00", "10:50"),
    (4, "11:00", "11:50"),
    (5, "12:30", "13:20"),
    (6, "13:30", "14:20"),
    (7, "14:30", "15:20"),
    (8, "15:30", "16:20"),
];

pub fn standard_slots() -> Vec<TimeSlot> {
    STANDARD_SLOTS
        .iter()
        .map(|&(id, start, end)| TimeSlot {
            id: SlotId(id),
            start,
            end,
        })
        .collect()
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct ScheduledActivity {
    pub activity_id: ActivityId,
    pub faculty_id: FacultyId,
    pub day: DayOfWeek,
    pub slot_id: SlotId,
    pub room_id: RoomId,
    pub course_name: String,
    pub activity_type: ActivityType,
    pub hours: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Timetable {
    pub scheduled: Vec<ScheduledActivity>,
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub unplaced: Vec<ActivityId>,
}
