use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, HashSet};
use types::{
    standard_slots, ActivityId, ActivityType, DayOfWeek, FacultyId, Instance, OptimizationResult, Room, RoomId,
    RoomType, ScheduledActivity, SlotId, TimeSlot, Timetable,
};

/// A double-booking left behind on a [`Timetable`]. The greedy placement
/// pass in [`TimetableGenerator::generate`] never produces one of these by
/// construction; [`check_conflicts`] exists to verify that invariant holds
/// for timetables assembled some other way (hand-built fixtures, a future
/// alternate generator).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Conflict {
    RoomDoubleBooked {
        room_id: RoomId,
        day: DayOfWeek,
        slot_id: SlotId,
        activities: Vec<ActivityId>,
    },
    FacultyDoubleBooked {
        faculty_id: FacultyId,
        day: DayOfWeek,
        slot_id: SlotId,
        activities: Vec<ActivityId>,
    },
}

/// Scans a timetable for two scheduled activities sharing a (room, day,
/// slot) or (faculty, day, slot) triple. Empty on any timetable the
/// generator itself produced.
pub fn check_conflicts(timetable: &Timetable) -> Vec<Conflict> {
    let mut by_room: HashMap<(RoomId, DayOfWeek, SlotId), Vec<ActivityId>> = HashMap::new();
    let mut by_faculty: HashMap<(FacultyId, DayOfWeek, SlotId), Vec<ActivityId>> = HashMap::new();

    for s in &timetable.scheduled {
        by_room
            .entry((s.room_id.clone(), s.day, s.slot_id))
            .or_default()
            .push(s.activity_id.clone());
        by_faculty
            .entry((s.faculty_id, s.day, s.slot_id))
            .or_default()
            .push(s.activity_id.clone());
    }

    let mut conflicts = Vec::new();
    for ((room_id, day, slot_id), activities) in by_room {
        if activities.len() > 1 {
            conflicts.push(Conflict::RoomDoubleBooked { room_id, day, slot_id, activities });
        }
    }
    for ((faculty_id, day, slot_id), activities) in by_faculty {
        if activities.len() > 1 {
            conflicts.push(Conflict::FacultyDoubleBooked { faculty_id, day, slot_id, activities });
        }
    }
    conflicts
}

/// Converts a solved assignment (who teaches what) into a day/slot/room
/// schedule. Supervision and research activities (thesis, NIRM) are never
/// placed on the weekly grid — they carry load but not a classroom slot.
pub struct TimetableGenerator {
    rng: ChaCha8Rng,
    time_slots: Vec<TimeSlot>,
}

impl TimetableGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            time_slots: standard_slots(),
        }
    }

    /// Synthesizes a room inventory: roughly a quarter lecture halls, half
    /// classrooms, and the remainder split between computer labs and
    /// laboratories.
    pub fn generate_rooms(&mut self, count: usize) -> Vec<Room> {
        let mut rooms = Vec::new();
        let lecture_hall_capacities = [100, 120, 150, 200];
        let classroom_capacities = [30, 35, 40];

        for i in 1..=(count / 4).max(0) {
            rooms.push(Room {
                id: RoomId(format!("LH{i:02}")),
                name: format!("Hall {}", 100 + i),
                room_type: RoomType::LectureHall,
                capacity: *lecture_hall_capacities.choose(&mut self.rng).unwrap(),
            });
        }
        for i in 1..=(count / 2).max(0) {
            rooms.push(Room {
                id: RoomId(format!("CR{i:02}")),
                name: format!("Room {}", 200 + i),
                room_type: RoomType::Classroom,
                capacity: *classroom_capacities.choose(&mut self.rng).unwrap(),
            });
        }
        for i in 1..=(count / 6).max(0) {
            rooms.push(Room {
                id: RoomId(format!("CL{i:02}")),
                name: format!("Lab {}", 300 + i),
                room_type: RoomType::ComputerLab,
                capacity: 25,
            });
        }
        for i in 1..=(count / 6).max(0) {
            rooms.push(Room {
                id: RoomId(format!("LB{i:02}")),
                name: format!("Laboratory {}", 400 + i),
                room_type: RoomType::Laboratory,
                capacity: 20,
            });
        }
        rooms
    }

    pub fn generate(&mut self, instance: &Instance, result: &OptimizationResult, rooms: Option<Vec<Room>>) -> Timetable {
        let rooms = rooms.unwrap_or_else(|| self.generate_rooms(20));

        let mut faculty_schedule: HashMap<(FacultyId, DayOfWeek), HashSet<SlotId>> = HashMap::new();
        let mut room_schedule: HashMap<(RoomId, DayOfWeek), HashSet<SlotId>> = HashMap::new();
        for f in &instance.faculty {
            for &day in &DayOfWeek::ALL {
                faculty_schedule.insert((f.id, day), HashSet::new());
            }
        }
        for r in &rooms {
            for &day in &DayOfWeek::ALL {
                room_schedule.insert((r.id.clone(), day), HashSet::new());
            }
        }

        let mut scheduled = Vec::new();
        let mut unplaced = Vec::new();

        for assignment in &result.assignments {
            let Some(activity) = instance.activities.iter().find(|a| a.id == assignment.activity_id) else {
                continue;
            };
            if instance.faculty.iter().find(|f| f.id == assignment.faculty_id).is_none() {
                continue;
            }
            if activity.activity_type.is_supervision() {
                continue;
            }

            match self.find_suitable_room(activity, &rooms, &room_schedule, &faculty_schedule, assignment.faculty_id) {
                Some((room_id, day, slot)) => {
                    scheduled.push(ScheduledActivity {
                        activity_id: activity.id.clone(),
                        faculty_id: assignment.faculty_id,
                        day,
                        slot_id: slot.id,
                        room_id: room_id.clone(),
                        course_name: activity.course_name.clone(),
                        activity_type: activity.activity_type,
                        hours: activity.hours,
                    });
                    faculty_schedule.get_mut(&(assignment.faculty_id, day)).unwrap().insert(slot.id);
                    room_schedule.get_mut(&(room_id, day)).unwrap().insert(slot.id);
                }
                None => unplaced.push(activity.id.clone()),
            }
        }

        Timetable { scheduled, rooms, unplaced }
    }

    fn find_suitable_room(
        &mut self,
        activity: &types::CourseActivity,
        rooms: &[Room],
        room_schedule: &HashMap<(RoomId, DayOfWeek), HashSet<SlotId>>,
        faculty_schedule: &HashMap<(FacultyId, DayOfWeek), HashSet<SlotId>>,
        faculty_id: FacultyId,
    ) -> Option<(RoomId, DayOfWeek, TimeSlot)> {
        let preferred_types: &[RoomType] = match activity.activity_type {
            ActivityType::Lecture => &[RoomType::LectureHall, RoomType::Classroom],
            ActivityType::Practical => &[RoomType::Classroom],
            ActivityType::Lab => &[RoomType::Laboratory, RoomType::ComputerLab],
            ActivityType::Seminar => &[RoomType::Classroom],
            _ => &[RoomType::Classroom],
        };

        let mut suitable: Vec<&Room> = rooms
            .iter()
            .filter(|r| preferred_types.contains(&r.room_type) && r.capacity >= activity.student_count)
            .collect();
        if suitable.is_empty() {
            suitable = rooms.iter().filter(|r| r.capacity >= activity.student_count).collect();
        }
        if suitable.is_empty() {
            suitable = rooms.iter().collect();
        }

        suitable.shuffle(&mut self.rng);
        let mut days = DayOfWeek::ALL;
        days.shuffle(&mut self.rng);

        for room in &suitable {
            for &day in &days {
                for slot in &self.time_slots {
                    let room_taken = room_schedule
                        .get(&(room.id.clone(), day))
                        .map(|s| s.contains(&slot.id))
                        .unwrap_or(false);
                    if room_taken {
                        continue;
                    }
                    let faculty_taken = faculty_schedule
                        .get(&(faculty_id, day))
                        .map(|s| s.contains(&slot.id))
                        .unwrap_or(false);
                    if faculty_taken {
                        continue;
                    }
                    return Some((room.id.clone(), day, slot.clone()));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixtures::InstanceGenerator;
    use proptest::prelude::*;
    use types::{Assignment, SolverStatus};

    #[test]
    fn rooms_are_spread_across_types() {
        let mut gen = TimetableGenerator::new(1);
        let rooms = gen.generate_rooms(20);
        assert!(rooms.iter().any(|r| r.room_type == RoomType::LectureHall));
        assert!(rooms.iter().any(|r| r.room_type == RoomType::Classroom));
        assert!(rooms.iter().any(|r| r.room_type == RoomType::ComputerLab));
        assert!(rooms.iter().any(|r| r.room_type == RoomType::Laboratory));
    }

    #[test]
    fn schedule_never_double_books_a_faculty_member_or_room() {
        let mut instance_gen = InstanceGenerator::new(3);
        let instance = instance_gen.generate_instance(types::InstanceSize::Small, None);

        let assignments: Vec<Assignment> = instance
            .activities
            .iter()
            .filter(|a| !a.activity_type.is_supervision())
            .filter_map(|a| {
                instance
                    .faculty
                    .iter()
                    .find(|f| instance.qualifications.is_qualified(f.id, &a.id))
                    .map(|f| Assignment {
                        faculty_id: f.id,
                        activity_id: a.id.clone(),
                        preference_score: 0.0,
                    })
            })
            .collect();

        let result = OptimizationResult {
            assignments,
            objective_value: 0.0,
            total_deviation: 0.0,
            computation_time_seconds: 0.0,
            solver_name: "test".into(),
            solver_status: SolverStatus::Optimal,
            faculty_loads: HashMap::new(),
            unassigned_activities: Vec::new(),
            is_feasible: true,
            gap: None,
        };

        let mut tt_gen = TimetableGenerator::new(5);
        let timetable = tt_gen.generate(&instance, &result, None);

        assert!(check_conflicts(&timetable).is_empty());
    }

    #[test]
    fn check_conflicts_detects_a_double_booked_room() {
        let room = Room {
            id: RoomId("CR01".into()),
            name: "Room".into(),
            room_type: RoomType::Classroom,
            capacity: 30,
        };
        let slot = standard_slots()[0].clone();
        let timetable = Timetable {
            scheduled: vec![
                types::ScheduledActivity {
                    activity_id: types::ActivityId::from("act-1"),
                    faculty_id: FacultyId(1),
                    day: DayOfWeek::Mon,
                    slot_id: slot.id,
                    room_id: room.id.clone(),
                    course_name: "Course".into(),
                    activity_type: ActivityType::Lecture,
                    hours: 20.0,
                },
                types::ScheduledActivity {
                    activity_id: types::ActivityId::from("act-2"),
                    faculty_id: FacultyId(2),
                    day: DayOfWeek::Mon,
                    slot_id: slot.id,
                    room_id: room.id.clone(),
                    course_name: "Course".into(),
                    activity_type: ActivityType::Lecture,
                    hours: 20.0,
                },
            ],
            rooms: vec![room],
            unplaced: Vec::new(),
        };

        let conflicts = check_conflicts(&timetable);
        assert_eq!(conflicts.len(), 1);
        assert!(matches!(conflicts[0], Conflict::RoomDoubleBooked { .. }));
    }

    proptest! {
        #[test]
        fn generated_timetables_never_conflict(seed in 0u64..200, size_idx in 0usize..3) {
            let size = [types::InstanceSize::Small, types::InstanceSize::Medium, types::InstanceSize::Large][size_idx];
            let instance = InstanceGenerator::new(seed).generate_instance(size, None);

            let assignments: Vec<Assignment> = instance
                .activities
                .iter()
                .filter(|a| !a.activity_type.is_supervision())
                .filter_map(|a| {
                    instance
                        .faculty
                        .iter()
                        .find(|f| instance.qualifications.is_qualified(f.id, &a.id))
                        .map(|f| Assignment {
                            faculty_id: f.id,
                            activity_id: a.id.clone(),
                            preference_score: 0.0,
                        })
                })
                .collect();

            let result = OptimizationResult {
                assignments,
                objective_value: 0.0,
                total_deviation: 0.0,
                computation_time_seconds: 0.0,
                solver_name: "property-test".into(),
                solver_status: SolverStatus::Optimal,
                faculty_loads: HashMap::new(),
                unassigned_activities: Vec::new(),
                is_feasible: true,
                gap: None,
            };

            let timetable = TimetableGenerator::new(seed).generate(&instance, &result, None);
            prop_assert!(check_conflicts(&timetable).is_empty());
        }
    }
}
