//! End-to-end placement properties.
//!
//! The scenario tests pin down concrete outcomes; the property tests run
//! seeded random institutions and check that every committed placement is
//! valid, every session is accounted for, and runs are reproducible.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

use u_timetable::basket::BasketResolver;
use u_timetable::calendar::{Commitment, ResourceCalendar};
use u_timetable::catalog::SessionCatalog;
use u_timetable::config::{MealBreak, SessionDurations, TimetableConfig};
use u_timetable::models::{
    Batch, Course, ElectiveRegistration, Room, RoomType, SessionId, SessionKind, SlotRange,
    UnscheduledReason, WeekGrid,
};
use u_timetable::scheduler::{PlacementEngine, PlacementRules, Timetable, TimetableInput, Timetabler};

// ======================== Scenarios ========================

#[test]
fn test_scenario_two_lectures_one_room() {
    let input = TimetableInput::new(
        vec![Course::new("CS301", "CSE", "3", "CSE3", "F1").with_periods(2)],
        vec![Room::lecture_hall("LH1", 60)],
        vec![Batch::new("CSE3", "CSE", "3", 50)],
    );
    let tt = Timetabler::new(TimetableConfig::compact(5, 6)).run(&input).unwrap();

    assert!(tt.is_complete());
    let placements: Vec<_> = tt.committed().filter_map(|s| s.placement()).collect();
    assert_eq!(placements.len(), 2);
    assert!(placements.iter().all(|p| p.room_id == "LH1"));
    assert_ne!(placements[0].range, placements[1].range);
    assert!(tt.report().unscheduled_report().is_empty());
}

#[test]
fn test_scenario_batch_with_one_free_slot() {
    let input = TimetableInput::new(
        vec![
            Course::new("CS301", "CSE", "3", "CSE3", "F1"),
            Course::new("CS302", "CSE", "3", "CSE3", "F2"),
        ],
        vec![Room::lecture_hall("LH1", 60), Room::lecture_hall("LH2", 60)],
        vec![Batch::new("CSE3", "CSE", "3", 50)],
    );
    let tt = Timetabler::new(TimetableConfig::compact(1, 1)).run(&input).unwrap();

    assert_eq!(tt.committed().count(), 1);
    let unscheduled: Vec<_> = tt.unscheduled().collect();
    assert_eq!(unscheduled.len(), 1);
    assert_eq!(unscheduled[0].reason(), Some(&UnscheduledReason::BatchFullyBooked));
}

fn elective_input() -> TimetableInput {
    TimetableInput::new(
        vec![
            Course::new("CS451", "CSE", "5", "CSE5", "F1"),
            Course::new("CS452", "CSE", "5", "CSE5", "F2"),
        ],
        vec![Room::lecture_hall("LH1", 60), Room::lecture_hall("LH2", 60)],
        vec![Batch::new("CSE5", "CSE", "5", 50)],
    )
    .with_registrations(vec![
        ElectiveRegistration::new("CSE5", "B1", "CS451"),
        ElectiveRegistration::new("CSE5", "B1", "CS452"),
    ])
}

#[test]
fn test_scenario_basket_siblings_take_separate_slots() {
    let tt = Timetabler::new(TimetableConfig::compact(1, 2)).run(&elective_input()).unwrap();

    assert!(tt.is_complete());
    let ranges: Vec<SlotRange> = tt.committed().filter_map(|s| s.placement()).map(|p| p.range).collect();
    assert!(!ranges[0].overlaps(&ranges[1]));
}

#[test]
fn test_scenario_basket_conflict_only() {
    let tt = Timetabler::new(TimetableConfig::compact(1, 1)).run(&elective_input()).unwrap();

    assert_eq!(tt.committed().count(), 1);
    let blocked = tt.unscheduled().next().unwrap();
    assert_eq!(
        blocked.reason(),
        Some(&UnscheduledReason::BasketConflictOnly { basket_id: "B1".into() })
    );
}

#[test]
fn test_scenario_no_lab_rooms() {
    let input = TimetableInput::new(
        vec![
            Course::new("CS301", "CSE", "3", "CSE3", "F1").with_periods(2),
            Course::new("CS301", "CSE", "3", "CSE3", "F1")
                .with_kind(SessionKind::Lab)
                .with_room_type(RoomType::Lab)
                .with_periods(2),
        ],
        vec![Room::lecture_hall("LH1", 60)],
        vec![Batch::new("CSE3", "CSE", "3", 50)],
    );
    let tt = Timetabler::new(TimetableConfig::compact(5, 6)).run(&input).unwrap();

    for s in tt.sessions() {
        if s.kind == SessionKind::Lab {
            assert!(matches!(s.reason(), Some(UnscheduledReason::NoRoomOfType { .. })));
        } else {
            assert!(s.is_committed());
        }
    }
}

fn lab_course() -> Vec<Course> {
    vec![Course::new("CS303", "CSE", "3", "CSE3", "F1")
        .with_kind(SessionKind::Lab)
        .with_room_type(RoomType::Lab)]
}

#[test]
fn test_scenario_no_contiguous_window_in_grid() {
    let cfg = TimetableConfig::compact(1, 5)
        .with_break(1)
        .with_break(3)
        .with_durations(SessionDurations {
            lab: 2,
            ..SessionDurations::uniform(1)
        });
    let input = TimetableInput::new(lab_course(), vec![Room::lab("L1", 60)], vec![Batch::new("CSE3", "CSE", "3", 50)]);
    let tt = Timetabler::new(cfg).run(&input).unwrap();

    assert_eq!(
        tt.sessions()[0].reason(),
        Some(&UnscheduledReason::NoWindowOfDuration { duration: 2 })
    );
    assert_eq!(tt.calendar().commit_count(), 0);
}

/// Places the lab on a calendar where other sessions already hold `held`.
fn place_lab_around(held: &[(&str, &str, SlotRange)]) -> UnscheduledReason {
    let rooms = vec![Room::lab("L1", 60)];
    let batches = vec![Batch::new("CSE3", "CSE", "3", 50)];
    let mut baskets = BasketResolver::new();
    let (mut sessions, order) =
        SessionCatalog::build(&lab_course(), &batches, &baskets, &SessionDurations::uniform(2)).into_parts();

    let mut calendar = ResourceCalendar::new(WeekGrid::new(1, 6));
    for (i, (faculty, batch, range)) in held.iter().enumerate() {
        let room = format!("X{i}");
        calendar
            .commit(&Commitment {
                session: SessionId(100 + i as u32),
                room_id: &room,
                faculty_id: faculty,
                batch_id: batch,
                semester: "3",
                basket: None,
                range: *range,
            })
            .unwrap();
    }
    let before = calendar.commit_count();

    PlacementEngine::new(&rooms)
        .run(&mut calendar, &mut baskets, &mut sessions, &order)
        .unwrap();
    assert_eq!(calendar.commit_count(), before, "no partial commit");
    sessions[0].reason().cloned().unwrap()
}

#[test]
fn test_scenario_scattered_batch_slots() {
    // batch free only at slots 0, 2, 4
    let reason = place_lab_around(&[
        ("G1", "CSE3", SlotRange::new(0, 1, 1)),
        ("G2", "CSE3", SlotRange::new(0, 3, 1)),
        ("G3", "CSE3", SlotRange::new(0, 5, 1)),
    ]);
    assert_eq!(reason, UnscheduledReason::BatchFullyBooked);
}

#[test]
fn test_scenario_faculty_and_batch_never_meet() {
    // F1 free at [0,2) and [4,6); CSE3 free at [2,4)
    let reason = place_lab_around(&[
        ("F1", "OTHER", SlotRange::new(0, 2, 2)),
        ("G1", "CSE3", SlotRange::new(0, 0, 2)),
        ("G2", "CSE3", SlotRange::new(0, 4, 2)),
    ]);
    assert!(matches!(reason, UnscheduledReason::SearchExhausted { .. }));
}

// ======================== Properties ========================

fn random_input(seed: u64) -> TimetableInput {
    let mut rng = SmallRng::seed_from_u64(seed);

    let mut rooms = Vec::new();
    for i in 0..rng.random_range(2..5) {
        rooms.push(Room::lecture_hall(format!("LH{i}"), rng.random_range(30..120)));
    }
    for i in 0..rng.random_range(0..3) {
        rooms.push(Room::lab(format!("LAB{i}"), rng.random_range(30..80)));
    }

    let mut batches = Vec::new();
    for dept in ["CSE", "ECE"] {
        for sem in ["3", "5"] {
            let total = rng.random_range(40..140);
            batches.extend(Batch::split_sections(dept, sem, total, 70));
        }
    }

    let faculty: Vec<String> = (0..6).map(|i| format!("F{i}")).collect();
    let mut courses = Vec::new();
    for b in &batches {
        for c in 0..rng.random_range(2..5) {
            let code = format!("{}{}{c}", b.department, b.semester);
            let fac = faculty[rng.random_range(0..faculty.len())].clone();
            courses.push(
                Course::new(&code, &b.department, &b.semester, &b.id, &fac)
                    .with_periods(rng.random_range(1..4)),
            );
            if rng.random_bool(0.4) {
                courses.push(
                    Course::new(&code, &b.department, &b.semester, &b.id, &fac)
                        .with_kind(SessionKind::Lab)
                        .with_room_type(RoomType::Lab),
                );
            }
            if rng.random_bool(0.3) {
                courses.push(
                    Course::new(&code, &b.department, &b.semester, &b.id, &fac)
                        .with_kind(SessionKind::Tutorial)
                        .with_periods(1),
                );
            }
        }
        // one elective basket per batch
        for e in 0..rng.random_range(0..3) {
            let code = format!("B1-{}{}E{e}", b.department, b.semester);
            let fac = faculty[rng.random_range(0..faculty.len())].clone();
            courses.push(
                Course::new(code, &b.department, &b.semester, &b.id, fac)
                    .with_basket("B1")
                    .with_periods(rng.random_range(1..3)),
            );
        }
    }

    TimetableInput::new(courses, rooms, batches)
}

fn random_config(seed: u64) -> TimetableConfig {
    let cfg = TimetableConfig::compact(5, 10)
        .with_break(4)
        .with_durations(SessionDurations {
            lecture: 1,
            lab: 2,
            tutorial: 1,
            self_study: 1,
        });
    if seed % 2 == 0 {
        cfg.with_meal_break(Some(MealBreak {
            window_start: 6,
            window_slots: 3,
            duration_slots: 2,
        }))
    } else {
        cfg
    }
}

fn run(seed: u64) -> (TimetableInput, Timetable) {
    let input = random_input(seed);
    let tt = Timetabler::new(random_config(seed)).run(&input).unwrap();
    (input, tt)
}

#[test]
fn test_no_double_booking() {
    for seed in 0..25 {
        let (_, tt) = run(seed);
        let placed: Vec<_> = tt
            .committed()
            .filter_map(|s| s.placement().map(|p| (s, p)))
            .collect();
        for (i, (a, pa)) in placed.iter().enumerate() {
            for (b, pb) in &placed[i + 1..] {
                if !pa.range.overlaps(&pb.range) {
                    continue;
                }
                assert_ne!(pa.room_id, pb.room_id, "seed {seed}: room double-booked");
                assert_ne!(pa.faculty_id, pb.faculty_id, "seed {seed}: faculty double-booked");
                assert_ne!(a.batch_id, b.batch_id, "seed {seed}: batch double-booked");
            }
        }
    }
}

#[test]
fn test_basket_members_never_overlap() {
    for seed in 0..25 {
        let (_, tt) = run(seed);
        let mut groups: BTreeMap<(&str, &str), Vec<SlotRange>> = BTreeMap::new();
        for s in tt.committed() {
            if let (Some(basket), Some(p)) = (&s.basket_id, s.placement()) {
                groups.entry((basket.as_str(), s.batch_id.as_str())).or_default().push(p.range);
            }
        }
        for ranges in groups.values() {
            for (i, a) in ranges.iter().enumerate() {
                for b in &ranges[i + 1..] {
                    assert!(!a.overlaps(b), "seed {seed}: basket members overlap");
                }
            }
        }
    }
}

#[test]
fn test_breaks_and_capacity_respected() {
    for seed in 0..25 {
        let (input, tt) = run(seed);
        let rooms: BTreeMap<&str, &Room> = input.rooms.iter().map(|r| (r.id.as_str(), r)).collect();
        let semesters: BTreeMap<&str, &str> = input
            .batches
            .iter()
            .map(|b| (b.id.as_str(), b.semester.as_str()))
            .collect();
        for s in tt.committed() {
            let p = s.placement().unwrap();
            let semester = semesters[s.batch_id.as_str()];
            assert!(
                tt.grid().check_range(p.range, Some(semester)).is_ok(),
                "seed {seed}: {} on a break",
                s.label()
            );
            let room = rooms[p.room_id.as_str()];
            assert!(room.capacity >= s.headcount, "seed {seed}: room too small");
            assert_eq!(room.room_type, s.room_type, "seed {seed}: wrong room type");
        }
    }
}

#[test]
fn test_enabled_rules_hold() {
    let rules = PlacementRules::default()
        .with_faculty_daily_limit(2)
        .with_course_gap(2)
        .with_batch_buffer(1);
    for seed in 0..25 {
        let input = random_input(seed);
        let tt = Timetabler::new(random_config(seed).with_rules(rules)).run(&input).unwrap();
        let placed: Vec<_> = tt
            .committed()
            .filter_map(|s| s.placement().map(|p| (s, p)))
            .collect();

        let mut regular_per_day: BTreeMap<(&str, u8), usize> = BTreeMap::new();
        for (s, p) in &placed {
            if s.basket_id.is_none() {
                *regular_per_day.entry((s.faculty_id.as_str(), p.range.day)).or_default() += 1;
            }
        }
        assert!(regular_per_day.values().all(|&n| n <= 2), "seed {seed}: faculty over daily limit");

        for (i, (a, pa)) in placed.iter().enumerate() {
            for (b, pb) in &placed[i + 1..] {
                if a.batch_id != b.batch_id || pa.range.day != pb.range.day {
                    continue;
                }
                let idle = if pa.range.end() <= pb.range.start {
                    pb.range.start - pa.range.end()
                } else {
                    pa.range.start.saturating_sub(pb.range.end())
                };
                let spaced = |k: SessionKind| matches!(k, SessionKind::Lecture | SessionKind::Tutorial);
                if a.course_id == b.course_id && spaced(a.kind) && spaced(b.kind) {
                    assert!(idle >= 2, "seed {seed}: {} and {} too close", a.label(), b.label());
                }
                let siblings = a.basket_id.is_some() && a.basket_id == b.basket_id;
                if !siblings {
                    assert!(idle >= 1, "seed {seed}: no buffer between {} and {}", a.label(), b.label());
                }
            }
        }
    }
}

#[test]
fn test_every_session_accounted_for() {
    for seed in 0..25 {
        let (input, tt) = run(seed);
        let expected: u32 = input.courses.iter().map(|c| c.weekly_periods).sum();
        assert_eq!(tt.sessions().len(), expected as usize);
        assert_eq!(
            tt.committed().count() + tt.unscheduled().count(),
            tt.sessions().len(),
            "seed {seed}: session left pending"
        );
        assert_eq!(tt.report().unscheduled_report().len(), tt.unscheduled().count());
    }
}

#[test]
fn test_runs_are_reproducible() {
    for seed in [1, 7, 42] {
        let (_, a) = run(seed);
        let (_, b) = run(seed);
        let ja = serde_json::to_string(&a.document()).unwrap();
        let jb = serde_json::to_string(&b.document()).unwrap();
        assert_eq!(ja, jb, "seed {seed}: runs differ");
    }
}
