//! Timetable quality metrics (KPIs).
//!
//! Computes placement and load indicators from the final session table.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Placement Rate | committed / total sessions |
//! | Room Utilisation | busy slots / teaching slots of the week, per room |
//! | Avg Room Utilisation | mean over the room inventory |
//! | Faculty Load | committed slots per faculty per week |
//! | Unscheduled by Reason | count per reason code |

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{Room, Session, WeekGrid};

/// Timetable performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimetableKpi {
    /// Sessions produced by the catalog.
    pub total_sessions: usize,
    /// Committed sessions.
    pub committed: usize,
    /// Unscheduled sessions.
    pub unscheduled: usize,
    /// Fraction of sessions committed (0.0..1.0).
    pub placement_rate: f64,
    /// Per-room utilisation (0.0..1.0). Every inventory room appears.
    pub room_utilization: BTreeMap<String, f64>,
    /// Mean room utilisation (0.0..1.0).
    pub avg_room_utilization: f64,
    /// Committed slots per faculty.
    pub faculty_load: BTreeMap<String, u32>,
    /// Unscheduled sessions per reason code.
    pub unscheduled_by_reason: BTreeMap<String, usize>,
}

impl TimetableKpi {
    /// Computes KPIs from the final session table.
    ///
    /// # Arguments
    /// * `sessions` - Sessions after placement.
    /// * `rooms` - Room inventory (rooms never used count as 0.0).
    /// * `grid` - Week grid; global breaks are excluded from room capacity.
    pub fn calculate(sessions: &[Session], rooms: &[Room], grid: &WeekGrid) -> Self {
        let mut committed = 0usize;
        let mut unscheduled = 0usize;
        let mut room_busy: BTreeMap<&str, u32> = BTreeMap::new();
        let mut faculty_load: BTreeMap<String, u32> = BTreeMap::new();
        let mut unscheduled_by_reason: BTreeMap<String, usize> = BTreeMap::new();

        for s in sessions {
            if let Some(p) = s.placement() {
                committed += 1;
                *room_busy.entry(p.room_id.as_str()).or_default() += p.range.len as u32;
                *faculty_load.entry(p.faculty_id.clone()).or_default() += p.range.len as u32;
            } else if let Some(r) = s.reason() {
                unscheduled += 1;
                *unscheduled_by_reason.entry(r.code().to_string()).or_default() += 1;
            }
        }

        let capacity = grid.teaching_slot_count(None) as f64;
        let room_utilization: BTreeMap<String, f64> = rooms
            .iter()
            .map(|r| {
                let busy = room_busy.get(r.id.as_str()).copied().unwrap_or(0) as f64;
                let u = if capacity > 0.0 { busy / capacity } else { 0.0 };
                (r.id.clone(), u)
            })
            .collect();

        let avg_room_utilization = if room_utilization.is_empty() {
            0.0
        } else {
            room_utilization.values().sum::<f64>() / room_utilization.len() as f64
        };

        let placement_rate = if sessions.is_empty() {
            1.0
        } else {
            committed as f64 / sessions.len() as f64
        };

        Self {
            total_sessions: sessions.len(),
            committed,
            unscheduled,
            placement_rate,
            room_utilization,
            avg_room_utilization,
            faculty_load,
            unscheduled_by_reason,
        }
    }

    /// Heaviest faculty load in slots.
    pub fn max_faculty_load(&self) -> u32 {
        self.faculty_load.values().copied().max().unwrap_or(0)
    }

    /// Whether the timetable meets the given quality thresholds.
    pub fn meets_thresholds(&self, min_placement_rate: f64, max_faculty_load: u32) -> bool {
        self.placement_rate >= min_placement_rate && self.max_faculty_load() <= max_faculty_load
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Placement, RoomType, SessionId, SessionKind, SessionStatus, SlotRange, UnscheduledReason,
    };

    fn make_session(id: u32, status: SessionStatus) -> Session {
        Session {
            id: SessionId(id),
            course_id: format!("C{id}"),
            course_name: String::new(),
            department: "CSE".into(),
            semester: "3".into(),
            batch_id: "CSE3".into(),
            headcount: 40,
            kind: SessionKind::Lecture,
            duration: 2,
            room_type: RoomType::LectureHall,
            faculty_id: "F1".into(),
            basket_id: None,
            occurrence: 1,
            status,
        }
    }

    fn committed(id: u32, room: &str, faculty: &str, range: SlotRange) -> Session {
        make_session(
            id,
            SessionStatus::Committed(Placement {
                room_id: room.into(),
                faculty_id: faculty.into(),
                range,
            }),
        )
    }

    #[test]
    fn test_kpi_basic() {
        let sessions = vec![
            committed(0, "R1", "F1", SlotRange::new(0, 0, 2)),
            committed(1, "R1", "F2", SlotRange::new(0, 2, 2)),
            make_session(2, SessionStatus::Unscheduled(UnscheduledReason::BatchFullyBooked)),
            make_session(3, SessionStatus::Unscheduled(UnscheduledReason::BatchFullyBooked)),
        ];
        let rooms = vec![Room::lecture_hall("R1", 60), Room::lecture_hall("R2", 60)];
        let grid = WeekGrid::new(1, 8);

        let kpi = TimetableKpi::calculate(&sessions, &rooms, &grid);
        assert_eq!(kpi.total_sessions, 4);
        assert_eq!(kpi.committed, 2);
        assert_eq!(kpi.unscheduled, 2);
        assert!((kpi.placement_rate - 0.5).abs() < 1e-10);
        assert!((kpi.room_utilization["R1"] - 0.5).abs() < 1e-10); // 4 / 8
        assert!((kpi.room_utilization["R2"] - 0.0).abs() < 1e-10);
        assert!((kpi.avg_room_utilization - 0.25).abs() < 1e-10);
        assert_eq!(kpi.faculty_load["F1"], 2);
        assert_eq!(kpi.unscheduled_by_reason["BatchFullyBooked"], 2);
    }

    #[test]
    fn test_kpi_breaks_excluded_from_capacity() {
        let sessions = vec![committed(0, "R1", "F1", SlotRange::new(0, 0, 2))];
        let rooms = vec![Room::lecture_hall("R1", 60)];
        let grid = WeekGrid::new(1, 5).with_break(4);

        let kpi = TimetableKpi::calculate(&sessions, &rooms, &grid);
        assert!((kpi.room_utilization["R1"] - 0.5).abs() < 1e-10); // 2 / 4
    }

    #[test]
    fn test_kpi_empty() {
        let kpi = TimetableKpi::calculate(&[], &[], &WeekGrid::new(5, 6));
        assert_eq!(kpi.total_sessions, 0);
        assert!((kpi.placement_rate - 1.0).abs() < 1e-10);
        assert!((kpi.avg_room_utilization - 0.0).abs() < 1e-10);
        assert_eq!(kpi.max_faculty_load(), 0);
    }

    #[test]
    fn test_meets_thresholds() {
        let sessions = vec![
            committed(0, "R1", "F1", SlotRange::new(0, 0, 2)),
            make_session(1, SessionStatus::Unscheduled(UnscheduledReason::RoomsFullyBooked)),
        ];
        let kpi = TimetableKpi::calculate(&sessions, &[], &WeekGrid::new(1, 4));
        assert!(kpi.meets_thresholds(0.5, 2));
        assert!(!kpi.meets_thresholds(0.6, 2));
        assert!(!kpi.meets_thresholds(0.5, 1));
    }
}
