//! Schedule report.
//!
//! Read-side projections of a finished run for downstream rendering:
//! day × slot grids per (department, semester) and per batch, the
//! unscheduled list with reasons, and a per-course summary of what is
//! still missing. Nothing here mutates state or evaluates constraints.
//!
//! Every collection is ordered, so two identical runs serialize to
//! identical bytes.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::config::TimetableConfig;
use crate::models::{Session, SessionId, SessionKind, TimeSlot, UnscheduledReason, WeekGrid};
use crate::scheduler::TimetableKpi;

/// One committed session as it appears in a grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridEntry {
    pub session_id: SessionId,
    pub course_id: String,
    pub course_name: String,
    pub kind: SessionKind,
    pub batch_id: String,
    pub room_id: String,
    pub faculty_id: String,
    pub basket_id: Option<String>,
}

impl GridEntry {
    /// Cell label, e.g. `CS301 LEC (LH1)`.
    pub fn label(&self) -> String {
        format!("{} {} ({})", self.course_id, self.kind, self.room_id)
    }
}

/// Content of one grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "sessions")]
pub enum GridCell {
    Free,
    Break,
    Sessions(Vec<GridEntry>),
}

impl GridCell {
    /// Entries in the cell; empty for free and break cells.
    pub fn entries(&self) -> &[GridEntry] {
        match self {
            GridCell::Sessions(e) => e,
            _ => &[],
        }
    }
}

/// One day of a grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayRow {
    pub day: u8,
    pub name: String,
    pub cells: Vec<GridCell>,
}

/// Day × slot matrix of committed sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimetableGrid {
    pub department: String,
    pub semester: String,
    /// Set for per-batch grids.
    pub batch_id: Option<String>,
    /// Clock label per slot index.
    pub slot_labels: Vec<String>,
    pub days: Vec<DayRow>,
}

impl TimetableGrid {
    /// Cell at a slot, if inside the grid.
    pub fn cell(&self, slot: TimeSlot) -> Option<&GridCell> {
        self.days
            .get(slot.day as usize)
            .and_then(|d| d.cells.get(slot.slot as usize))
    }

    /// Distinct sessions shown in the grid.
    pub fn session_count(&self) -> usize {
        self.days
            .iter()
            .flat_map(|d| d.cells.iter())
            .flat_map(|c| c.entries().iter().map(|e| e.session_id))
            .collect::<BTreeSet<_>>()
            .len()
    }
}

/// One unscheduled session and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnscheduledEntry {
    pub session_id: SessionId,
    pub department: String,
    pub semester: String,
    pub course_id: String,
    pub course_name: String,
    pub batch_id: String,
    pub faculty_id: String,
    pub kind: SessionKind,
    pub occurrence: u32,
    pub code: String,
    pub reason: UnscheduledReason,
    pub message: String,
}

/// Required versus scheduled sessions of one course for one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseSummary {
    pub department: String,
    pub semester: String,
    pub batch_id: String,
    pub course_id: String,
    pub course_name: String,
    pub faculty_id: String,
    pub required: BTreeMap<SessionKind, u32>,
    pub scheduled: BTreeMap<SessionKind, u32>,
    /// Missing components, e.g. `LEC:1, LAB:1`. Empty when complete.
    pub missing: String,
}

impl CourseSummary {
    /// Whether every required session was placed.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Full serializable output of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDocument {
    pub grids: Vec<TimetableGrid>,
    pub batch_grids: Vec<TimetableGrid>,
    pub unscheduled: Vec<UnscheduledEntry>,
    pub course_summary: Vec<CourseSummary>,
    pub kpi: TimetableKpi,
}

/// Kind order used in missing-component strings.
const SUMMARY_KINDS: [SessionKind; 4] = [
    SessionKind::Lecture,
    SessionKind::Tutorial,
    SessionKind::Lab,
    SessionKind::SelfStudy,
];

/// Read-only view over a finished run.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleReport<'a> {
    sessions: &'a [Session],
    grid: &'a WeekGrid,
    config: &'a TimetableConfig,
}

impl<'a> ScheduleReport<'a> {
    /// Creates a report over final session states.
    pub fn new(sessions: &'a [Session], grid: &'a WeekGrid, config: &'a TimetableConfig) -> Self {
        Self {
            sessions,
            grid,
            config,
        }
    }

    /// Grid of every batch in a department and semester.
    pub fn build_grid(&self, department: &str, semester: &str) -> TimetableGrid {
        self.grid_for(department, semester, None, |s| {
            s.department == department && s.semester == semester
        })
    }

    /// Grid of a single batch. Unknown batches give an all-free grid.
    pub fn build_batch_grid(&self, batch_id: &str) -> TimetableGrid {
        let (department, semester) = self
            .sessions
            .iter()
            .find(|s| s.batch_id == batch_id)
            .map(|s| (s.department.as_str(), s.semester.as_str()))
            .unwrap_or(("", ""));
        self.grid_for(department, semester, Some(batch_id), |s| s.batch_id == batch_id)
    }

    /// Every (department, semester) pair with sessions, sorted.
    pub fn groups(&self) -> BTreeSet<(&'a str, &'a str)> {
        self.sessions
            .iter()
            .map(|s| (s.department.as_str(), s.semester.as_str()))
            .collect()
    }

    /// Every batch with sessions, sorted.
    pub fn batches(&self) -> BTreeSet<&'a str> {
        self.sessions.iter().map(|s| s.batch_id.as_str()).collect()
    }

    /// Unscheduled sessions ordered by department, course, then session id.
    pub fn unscheduled_report(&self) -> Vec<UnscheduledEntry> {
        let mut out: Vec<UnscheduledEntry> = self
            .sessions
            .iter()
            .filter_map(|s| {
                let reason = s.reason()?;
                Some(UnscheduledEntry {
                    session_id: s.id,
                    department: s.department.clone(),
                    semester: s.semester.clone(),
                    course_id: s.course_id.clone(),
                    course_name: s.course_name.clone(),
                    batch_id: s.batch_id.clone(),
                    faculty_id: s.faculty_id.clone(),
                    kind: s.kind,
                    occurrence: s.occurrence,
                    code: reason.code().to_string(),
                    reason: reason.clone(),
                    message: reason.to_string(),
                })
            })
            .collect();
        out.sort_by(|a, b| {
            (&a.department, &a.course_id, a.session_id).cmp(&(&b.department, &b.course_id, b.session_id))
        });
        out
    }

    /// Per (batch, course) counts of required and scheduled sessions.
    ///
    /// Ordered by department, semester, batch, then course.
    pub fn course_summary(&self) -> Vec<CourseSummary> {
        let mut groups: BTreeMap<(&str, &str, &str, &str), CourseSummary> = BTreeMap::new();
        for s in self.sessions {
            let key = (
                s.department.as_str(),
                s.semester.as_str(),
                s.batch_id.as_str(),
                s.course_id.as_str(),
            );
            let entry = groups.entry(key).or_insert_with(|| CourseSummary {
                department: s.department.clone(),
                semester: s.semester.clone(),
                batch_id: s.batch_id.clone(),
                course_id: s.course_id.clone(),
                course_name: s.course_name.clone(),
                faculty_id: s.faculty_id.clone(),
                required: BTreeMap::new(),
                scheduled: BTreeMap::new(),
                missing: String::new(),
            });
            *entry.required.entry(s.kind).or_default() += 1;
            if s.is_committed() {
                *entry.scheduled.entry(s.kind).or_default() += 1;
            }
        }

        groups
            .into_values()
            .map(|mut c| {
                c.missing = SUMMARY_KINDS
                    .iter()
                    .filter_map(|k| {
                        let req = c.required.get(k).copied().unwrap_or(0);
                        let done = c.scheduled.get(k).copied().unwrap_or(0);
                        (done < req).then(|| format!("{}:{}", k.code(), req - done))
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                c
            })
            .collect()
    }

    /// Assembles the full output document.
    pub fn document(&self, kpi: TimetableKpi) -> ReportDocument {
        ReportDocument {
            grids: self
                .groups()
                .into_iter()
                .map(|(d, s)| self.build_grid(d, s))
                .collect(),
            batch_grids: self
                .batches()
                .into_iter()
                .map(|b| self.build_batch_grid(b))
                .collect(),
            unscheduled: self.unscheduled_report(),
            course_summary: self.course_summary(),
            kpi,
        }
    }

    fn grid_for(
        &self,
        department: &str,
        semester: &str,
        batch_id: Option<&str>,
        include: impl Fn(&Session) -> bool,
    ) -> TimetableGrid {
        let sem = (!semester.is_empty()).then_some(semester);
        let mut days: Vec<DayRow> = (0..self.grid.days())
            .map(|day| DayRow {
                day,
                name: self.config.day_name(day).to_string(),
                cells: (0..self.grid.slots_per_day())
                    .map(|slot| {
                        if self.grid.is_break(slot, sem) {
                            GridCell::Break
                        } else {
                            GridCell::Free
                        }
                    })
                    .collect(),
            })
            .collect();

        // Sessions are visited in id order, so entries within a cell are too.
        for s in self.sessions.iter().filter(|s| include(s)) {
            let Some(p) = s.placement() else { continue };
            for slot in p.range.slots() {
                let Some(cell) = days
                    .get_mut(slot.day as usize)
                    .and_then(|d| d.cells.get_mut(slot.slot as usize))
                else {
                    continue;
                };
                let entry = GridEntry {
                    session_id: s.id,
                    course_id: s.course_id.clone(),
                    course_name: s.course_name.clone(),
                    kind: s.kind,
                    batch_id: s.batch_id.clone(),
                    room_id: p.room_id.clone(),
                    faculty_id: p.faculty_id.clone(),
                    basket_id: s.basket_id.clone(),
                };
                match cell {
                    GridCell::Sessions(entries) => entries.push(entry),
                    other => *other = GridCell::Sessions(vec![entry]),
                }
            }
        }

        TimetableGrid {
            department: department.to_string(),
            semester: semester.to_string(),
            batch_id: batch_id.map(str::to_string),
            slot_labels: (0..self.grid.slots_per_day())
                .map(|s| self.config.slot_label(s))
                .collect(),
            days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Placement, RoomType, SessionStatus, SlotRange};

    fn session(id: u32, course: &str, batch: &str, kind: SessionKind, status: SessionStatus) -> Session {
        Session {
            id: SessionId(id),
            course_id: course.into(),
            course_name: format!("{course} name"),
            department: "CSE".into(),
            semester: "3".into(),
            batch_id: batch.into(),
            headcount: 40,
            kind,
            duration: 2,
            room_type: RoomType::LectureHall,
            faculty_id: "F1".into(),
            basket_id: None,
            occurrence: 1,
            status,
        }
    }

    fn placed(room: &str, range: SlotRange) -> SessionStatus {
        SessionStatus::Committed(Placement {
            room_id: room.into(),
            faculty_id: "F1".into(),
            range,
        })
    }

    fn fixture() -> (Vec<Session>, WeekGrid, TimetableConfig) {
        let sessions = vec![
            session(0, "CS301", "CSE3_A", SessionKind::Lecture, placed("LH1", SlotRange::new(0, 0, 2))),
            session(1, "CS301", "CSE3_B", SessionKind::Lecture, placed("LH2", SlotRange::new(0, 0, 2))),
            session(2, "CS302", "CSE3_A", SessionKind::Lab, SessionStatus::Unscheduled(UnscheduledReason::RoomsFullyBooked)),
            session(3, "CS301", "CSE3_A", SessionKind::Lecture, SessionStatus::Unscheduled(UnscheduledReason::BatchFullyBooked)),
        ];
        let config = TimetableConfig::compact(2, 4).with_break(3);
        let grid = config.week_grid(["3"]);
        (sessions, grid, config)
    }

    #[test]
    fn test_build_grid() {
        let (sessions, grid, config) = fixture();
        let report = ScheduleReport::new(&sessions, &grid, &config);
        let g = report.build_grid("CSE", "3");

        assert_eq!(g.days.len(), 2);
        assert_eq!(g.days[0].cells.len(), 4);
        assert_eq!(g.days[1].name, "Day 2");
        assert_eq!(g.slot_labels[0], "09:00-09:30");
        // both sections share the first two cells
        let cell = g.cell(TimeSlot::new(0, 1)).unwrap();
        assert_eq!(cell.entries().len(), 2);
        assert_eq!(cell.entries()[0].session_id, SessionId(0));
        assert_eq!(cell.entries()[0].label(), "CS301 LEC (LH1)");
        assert_eq!(g.cell(TimeSlot::new(0, 2)), Some(&GridCell::Free));
        assert_eq!(g.cell(TimeSlot::new(1, 3)), Some(&GridCell::Break));
        assert_eq!(g.session_count(), 2);
    }

    #[test]
    fn test_build_grid_other_department_is_empty() {
        let (sessions, grid, config) = fixture();
        let report = ScheduleReport::new(&sessions, &grid, &config);
        assert_eq!(report.build_grid("ECE", "3").session_count(), 0);
    }

    #[test]
    fn test_build_batch_grid() {
        let (sessions, grid, config) = fixture();
        let report = ScheduleReport::new(&sessions, &grid, &config);
        let g = report.build_batch_grid("CSE3_B");
        assert_eq!(g.batch_id.as_deref(), Some("CSE3_B"));
        assert_eq!(g.session_count(), 1);
        assert_eq!(g.cell(TimeSlot::new(0, 0)).unwrap().entries()[0].room_id, "LH2");
    }

    #[test]
    fn test_unscheduled_report_order() {
        let (sessions, grid, config) = fixture();
        let report = ScheduleReport::new(&sessions, &grid, &config);
        let u = report.unscheduled_report();
        assert_eq!(u.len(), 2);
        // CS301 before CS302 within CSE
        assert_eq!(u[0].course_id, "CS301");
        assert_eq!(u[0].code, "BatchFullyBooked");
        assert_eq!(u[1].course_id, "CS302");
        assert_eq!(u[1].message, "all suitable rooms taken");
    }

    #[test]
    fn test_course_summary() {
        let (sessions, grid, config) = fixture();
        let report = ScheduleReport::new(&sessions, &grid, &config);
        let summary = report.course_summary();

        let keys: Vec<(&str, &str)> = summary
            .iter()
            .map(|c| (c.batch_id.as_str(), c.course_id.as_str()))
            .collect();
        assert_eq!(keys, vec![("CSE3_A", "CS301"), ("CSE3_A", "CS302"), ("CSE3_B", "CS301")]);
        assert_eq!(summary[0].missing, "LEC:1");
        assert_eq!(summary[1].missing, "LAB:1");
        assert!(summary[2].is_complete());
    }

    #[test]
    fn test_document_serializes() {
        let (sessions, grid, config) = fixture();
        let report = ScheduleReport::new(&sessions, &grid, &config);
        let kpi = TimetableKpi::calculate(&sessions, &[], &grid);
        let doc = report.document(kpi);
        assert_eq!(doc.grids.len(), 1);
        assert_eq!(doc.batch_grids.len(), 2);

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["grids"][0]["days"][0]["cells"][2]["state"], "Free");
        assert_eq!(json["unscheduled"][0]["code"], "BatchFullyBooked");
        assert_eq!(json["course_summary"][0]["required"]["Lecture"], 2);
    }
}
