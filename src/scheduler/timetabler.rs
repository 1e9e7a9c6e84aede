//! End-to-end timetabling run.
//!
//! # Pipeline
//!
//! 1. Validate configuration and input (fail fast).
//! 2. Build the week grid, staggering meal breaks over the batches' semesters.
//! 3. Expand courses into the ordered session catalog.
//! 4. Run the placement engine on a fresh calendar.
//! 5. Hand back a [`Timetable`] for reporting.

use std::collections::BTreeSet;
use tracing::{info, instrument, warn};

use super::engine::{PlacementEngine, RunSummary};
use super::kpi::TimetableKpi;
use crate::basket::BasketResolver;
use crate::calendar::ResourceCalendar;
use crate::catalog::SessionCatalog;
use crate::config::TimetableConfig;
use crate::error::{ConfigurationError, Result, TimetableError};
use crate::models::{Batch, Course, ElectiveRegistration, Room, Session, SessionId, WeekGrid};
use crate::report::{ReportDocument, ScheduleReport};
use crate::validation::{missing_room_types, validate_input};

/// Input container for a timetabling run.
#[derive(Debug, Clone, Default)]
pub struct TimetableInput {
    /// Course components to schedule.
    pub courses: Vec<Course>,
    /// Room inventory.
    pub rooms: Vec<Room>,
    /// Student batches (sections).
    pub batches: Vec<Batch>,
    /// Elective choices per batch.
    pub registrations: Vec<ElectiveRegistration>,
}

impl TimetableInput {
    /// Creates an input without elective registrations.
    pub fn new(courses: Vec<Course>, rooms: Vec<Room>, batches: Vec<Batch>) -> Self {
        Self {
            courses,
            rooms,
            batches,
            registrations: Vec::new(),
        }
    }

    /// Sets elective registrations.
    pub fn with_registrations(mut self, registrations: Vec<ElectiveRegistration>) -> Self {
        self.registrations = registrations;
        self
    }

    /// Distinct semesters of the batches, sorted.
    pub fn semesters(&self) -> BTreeSet<&str> {
        self.batches.iter().map(|b| b.semester.as_str()).collect()
    }
}

/// Result of a completed run.
///
/// Every catalog session is in [`sessions`](Timetable::sessions) exactly
/// once, either committed or unscheduled with a reason.
#[derive(Debug, Clone)]
pub struct Timetable {
    config: TimetableConfig,
    calendar: ResourceCalendar,
    sessions: Vec<Session>,
    order: Vec<SessionId>,
    rooms: Vec<Room>,
    summary: RunSummary,
}

impl Timetable {
    /// Configuration the run used.
    pub fn config(&self) -> &TimetableConfig {
        &self.config
    }

    /// Final calendar state.
    pub fn calendar(&self) -> &ResourceCalendar {
        &self.calendar
    }

    /// Week grid, breaks included.
    pub fn grid(&self) -> &WeekGrid {
        self.calendar.grid()
    }

    /// All sessions in id order.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Order in which sessions were attempted.
    pub fn order(&self) -> &[SessionId] {
        &self.order
    }

    /// Committed sessions in id order.
    pub fn committed(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter().filter(|s| s.is_committed())
    }

    /// Unscheduled sessions in id order.
    pub fn unscheduled(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter().filter(|s| s.is_unscheduled())
    }

    /// Engine counters.
    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Whether every session was placed.
    pub fn is_complete(&self) -> bool {
        self.sessions.iter().all(Session::is_committed)
    }

    /// Read-side projections for rendering.
    pub fn report(&self) -> ScheduleReport<'_> {
        ScheduleReport::new(&self.sessions, self.calendar.grid(), &self.config)
    }

    /// Quality metrics.
    pub fn kpi(&self) -> TimetableKpi {
        TimetableKpi::calculate(&self.sessions, &self.rooms, self.calendar.grid())
    }

    /// Everything a renderer needs, as one serializable document.
    pub fn document(&self) -> ReportDocument {
        self.report().document(self.kpi())
    }
}

/// Runs the whole pipeline for one configuration.
///
/// # Example
///
/// ```
/// use u_timetable::config::TimetableConfig;
/// use u_timetable::models::{Batch, Course, Room};
/// use u_timetable::scheduler::{TimetableInput, Timetabler};
///
/// let input = TimetableInput::new(
///     vec![Course::new("CS301", "CSE", "3", "CSE3", "Dr. Rao").with_periods(2)],
///     vec![Room::lecture_hall("LH1", 60)],
///     vec![Batch::new("CSE3", "CSE", "3", 50)],
/// );
///
/// let timetable = Timetabler::new(TimetableConfig::compact(5, 6)).run(&input).unwrap();
/// assert!(timetable.is_complete());
/// assert_eq!(timetable.committed().count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Timetabler {
    config: TimetableConfig,
}

impl Timetabler {
    /// Creates a timetabler.
    pub fn new(config: TimetableConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &TimetableConfig {
        &self.config
    }

    /// Validates, expands and places.
    ///
    /// # Errors
    /// - [`TimetableError::Configuration`] for an unusable grid, a semester
    ///   left with no teaching slot, or a room type no room provides when
    ///   `strict_room_types` is set
    /// - [`TimetableError::InvalidInput`] for malformed records
    /// - [`TimetableError::Conflict`] if the engine tries to double-book
    #[instrument(skip_all, fields(courses = input.courses.len(), rooms = input.rooms.len(), batches = input.batches.len()))]
    pub fn run(&self, input: &TimetableInput) -> Result<Timetable> {
        self.config.validate()?;
        validate_input(&input.courses, &input.rooms, &input.batches, &input.registrations)
            .map_err(TimetableError::InvalidInput)?;

        for (room_type, sessions) in missing_room_types(&input.courses, &input.rooms) {
            if self.config.strict_room_types {
                return Err(ConfigurationError::MissingRoomType {
                    room_type: room_type.to_string(),
                    sessions,
                }
                .into());
            }
            warn!(%room_type, sessions, "no room of required type, sessions will stay unscheduled");
        }

        let grid = self.config.teaching_grid(input.semesters())?;
        let mut baskets = BasketResolver::new().with_registrations(&input.registrations);
        let catalog = SessionCatalog::build(&input.courses, &input.batches, &baskets, &self.config.durations);
        let (mut sessions, order) = catalog.into_parts();

        let mut calendar = ResourceCalendar::new(grid);
        let summary = PlacementEngine::new(&input.rooms)
            .with_max_candidates(self.config.max_candidates_per_session)
            .with_rules(self.config.rules)
            .run(&mut calendar, &mut baskets, &mut sessions, &order)?;

        info!(
            sessions = sessions.len(),
            committed = summary.committed,
            unscheduled = summary.unscheduled,
            "timetable built"
        );

        Ok(Timetable {
            config: self.config.clone(),
            calendar,
            sessions,
            order,
            rooms: input.rooms.clone(),
            summary,
        })
    }
}
