//! Greedy constraint placement.
//!
//! # Algorithm
//!
//! For each session, in catalog order:
//! 1. Enumerate break-free windows of the session's duration, day ascending
//!    then slot ascending.
//! 2. Per window, require the faculty free, the batch free (cells held by
//!    the session's own basket excepted), no overlapping basket sibling and
//!    every enabled [`PlacementRules`] rule satisfied.
//! 3. Try candidate rooms (required type, capacity ≥ headcount) tightest
//!    first; commit the first free one.
//! 4. If nothing commits, classify the blocking cause
//!    ([`diagnose`](super::diagnosis::diagnose)) and mark the session
//!    unscheduled.
//!
//! A single pass, no backtracking: committed sessions are never moved.
//!
//! # Complexity
//! O(n · w · r) where n=sessions, w=windows per session, r=candidate rooms.

use tracing::{debug, info, instrument, warn};

use super::diagnosis::{diagnose, Attempt};
use super::rules::PlacementRules;
use crate::basket::BasketResolver;
use crate::calendar::{Commitment, ResourceCalendar, ResourceKind};
use crate::error::ConflictError;
use crate::models::{Placement, Room, Session, SessionId, SessionStatus, SlotRange, UnscheduledReason};

/// Counters for one engine run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Sessions the engine looked at.
    pub attempted: usize,
    /// Sessions committed.
    pub committed: usize,
    /// Sessions marked unscheduled.
    pub unscheduled: usize,
    /// (window, room) pairs examined across all sessions.
    pub candidates_checked: usize,
}

/// Search outcome for one session, before it is written back.
enum Outcome {
    Place { room: usize, range: SlotRange, checked: usize },
    Capped { checked: usize },
    Exhausted { checked: usize },
}

/// Single-pass greedy placement engine.
///
/// # Example
///
/// ```
/// use u_timetable::basket::BasketResolver;
/// use u_timetable::calendar::ResourceCalendar;
/// use u_timetable::catalog::SessionCatalog;
/// use u_timetable::config::SessionDurations;
/// use u_timetable::models::{Batch, Course, Room, WeekGrid};
/// use u_timetable::scheduler::PlacementEngine;
///
/// let rooms = vec![Room::lecture_hall("LH1", 60)];
/// let batches = vec![Batch::new("CSE3", "CSE", "3", 50)];
/// let courses = vec![Course::new("CS301", "CSE", "3", "CSE3", "F1").with_periods(2)];
///
/// let mut baskets = BasketResolver::new();
/// let (mut sessions, order) =
///     SessionCatalog::build(&courses, &batches, &baskets, &SessionDurations::uniform(1)).into_parts();
/// let mut calendar = ResourceCalendar::new(WeekGrid::new(5, 6));
///
/// let engine = PlacementEngine::new(&rooms);
/// let summary = engine.run(&mut calendar, &mut baskets, &mut sessions, &order).unwrap();
/// assert_eq!(summary.committed, 2);
/// ```
#[derive(Debug, Clone)]
pub struct PlacementEngine<'a> {
    rooms: &'a [Room],
    max_candidates: usize,
    rules: PlacementRules,
}

impl<'a> PlacementEngine<'a> {
    /// Creates an engine over a room inventory with no search cap.
    pub fn new(rooms: &'a [Room]) -> Self {
        Self {
            rooms,
            max_candidates: usize::MAX,
            rules: PlacementRules::default(),
        }
    }

    /// Enables optional placement rules.
    pub fn with_rules(mut self, rules: PlacementRules) -> Self {
        self.rules = rules;
        self
    }

    /// Caps the (window, room) pairs examined per session.
    ///
    /// A session that hits the cap is unscheduled with `SearchExhausted`.
    pub fn with_max_candidates(mut self, cap: usize) -> Self {
        self.max_candidates = cap.max(1);
        self
    }

    /// Rooms that can host the session, tightest fit first.
    ///
    /// Ties on capacity keep inventory order.
    pub fn candidate_rooms(&self, session: &Session) -> Vec<&'a Room> {
        let mut rooms: Vec<&Room> = self
            .rooms
            .iter()
            .filter(|r| r.suits(&session.room_type, session.headcount))
            .collect();
        rooms.sort_by_key(|r| r.capacity);
        rooms
    }

    /// Places every pending session named in `order`.
    ///
    /// Sessions that are not `Pending` are skipped, so a run is never
    /// applied twice to the same session.
    ///
    /// # Errors
    /// Returns the calendar's [`ConflictError`] if a commit that passed
    /// every feasibility check is rejected. That is an internal defect;
    /// the run stops there.
    #[instrument(skip_all, fields(sessions = order.len()))]
    pub fn run(
        &self,
        calendar: &mut ResourceCalendar,
        baskets: &mut BasketResolver,
        sessions: &mut [Session],
        order: &[SessionId],
    ) -> Result<RunSummary, ConflictError> {
        let mut summary = RunSummary::default();

        for &id in order {
            let Some(idx) = position(sessions, id) else {
                warn!(session = %id, "ordered session not in table, skipped");
                continue;
            };
            if sessions[idx].status != SessionStatus::Pending {
                continue;
            }
            summary.attempted += 1;

            let (status, checked) = self.place(calendar, baskets, sessions, idx)?;
            summary.candidates_checked += checked;
            match &status {
                SessionStatus::Committed(p) => {
                    summary.committed += 1;
                    debug!(session = %id, course = %sessions[idx].course_id, room = %p.room_id, range = %p.range, "placed");
                }
                SessionStatus::Unscheduled(reason) => {
                    summary.unscheduled += 1;
                    debug!(session = %id, course = %sessions[idx].course_id, reason = reason.code(), "unscheduled");
                }
                SessionStatus::Pending => {}
            }
            sessions[idx].status = status;
            if sessions[idx].is_committed() {
                baskets.register(&sessions[idx]);
            }
        }

        info!(
            attempted = summary.attempted,
            committed = summary.committed,
            unscheduled = summary.unscheduled,
            "placement finished"
        );
        Ok(summary)
    }

    /// Resolves one session to its terminal status, committing on success.
    ///
    /// Returns the status and the number of candidates examined.
    fn place(
        &self,
        calendar: &mut ResourceCalendar,
        baskets: &BasketResolver,
        sessions: &[Session],
        idx: usize,
    ) -> Result<(SessionStatus, usize), ConflictError> {
        let session = &sessions[idx];
        let rooms = self.candidate_rooms(session);
        let windows = calendar.grid().windows(session.duration, Some(&session.semester));

        let (room, range, checked) = {
            let attempt = Attempt {
                calendar: &*calendar,
                baskets,
                sessions,
                session,
                rooms: &rooms,
                windows: &windows,
                rules: &self.rules,
            };
            let outcome = if rooms.is_empty() {
                Outcome::Exhausted { checked: 0 }
            } else {
                self.search(&attempt)
            };
            match outcome {
                Outcome::Place { room, range, checked } => (rooms[room], range, checked),
                Outcome::Capped { checked } => {
                    let reason = UnscheduledReason::SearchExhausted {
                        candidates_checked: checked,
                    };
                    return Ok((SessionStatus::Unscheduled(reason), checked));
                }
                Outcome::Exhausted { checked } => {
                    return Ok((SessionStatus::Unscheduled(diagnose(&attempt, checked)), checked));
                }
            }
        };

        calendar.commit(&Commitment {
            session: session.id,
            room_id: &room.id,
            faculty_id: &session.faculty_id,
            batch_id: &session.batch_id,
            semester: &session.semester,
            basket: session.basket_id.as_deref(),
            range,
        })?;
        let placement = Placement {
            room_id: room.id.clone(),
            faculty_id: session.faculty_id.clone(),
            range,
        };
        Ok((SessionStatus::Committed(placement), checked))
    }

    fn search(&self, attempt: &Attempt<'_>) -> Outcome {
        let mut checked = 0usize;

        for &range in attempt.windows {
            let open = attempt.faculty_free(range)
                && attempt.batch_free(range)
                && !attempt.basket_blocked(range)
                && self.rules.admits(attempt, range);

            if !open {
                checked += attempt.rooms.len();
                if checked >= self.max_candidates {
                    return Outcome::Capped { checked };
                }
                continue;
            }
            for (i, room) in attempt.rooms.iter().enumerate() {
                checked += 1;
                if attempt.calendar.is_free(ResourceKind::Room, &room.id, range) {
                    return Outcome::Place { room: i, range, checked };
                }
                if checked >= self.max_candidates {
                    return Outcome::Capped { checked };
                }
            }
        }
        Outcome::Exhausted { checked }
    }
}

/// Index of a session in the table. Ids are dense, so the index is tried first.
fn position(sessions: &[Session], id: SessionId) -> Option<usize> {
    match sessions.get(id.0 as usize) {
        Some(s) if s.id == id => Some(id.0 as usize),
        _ => sessions.iter().position(|s| s.id == id),
    }
}
