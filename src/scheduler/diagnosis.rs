//! Unscheduled-reason classification.
//!
//! When the search finds no (window, room) pair, the filters are re-run
//! one at a time to name the most actionable blocking cause. Causes are
//! tested in priority order and the first that holds is reported:
//!
//! | Reason | Holds when |
//! |--------|-----------|
//! | `NoRoomOfType` | no room of the type seats the batch |
//! | `NoWindowOfDuration` | the grid has no break-free run that long |
//! | `FacultyFullyBooked` | the faculty is busy in every window |
//! | `BatchFullyBooked` | the batch is busy in every window |
//! | `FacultyDailyLimit` | faculty and batch are jointly free only on days at the faculty's limit |
//! | `CourseSpacing` | the remaining windows sit too close to the course's other sessions |
//! | `BatchBuffer` | the remaining windows leave no idle buffer for the batch |
//! | `BasketConflictOnly` | some window had faculty, batch and a room free but a basket sibling overlaps it |
//! | `RoomsFullyBooked` | faculty and batch are jointly free somewhere, every room is taken there |
//!
//! The three rule reasons only appear when the rule is enabled in
//! [`PlacementRules`]. Each one narrows the jointly free windows that the
//! later checks look at.
//! | `SearchExhausted` | otherwise |

use super::rules::PlacementRules;
use crate::basket::BasketResolver;
use crate::calendar::{ResourceCalendar, ResourceKind};
use crate::models::{Room, Session, SlotRange, UnscheduledReason};

/// Read-only view of the state one session is placed against.
pub(crate) struct Attempt<'a> {
    pub calendar: &'a ResourceCalendar,
    pub baskets: &'a BasketResolver,
    pub sessions: &'a [Session],
    pub session: &'a Session,
    /// Candidate rooms, already filtered by type and capacity.
    pub rooms: &'a [&'a Room],
    /// Break-free windows of the session's duration.
    pub windows: &'a [SlotRange],
    pub rules: &'a PlacementRules,
}

impl Attempt<'_> {
    pub(crate) fn faculty_free(&self, range: SlotRange) -> bool {
        self.calendar
            .is_free(ResourceKind::Faculty, &self.session.faculty_id, range)
    }

    pub(crate) fn batch_free(&self, range: SlotRange) -> bool {
        self.calendar.is_batch_free_outside_basket(
            &self.session.batch_id,
            range,
            self.session.basket_id.as_deref(),
        )
    }

    pub(crate) fn room_free(&self, range: SlotRange) -> bool {
        self.rooms
            .iter()
            .any(|r| self.calendar.is_free(ResourceKind::Room, &r.id, range))
    }

    pub(crate) fn basket_blocked(&self, range: SlotRange) -> bool {
        self.baskets.conflicts_with_basket(
            &self.session.batch_id,
            self.session.basket_id.as_deref(),
            range,
            self.sessions,
        )
    }
}

/// Names the blocking cause of a failed placement.
///
/// `checked` is the number of candidates the search examined, reported by
/// the catch-all reason.
pub(crate) fn diagnose(attempt: &Attempt<'_>, checked: usize) -> UnscheduledReason {
    let s = attempt.session;
    let rules = attempt.rules;
    if attempt.rooms.is_empty() {
        return UnscheduledReason::NoRoomOfType {
            room_type: s.room_type.clone(),
            min_capacity: s.headcount,
        };
    }
    if attempt.windows.is_empty() {
        return UnscheduledReason::NoWindowOfDuration { duration: s.duration };
    }
    if !attempt.windows.iter().any(|&w| attempt.faculty_free(w)) {
        return UnscheduledReason::FacultyFullyBooked;
    }
    if !attempt.windows.iter().any(|&w| attempt.batch_free(w)) {
        return UnscheduledReason::BatchFullyBooked;
    }

    let mut joint: Vec<SlotRange> = attempt
        .windows
        .iter()
        .copied()
        .filter(|&w| attempt.faculty_free(w) && attempt.batch_free(w))
        .collect();

    if let Some(limit) = rules.faculty_daily_limit {
        if narrow(&mut joint, |w| rules.faculty_day_open(attempt, w.day)) {
            return UnscheduledReason::FacultyDailyLimit { limit };
        }
    }
    if let Some(gap) = rules.course_gap_slots {
        if narrow(&mut joint, |w| rules.spacing_open(attempt, w)) {
            return UnscheduledReason::CourseSpacing { gap };
        }
    }
    if rules.batch_buffer_slots > 0 && narrow(&mut joint, |w| rules.buffer_open(attempt, w)) {
        return UnscheduledReason::BatchBuffer {
            slots: rules.batch_buffer_slots,
        };
    }

    if let Some(basket_id) = &s.basket_id {
        let open_but_blocked = joint
            .iter()
            .any(|&w| attempt.room_free(w) && attempt.basket_blocked(w));
        if open_but_blocked {
            return UnscheduledReason::BasketConflictOnly {
                basket_id: basket_id.clone(),
            };
        }
    }
    if !joint.is_empty() && !joint.iter().any(|&w| attempt.room_free(w)) {
        return UnscheduledReason::RoomsFullyBooked;
    }
    UnscheduledReason::SearchExhausted {
        candidates_checked: checked,
    }
}

/// Keeps the windows a rule accepts. Returns `true` when the rule removed
/// every remaining window.
fn narrow(windows: &mut Vec<SlotRange>, accepts: impl Fn(SlotRange) -> bool) -> bool {
    if windows.is_empty() {
        return false;
    }
    windows.retain(|&w| accepts(w));
    windows.is_empty()
}
