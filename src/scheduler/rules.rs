//! Optional placement rules.
//!
//! Every rule is off by default. When enabled, a rule is checked per window
//! next to the resource checks. If a rule is the only thing standing in the
//! way, [`diagnose`](super::diagnosis::diagnose) names it.
//!
//! | Rule | Window rejected when |
//! |------|----------------------|
//! | `faculty_daily_limit` | the faculty already teaches that many sessions on the day |
//! | `course_gap_slots` | another lecture or tutorial of the course for the batch is closer than the gap |
//! | `batch_buffer_slots` | the batch has a session within that many slots before or after |

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::diagnosis::Attempt;
use crate::basket::lookup;
use crate::calendar::ResourceKind;
use crate::models::{Session, SessionId, SessionKind, SlotRange};

/// Soft institutional rules, promoted to hard per-window checks.
///
/// # Example
///
/// ```
/// use u_timetable::scheduler::PlacementRules;
///
/// let rules = PlacementRules::default()
///     .with_faculty_daily_limit(2)
///     .with_course_gap(6);
/// assert_eq!(rules.batch_buffer_slots, 0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementRules {
    /// Most sessions one faculty member teaches per day.
    ///
    /// Basket sessions count once per course. When the session's own
    /// basket already meets that day for the batch, one more is allowed.
    pub faculty_daily_limit: Option<u16>,
    /// Minimum idle slots between two lectures or tutorials of the same
    /// course for the same batch on one day. Six is three hours of
    /// 30 minute slots.
    pub course_gap_slots: Option<u16>,
    /// Idle slots the batch keeps before and after each session.
    pub batch_buffer_slots: u16,
}

/// What a faculty member's day is counted in.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Taught<'a> {
    Session(SessionId),
    Elective(&'a str),
}

impl PlacementRules {
    /// Limits sessions per faculty per day.
    pub fn with_faculty_daily_limit(mut self, limit: u16) -> Self {
        self.faculty_daily_limit = Some(limit);
        self
    }

    /// Spaces lectures and tutorials of one course at least `slots` apart.
    pub fn with_course_gap(mut self, slots: u16) -> Self {
        self.course_gap_slots = Some(slots);
        self
    }

    /// Keeps `slots` idle slots around each batch session.
    pub fn with_batch_buffer(mut self, slots: u16) -> Self {
        self.batch_buffer_slots = slots;
        self
    }

    /// Whether every enabled rule accepts the window.
    pub(crate) fn admits(&self, attempt: &Attempt<'_>, range: SlotRange) -> bool {
        self.faculty_day_open(attempt, range.day)
            && self.spacing_open(attempt, range)
            && self.buffer_open(attempt, range)
    }

    pub(crate) fn faculty_day_open(&self, attempt: &Attempt<'_>, day: u8) -> bool {
        let Some(limit) = self.faculty_daily_limit else {
            return true;
        };
        let taught: BTreeSet<Taught<'_>> = attempt
            .calendar
            .occupied(ResourceKind::Faculty, &attempt.session.faculty_id)
            .filter(|(slot, _)| slot.day == day)
            .map(|(_, occ)| match lookup(attempt.sessions, occ.session) {
                Some(s) if s.basket_id.is_some() => Taught::Elective(s.course_id.as_str()),
                _ => Taught::Session(occ.session),
            })
            .collect();

        let limit = if basket_meets_on(attempt, day) {
            limit.saturating_add(1)
        } else {
            limit
        };
        taught.len() < limit as usize
    }

    pub(crate) fn spacing_open(&self, attempt: &Attempt<'_>, range: SlotRange) -> bool {
        let Some(gap) = self.course_gap_slots else {
            return true;
        };
        let s = attempt.session;
        if !is_spaced(s.kind) {
            return true;
        }
        attempt
            .calendar
            .occupied(ResourceKind::Batch, &s.batch_id)
            .filter(|(slot, _)| slot.day == range.day)
            .filter_map(|(_, occ)| lookup(attempt.sessions, occ.session))
            .filter(|other| other.course_id == s.course_id && is_spaced(other.kind))
            .filter_map(Session::placement)
            .all(|p| idle_between(p.range, range) >= gap)
    }

    pub(crate) fn buffer_open(&self, attempt: &Attempt<'_>, range: SlotRange) -> bool {
        let pad = self.batch_buffer_slots;
        if pad == 0 {
            return true;
        }
        let last = attempt.calendar.grid().slots_per_day();
        let before_start = range.start.saturating_sub(pad);
        let after_end = range.end().saturating_add(pad).min(last);
        let before = SlotRange::new(range.day, before_start, range.start - before_start);
        let after = SlotRange::new(range.day, range.end(), after_end.saturating_sub(range.end()));
        attempt.batch_free(before) && attempt.batch_free(after)
    }
}

fn is_spaced(kind: SessionKind) -> bool {
    matches!(kind, SessionKind::Lecture | SessionKind::Tutorial)
}

/// Idle slots between two ranges of the same day, zero if they touch or overlap.
fn idle_between(a: SlotRange, b: SlotRange) -> u16 {
    if a.end() <= b.start {
        b.start - a.end()
    } else if b.end() <= a.start {
        a.start - b.end()
    } else {
        0
    }
}

fn basket_meets_on(attempt: &Attempt<'_>, day: u8) -> bool {
    let Some(basket) = attempt.session.basket_id.as_deref() else {
        return false;
    };
    attempt
        .baskets
        .members(basket, &attempt.session.batch_id)
        .iter()
        .filter_map(|&id| lookup(attempt.sessions, id))
        .filter_map(Session::placement)
        .any(|p| p.range.day == day)
}
