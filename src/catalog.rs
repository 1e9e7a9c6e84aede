//! Session catalog.
//!
//! Expands course records into atomic sessions and fixes the order in which
//! the placement engine attempts them.
//!
//! # Expansion
//! A course component with `N` weekly periods yields `N` independent
//! sessions (no adjacency between them). Session ids are dense and follow
//! input order.
//!
//! # Ordering
//! Sessions are attempted by decreasing constraint pressure, see
//! [`pressure_cmp`]. Order affects outcome quality only, never validity.

use std::cmp::{Ordering, Reverse};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::basket::BasketResolver;
use crate::config::SessionDurations;
use crate::models::{Batch, Course, Session, SessionId, SessionKind, SessionStatus};

/// Expanded, ordered work queue.
#[derive(Debug, Clone, Default)]
pub struct SessionCatalog {
    sessions: Vec<Session>,
    order: Vec<SessionId>,
}

impl SessionCatalog {
    /// Expands courses into sessions.
    ///
    /// Courses whose batch is unknown are skipped with a warning; run
    /// [`validate_input`](crate::validation::validate_input) first to turn
    /// that into a hard error. A course without a basket id inherits the
    /// basket its batch registered it under. Department and semester come
    /// from the batch, since meal breaks and report sheets are keyed by it.
    pub fn build(
        courses: &[Course],
        batches: &[Batch],
        baskets: &BasketResolver,
        durations: &SessionDurations,
    ) -> Self {
        let batch_index: BTreeMap<&str, &Batch> = batches.iter().map(|b| (b.id.as_str(), b)).collect();
        let mut sessions = Vec::new();

        for course in courses {
            let Some(batch) = batch_index.get(course.batch_id.as_str()) else {
                warn!(course = %course.id, batch = %course.batch_id, "course references unknown batch, skipped");
                continue;
            };
            let basket_id = course.basket_id.clone().or_else(|| {
                baskets
                    .registered_basket(&course.batch_id, &course.id)
                    .map(str::to_string)
            });
            let duration = course.duration.unwrap_or_else(|| durations.get(course.kind));

            for occurrence in 1..=course.weekly_periods {
                sessions.push(Session {
                    id: SessionId(sessions.len() as u32),
                    course_id: course.id.clone(),
                    course_name: course.name.clone(),
                    department: batch.department.clone(),
                    semester: batch.semester.clone(),
                    batch_id: course.batch_id.clone(),
                    headcount: batch.headcount,
                    kind: course.kind,
                    duration,
                    room_type: course.room_type.clone(),
                    faculty_id: course.faculty_id.clone(),
                    basket_id: basket_id.clone(),
                    occurrence,
                    status: SessionStatus::Pending,
                });
            }
        }

        let mut order: Vec<usize> = (0..sessions.len()).collect();
        order.sort_by(|&a, &b| pressure_cmp(&sessions[a], &sessions[b]));
        let order = order.into_iter().map(|i| sessions[i].id).collect();

        debug!(courses = courses.len(), sessions = sessions.len(), "catalog built");
        Self { sessions, order }
    }

    /// Sessions in id (input) order.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Session ids in attempt order.
    pub fn order(&self) -> &[SessionId] {
        &self.order
    }

    /// Sessions in attempt order.
    pub fn ordered(&self) -> impl Iterator<Item = &Session> {
        self.order.iter().map(|id| &self.sessions[id.0 as usize])
    }

    /// Number of sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Splits into the session table and the attempt order.
    pub fn into_parts(self) -> (Vec<Session>, Vec<SessionId>) {
        (self.sessions, self.order)
    }
}

/// Constraint-pressure comparator (less = attempted earlier).
///
/// Keys, in order:
/// 1. labs and multi-slot sessions before single-slot non-labs
/// 2. larger batch headcount first
/// 3. kind rank: lab, lecture, tutorial, self-study
/// 4. session id (input order)
pub fn pressure_cmp(a: &Session, b: &Session) -> Ordering {
    pressure_key(a).cmp(&pressure_key(b))
}

fn pressure_key(s: &Session) -> (u8, Reverse<u32>, u8, SessionId) {
    let tier = if s.kind == SessionKind::Lab || s.duration > 1 { 0 } else { 1 };
    (tier, Reverse(s.headcount), s.kind.rank(), s.id)
}
