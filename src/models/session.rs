//! Session (schedulable unit) model.
//!
//! A session is one weekly occurrence of a course component. It starts
//! `Pending`, goes through the placement engine exactly once and ends in
//! either `Committed` or `Unscheduled`.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{FacultyId, RoomType, SessionKind, SlotRange};

/// Session identifier, dense and assigned in catalog input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u32);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One atomic weekly occurrence of a course component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier.
    pub id: SessionId,
    /// Owning course code.
    pub course_id: String,
    /// Course title (for reports).
    pub course_name: String,
    /// Owning department.
    pub department: String,
    /// Semester label.
    pub semester: String,
    /// Attending batch.
    pub batch_id: String,
    /// Attending headcount (copied from the batch).
    pub headcount: u32,
    /// Session kind.
    pub kind: SessionKind,
    /// Length in slots.
    pub duration: u16,
    /// Required room type.
    pub room_type: RoomType,
    /// Teaching faculty.
    pub faculty_id: FacultyId,
    /// Elective basket, if any.
    pub basket_id: Option<String>,
    /// Occurrence number within the course component (1-based).
    pub occurrence: u32,
    /// Current state.
    pub status: SessionStatus,
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Not yet attempted.
    Pending,
    /// Placed.
    Committed(Placement),
    /// No feasible placement.
    Unscheduled(UnscheduledReason),
}

/// Where and with whom a committed session runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Assigned room.
    pub room_id: String,
    /// Assigned faculty.
    pub faculty_id: FacultyId,
    /// Occupied slots.
    pub range: SlotRange,
}

/// Why a session could not be placed.
///
/// Variants are listed in reporting priority: when several causes apply,
/// the engine reports the first one that holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnscheduledReason {
    /// No room of the required type seats the batch.
    NoRoomOfType {
        room_type: RoomType,
        min_capacity: u32,
    },
    /// The grid has no break-free run of the required length.
    NoWindowOfDuration { duration: u16 },
    /// The faculty is busy somewhere in every window of the required
    /// duration.
    FacultyFullyBooked,
    /// The batch is busy somewhere in every window of the required duration.
    ///
    /// Free single slots that never line up into such a window count as
    /// busy, so a batch can have idle slots and still be reported here.
    BatchFullyBooked,
    /// Faculty and batch are free together only on days where the faculty
    /// already teaches `limit` sessions.
    FacultyDailyLimit { limit: u16 },
    /// Every jointly free window lies within `gap` slots of another lecture
    /// or tutorial of the same course for the batch.
    CourseSpacing { gap: u16 },
    /// Every remaining window would leave the batch fewer than `slots` idle
    /// slots next to another of its sessions.
    BatchBuffer { slots: u16 },
    /// A room, faculty and batch were free together, but only in windows
    /// already taken by a sibling of the same elective basket.
    BasketConflictOnly { basket_id: String },
    /// Faculty and batch are free together, but every suitable room is taken.
    RoomsFullyBooked,
    /// Constraints are each satisfiable but never simultaneously, or the
    /// per-session search cap ran out.
    SearchExhausted { candidates_checked: usize },
}

impl UnscheduledReason {
    /// Stable short code.
    pub fn code(&self) -> &'static str {
        match self {
            UnscheduledReason::NoRoomOfType { .. } => "NoRoomOfType",
            UnscheduledReason::NoWindowOfDuration { .. } => "NoWindowOfDuration",
            UnscheduledReason::FacultyFullyBooked => "FacultyFullyBooked",
            UnscheduledReason::BatchFullyBooked => "BatchFullyBooked",
            UnscheduledReason::FacultyDailyLimit { .. } => "FacultyDailyLimit",
            UnscheduledReason::CourseSpacing { .. } => "CourseSpacing",
            UnscheduledReason::BatchBuffer { .. } => "BatchBuffer",
            UnscheduledReason::BasketConflictOnly { .. } => "BasketConflictOnly",
            UnscheduledReason::RoomsFullyBooked => "RoomsFullyBooked",
            UnscheduledReason::SearchExhausted { .. } => "SearchExhausted",
        }
    }
}

impl fmt::Display for UnscheduledReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnscheduledReason::NoRoomOfType {
                room_type,
                min_capacity,
            } => write!(f, "no {room_type} room seats {min_capacity}"),
            UnscheduledReason::NoWindowOfDuration { duration } => {
                write!(f, "no break-free run of {duration} slots")
            }
            UnscheduledReason::FacultyFullyBooked => f.write_str("faculty has no free window"),
            UnscheduledReason::BatchFullyBooked => f.write_str("batch has no free window"),
            UnscheduledReason::FacultyDailyLimit { limit } => {
                write!(f, "faculty already teaches {limit} sessions on every open day")
            }
            UnscheduledReason::CourseSpacing { gap } => {
                write!(f, "no window {gap} slots away from the course's other sessions")
            }
            UnscheduledReason::BatchBuffer { slots } => {
                write!(f, "no window leaves {slots} idle slots around the batch's sessions")
            }
            UnscheduledReason::BasketConflictOnly { basket_id } => {
                write!(f, "blocked only by basket {basket_id}")
            }
            UnscheduledReason::RoomsFullyBooked => f.write_str("all suitable rooms taken"),
            UnscheduledReason::SearchExhausted { candidates_checked } => {
                write!(f, "search exhausted after {candidates_checked} candidates")
            }
        }
    }
}

impl Session {
    /// Whether the session has been placed.
    pub fn is_committed(&self) -> bool {
        matches!(self.status, SessionStatus::Committed(_))
    }

    /// Whether the session ended unscheduled.
    pub fn is_unscheduled(&self) -> bool {
        matches!(self.status, SessionStatus::Unscheduled(_))
    }

    /// Placement, when committed.
    pub fn placement(&self) -> Option<&Placement> {
        match &self.status {
            SessionStatus::Committed(p) => Some(p),
            _ => None,
        }
    }

    /// Unscheduled reason, when unscheduled.
    pub fn reason(&self) -> Option<&UnscheduledReason> {
        match &self.status {
            SessionStatus::Unscheduled(r) => Some(r),
            _ => None,
        }
    }

    /// Short display label, e.g. `CS301 LEC`.
    pub fn label(&self) -> String {
        format!("{} {}", self.course_id, self.kind)
    }
}
