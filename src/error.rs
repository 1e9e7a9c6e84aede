//! Error taxonomy.
//!
//! Only true failures live here. A session that cannot be placed is not an
//! error: it ends in [`SessionStatus::Unscheduled`](crate::models::SessionStatus)
//! and is reported.
//!
//! | Error | When | Recovery |
//! |-------|------|----------|
//! | [`ConflictError`] | calendar asked to double-book or to cover a break | none, placement logic is broken |
//! | [`ConfigurationError`] | grid or durations make scheduling meaningless | fix configuration |
//! | [`LoadError`] | CSV input could not be read | fix input files |

use thiserror::Error;

use crate::calendar::ResourceKind;
use crate::models::{SessionId, SlotRange, TimeSlot};
use crate::validation::ValidationError;

/// Crate-level result alias.
pub type Result<T, E = TimetableError> = std::result::Result<T, E>;

/// Top-level error returned by [`Timetabler::run`](crate::scheduler::Timetabler::run).
#[derive(Error, Debug)]
pub enum TimetableError {
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("invalid input: {} issue(s), first: {}", .0.len(), first_message(.0))]
    InvalidInput(Vec<ValidationError>),

    #[error(transparent)]
    Load(#[from] LoadError),
}

fn first_message(errors: &[ValidationError]) -> &str {
    errors.first().map(|e| e.message.as_str()).unwrap_or("-")
}

/// Resource calendar refused a commit.
///
/// Raised only when the placement engine hands the calendar a range that it
/// should already have rejected, so it signals an internal invariant failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConflictError {
    #[error("{kind} '{resource_id}' already held at {slot} by session {holder}")]
    Occupied {
        kind: ResourceKind,
        resource_id: String,
        slot: TimeSlot,
        holder: SessionId,
    },

    #[error("range {range} covers break slot {slot}")]
    BreakSlot { range: SlotRange, slot: TimeSlot },

    #[error("range {range} lies outside the weekly grid")]
    OutOfGrid { range: SlotRange },

    #[error("range {range} is empty")]
    EmptyRange { range: SlotRange },
}

/// Configuration that makes every placement trivially impossible.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("weekly grid has no days")]
    NoDays,

    #[error("weekly grid supports at most 6 days, got {0}")]
    TooManyDays(usize),

    #[error("weekly grid has no time slots")]
    NoTimeSlots,

    #[error("every time slot is a break")]
    AllSlotsAreBreaks,

    #[error("semester {semester} has no teaching slot once breaks are applied")]
    NoTeachingSlots { semester: String },

    #[error("break slot {slot} is outside a {slots_per_day}-slot day")]
    BreakOutOfRange { slot: u16, slots_per_day: u16 },

    #[error("duration for {kind} must be at least one slot")]
    ZeroDuration { kind: String },

    #[error("duration for {kind} ({duration} slots) exceeds a {slots_per_day}-slot day")]
    DurationExceedsDay {
        kind: String,
        duration: u16,
        slots_per_day: u16,
    },

    #[error("invalid day start '{0}', expected HH:MM")]
    InvalidDayStart(String),

    #[error("slot length must be positive")]
    ZeroSlotLength,

    #[error("no rooms of type {room_type} exist but {sessions} session(s) need one")]
    MissingRoomType { room_type: String, sessions: usize },

    #[error("cannot parse configuration: {0}")]
    Parse(String),
}

/// Failure while reading CSV input.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    #[error("{file} line {line}: {message}")]
    Parse {
        file: String,
        line: u64,
        message: String,
    },
}
