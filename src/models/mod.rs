//! Timetabling domain models.
//!
//! Provides the data types shared by the catalog, calendar, engine and
//! report. Input records ([`Course`], [`Room`], [`Batch`],
//! [`ElectiveRegistration`]) are immutable once loaded; [`Session`] carries
//! the only mutable state, its [`SessionStatus`].
//!
//! # Domain Mappings
//!
//! | u-timetable | Generic scheduling |
//! |-------------|--------------------|
//! | Course | Task |
//! | Session | Activity |
//! | Room / Faculty / Batch | Resource |
//! | WeekGrid | Calendar |

mod course;
mod resource;
mod session;
mod slot;

pub use course::{Course, ElectiveRegistration, SessionKind, WeeklyLoad};
pub use resource::{Batch, FacultyId, Room, RoomType};
pub use session::{Placement, Session, SessionId, SessionStatus, UnscheduledReason};
pub use slot::{SlotRange, TimeSlot, WeekGrid};
