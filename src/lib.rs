//! Academic timetabling engine.
//!
//! Assigns lectures, labs, tutorials and self-study blocks to weekly time
//! slots, rooms and faculty for every batch of an institution, without
//! double-booking anyone, honouring breaks, room capacity and elective
//! basket exclusivity. Sessions that cannot be placed are reported with a
//! structured reason instead of failing the run.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Course`, `Session`, `Room`, `Batch`,
//!   `TimeSlot`, `SlotRange`, `WeekGrid`
//! - **`calendar`**: Per-slot occupancy of rooms, faculty and batches
//! - **`catalog`**: Course → session expansion and attempt ordering
//! - **`basket`**: Elective basket exclusivity
//! - **`scheduler`**: Placement engine, `Timetabler` facade, KPIs
//! - **`report`**: Grids, unscheduled list, course summary
//! - **`validation`**: Input integrity checks (duplicate IDs, dangling refs)
//! - **`config`**, **`loader`**, **`logging`**, **`error`**: ambient plumbing
//!
//! # Architecture
//!
//! ```text
//! loader ─► validation ─► catalog ─► engine ─► report
//!                                      │  ▲
//!                            calendar ◄┘  └─ basket
//! ```
//!
//! The run is single-threaded and deterministic: identical input yields
//! identical grids and unscheduled lists.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Carter & Laporte (1998), "Recent Developments in Practical Course Timetabling"

pub mod basket;
pub mod calendar;
pub mod catalog;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod models;
pub mod report;
pub mod scheduler;
pub mod validation;

pub use config::TimetableConfig;
pub use error::{ConfigurationError, ConflictError, LoadError, Result, TimetableError};
pub use scheduler::{Timetable, TimetableInput, Timetabler};
