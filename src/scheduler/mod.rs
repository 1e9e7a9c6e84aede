//! Placement engine, facade and KPI evaluation.
//!
//! # Algorithm
//!
//! `PlacementEngine` is a single deterministic greedy pass: sessions are
//! taken in constraint-pressure order and each one gets the first feasible
//! (window, room) pair, or a structured reason why none exists. It is not
//! optimal and never backtracks, but every placement it makes is valid and
//! every failure is explained. Optional `PlacementRules` (faculty daily
//! limit, course spacing, batch buffer) tighten the per-window check.
//!
//! # Facade
//!
//! `Timetabler` wires validation, catalog, calendar and engine together
//! and returns a `Timetable` ready for reporting.
//!
//! # KPI
//!
//! `TimetableKpi` computes placement rate, room utilisation, faculty load
//! and unscheduled counts per reason.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent Research Directions in Automated Timetabling"

mod diagnosis;
mod engine;
mod kpi;
mod rules;
mod timetabler;

pub use engine::{PlacementEngine, RunSummary};
pub use kpi::TimetableKpi;
pub use rules::PlacementRules;
pub use timetabler::{Timetable, TimetableInput, Timetabler};
