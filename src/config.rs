//! Run configuration.
//!
//! Describes the weekly grid (days, slot length, breaks), the slot length of
//! each session kind, and the engine's safety limits. Defaults reproduce a
//! five-day week of 30 minute slots from 09:00 to 18:30 with a 10:30 break
//! and a staggered one hour meal between 12:30 and 14:00.
//!
//! Configuration can be built in code with the `with_*` methods or read
//! from JSON; either way [`TimetableConfig::validate`] must pass before a
//! run.

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;
use std::path::Path;

use crate::error::ConfigurationError;
use crate::models::{SessionKind, WeekGrid};
use crate::scheduler::PlacementRules;

/// Complete run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimetableConfig {
    /// Day names, one per teaching day (at most six).
    pub days: Vec<String>,
    /// Start of the first slot, `HH:MM`.
    pub day_start: String,
    /// Slot length in minutes.
    pub slot_minutes: u32,
    /// Slots per day.
    pub slots_per_day: u16,
    /// Slot indices blocked for everyone, every day.
    pub breaks: Vec<u16>,
    /// Staggered per-semester meal break.
    pub meal_break: Option<MealBreak>,
    /// Session length per kind, in slots.
    pub durations: SessionDurations,
    /// Upper bound on (window, room) candidates examined per session.
    pub max_candidates_per_session: usize,
    /// Treat a required room type with no rooms as a fatal error.
    pub strict_room_types: bool,
    /// Optional placement rules, all off by default.
    pub rules: PlacementRules,
}

/// Slot length per session kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDurations {
    pub lecture: u16,
    pub lab: u16,
    pub tutorial: u16,
    pub self_study: u16,
}

impl SessionDurations {
    /// Same length for every kind.
    pub fn uniform(slots: u16) -> Self {
        Self {
            lecture: slots,
            lab: slots,
            tutorial: slots,
            self_study: slots,
        }
    }

    /// Length for one kind.
    pub fn get(&self, kind: SessionKind) -> u16 {
        match kind {
            SessionKind::Lecture => self.lecture,
            SessionKind::Lab => self.lab,
            SessionKind::Tutorial => self.tutorial,
            SessionKind::SelfStudy => self.self_study,
        }
    }
}

impl Default for SessionDurations {
    fn default() -> Self {
        Self {
            lecture: 3,
            lab: 4,
            tutorial: 2,
            self_study: 2,
        }
    }
}

/// A meal break whose start is staggered by semester.
///
/// With `n` semesters the free part of the window is split evenly, so the
/// first semester eats at `window_start` and the last one as late as the
/// window allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealBreak {
    /// First slot of the meal window.
    pub window_start: u16,
    /// Window length in slots.
    pub window_slots: u16,
    /// Meal length in slots.
    pub duration_slots: u16,
}

impl MealBreak {
    /// Assigns each semester its meal slots.
    ///
    /// Semesters are sorted before assignment so the result does not
    /// depend on input order.
    pub fn stagger<'a>(&self, semesters: impl IntoIterator<Item = &'a str>) -> BTreeMap<String, Range<u16>> {
        let mut sorted: Vec<&str> = semesters.into_iter().collect();
        sorted.sort_unstable();
        sorted.dedup();

        let slack = self.window_slots.saturating_sub(self.duration_slots) as usize;
        let gaps = sorted.len().saturating_sub(1);

        sorted
            .into_iter()
            .enumerate()
            .map(|(i, sem)| {
                let offset = if gaps == 0 { 0 } else { (i * slack / gaps) as u16 };
                let start = self.window_start.saturating_add(offset);
                (sem.to_string(), start..start.saturating_add(self.duration_slots))
            })
            .collect()
    }
}

impl Default for TimetableConfig {
    fn default() -> Self {
        Self {
            days: ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            day_start: "09:00".into(),
            slot_minutes: 30,
            slots_per_day: 19,
            breaks: vec![3],
            meal_break: Some(MealBreak {
                window_start: 7,
                window_slots: 3,
                duration_slots: 2,
            }),
            durations: SessionDurations::default(),
            max_candidates_per_session: 20_000,
            strict_room_types: false,
            rules: PlacementRules::default(),
        }
    }
}

impl TimetableConfig {
    /// A break-free grid of `days × slots_per_day` with one-slot sessions.
    pub fn compact(days: usize, slots_per_day: u16) -> Self {
        Self {
            days: (1..=days).map(|d| format!("Day {d}")).collect(),
            slots_per_day,
            breaks: Vec::new(),
            meal_break: None,
            durations: SessionDurations::uniform(1),
            ..Self::default()
        }
    }

    /// Sets the day names.
    pub fn with_days(mut self, days: Vec<String>) -> Self {
        self.days = days;
        self
    }

    /// Sets slots per day.
    pub fn with_slots_per_day(mut self, slots: u16) -> Self {
        self.slots_per_day = slots;
        self
    }

    /// Adds a global break slot.
    pub fn with_break(mut self, slot: u16) -> Self {
        self.breaks.push(slot);
        self
    }

    /// Sets or clears the meal break.
    pub fn with_meal_break(mut self, meal: Option<MealBreak>) -> Self {
        self.meal_break = meal;
        self
    }

    /// Sets per-kind durations.
    pub fn with_durations(mut self, durations: SessionDurations) -> Self {
        self.durations = durations;
        self
    }

    /// Sets the per-session search cap.
    pub fn with_max_candidates(mut self, cap: usize) -> Self {
        self.max_candidates_per_session = cap;
        self
    }

    /// Makes missing room types fatal.
    pub fn with_strict_room_types(mut self, strict: bool) -> Self {
        self.strict_room_types = strict;
        self
    }

    /// Sets optional placement rules.
    pub fn with_rules(mut self, rules: PlacementRules) -> Self {
        self.rules = rules;
        self
    }

    /// Parses configuration from JSON. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(json).map_err(|e| ConfigurationError::Parse(e.to_string()))
    }

    /// Reads configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigurationError::Parse(format!("{}: {e}", path.as_ref().display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Checks that the grid can hold at least one session of every kind.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.days.is_empty() {
            return Err(ConfigurationError::NoDays);
        }
        if self.days.len() > 6 {
            return Err(ConfigurationError::TooManyDays(self.days.len()));
        }
        if self.slots_per_day == 0 {
            return Err(ConfigurationError::NoTimeSlots);
        }
        if self.slot_minutes == 0 {
            return Err(ConfigurationError::ZeroSlotLength);
        }
        self.start_time()?;

        for &slot in &self.breaks {
            if slot >= self.slots_per_day {
                return Err(ConfigurationError::BreakOutOfRange {
                    slot,
                    slots_per_day: self.slots_per_day,
                });
            }
        }
        if let Some(meal) = &self.meal_break {
            let end = meal
                .window_start
                .checked_add(meal.window_slots.max(meal.duration_slots));
            match end {
                Some(end) if end <= self.slots_per_day => {}
                _ => {
                    return Err(ConfigurationError::BreakOutOfRange {
                        slot: end.map_or(u16::MAX, |e| e - 1),
                        slots_per_day: self.slots_per_day,
                    })
                }
            }
        }

        let mut blocked = self.breaks.clone();
        blocked.sort_unstable();
        blocked.dedup();
        if blocked.len() >= self.slots_per_day as usize {
            return Err(ConfigurationError::AllSlotsAreBreaks);
        }

        for kind in SessionKind::ALL {
            let duration = self.durations.get(kind);
            if duration == 0 {
                return Err(ConfigurationError::ZeroDuration {
                    kind: kind.to_string(),
                });
            }
            if duration > self.slots_per_day {
                return Err(ConfigurationError::DurationExceedsDay {
                    kind: kind.to_string(),
                    duration,
                    slots_per_day: self.slots_per_day,
                });
            }
        }
        Ok(())
    }

    /// Builds the weekly grid and checks every semester can still be taught.
    ///
    /// # Errors
    /// [`ConfigurationError::NoTeachingSlots`] when global breaks and a
    /// semester's meal break cover the whole day.
    pub fn teaching_grid<'a>(&self, semesters: impl IntoIterator<Item = &'a str>) -> Result<WeekGrid, ConfigurationError> {
        let semesters: Vec<&str> = semesters.into_iter().collect();
        let grid = self.week_grid(semesters.iter().copied());
        for sem in semesters {
            if grid.teaching_slot_count(Some(sem)) == 0 {
                return Err(ConfigurationError::NoTeachingSlots {
                    semester: sem.to_string(),
                });
            }
        }
        Ok(grid)
    }

    /// Builds the weekly grid, staggering meal breaks over `semesters`.
    pub fn week_grid<'a>(&self, semesters: impl IntoIterator<Item = &'a str>) -> WeekGrid {
        let mut grid = WeekGrid::new(self.days.len() as u8, self.slots_per_day);
        for &slot in &self.breaks {
            grid = grid.with_break(slot);
        }
        if let Some(meal) = &self.meal_break {
            for (semester, slots) in meal.stagger(semesters) {
                for slot in slots {
                    grid = grid.with_semester_break(semester.clone(), slot);
                }
            }
        }
        grid
    }

    /// Session length for a kind.
    pub fn duration(&self, kind: SessionKind) -> u16 {
        self.durations.get(kind)
    }

    /// Day name for a day index.
    pub fn day_name(&self, day: u8) -> &str {
        self.days.get(day as usize).map(String::as_str).unwrap_or("?")
    }

    /// Clock label of a slot, e.g. `09:30-10:00`.
    pub fn slot_label(&self, slot: u16) -> String {
        match self.start_time() {
            Ok(start) => {
                let step = Duration::minutes(self.slot_minutes as i64);
                let from = start + step * slot as i32;
                let to = from + step;
                format!("{}-{}", from.format("%H:%M"), to.format("%H:%M"))
            }
            Err(_) => format!("slot {slot}"),
        }
    }

    fn start_time(&self) -> Result<NaiveTime, ConfigurationError> {
        NaiveTime::parse_from_str(&self.day_start, "%H:%M")
            .map_err(|_| ConfigurationError::InvalidDayStart(self.day_start.clone()))
    }
}
