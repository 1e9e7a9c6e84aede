//! Weekly time grid.
//!
//! The week is a fixed grid of `days × slots_per_day` atomic slots. Days and
//! slots are zero-based. Break slots repeat every day at the same index:
//! global breaks apply to every batch, semester breaks (staggered meals)
//! only to batches of that semester.
//!
//! # Ranges
//! A [`SlotRange`] is a half-open run `[start, start + len)` inside one day.
//! Ranges never wrap across days, so two ranges on different days never
//! overlap.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::ConflictError;

/// One atomic cell of the weekly grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Day index (0-based).
    pub day: u8,
    /// Slot index within the day (0-based).
    pub slot: u16,
}

impl TimeSlot {
    /// Creates a time slot.
    pub fn new(day: u8, slot: u16) -> Self {
        Self { day, slot }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}s{}", self.day, self.slot)
    }
}

/// A contiguous run of slots within a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotRange {
    /// Day index (0-based).
    pub day: u8,
    /// First slot (inclusive).
    pub start: u16,
    /// Number of slots.
    pub len: u16,
}

impl SlotRange {
    /// Creates a range.
    pub fn new(day: u8, start: u16, len: u16) -> Self {
        Self { day, start, len }
    }

    /// Exclusive end slot, saturating at `u16::MAX`.
    #[inline]
    pub fn end(&self) -> u16 {
        self.start.saturating_add(self.len)
    }

    /// Whether the range covers a slot.
    #[inline]
    pub fn contains(&self, slot: TimeSlot) -> bool {
        slot.day == self.day && slot.slot >= self.start && slot.slot < self.end()
    }

    /// Whether two ranges share at least one slot.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.day == other.day && self.start < other.end() && other.start < self.end()
    }

    /// Slots covered, in ascending order.
    pub fn slots(&self) -> impl Iterator<Item = TimeSlot> + '_ {
        (self.start..self.end()).map(move |s| TimeSlot::new(self.day, s))
    }
}

impl fmt::Display for SlotRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}[{}..{})", self.day, self.start, self.end())
    }
}

/// The enumerated weekly grid with its break slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekGrid {
    days: u8,
    slots_per_day: u16,
    breaks: BTreeSet<u16>,
    semester_breaks: BTreeMap<String, BTreeSet<u16>>,
}

impl WeekGrid {
    /// Creates a grid without breaks.
    pub fn new(days: u8, slots_per_day: u16) -> Self {
        Self {
            days,
            slots_per_day,
            breaks: BTreeSet::new(),
            semester_breaks: BTreeMap::new(),
        }
    }

    /// Marks a slot index as a break on every day, for every batch.
    pub fn with_break(mut self, slot: u16) -> Self {
        self.breaks.insert(slot);
        self
    }

    /// Marks a slot index as a break on every day for one semester.
    pub fn with_semester_break(mut self, semester: impl Into<String>, slot: u16) -> Self {
        self.semester_breaks
            .entry(semester.into())
            .or_default()
            .insert(slot);
        self
    }

    /// Number of days.
    pub fn days(&self) -> u8 {
        self.days
    }

    /// Slots per day.
    pub fn slots_per_day(&self) -> u16 {
        self.slots_per_day
    }

    /// Total slot count (breaks included).
    pub fn slot_count(&self) -> usize {
        self.days as usize * self.slots_per_day as usize
    }

    /// Global break slot indices.
    pub fn breaks(&self) -> impl Iterator<Item = u16> + '_ {
        self.breaks.iter().copied()
    }

    /// Whether a slot index is a break for a batch of `semester`.
    ///
    /// `None` asks about global breaks only.
    pub fn is_break(&self, slot: u16, semester: Option<&str>) -> bool {
        if self.breaks.contains(&slot) {
            return true;
        }
        semester
            .and_then(|s| self.semester_breaks.get(s))
            .is_some_and(|set| set.contains(&slot))
    }

    /// Whether the slot lies inside the grid.
    pub fn contains(&self, slot: TimeSlot) -> bool {
        slot.day < self.days && slot.slot < self.slots_per_day
    }

    /// Every slot of the week, day ascending then slot ascending.
    pub fn slots(&self) -> impl Iterator<Item = TimeSlot> + '_ {
        (0..self.days)
            .flat_map(move |d| (0..self.slots_per_day).map(move |s| TimeSlot::new(d, s)))
    }

    /// Checks that a range is non-empty, inside the grid and break-free.
    pub fn check_range(&self, range: SlotRange, semester: Option<&str>) -> Result<(), ConflictError> {
        if range.len == 0 {
            return Err(ConflictError::EmptyRange { range });
        }
        let fits = range
            .start
            .checked_add(range.len)
            .is_some_and(|end| end <= self.slots_per_day);
        if range.day >= self.days || !fits {
            return Err(ConflictError::OutOfGrid { range });
        }
        if let Some(slot) = range.slots().find(|s| self.is_break(s.slot, semester)) {
            return Err(ConflictError::BreakSlot { range, slot });
        }
        Ok(())
    }

    /// Enumerates every break-free window of `duration` slots.
    ///
    /// Order is deterministic: day ascending, then start slot ascending.
    pub fn windows(&self, duration: u16, semester: Option<&str>) -> Vec<SlotRange> {
        if duration == 0 || duration > self.slots_per_day {
            return Vec::new();
        }
        let mut out = Vec::new();
        for day in 0..self.days {
            for start in 0..=(self.slots_per_day - duration) {
                let range = SlotRange::new(day, start, duration);
                if range.slots().all(|s| !self.is_break(s.slot, semester)) {
                    out.push(range);
                }
            }
        }
        out
    }

    /// Number of slots usable by a batch of `semester` across the week.
    pub fn teaching_slot_count(&self, semester: Option<&str>) -> usize {
        let per_day = (0..self.slots_per_day)
            .filter(|&s| !self.is_break(s, semester))
            .count();
        per_day * self.days as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_basics() {
        let r = SlotRange::new(1, 2, 3);
        assert_eq!(r.end(), 5);
        assert!(r.contains(TimeSlot::new(1, 2)));
        assert!(r.contains(TimeSlot::new(1, 4)));
        assert!(!r.contains(TimeSlot::new(1, 5))); // exclusive end
        assert!(!r.contains(TimeSlot::new(0, 3))); // other day
        assert_eq!(r.slots().count(), 3);
    }

    #[test]
    fn test_range_overlap() {
        let a = SlotRange::new(0, 0, 2);
        let b = SlotRange::new(0, 1, 2);
        let c = SlotRange::new(0, 2, 2); // touching
        let d = SlotRange::new(1, 0, 2); // other day
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert!(!a.overlaps(&d));
    }

    #[test]
    fn test_windows_order_and_breaks() {
        let grid = WeekGrid::new(2, 4).with_break(2);
        let w = grid.windows(1, None);
        // 3 usable slots per day
        assert_eq!(w.len(), 6);
        assert_eq!(w[0], SlotRange::new(0, 0, 1));
        assert_eq!(w[2], SlotRange::new(0, 3, 1));
        assert_eq!(w[3], SlotRange::new(1, 0, 1));

        let pairs = grid.windows(2, None);
        // only [0,1] per day; [1,2] and [2,3] cross the break
        assert_eq!(pairs, vec![SlotRange::new(0, 0, 2), SlotRange::new(1, 0, 2)]);
    }

    #[test]
    fn test_windows_too_long() {
        let grid = WeekGrid::new(5, 3);
        assert!(grid.windows(4, None).is_empty());
        assert!(grid.windows(0, None).is_empty());
    }

    #[test]
    fn test_semester_breaks() {
        let grid = WeekGrid::new(1, 6).with_semester_break("3", 4);
        assert!(grid.is_break(4, Some("3")));
        assert!(!grid.is_break(4, Some("5")));
        assert!(!grid.is_break(4, None));
        assert_eq!(grid.windows(1, Some("3")).len(), 5);
        assert_eq!(grid.windows(1, Some("5")).len(), 6);
        assert_eq!(grid.teaching_slot_count(Some("3")), 5);
    }

    #[test]
    fn test_check_range() {
        let grid = WeekGrid::new(2, 6).with_break(3);
        assert!(grid.check_range(SlotRange::new(0, 0, 3), None).is_ok());
        assert!(matches!(
            grid.check_range(SlotRange::new(0, 2, 2), None),
            Err(ConflictError::BreakSlot { .. })
        ));
        assert!(matches!(
            grid.check_range(SlotRange::new(2, 0, 1), None),
            Err(ConflictError::OutOfGrid { .. })
        ));
        assert!(matches!(
            grid.check_range(SlotRange::new(0, 5, 2), None),
            Err(ConflictError::OutOfGrid { .. })
        ));
        assert!(matches!(
            grid.check_range(SlotRange::new(0, 1, 0), None),
            Err(ConflictError::EmptyRange { .. })
        ));
    }

    #[test]
    fn test_check_range_extreme_values() {
        let grid = WeekGrid::new(1, 6);
        let huge = SlotRange::new(0, u16::MAX, 2);
        assert_eq!(huge.end(), u16::MAX);
        assert!(matches!(
            grid.check_range(huge, None),
            Err(ConflictError::OutOfGrid { .. })
        ));
        assert!(matches!(
            grid.check_range(SlotRange::new(0, 3, u16::MAX), None),
            Err(ConflictError::OutOfGrid { .. })
        ));
    }

    #[test]
    fn test_slot_enumeration() {
        let grid = WeekGrid::new(3, 4);
        let all: Vec<_> = grid.slots().collect();
        assert_eq!(all.len(), grid.slot_count());
        assert_eq!(all[0], TimeSlot::new(0, 0));
        assert_eq!(all[5], TimeSlot::new(1, 1));
    }
}
