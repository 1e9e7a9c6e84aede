//! Resource calendar.
//!
//! Owns per-slot occupancy for the three contended resource dimensions
//! (room, faculty, batch) over one [`WeekGrid`]. It is the only mutable
//! state shared between placements, and [`ResourceCalendar::commit`] is the
//! only way to change it.
//!
//! # Atomicity
//! A commit checks all three dimensions for every slot of the range before
//! writing anything, so a rejected commit leaves the calendar untouched.
//!
//! # Append-only
//! Commitments are never retracted within a run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::trace;

use crate::error::ConflictError;
use crate::models::{SessionId, SlotRange, TimeSlot, WeekGrid};

/// Resource dimension tracked by the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Room,
    Faculty,
    Batch,
}

impl ResourceKind {
    fn index(self) -> usize {
        match self {
            ResourceKind::Room => 0,
            ResourceKind::Faculty => 1,
            ResourceKind::Batch => 2,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceKind::Room => "room",
            ResourceKind::Faculty => "faculty",
            ResourceKind::Batch => "batch",
        })
    }
}

/// Who holds a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    /// Holding session.
    pub session: SessionId,
    /// Basket of the holding session, if elective.
    pub basket: Option<String>,
}

/// Everything needed to reserve one session's resources.
#[derive(Debug, Clone, Copy)]
pub struct Commitment<'a> {
    pub session: SessionId,
    pub room_id: &'a str,
    pub faculty_id: &'a str,
    pub batch_id: &'a str,
    /// Semester of the batch, selects its meal breaks.
    pub semester: &'a str,
    pub basket: Option<&'a str>,
    pub range: SlotRange,
}

type SlotMap = BTreeMap<TimeSlot, Occupant>;

/// Occupancy of rooms, faculty and batches over the week.
#[derive(Debug, Clone)]
pub struct ResourceCalendar {
    grid: WeekGrid,
    dimensions: [BTreeMap<String, SlotMap>; 3],
    commits: usize,
}

impl ResourceCalendar {
    /// Creates an empty calendar over a grid.
    pub fn new(grid: WeekGrid) -> Self {
        Self {
            grid,
            dimensions: Default::default(),
            commits: 0,
        }
    }

    /// The grid this calendar covers.
    pub fn grid(&self) -> &WeekGrid {
        &self.grid
    }

    /// Number of successful commits.
    pub fn commit_count(&self) -> usize {
        self.commits
    }

    /// Whether the resource holds no commitment anywhere in `range`.
    pub fn is_free(&self, kind: ResourceKind, resource_id: &str, range: SlotRange) -> bool {
        match self.dimensions[kind.index()].get(resource_id) {
            None => true,
            Some(slots) => range.slots().all(|s| !slots.contains_key(&s)),
        }
    }

    /// Whether a batch is free in `range`, ignoring cells held by sessions
    /// of `basket`.
    ///
    /// Basket siblings are exempt from the plain batch check; the
    /// [`BasketResolver`](crate::basket::BasketResolver) rules on them.
    pub fn is_batch_free_outside_basket(&self, batch_id: &str, range: SlotRange, basket: Option<&str>) -> bool {
        let Some(basket) = basket else {
            return self.is_free(ResourceKind::Batch, batch_id, range);
        };
        match self.dimensions[ResourceKind::Batch.index()].get(batch_id) {
            None => true,
            Some(slots) => range.slots().all(|s| match slots.get(&s) {
                None => true,
                Some(occ) => occ.basket.as_deref() == Some(basket),
            }),
        }
    }

    /// Holder of a cell, if any.
    pub fn occupant(&self, kind: ResourceKind, resource_id: &str, slot: TimeSlot) -> Option<&Occupant> {
        self.dimensions[kind.index()]
            .get(resource_id)
            .and_then(|slots| slots.get(&slot))
    }

    /// Occupied cells of one resource, in slot order.
    pub fn occupied(&self, kind: ResourceKind, resource_id: &str) -> impl Iterator<Item = (TimeSlot, &Occupant)> {
        self.dimensions[kind.index()]
            .get(resource_id)
            .into_iter()
            .flat_map(|slots| slots.iter().map(|(s, o)| (*s, o)))
    }

    /// Number of occupied slots of one resource.
    pub fn busy_slots(&self, kind: ResourceKind, resource_id: &str) -> usize {
        self.dimensions[kind.index()]
            .get(resource_id)
            .map_or(0, BTreeMap::len)
    }

    /// Resource ids with at least one commitment, sorted.
    pub fn resources(&self, kind: ResourceKind) -> impl Iterator<Item = &str> {
        self.dimensions[kind.index()].keys().map(String::as_str)
    }

    /// Reserves room, faculty and batch for the range.
    ///
    /// # Errors
    /// [`ConflictError`] if the range is empty, leaves the grid, covers a
    /// break for the batch's semester, or any dimension is already held.
    /// Nothing is written on error.
    pub fn commit(&mut self, c: &Commitment<'_>) -> Result<(), ConflictError> {
        self.grid.check_range(c.range, Some(c.semester))?;

        let checks = [
            (ResourceKind::Room, c.room_id),
            (ResourceKind::Faculty, c.faculty_id),
            (ResourceKind::Batch, c.batch_id),
        ];
        for (kind, id) in checks {
            if let Some(slots) = self.dimensions[kind.index()].get(id) {
                if let Some((slot, holder)) = c
                    .range
                    .slots()
                    .find_map(|s| slots.get(&s).map(|o| (s, o.session)))
                {
                    return Err(ConflictError::Occupied {
                        kind,
                        resource_id: id.to_string(),
                        slot,
                        holder,
                    });
                }
            }
        }

        let occupant = Occupant {
            session: c.session,
            basket: c.basket.map(str::to_string),
        };
        for (kind, id) in checks {
            let slots = self.dimensions[kind.index()].entry(id.to_string()).or_default();
            for s in c.range.slots() {
                slots.insert(s, occupant.clone());
            }
        }
        self.commits += 1;
        trace!(session = %c.session, room = c.room_id, faculty = c.faculty_id, batch = c.batch_id, range = %c.range, "committed");
        Ok(())
    }
}
