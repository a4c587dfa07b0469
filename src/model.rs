use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix milliseconds — the only time type.
pub type Ms = i64;

pub const MINUTE_MS: Ms = 60_000;
pub const HOUR_MS: Ms = 3_600_000;

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    pub fn duration_ms(&self) -> Ms {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_instant(&self, t: Ms) -> bool {
        self.start <= t && t < self.end
    }
}

/// A pre-booked future window on one equipment item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub id: Ulid,
    pub owner: String,
    pub span: Span,
}

/// Live exclusive use of an item. One `Option<Occupancy>` carries both the
/// occupant and the window end, so neither can exist without the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupancy {
    pub user: String,
    pub until: Ms,
}

#[derive(Debug, Clone)]
pub struct EquipmentState {
    /// Canonical display casing.
    pub name: String,
    pub occupancy: Option<Occupancy>,
    /// FIFO queue of callers wanting the item next. No duplicates.
    pub waitlist: VecDeque<String>,
    /// All reservations, sorted by `span.start`.
    pub reservations: Vec<Reservation>,
}

impl EquipmentState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            occupancy: None,
            waitlist: VecDeque::new(),
            reservations: Vec::new(),
        }
    }

    /// Insert a reservation maintaining sort order by span.start.
    pub fn insert_reservation(&mut self, reservation: Reservation) {
        let pos = self
            .reservations
            .binary_search_by_key(&reservation.span.start, |r| r.span.start)
            .unwrap_or_else(|e| e);
        self.reservations.insert(pos, reservation);
    }

    /// Remove a reservation by id.
    pub fn remove_reservation(&mut self, id: Ulid) -> Option<Reservation> {
        if let Some(pos) = self.reservations.iter().position(|r| r.id == id) {
            Some(self.reservations.remove(pos))
        } else {
            None
        }
    }

    /// Return only reservations whose span overlaps the query window.
    /// Uses binary search to skip reservations starting at or after `query.end`.
    pub fn overlapping(&self, query: &Span) -> impl Iterator<Item = &Reservation> {
        // Everything at index >= right_bound starts at or after query.end → can't overlap.
        let right_bound = self
            .reservations
            .partition_point(|r| r.span.start < query.end);
        self.reservations[..right_bound]
            .iter()
            .filter(move |r| r.span.end > query.start)
    }

    /// Drop reservations whose window has fully elapsed. Idempotent.
    pub fn prune_expired(&mut self, now: Ms) {
        self.reservations.retain(|r| r.span.end > now);
    }

    pub fn is_occupied_by(&self, caller: &str) -> bool {
        self.occupancy.as_ref().is_some_and(|o| o.user == caller)
    }

    pub fn is_waiting(&self, caller: &str) -> bool {
        self.waitlist.iter().any(|w| w == caller)
    }
}
