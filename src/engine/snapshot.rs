use std::fmt::Write as _;

use chrono_tz::Tz;

use crate::model::{Ms, Occupancy, Span};
use crate::timeparse::fmt_local;

use super::Engine;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationView {
    pub owner: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStatus {
    pub name: String,
    pub occupancy: Option<Occupancy>,
    pub waitlist_len: usize,
    /// Remaining (non-expired) reservations, ascending by start.
    pub reservations: Vec<ReservationView>,
}

/// Point-in-time view of the whole pool, items in configured display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub items: Vec<ItemStatus>,
}

impl StatusReport {
    /// Human-readable rendering with local clock times.
    pub fn render(&self, tz: Tz) -> String {
        let mut out = String::new();
        for item in &self.items {
            let _ = write!(out, "{}: ", item.name);
            match &item.occupancy {
                Some(o) => {
                    let _ = write!(out, "in use by {} until {}", o.user, fmt_local(o.until, tz));
                }
                None => out.push_str("free"),
            }
            let _ = write!(out, " | waiting: {}", item.waitlist_len);
            if item.reservations.is_empty() {
                out.push_str(" | no reservations");
            } else {
                out.push_str(" | reserved: ");
                for (i, r) in item.reservations.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    let _ = write!(
                        out,
                        "{} {}-{}",
                        r.owner,
                        fmt_local(r.span.start, tz),
                        fmt_local(r.span.end, tz)
                    );
                }
            }
            out.push('\n');
        }
        out
    }
}

impl Engine {
    /// Snapshot every item, pruning expired reservations first. Takes one
    /// item's lock at a time; there is no cross-pool lock, so the report
    /// is read-consistent per item, not globally.
    pub async fn status_snapshot(&self, now: Ms) -> StatusReport {
        let mut items = Vec::with_capacity(self.registry().len());
        for name in self.registry().display_order() {
            let Ok(item) = self.resolve(name) else {
                continue;
            };
            let mut guard = item.write().await;
            guard.prune_expired(now);
            items.push(ItemStatus {
                name: guard.name.clone(),
                occupancy: guard.occupancy.clone(),
                waitlist_len: guard.waitlist.len(),
                reservations: guard
                    .reservations
                    .iter()
                    .map(|r| ReservationView {
                        owner: r.owner.clone(),
                        span: r.span,
                    })
                    .collect(),
            });
        }
        StatusReport { items }
    }
}
