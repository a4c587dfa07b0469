use tracing::debug;
use ulid::Ulid;

use crate::model::{MINUTE_MS, Ms, Occupancy, Reservation, Span};
use crate::timeparse::{self, fmt_local};

use super::conflict::slot_is_free;
use super::{Engine, EngineError, Outcome};

/// Positive whole minutes → window length in ms.
fn minutes_to_ms(minutes: i64) -> Result<Ms, EngineError> {
    if minutes <= 0 {
        return Err(EngineError::InvalidDuration(minutes.to_string()));
    }
    minutes
        .checked_mul(MINUTE_MS)
        .ok_or_else(|| EngineError::InvalidDuration(minutes.to_string()))
}

impl Engine {
    /// Occupy an item immediately for `minutes`. The item must be free of
    /// both a live occupant and any reservation that would overlap
    /// `[now, now + minutes)`.
    pub async fn start(
        &self,
        equip: &str,
        caller: &str,
        minutes: i64,
        now: Ms,
    ) -> Result<Outcome, EngineError> {
        let duration = minutes_to_ms(minutes)?;
        let item = self.resolve(equip)?;
        let mut guard = item.write().await;

        if let Some(occupancy) = &guard.occupancy {
            return Err(EngineError::AlreadyOccupied {
                occupant: occupancy.user.clone(),
                until: occupancy.until,
            });
        }
        let end = now
            .checked_add(duration)
            .ok_or_else(|| EngineError::InvalidDuration(minutes.to_string()))?;
        let span = Span::new(now, end);
        if !slot_is_free(&guard, &span) {
            return Err(EngineError::SlotConflict);
        }

        guard.occupancy = Some(Occupancy {
            user: caller.to_string(),
            until: span.end,
        });
        debug!(equipment = %guard.name, caller, minutes, "start");

        let until = fmt_local(span.end, self.config.timezone);
        let mut broadcasts = Vec::new();
        self.announce(
            &mut broadcasts,
            format!("{caller} started on {} for {minutes} min, until {until}", guard.name),
        );
        Ok(Outcome {
            reply: format!("You're on {} until {until}.", guard.name),
            broadcasts,
        })
    }

    /// Release an item held by `caller`, then promote the waitlist head:
    /// auto-start them for the configured default duration when the slot
    /// is free, otherwise tell them to start manually once the blocking
    /// reservation allows it.
    pub async fn finish(&self, equip: &str, caller: &str, now: Ms) -> Result<Outcome, EngineError> {
        let item = self.resolve(equip)?;
        let mut guard = item.write().await;

        if !guard.is_occupied_by(caller) {
            return Err(EngineError::NotOccupant);
        }
        guard.occupancy = None;
        debug!(equipment = %guard.name, caller, "finish");

        let mut broadcasts = Vec::new();
        if let Some(next) = guard.waitlist.pop_front() {
            let minutes = self.config.auto_start_minutes;
            let span = Span::new(now, now + self.config.auto_start_ms());
            if slot_is_free(&guard, &span) {
                guard.occupancy = Some(Occupancy {
                    user: next.clone(),
                    until: span.end,
                });
                let until = fmt_local(span.end, self.config.timezone);
                self.announce(
                    &mut broadcasts,
                    format!(
                        "{next}: your turn on {}, auto-started for {minutes} min, until {until}",
                        guard.name
                    ),
                );
            } else {
                self.announce(
                    &mut broadcasts,
                    format!(
                        "{next}: your turn on {}, but it's reserved soon. Start it manually with a shorter duration.",
                        guard.name
                    ),
                );
            }
        } else {
            self.announce(&mut broadcasts, format!("{} is now free", guard.name));
        }

        Ok(Outcome {
            reply: format!("You're done on {}.", guard.name),
            broadcasts,
        })
    }

    /// Join the FIFO waitlist. Reports the caller's 1-based position.
    pub async fn wait(&self, equip: &str, caller: &str) -> Result<Outcome, EngineError> {
        let item = self.resolve(equip)?;
        let mut guard = item.write().await;

        if guard.is_occupied_by(caller) {
            return Err(EngineError::AlreadySelf);
        }
        if guard.is_waiting(caller) {
            return Err(EngineError::AlreadyWaiting);
        }
        guard.waitlist.push_back(caller.to_string());
        let position = guard.waitlist.len();
        debug!(equipment = %guard.name, caller, position, "wait");

        let mut broadcasts = Vec::new();
        self.announce(
            &mut broadcasts,
            format!("{caller} joined the waitlist for {} (position {position})", guard.name),
        );
        Ok(Outcome {
            reply: format!("You're #{position} in line for {}.", guard.name),
            broadcasts,
        })
    }

    /// Book a future window starting at the parsed time expression.
    pub async fn reserve(
        &self,
        equip: &str,
        caller: &str,
        time_text: &str,
        minutes: i64,
        now: Ms,
    ) -> Result<Outcome, EngineError> {
        let start = timeparse::parse(
            time_text,
            now,
            self.config.timezone,
            self.config.horizon_ms(),
        )?;
        let duration = minutes_to_ms(minutes)?;
        let item = self.resolve(equip)?;
        let mut guard = item.write().await;

        // The parser already excludes past instants; keep the engine honest
        // even if a caller bypasses it.
        if start < now {
            return Err(EngineError::PastReservation);
        }
        let end = start
            .checked_add(duration)
            .ok_or_else(|| EngineError::InvalidDuration(minutes.to_string()))?;
        let span = Span::new(start, end);
        if !slot_is_free(&guard, &span) {
            return Err(EngineError::SlotConflict);
        }

        guard.insert_reservation(Reservation {
            id: Ulid::new(),
            owner: caller.to_string(),
            span,
        });
        debug!(equipment = %guard.name, caller, start, minutes, "reserve");

        let tz = self.config.timezone;
        let (from, to) = (fmt_local(span.start, tz), fmt_local(span.end, tz));
        let mut broadcasts = Vec::new();
        self.announce(
            &mut broadcasts,
            format!("{caller} reserved {} from {from} to {to}", guard.name),
        );
        Ok(Outcome {
            reply: format!("Reserved {} from {from} to {to}.", guard.name),
            broadcasts,
        })
    }

    /// Cancel one of the caller's reservations. Without a time, the
    /// soonest-starting future one goes; with a time, only an exact start
    /// match does. The match is located first, the list mutated after.
    pub async fn cancel(
        &self,
        equip: &str,
        caller: &str,
        time_text: Option<&str>,
        now: Ms,
    ) -> Result<Outcome, EngineError> {
        let item = self.resolve(equip)?;
        let mut guard = item.write().await;

        let target = match time_text {
            None => guard
                .reservations
                .iter()
                // Sorted by start, so the first future match is the soonest.
                .find(|r| r.owner == caller && r.span.start > now)
                .map(|r| r.id)
                .ok_or(EngineError::NoUpcomingReservation)?,
            Some(text) => {
                let start = timeparse::parse(
                    text,
                    now,
                    self.config.timezone,
                    self.config.horizon_ms(),
                )?;
                guard
                    .reservations
                    .iter()
                    .find(|r| r.owner == caller && r.span.start == start)
                    .map(|r| r.id)
                    .ok_or(EngineError::ReservationNotFound)?
            }
        };
        let Some(removed) = guard.remove_reservation(target) else {
            return Err(EngineError::ReservationNotFound);
        };
        debug!(equipment = %guard.name, caller, start = removed.span.start, "cancel");

        let from = fmt_local(removed.span.start, self.config.timezone);
        let mut broadcasts = Vec::new();
        self.announce(
            &mut broadcasts,
            format!("{caller} cancelled their {from} reservation on {}", guard.name),
        );
        Ok(Outcome {
            reply: format!("Cancelled your {from} reservation on {}.", guard.name),
            broadcasts,
        })
    }
}
