use crate::model::Ms;
use crate::timeparse::TimeRejection;

/// Every way an operation can be refused. All recoverable: a rejection is
/// surfaced to the caller as text and leaves state untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Name does not resolve against the configured pool.
    InvalidEquipment(String),
    /// Duration argument was not a positive whole number of minutes.
    InvalidDuration(String),
    InvalidTime(TimeRejection),
    AlreadyOccupied { occupant: String, until: Ms },
    /// The requested window collides with an existing reservation or the
    /// live occupancy.
    SlotConflict,
    NotOccupant,
    /// Caller asked to wait for an item they currently occupy.
    AlreadySelf,
    AlreadyWaiting,
    PastReservation,
    NoUpcomingReservation,
    ReservationNotFound,
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidEquipment(name) => write!(f, "unknown equipment: {name}"),
            EngineError::InvalidDuration(text) => {
                write!(f, "duration must be a positive number of minutes, got: {text}")
            }
            EngineError::InvalidTime(reason) => write!(f, "invalid time: {reason}"),
            EngineError::AlreadyOccupied { occupant, .. } => {
                write!(f, "already in use by {occupant}")
            }
            EngineError::SlotConflict => write!(f, "that slot conflicts with a reservation"),
            EngineError::NotOccupant => write!(f, "you are not using this equipment"),
            EngineError::AlreadySelf => write!(f, "you are already using this equipment"),
            EngineError::AlreadyWaiting => write!(f, "you are already on the waitlist"),
            EngineError::PastReservation => write!(f, "cannot reserve a time in the past"),
            EngineError::NoUpcomingReservation => {
                write!(f, "you have no upcoming reservation to cancel")
            }
            EngineError::ReservationNotFound => {
                write!(f, "no reservation of yours starts at that time")
            }
        }
    }
}

impl std::error::Error for EngineError {}

impl From<TimeRejection> for EngineError {
    fn from(reason: TimeRejection) -> Self {
        EngineError::InvalidTime(reason)
    }
}
