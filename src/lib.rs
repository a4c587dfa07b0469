//! Reservation engine for a small shared pool of gym equipment.
//!
//! The core is synchronous in effect: every operation takes one item's
//! write lock, runs its whole check-then-act sequence under it, and
//! returns a reply plus broadcasts for the shared status channel.
//! Transport (chat commands in, text out) lives outside this crate's
//! semantics; the bundled binary is only a line-oriented adapter.

pub mod command;
pub mod config;
pub mod engine;
pub mod model;
pub mod notify;
pub mod observability;
pub mod registry;
pub mod timeparse;
