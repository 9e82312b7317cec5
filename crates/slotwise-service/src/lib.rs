//! # slotwise-service
//!
//! Orchestration layer of the slotwise reservation service: resolves the
//! busy set for a resource and window, writes conflict-checked bookings,
//! and answers availability and next-slot queries.
//!
//! The temporal computation lives in `slotwise-engine`; persistence in
//! `slotwise-store`. This crate wires them together per request: every
//! entry point takes the pool, the runtime config, and a cancellation
//! token that is honored at every store await.
//!
//! A booking conflict is a **value** ([`CreateOutcome::Conflict`]), not an
//! error — it carries the clashing busy instances and next-available
//! suggestions for the client.
//!
//! ## Modules
//!
//! - [`resolver`] — (resource, window) → merged view of busy instances
//! - [`writer`] — conflict-checked creation of single and recurring bookings
//! - [`availability`] — gap enumeration and forward next-slot search
//! - [`config`] — environment-derived runtime knobs
//! - [`error`] — the service error taxonomy

pub mod availability;
pub mod config;
pub mod error;
pub mod resolver;
pub mod writer;

mod cancel;

pub use availability::{availability, next_available, AvailabilityReport, SuggestionParams};
pub use config::ServiceConfig;
pub use error::ServiceError;
pub use resolver::{resolve_busy, BusyInstance};
pub use writer::{
    create_booking, BookingException, BookingRecord, BookingRequest, ConflictEntry,
    ConflictReport, CreateOutcome,
};
