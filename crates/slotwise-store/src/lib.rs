//! # slotwise-store
//!
//! PostgreSQL persistence for the slotwise reservation service.
//!
//! The store owns three things:
//!
//! - the process-wide connection pool ([`connect`]),
//! - the versioned schema runner ([`run_migrations`]),
//! - the booking repository ([`repository`]) — plain query functions over
//!   `&mut PgConnection` so they compose into the service layer's
//!   transactions.
//!
//! Bookings live in a table with a generated `tstzrange` column and a
//! GiST exclusion constraint on `(resource_id, time_range)` — the storage
//! layer, not application code, is the authority for the per-resource
//! non-overlap invariant on stored rows.

pub mod error;
pub mod models;
pub mod pool;
pub mod repository;
pub mod schema;

pub use error::StoreError;
pub use models::{
    BookingRow, ExceptionRow, NewBooking, NewException, RecurringBooking, Resource,
};
pub use pool::connect;
pub use schema::run_migrations;
