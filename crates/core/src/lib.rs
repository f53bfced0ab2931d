//! goalpace core - savings goals, their badge schedules and monthly budgets.
//!
//! This crate contains the domain logic. It is database-agnostic and defines
//! traits that are implemented by the `storage-sqlite` crate.

pub mod budget;
pub mod constants;
pub mod errors;
pub mod events;
pub mod goals;
pub mod schedule;
pub mod settings;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
