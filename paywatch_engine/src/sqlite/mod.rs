//! SQLite storage backend for the combining orchestrator.
//!
//! [`SqliteDatabase`] implements every trait in [`crate::traits`]. The free functions in [`db`] do the actual work and
//! can be composed inside a single transaction where atomicity matters.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
