//! Paywatch Engine
//!
//! Tracks payments to a set of watched addresses across two views of the same chain: the native currency, and a
//! token protocol layered on top of it. Two upstream followers report blocks, transactions and reorgs; the
//! [`CombiningOrchestrator`] merges them into one stream of events that is
//!
//! * deduplicated: each `(transaction, destination, confirmations)` event is delivered at most once, across restarts;
//! * confirmation-aware: every confirmation level up to a configurable maximum is delivered, in order;
//! * reorg-safe: orphaned blocks are unwound and reported;
//! * carrier-aware: the dust-sized native transaction that carries a token send is not reported as a payment of its
//!   own.
//!
//! The library is divided into
//! 1. Storage ([`mod@traits`] and the SQLite backend, [`SqliteDatabase`]). The orchestrator only talks to the traits.
//! 2. The follower contract ([`mod@follower`]) that upstream chain followers implement.
//! 3. Application callbacks ([`mod@events`]).
//! 4. The orchestrator itself, plus [`run_watcher`] to drive it on a timer.
pub mod carrier;
pub mod clock;
pub mod config;
pub mod db_types;
pub mod events;
pub mod follower;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;
mod watcher_api;
mod worker;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use watcher_api::{CombiningOrchestrator, WatcherError, DEFAULT_MAX_CONFIRMATIONS};
pub use worker::run_watcher;
