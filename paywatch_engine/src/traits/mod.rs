//! # Storage contracts
//!
//! This module defines the behaviour a storage backend must provide for the combining orchestrator. The orchestrator
//! never talks to a database directly; it goes through these traits, so that the same reconciliation logic runs
//! against any backend.
//!
//! * [`TransactionLedger`] is the record of transactions destined to watched addresses.
//! * [`WatchAddressManagement`] is the watch set.
//! * [`DeliveryTracker`] is the idempotency ledger for callbacks.
//! * [`CarrierQueue`] holds native transactions that might be carriers of token-layer sends.
//! * [`WatcherDatabase`] bundles them.
mod carrier_queue;
mod delivery_tracker;
mod transaction_ledger;
mod watch_addresses;
mod watcher_database;

pub use carrier_queue::CarrierQueue;
pub use delivery_tracker::DeliveryTracker;
pub use transaction_ledger::{LedgerError, TransactionLedger};
pub use watch_addresses::WatchAddressManagement;
pub use watcher_database::WatcherDatabase;
