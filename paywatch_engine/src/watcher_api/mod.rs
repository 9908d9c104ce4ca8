//! # Combining orchestrator
//!
//! [`CombiningOrchestrator`] merges a native-chain follower and a token-layer follower into one stream of
//! deduplicated, confirmation-aware payment events for a set of watched addresses.
//!
//! ```rust,ignore
//! let db = SqliteDatabase::new_with_url(&config.database_url, config.db_max_connections).await?;
//! let mut orchestrator = CombiningOrchestrator::new(db, native_follower, token_follower);
//! orchestrator.apply_config(&config);
//! orchestrator.add_watch_address("1AEw...").await?;
//! orchestrator.hooks_mut().on_confirmed_transaction(|ev| Box::pin(async move { notify(ev).await }));
//! run_watcher(&mut orchestrator, config.poll_interval, shutdown_signal()).await;
//! ```
mod dispatch;
mod errors;
mod orchestrator;
mod reconciler;

pub use errors::WatcherError;
pub use orchestrator::CombiningOrchestrator;
pub use reconciler::DEFAULT_MAX_CONFIRMATIONS;
