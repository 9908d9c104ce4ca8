use std::fmt::Debug;

use chrono::Duration;
use log::*;

use super::{
    dispatch::{NativeDispatch, TokenDispatch},
    reconciler::Reconciler,
};
use crate::{
    clock::{Clock, SystemClock},
    config::{WatcherConfig, DEFAULT_GENESIS_BLOCK},
    db_types::LedgerTransaction,
    events::EventHooks,
    follower::{ChainFollower, NativeTransaction, TokenSend},
    traits::{TransactionLedger, WatchAddressManagement, WatcherDatabase},
    watcher_api::WatcherError,
};

/// The stateful coordinator of the two chain followers.
///
/// Each call to [`Self::run_one_iteration`] advances the native follower by at most one block, then the token
/// follower, then releases timed-out carriers. The orchestrator must be the only writer to its database, and
/// iterations must not overlap (`run_one_iteration` takes `&mut self`).
pub struct CombiningOrchestrator<B, N, T, C = SystemClock> {
    native: N,
    token: T,
    core: Reconciler<B, C>,
}

impl<B, N, T, C> Debug for CombiningOrchestrator<B, N, T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CombiningOrchestrator (max confirmations: {})", self.core.max_confirmations)
    }
}

impl<B, N, T> CombiningOrchestrator<B, N, T, SystemClock>
where
    B: WatcherDatabase,
    N: ChainFollower<Data = NativeTransaction>,
    T: ChainFollower<Data = TokenSend>,
{
    pub fn new(db: B, native: N, token: T) -> Self {
        Self::new_with_clock(db, native, token, SystemClock)
    }
}

impl<B, N, T, C> CombiningOrchestrator<B, N, T, C>
where
    B: WatcherDatabase,
    N: ChainFollower<Data = NativeTransaction>,
    T: ChainFollower<Data = TokenSend>,
    C: Clock,
{
    /// Creates an orchestrator that reads time from `clock`. Both followers are floored at the default genesis
    /// block.
    pub fn new_with_clock(db: B, mut native: N, mut token: T, clock: C) -> Self {
        native.set_genesis_block(DEFAULT_GENESIS_BLOCK);
        token.set_genesis_block(DEFAULT_GENESIS_BLOCK);
        Self { native, token, core: Reconciler::new(db, clock) }
    }

    pub fn with_hooks(mut self, hooks: EventHooks) -> Self {
        self.core.hooks = hooks;
        self
    }

    pub fn hooks_mut(&mut self) -> &mut EventHooks {
        &mut self.core.hooks
    }

    //--------------------------------------   Configuration   ---------------------------------------------------

    pub fn set_genesis_block(&mut self, block_id: i64) {
        self.native.set_genesis_block(block_id);
        self.token.set_genesis_block(block_id);
    }

    /// Sets how many confirmation levels are delivered per transaction. Values below 1 are raised to 1.
    pub fn set_max_confirmations_for_confirmed_callback(&mut self, max_confirmations: i64) {
        if max_confirmations < 1 {
            warn!("🔄️ Max confirmations must be at least 1. Ignoring {max_confirmations} and using 1.");
        }
        self.core.max_confirmations = max_confirmations.max(1);
    }

    pub fn max_confirmations(&self) -> i64 {
        self.core.max_confirmations
    }

    pub fn set_carrier_timeout(&mut self, timeout: Duration) {
        self.core.carriers.set_timeout(timeout);
    }

    /// Pushes the follower and delivery settings of `config` into this orchestrator.
    pub fn apply_config(&mut self, config: &WatcherConfig) {
        self.set_genesis_block(config.genesis_block);
        self.set_max_confirmations_for_confirmed_callback(config.max_confirmations);
        self.set_carrier_timeout(config.carrier_timeout);
        info!(
            "🔄️ Configured with genesis block {}, {} confirmations and a {}s carrier timeout",
            config.genesis_block,
            self.core.max_confirmations,
            config.carrier_timeout.num_seconds()
        );
    }

    //--------------------------------------   Watch addresses   ---------------------------------------------------

    pub async fn add_watch_address(&mut self, address: &str) -> Result<(), WatcherError> {
        self.core.db.add_watch_address(address).await?;
        self.core.invalidate_watch_cache();
        Ok(())
    }

    pub async fn remove_watch_address(&mut self, address: &str) -> Result<bool, WatcherError> {
        let removed = self.core.db.remove_watch_address(address).await?;
        self.core.invalidate_watch_cache();
        Ok(removed)
    }

    pub async fn clear_watch_addresses(&mut self) -> Result<(), WatcherError> {
        self.core.db.clear_watch_addresses().await?;
        self.core.invalidate_watch_cache();
        Ok(())
    }

    //--------------------------------------      Execution      ---------------------------------------------------

    /// Runs one processing step. Follower errors abort the step and are returned as is; the next call picks up where
    /// the followers left off.
    pub async fn run_one_iteration(&mut self) -> Result<(), WatcherError> {
        self.core.invalidate_watch_cache();
        let mut native_sink = NativeDispatch { core: &mut self.core, token: &mut self.token };
        self.native.process_one_new_block(&mut native_sink).await?;
        let mut token_sink = TokenDispatch { core: &mut self.core };
        self.token.process_one_new_block(&mut token_sink).await?;
        let native_height = self.native.last_processed_block();
        self.core.resolve_timed_out_carriers(native_height).await
    }

    //--------------------------------------       Queries       ---------------------------------------------------

    /// Every ledger row for `address`, confirmed rows first.
    pub async fn transactions_to_destination(&self, address: &str) -> Result<Vec<LedgerTransaction>, WatcherError> {
        let rows = self.core.db.fetch_transactions_for_destination(address).await?;
        Ok(rows)
    }

    pub fn db(&self) -> &B {
        &self.core.db
    }

    pub fn native_follower(&self) -> &N {
        &self.native
    }

    pub fn native_follower_mut(&mut self) -> &mut N {
        &mut self.native
    }

    pub fn token_follower(&self) -> &T {
        &self.token
    }

    pub fn token_follower_mut(&mut self) -> &mut T {
        &mut self.token
    }

    pub fn clock(&self) -> &C {
        self.core.carriers.clock()
    }
}
