use std::collections::HashSet;

use log::*;

use crate::{
    carrier::CarrierCorrelation,
    clock::Clock,
    db_types::{Chain, LedgerTransaction, NewLedgerTransaction, Satoshis, NATIVE_ASSET},
    events::{
        BlockOrphanedEvent,
        ConfirmedTransactionEvent,
        EventHooks,
        MempoolTransactionEvent,
        NewBlockEvent,
        TransactionOrphanedEvent,
    },
    follower::{ChainFollower, NativeTransaction, TokenSend},
    traits::WatcherDatabase,
    watcher_api::WatcherError,
};

pub const DEFAULT_MAX_CONFIRMATIONS: i64 = 6;

/// The orchestrator's state, minus the followers.
///
/// Followers push events into this while they hold `&mut self` on themselves, so the two live in disjoint fields of
/// [`super::CombiningOrchestrator`].
pub(crate) struct Reconciler<B, C> {
    pub(crate) db: B,
    pub(crate) hooks: EventHooks,
    pub(crate) carriers: CarrierCorrelation<C>,
    pub(crate) max_confirmations: i64,
    watch_cache: Option<HashSet<String>>,
}

impl<B, C> Reconciler<B, C>
where
    B: WatcherDatabase,
    C: Clock,
{
    pub fn new(db: B, clock: C) -> Self {
        Self {
            db,
            hooks: EventHooks::default(),
            carriers: CarrierCorrelation::new(clock),
            max_confirmations: DEFAULT_MAX_CONFIRMATIONS,
            watch_cache: None,
        }
    }

    pub fn invalidate_watch_cache(&mut self) {
        self.watch_cache = None;
    }

    async fn watched(&mut self) -> Result<&HashSet<String>, WatcherError> {
        if self.watch_cache.is_none() {
            let snapshot = self.db.watch_address_snapshot().await?;
            trace!("🔄️ Loaded {} watch addresses", snapshot.len());
            self.watch_cache = Some(snapshot);
        }
        Ok(self.watch_cache.get_or_insert_with(HashSet::new))
    }

    //--------------------------------------   Follower events   ---------------------------------------------------

    /// Clears the chain's mempool view, announces the block, and replays pending confirmations up to `block_id`.
    pub async fn new_block(&mut self, chain: Chain, block_id: i64) -> Result<(), WatcherError> {
        debug!("🔄️🧱️ New {chain} block {block_id}");
        self.db.delete_mempool_transactions(chain).await?;
        self.hooks.new_block(NewBlockEvent::new(block_id, chain)).await;
        if chain.is_native() {
            let purged = self.db.delete_mempool_carriers().await?;
            if purged > 0 {
                trace!("🔄️📦️ Purged {purged} mempool carriers");
            }
        }
        self.confirmation_sweep(chain, block_id).await
    }

    pub async fn native_transaction(
        &mut self,
        tx: NativeTransaction,
        block_id: i64,
        is_mempool: bool,
        cursor: Option<i64>,
    ) -> Result<(), WatcherError> {
        let current_block_id = current_block_id(block_id, is_mempool, cursor);
        let payments = {
            let watched = self.watched().await?;
            let mut payments: Vec<(String, Satoshis)> = Vec::new();
            for (address, amount) in tx.addressed_outputs().filter(|(a, _)| watched.contains(*a)) {
                match payments.iter_mut().find(|(dest, _)| dest == address) {
                    Some((_, total)) => *total += amount,
                    None => payments.push((address.to_string(), amount)),
                }
            }
            payments
        };
        if payments.is_empty() {
            return Ok(());
        }
        let sources = tx.sources();
        for (destination, amount) in payments {
            let record = NewLedgerTransaction::new(
                tx.txid.clone(),
                Chain::Native,
                destination,
                NATIVE_ASSET.to_string(),
                amount,
            )
            .with_block(current_block_id, is_mempool)
            .with_sources(sources.clone())
            .with_created_at(self.carriers.now());
            self.record_and_deliver(record, current_block_id).await?;
        }
        Ok(())
    }

    pub async fn token_send(
        &mut self,
        send: TokenSend,
        block_id: i64,
        is_mempool: bool,
        cursor: Option<i64>,
    ) -> Result<(), WatcherError> {
        let current_block_id = current_block_id(block_id, is_mempool, cursor);
        if !self.watched().await?.contains(&send.destination) {
            return Ok(());
        }
        let quantity = match send.normalized_quantity() {
            Ok(q) => q,
            Err(e) => {
                warn!("🔄️ Skipping token send {}. {e}", send.tx_hash);
                return Ok(());
            },
        };
        let tx_ref = match (is_mempool, send.tx_index) {
            (false, Some(index)) => index.to_string(),
            _ => send.tx_hash.clone(),
        };
        let record = NewLedgerTransaction::new(send.tx_hash, Chain::Token, send.destination, send.asset, quantity)
            .with_block(current_block_id, is_mempool)
            .with_tx_ref(tx_ref)
            .with_sources(vec![send.source])
            .with_created_at(self.carriers.now());
        self.record_and_deliver(record, current_block_id).await
    }

    /// Unwinds `block_id`: rewinds the token follower, drops the block's ledger rows, and tells the application what
    /// was lost.
    ///
    /// The token follower is rewound first. If that fails, the ledger is untouched and the orphan can be handled again
    /// on the next iteration.
    pub async fn orphaned_block<T: ChainFollower>(&mut self, block_id: i64, token: &mut T) -> Result<(), WatcherError> {
        info!("🔄️🧱️ Block {block_id} was orphaned");
        token.orphan_block(block_id).await?;
        let removed = self.db.delete_transactions_at_block(block_id).await?;
        self.hooks.block_orphaned(BlockOrphanedEvent::new(block_id)).await;
        for tx in removed.into_iter().filter(LedgerTransaction::is_confirmed) {
            debug!("🔄️🧱️ Orphaned transaction {tx}");
            self.hooks.transaction_orphaned(TransactionOrphanedEvent::new(tx)).await;
        }
        let dropped = self.db.delete_carriers_from_block(block_id).await?;
        if dropped > 0 {
            debug!("🔄️📦️ Dropped {dropped} pending carriers at or above block {block_id}");
        }
        Ok(())
    }

    //--------------------------------------      Delivery      ---------------------------------------------------

    async fn record_and_deliver(
        &mut self,
        record: NewLedgerTransaction,
        current_block_id: i64,
    ) -> Result<(), WatcherError> {
        let Some(row) = self.db.upsert_transaction(record).await? else {
            return Ok(());
        };
        if self.carriers.classify(&self.db, &row).await?.suppresses_delivery() {
            return Ok(());
        }
        let confirmations = if row.is_mempool { 0 } else { 1 };
        self.deliver(row, confirmations, current_block_id).await
    }

    /// Replays every undelivered confirmation level for confirmed rows within `max_confirmations` of `head`.
    async fn confirmation_sweep(&mut self, chain: Chain, head: i64) -> Result<(), WatcherError> {
        let low = head - self.max_confirmations + 1;
        let rows = self.db.fetch_confirmed_in_window(chain, low, head).await?;
        trace!("🔄️ Confirmation sweep of {chain} blocks [{low}, {head}] covers {} rows", rows.len());
        for row in rows {
            if self.carriers.classify(&self.db, &row).await?.suppresses_delivery() {
                continue;
            }
            let levels = row.confirmations_at(head).min(self.max_confirmations);
            self.deliver_levels(&row, levels, head).await?;
        }
        Ok(())
    }

    /// Delivers carriers that were held back and never matched by a token send.
    pub async fn resolve_timed_out_carriers(&mut self, native_height: Option<i64>) -> Result<(), WatcherError> {
        let released = self.carriers.release_timed_out(&self.db).await?;
        for carrier in released {
            let rows = self.db.fetch_transactions_for_hash(&carrier.tx_hash, Chain::Native).await?;
            for row in rows {
                if !self.watched().await?.contains(&row.destination) {
                    continue;
                }
                let head = native_height.unwrap_or(row.block_id);
                if row.is_mempool {
                    self.deliver(row, 0, head).await?;
                } else {
                    let head = head.max(row.block_id);
                    let levels = row.confirmations_at(head).clamp(1, self.max_confirmations);
                    self.deliver_levels(&row, levels, head).await?;
                }
            }
        }
        Ok(())
    }

    async fn deliver_levels(&mut self, row: &LedgerTransaction, levels: i64, head: i64) -> Result<(), WatcherError> {
        for confirmations in 1..=levels {
            if self.db.has_fired(&row.tx_hash, &row.destination, confirmations).await? {
                continue;
            }
            self.deliver(row.clone(), confirmations, head).await?;
        }
        Ok(())
    }

    /// Claims the delivery and, if this call won the claim, invokes the matching hook.
    async fn deliver(
        &mut self,
        row: LedgerTransaction,
        confirmations: i64,
        current_block_id: i64,
    ) -> Result<(), WatcherError> {
        let claimed =
            self.db.claim_delivery(&row.tx_hash, &row.destination, confirmations, current_block_id).await?;
        if !claimed {
            trace!("🔄️ {} to {} at {confirmations} confirmations was already delivered", row.tx_hash, row.destination);
            return Ok(());
        }
        if confirmations == 0 {
            debug!("🔄️📨️ Mempool transaction {row}");
            self.hooks.mempool_transaction(MempoolTransactionEvent::new(row, current_block_id)).await;
        } else {
            debug!("🔄️📨️ Confirmed transaction {row} ({confirmations} confirmations)");
            self.hooks.confirmed_transaction(ConfirmedTransactionEvent::new(row, confirmations, current_block_id)).await;
        }
        Ok(())
    }
}

/// Confirmed transactions belong to their own block. Mempool sightings are pinned to the follower's cursor, or the
/// reported block if the follower has not processed anything yet.
fn current_block_id(block_id: i64, is_mempool: bool, cursor: Option<i64>) -> i64 {
    if is_mempool {
        cursor.unwrap_or(block_id)
    } else {
        block_id
    }
}
