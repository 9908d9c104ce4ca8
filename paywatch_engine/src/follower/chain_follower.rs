use crate::watcher_api::WatcherError;

/// What a follower reports while advancing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowerEvent<D> {
    /// The follower has moved to `block_id`. Emitted before the block's own transactions.
    NewBlock { block_id: i64 },
    /// A transaction (native) or send (token layer). For mempool sightings `block_id` is the follower's view of the
    /// current height.
    NewTransaction { data: D, block_id: i64, is_mempool: bool },
    /// `block_id` is no longer part of the best chain. Only the native follower detects reorgs.
    OrphanedBlock { block_id: i64 },
}

/// Receives follower events.
///
/// `cursor` is the follower's last processed block at the time of the event, if it has one.
#[allow(async_fn_in_trait)]
pub trait FollowerEventSink<D> {
    async fn handle_event(&mut self, event: FollowerEvent<D>, cursor: Option<i64>) -> Result<(), WatcherError>;
}

/// A chain follower that advances at most one block per call.
#[allow(async_fn_in_trait)]
pub trait ChainFollower {
    /// The transaction payload this follower emits.
    type Data;

    /// No block below `block_id` will ever be processed.
    fn set_genesis_block(&mut self, block_id: i64);

    fn last_processed_block(&self) -> Option<i64>;

    /// Advances by at most one block, pushing every resulting event into `sink` in order. Does nothing if there is no
    /// new block. Errors (node unreachable and the like) are returned to the caller untouched.
    async fn process_one_new_block<S: FollowerEventSink<Self::Data>>(&mut self, sink: &mut S)
        -> Result<(), WatcherError>;

    /// Rewinds so that `block_id` is processed again. The native side calls this on the token follower when it sees
    /// a reorg.
    async fn orphan_block(&mut self, block_id: i64) -> Result<(), WatcherError>;
}
