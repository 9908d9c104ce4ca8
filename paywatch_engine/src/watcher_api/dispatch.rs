//! Adapters that route each follower's events into the [`Reconciler`].
use log::*;

use super::reconciler::Reconciler;
use crate::{
    clock::Clock,
    db_types::Chain,
    follower::{ChainFollower, FollowerEvent, FollowerEventSink, NativeTransaction, TokenSend},
    traits::WatcherDatabase,
    watcher_api::WatcherError,
};

/// Native events. Orphans are forwarded to the token follower as well, so it also holds that follower.
pub(crate) struct NativeDispatch<'a, B, C, T> {
    pub core: &'a mut Reconciler<B, C>,
    pub token: &'a mut T,
}

impl<B, C, T> FollowerEventSink<NativeTransaction> for NativeDispatch<'_, B, C, T>
where
    B: WatcherDatabase,
    C: Clock,
    T: ChainFollower<Data = TokenSend>,
{
    async fn handle_event(
        &mut self,
        event: FollowerEvent<NativeTransaction>,
        cursor: Option<i64>,
    ) -> Result<(), WatcherError> {
        match event {
            FollowerEvent::NewBlock { block_id } => self.core.new_block(Chain::Native, block_id).await,
            FollowerEvent::NewTransaction { data, block_id, is_mempool } => {
                self.core.native_transaction(data, block_id, is_mempool, cursor).await
            },
            FollowerEvent::OrphanedBlock { block_id } => self.core.orphaned_block(block_id, &mut *self.token).await,
        }
    }
}

pub(crate) struct TokenDispatch<'a, B, C> {
    pub core: &'a mut Reconciler<B, C>,
}

impl<B, C> FollowerEventSink<TokenSend> for TokenDispatch<'_, B, C>
where
    B: WatcherDatabase,
    C: Clock,
{
    async fn handle_event(&mut self, event: FollowerEvent<TokenSend>, cursor: Option<i64>) -> Result<(), WatcherError> {
        match event {
            FollowerEvent::NewBlock { block_id } => self.core.new_block(Chain::Token, block_id).await,
            FollowerEvent::NewTransaction { data, block_id, is_mempool } => {
                self.core.token_send(data, block_id, is_mempool, cursor).await
            },
            FollowerEvent::OrphanedBlock { block_id } => {
                // Token reorgs are driven from the native side via `orphan_block`
                warn!("🔄️ Ignoring orphan notice for token block {block_id}");
                Ok(())
            },
        }
    }
}
