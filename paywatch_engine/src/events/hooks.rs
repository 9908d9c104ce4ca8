use std::{future::Future, pin::Pin, sync::Arc};

use log::*;

use crate::{
    db_types::Chain,
    events::{
        BlockOrphanedEvent,
        ConfirmedTransactionEvent,
        MempoolTransactionEvent,
        NewBlockEvent,
        TransactionOrphanedEvent,
    },
};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// The set of application callbacks. Every hook is optional; an unset hook swallows its events.
///
/// Hooks are awaited inline by the orchestrator, one at a time and in delivery order. A slow hook therefore delays
/// the rest of the iteration.
///
/// ```rust,ignore
/// let mut hooks = EventHooks::default();
/// hooks.on_confirmed_transaction(|ev| {
///     Box::pin(async move {
///         println!("{} has {} confirmations", ev.transaction.tx_hash, ev.confirmations);
///     })
/// });
/// ```
#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_native_block: Option<Handler<NewBlockEvent>>,
    pub on_token_block: Option<Handler<NewBlockEvent>>,
    pub on_mempool_transaction: Option<Handler<MempoolTransactionEvent>>,
    pub on_confirmed_transaction: Option<Handler<ConfirmedTransactionEvent>>,
    pub on_block_orphaned: Option<Handler<BlockOrphanedEvent>>,
    pub on_transaction_orphaned: Option<Handler<TransactionOrphanedEvent>>,
}

impl EventHooks {
    pub fn on_native_block<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(NewBlockEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_native_block = Some(Arc::new(f));
        self
    }

    pub fn on_token_block<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(NewBlockEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_token_block = Some(Arc::new(f));
        self
    }

    pub fn on_mempool_transaction<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(MempoolTransactionEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_mempool_transaction = Some(Arc::new(f));
        self
    }

    pub fn on_confirmed_transaction<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(ConfirmedTransactionEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_confirmed_transaction = Some(Arc::new(f));
        self
    }

    pub fn on_block_orphaned<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(BlockOrphanedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_block_orphaned = Some(Arc::new(f));
        self
    }

    pub fn on_transaction_orphaned<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(TransactionOrphanedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_transaction_orphaned = Some(Arc::new(f));
        self
    }

    //--------------------------------------   Dispatch   ---------------------------------------------------------

    pub(crate) async fn new_block(&self, event: NewBlockEvent) {
        let hook = match event.chain {
            Chain::Native => &self.on_native_block,
            Chain::Token => &self.on_token_block,
        };
        dispatch(hook, event).await;
    }

    pub(crate) async fn mempool_transaction(&self, event: MempoolTransactionEvent) {
        dispatch(&self.on_mempool_transaction, event).await;
    }

    pub(crate) async fn confirmed_transaction(&self, event: ConfirmedTransactionEvent) {
        dispatch(&self.on_confirmed_transaction, event).await;
    }

    pub(crate) async fn block_orphaned(&self, event: BlockOrphanedEvent) {
        dispatch(&self.on_block_orphaned, event).await;
    }

    pub(crate) async fn transaction_orphaned(&self, event: TransactionOrphanedEvent) {
        dispatch(&self.on_transaction_orphaned, event).await;
    }
}

async fn dispatch<E>(hook: &Option<Handler<E>>, event: E) {
    match hook {
        Some(f) => f(event).await,
        None => trace!("🪝️ No hook registered for {}", std::any::type_name::<E>()),
    }
}
