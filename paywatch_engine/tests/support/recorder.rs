use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex},
};

use log::*;
use paywatch_engine::events::EventHooks;

/// One hook invocation, reduced to what the tests assert on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    NativeBlock(i64),
    TokenBlock(i64),
    Mempool { tx_hash: String, destination: String, is_native: bool, current_block: i64 },
    Confirmed { tx_hash: String, destination: String, is_native: bool, confirmations: i64, current_block: i64 },
    BlockOrphaned(i64),
    TransactionOrphaned { tx_hash: String, destination: String },
}

#[derive(Default, Clone)]
pub struct Recorder {
    events: Arc<Mutex<Vec<Recorded>>>,
}

type Fut = Pin<Box<dyn Future<Output = ()> + Send>>;

impl Recorder {
    fn push(&self, event: Recorded) -> Fut {
        info!("🪝️ {event:?}");
        self.events.lock().unwrap().push(event);
        Box::pin(async {}) as Fut
    }

    pub fn hooks(&self) -> EventHooks {
        let mut hooks = EventHooks::default();
        let r = self.clone();
        hooks.on_native_block(move |ev| r.push(Recorded::NativeBlock(ev.block_id)));
        let r = self.clone();
        hooks.on_token_block(move |ev| r.push(Recorded::TokenBlock(ev.block_id)));
        let r = self.clone();
        hooks.on_mempool_transaction(move |ev| {
            r.push(Recorded::Mempool {
                tx_hash: ev.transaction.tx_hash.clone(),
                destination: ev.transaction.destination.clone(),
                is_native: ev.transaction.is_native,
                current_block: ev.current_block_id,
            })
        });
        let r = self.clone();
        hooks.on_confirmed_transaction(move |ev| {
            r.push(Recorded::Confirmed {
                tx_hash: ev.transaction.tx_hash.clone(),
                destination: ev.transaction.destination.clone(),
                is_native: ev.transaction.is_native,
                confirmations: ev.confirmations,
                current_block: ev.current_block_id,
            })
        });
        let r = self.clone();
        hooks.on_block_orphaned(move |ev| r.push(Recorded::BlockOrphaned(ev.block_id)));
        let r = self.clone();
        hooks.on_transaction_orphaned(move |ev| {
            r.push(Recorded::TransactionOrphaned {
                tx_hash: ev.transaction.tx_hash.clone(),
                destination: ev.transaction.destination.clone(),
            })
        });
        hooks
    }

    pub fn events(&self) -> Vec<Recorded> {
        self.events.lock().unwrap().clone()
    }

    pub fn native_blocks(&self) -> Vec<i64> {
        self.events().into_iter().filter_map(|e| if let Recorded::NativeBlock(b) = e { Some(b) } else { None }).collect()
    }

    pub fn token_blocks(&self) -> Vec<i64> {
        self.events().into_iter().filter_map(|e| if let Recorded::TokenBlock(b) = e { Some(b) } else { None }).collect()
    }

    pub fn mempool(&self) -> Vec<Recorded> {
        self.events().into_iter().filter(|e| matches!(e, Recorded::Mempool { .. })).collect()
    }

    /// `(tx_hash, confirmations)` of every confirmed delivery, in order.
    pub fn confirmations(&self) -> Vec<(String, i64)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Recorded::Confirmed { tx_hash, confirmations, .. } => Some((tx_hash, confirmations)),
                _ => None,
            })
            .collect()
    }

    /// Every delivery (mempool or confirmed) of a native-chain row.
    pub fn native_deliveries(&self) -> Vec<Recorded> {
        self.events()
            .into_iter()
            .filter(|e| {
                matches!(e, Recorded::Mempool { is_native: true, .. } | Recorded::Confirmed { is_native: true, .. })
            })
            .collect()
    }

    pub fn orphans(&self) -> Vec<Recorded> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, Recorded::BlockOrphaned(_) | Recorded::TransactionOrphaned { .. }))
            .collect()
    }
}
