use std::collections::BTreeMap;

use log::*;
use paywatch_engine::{
    db_types::Satoshis,
    follower::{
        ChainFollower,
        FollowerEvent,
        FollowerEventSink,
        NativeInput,
        NativeOutput,
        NativeTransaction,
        TokenSend,
    },
    WatcherError,
};

#[derive(Debug, Clone)]
pub struct ScriptedBlock<D> {
    pub hash: String,
    pub transactions: Vec<D>,
}

/// An in-memory chain follower. Tests edit the chain (add or replace blocks, set the mempool) between iterations.
///
/// Each call to `process_one_new_block`
/// * checks whether the blocks it already processed still have the same hash, and if `detects_reorgs` is set, emits
///   an orphan for each one that changed and rewinds once the orphan was handled;
/// * processes the next block if there is one (new block first, then its transactions);
/// * otherwise emits the mempool.
#[derive(Debug, Clone)]
pub struct ScriptedFollower<D> {
    blocks: BTreeMap<i64, ScriptedBlock<D>>,
    mempool: Vec<D>,
    genesis: i64,
    cursor: Option<i64>,
    processed_hashes: BTreeMap<i64, String>,
    detects_reorgs: bool,
    orphaned: Vec<i64>,
    failures_pending: usize,
    orphan_failures_pending: usize,
}

pub type ScriptedNativeFollower = ScriptedFollower<NativeTransaction>;
pub type ScriptedTokenFollower = ScriptedFollower<TokenSend>;

impl<D: Clone> ScriptedFollower<D> {
    fn new(detects_reorgs: bool) -> Self {
        Self {
            blocks: BTreeMap::new(),
            mempool: Vec::new(),
            genesis: 0,
            cursor: None,
            processed_hashes: BTreeMap::new(),
            detects_reorgs,
            orphaned: Vec::new(),
            failures_pending: 0,
            orphan_failures_pending: 0,
        }
    }

    pub fn add_block(&mut self, block_id: i64, transactions: Vec<D>) -> &mut Self {
        self.add_block_with_hash(block_id, &format!("block-{block_id}"), transactions)
    }

    /// Adds or replaces a block. Replacing a processed block with a different hash is a reorg.
    pub fn add_block_with_hash(&mut self, block_id: i64, hash: &str, transactions: Vec<D>) -> &mut Self {
        self.blocks.insert(block_id, ScriptedBlock { hash: hash.to_string(), transactions });
        self
    }

    pub fn add_empty_blocks(&mut self, from: i64, to: i64) -> &mut Self {
        for block_id in from..=to {
            self.add_block(block_id, Vec::new());
        }
        self
    }

    pub fn set_mempool(&mut self, transactions: Vec<D>) -> &mut Self {
        self.mempool = transactions;
        self
    }

    /// The next `n` calls to `process_one_new_block` fail without doing anything.
    pub fn fail_next(&mut self, n: usize) -> &mut Self {
        self.failures_pending = n;
        self
    }

    /// The next `n` calls to `orphan_block` fail without rewinding.
    pub fn fail_next_orphan(&mut self, n: usize) -> &mut Self {
        self.orphan_failures_pending = n;
        self
    }

    pub fn orphaned_blocks(&self) -> &[i64] {
        &self.orphaned
    }

    fn height(&self) -> Option<i64> {
        self.blocks.keys().next_back().copied()
    }

    fn rewind_to_before(&mut self, block_id: i64) {
        self.processed_hashes.retain(|b, _| *b < block_id);
        let previous = block_id - 1;
        self.cursor = if previous >= self.genesis { Some(previous) } else { None };
    }

    /// Highest processed block whose hash no longer matches the chain.
    fn stale_block(&self) -> Option<i64> {
        let cursor = self.cursor?;
        let seen = self.processed_hashes.get(&cursor)?;
        match self.blocks.get(&cursor) {
            Some(block) if &block.hash == seen => None,
            _ => Some(cursor),
        }
    }
}

impl ScriptedNativeFollower {
    pub fn native() -> Self {
        Self::new(true)
    }
}

impl ScriptedTokenFollower {
    pub fn token() -> Self {
        Self::new(false)
    }
}

impl<D: Clone> ChainFollower for ScriptedFollower<D> {
    type Data = D;

    fn set_genesis_block(&mut self, block_id: i64) {
        self.genesis = block_id;
    }

    fn last_processed_block(&self) -> Option<i64> {
        self.cursor
    }

    async fn process_one_new_block<S: FollowerEventSink<Self::Data>>(&mut self, sink: &mut S) -> Result<(), WatcherError> {
        if self.failures_pending > 0 {
            self.failures_pending -= 1;
            return Err(WatcherError::Follower("scripted node is unreachable".into()));
        }
        if self.detects_reorgs {
            while let Some(stale) = self.stale_block() {
                debug!("🧪️ Block {stale} changed. Orphaning it.");
                sink.handle_event(FollowerEvent::OrphanedBlock { block_id: stale }, self.cursor).await?;
                self.rewind_to_before(stale);
            }
        }
        let next = self.cursor.map(|c| c + 1).unwrap_or(self.genesis).max(self.genesis);
        match self.blocks.get(&next).cloned() {
            Some(block) => {
                self.cursor = Some(next);
                self.processed_hashes.insert(next, block.hash.clone());
                sink.handle_event(FollowerEvent::NewBlock { block_id: next }, self.cursor).await?;
                for data in block.transactions {
                    let event = FollowerEvent::NewTransaction { data, block_id: next, is_mempool: false };
                    sink.handle_event(event, self.cursor).await?;
                }
            },
            None => {
                let height = self.height().unwrap_or(self.genesis);
                for data in self.mempool.clone() {
                    let event = FollowerEvent::NewTransaction { data, block_id: height, is_mempool: true };
                    sink.handle_event(event, self.cursor).await?;
                }
            },
        }
        Ok(())
    }

    async fn orphan_block(&mut self, block_id: i64) -> Result<(), WatcherError> {
        if self.orphan_failures_pending > 0 {
            self.orphan_failures_pending -= 1;
            return Err(WatcherError::Follower(format!("scripted node could not rewind block {block_id}")));
        }
        self.orphaned.push(block_id);
        if self.cursor.map(|c| c >= block_id).unwrap_or(false) {
            self.rewind_to_before(block_id);
        }
        Ok(())
    }
}

//--------------------------------------   Transaction builders   ---------------------------------------------------

/// A native transaction from `source` paying each `(address, amount)` output.
pub fn native_tx(txid: &str, source: &str, outputs: &[(&str, i64)]) -> NativeTransaction {
    NativeTransaction {
        txid: txid.to_string(),
        inputs: vec![NativeInput { address: Some(source.to_string()) }],
        outputs: outputs
            .iter()
            .map(|(address, amount)| NativeOutput { address: Some(address.to_string()), amount: Satoshis::from(*amount) })
            .collect(),
    }
}

pub fn token_send(tx_hash: &str, destination: &str, asset: &str, quantity: i64, divisible: bool) -> TokenSend {
    TokenSend {
        tx_hash: tx_hash.to_string(),
        tx_index: None,
        block_index: None,
        source: "1AEwsource".to_string(),
        destination: destination.to_string(),
        asset: asset.to_string(),
        quantity,
        divisible,
    }
}

pub fn confirmed_token_send(
    tx_hash: &str,
    tx_index: i64,
    block_index: i64,
    destination: &str,
    quantity: i64,
) -> TokenSend {
    TokenSend { tx_index: Some(tx_index), block_index: Some(block_index), ..token_send(tx_hash, destination, "XCP", quantity, true) }
}
