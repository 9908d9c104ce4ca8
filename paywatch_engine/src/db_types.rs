use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub use paywatch_common::{Satoshis, NATIVE_ASSET};

//--------------------------------------        Chain          ---------------------------------------------------------
/// Which of the two followed ledgers a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chain {
    /// The base-currency blockchain.
    Native,
    /// The asset protocol layered on top of the native chain.
    Token,
}

impl Chain {
    pub fn is_native(&self) -> bool {
        matches!(self, Chain::Native)
    }

    pub fn from_native_flag(is_native: bool) -> Self {
        if is_native {
            Chain::Native
        } else {
            Chain::Token
        }
    }
}

impl Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Chain::Native => write!(f, "native"),
            Chain::Token => write!(f, "token"),
        }
    }
}

//--------------------------------------   LedgerTransaction   ---------------------------------------------------------
/// A transaction destined to a watched address, as recorded in the ledger.
///
/// A single chain transaction paying two watched addresses is stored as two rows, one per destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LedgerTransaction {
    /// Insertion order. Later sightings of the same transaction replace the row and receive a new id.
    pub id: i64,
    pub tx_hash: String,
    /// The follower's own reference for the transaction: the hash for mempool rows, the transaction index for
    /// confirmed token sends.
    pub tx_ref: String,
    pub is_native: bool,
    pub is_mempool: bool,
    /// The confirming block, or for mempool rows, the chain height when the transaction was seen.
    pub block_id: i64,
    pub destination: String,
    #[sqlx(json)]
    pub sources: Vec<String>,
    pub asset: String,
    pub quantity: Satoshis,
    pub created_at: DateTime<Utc>,
}

impl LedgerTransaction {
    pub fn chain(&self) -> Chain {
        Chain::from_native_flag(self.is_native)
    }

    pub fn is_confirmed(&self) -> bool {
        !self.is_mempool
    }

    /// The number of blocks, inclusive, between this transaction's block and `head`.
    pub fn confirmations_at(&self, head: i64) -> i64 {
        head - self.block_id + 1
    }
}

impl Display for LedgerTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = if self.is_mempool { "mempool" } else { "confirmed" };
        write!(
            f,
            "[{}] {} {} {} to {} ({state} @{})",
            self.chain(),
            self.tx_hash,
            self.quantity,
            self.asset,
            self.destination,
            self.block_id
        )
    }
}

//-------------------------------------- NewLedgerTransaction ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLedgerTransaction {
    pub tx_hash: String,
    pub tx_ref: String,
    pub chain: Chain,
    pub is_mempool: bool,
    pub block_id: i64,
    pub destination: String,
    pub sources: Vec<String>,
    pub asset: String,
    pub quantity: Satoshis,
    pub created_at: DateTime<Utc>,
}

impl NewLedgerTransaction {
    /// Creates a confirmed record with the hash doubling as the transaction reference. Use the `with_*` methods to
    /// adjust the remaining fields.
    pub fn new(tx_hash: String, chain: Chain, destination: String, asset: String, quantity: Satoshis) -> Self {
        Self {
            tx_ref: tx_hash.clone(),
            tx_hash,
            chain,
            is_mempool: false,
            block_id: 0,
            destination,
            sources: Vec::new(),
            asset,
            quantity,
            created_at: Utc::now(),
        }
    }

    pub fn with_block(mut self, block_id: i64, is_mempool: bool) -> Self {
        self.block_id = block_id;
        self.is_mempool = is_mempool;
        self
    }

    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_tx_ref<S: Into<String>>(mut self, tx_ref: S) -> Self {
        self.tx_ref = tx_ref.into();
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

//--------------------------------------   DeliveryRecord      ---------------------------------------------------------
/// Proof that the event for `(tx_hash, destination, confirmations)` has been handed to the application.
///
/// `confirmations` is zero for mempool deliveries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DeliveryRecord {
    pub tx_hash: String,
    pub destination: String,
    pub confirmations: i64,
    pub block_id: i64,
}

//--------------------------------------   PendingCarrier      ---------------------------------------------------------
/// A small native transaction that might be the carrier of a token-layer send. Its delivery is on hold until the
/// token side shows up or the carrier timeout elapses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PendingCarrier {
    pub tx_hash: String,
    pub block_id: i64,
    pub is_mempool: bool,
    /// Unix timestamp (seconds) of the first time the transaction was classified as carrier-shaped.
    pub first_seen_at: i64,
}

impl PendingCarrier {
    pub fn new(tx_hash: String, block_id: i64, is_mempool: bool, first_seen: DateTime<Utc>) -> Self {
        Self { tx_hash, block_id, is_mempool, first_seen_at: first_seen.timestamp() }
    }

    pub fn first_seen(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.first_seen_at, 0)
    }
}
