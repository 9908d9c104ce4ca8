use thiserror::Error;

use crate::db_types::{Chain, LedgerTransaction, NewLedgerTransaction};

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Invalid block range [{0}, {1}]")]
    InvalidBlockRange(i64, i64),
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::DatabaseError(e.to_string())
    }
}

/// The `TransactionLedger` trait is the durable record of transactions destined to watched addresses.
///
/// Rows are keyed by `(tx_hash, destination, chain)`. Within that key, a confirmed row always wins over a mempool
/// sighting of the same transaction.
#[allow(async_fn_in_trait)]
pub trait TransactionLedger {
    /// Stores the transaction, replacing any previous row for the same hash, chain and destination.
    ///
    /// If the new record is a mempool sighting and a confirmed row already exists for the hash on that chain, nothing
    /// is written and `None` is returned. Otherwise the stored row is returned.
    async fn upsert_transaction(&self, tx: NewLedgerTransaction) -> Result<Option<LedgerTransaction>, LedgerError>;

    /// All rows for the destination, confirmed rows first, then in insertion order.
    async fn fetch_transactions_for_destination(
        &self,
        destination: &str,
    ) -> Result<Vec<LedgerTransaction>, LedgerError>;

    /// Confirmed rows on `chain` with `low <= block_id <= high` whose destination is currently watched, in insertion
    /// order.
    async fn fetch_confirmed_in_window(
        &self,
        chain: Chain,
        low: i64,
        high: i64,
    ) -> Result<Vec<LedgerTransaction>, LedgerError>;

    /// Every row on `chain` with the given hash (one per destination), in insertion order.
    async fn fetch_transactions_for_hash(&self, tx_hash: &str, chain: Chain)
        -> Result<Vec<LedgerTransaction>, LedgerError>;

    /// Removes every mempool row for the chain. Returns the number of rows removed.
    async fn delete_mempool_transactions(&self, chain: Chain) -> Result<u64, LedgerError>;

    /// Removes every row recorded at `block_id` and returns them, in insertion order.
    async fn delete_transactions_at_block(&self, block_id: i64) -> Result<Vec<LedgerTransaction>, LedgerError>;

    /// True if the ledger holds a token-layer row with this hash, i.e. a native transaction with the same hash is
    /// the carrier of that token send.
    async fn token_counterpart_exists(&self, tx_hash: &str) -> Result<bool, LedgerError>;
}
