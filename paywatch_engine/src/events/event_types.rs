use serde::{Deserialize, Serialize};

use crate::db_types::{Chain, LedgerTransaction};

/// A follower has moved on to a new block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBlockEvent {
    pub block_id: i64,
    pub chain: Chain,
}

impl NewBlockEvent {
    pub fn new(block_id: i64, chain: Chain) -> Self {
        Self { block_id, chain }
    }
}

/// An unconfirmed transaction to a watched address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MempoolTransactionEvent {
    pub transaction: LedgerTransaction,
    pub current_block_id: i64,
}

impl MempoolTransactionEvent {
    pub fn new(transaction: LedgerTransaction, current_block_id: i64) -> Self {
        Self { transaction, current_block_id }
    }
}

/// A transaction to a watched address has reached `confirmations` confirmations.
///
/// Every level from 1 up to the configured maximum is reported exactly once, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedTransactionEvent {
    pub transaction: LedgerTransaction,
    pub confirmations: i64,
    pub current_block_id: i64,
}

impl ConfirmedTransactionEvent {
    pub fn new(transaction: LedgerTransaction, confirmations: i64, current_block_id: i64) -> Self {
        Self { transaction, confirmations, current_block_id }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockOrphanedEvent {
    pub block_id: i64,
}

impl BlockOrphanedEvent {
    pub fn new(block_id: i64) -> Self {
        Self { block_id }
    }
}

/// A previously confirmed transaction was removed by a reorg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOrphanedEvent {
    pub transaction: LedgerTransaction,
}

impl TransactionOrphanedEvent {
    pub fn new(transaction: LedgerTransaction) -> Self {
        Self { transaction }
    }
}
