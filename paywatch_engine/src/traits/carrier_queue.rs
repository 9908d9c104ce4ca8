use chrono::{DateTime, Utc};

use crate::{db_types::PendingCarrier, traits::LedgerError};

/// Durable queue of native transactions whose carrier status is not yet known.
#[allow(async_fn_in_trait)]
pub trait CarrierQueue {
    /// Registers the transaction as a pending carrier. If the hash is already pending, its block and mempool flag are
    /// updated but the original `first_seen_at` is kept, so that a transaction sighted on every iteration still
    /// times out.
    async fn save_pending_carrier(&self, carrier: PendingCarrier) -> Result<(), LedgerError>;

    /// Removes and returns every pending carrier first seen at or before `cutoff`, oldest first.
    async fn take_expired_carriers(&self, cutoff: DateTime<Utc>) -> Result<Vec<PendingCarrier>, LedgerError>;

    /// Removes the pending carrier for the hash, if any.
    async fn remove_pending_carrier(&self, tx_hash: &str) -> Result<bool, LedgerError>;

    /// Removes every pending carrier that was sighted in the mempool.
    async fn delete_mempool_carriers(&self) -> Result<u64, LedgerError>;

    /// Removes every pending carrier recorded at or after `block_id`.
    async fn delete_carriers_from_block(&self, block_id: i64) -> Result<u64, LedgerError>;

    async fn fetch_pending_carriers(&self) -> Result<Vec<PendingCarrier>, LedgerError>;

    /// Records that the hash timed out with no token-layer counterpart and was released as a native payment.
    /// Release markers are never removed.
    async fn mark_carrier_released(&self, tx_hash: &str, released_at: DateTime<Utc>) -> Result<(), LedgerError>;

    async fn is_carrier_released(&self, tx_hash: &str) -> Result<bool, LedgerError>;
}
