use crate::traits::LedgerError;

/// Idempotency ledger for application callbacks.
///
/// A record for `(tx_hash, destination, confirmations)` means that event has been delivered and must never be
/// delivered again. Records are write-once and never pruned.
#[allow(async_fn_in_trait)]
pub trait DeliveryTracker {
    async fn has_fired(&self, tx_hash: &str, destination: &str, confirmations: i64) -> Result<bool, LedgerError>;

    /// Records the delivery, overwriting the block id of any existing record for the same key.
    async fn mark_fired(
        &self,
        tx_hash: &str,
        destination: &str,
        confirmations: i64,
        block_id: i64,
    ) -> Result<(), LedgerError>;

    /// Atomically checks and records a delivery. Returns true if this call created the record, i.e. the caller now
    /// owns the delivery. Returns false if it had already been delivered.
    async fn claim_delivery(
        &self,
        tx_hash: &str,
        destination: &str,
        confirmations: i64,
        block_id: i64,
    ) -> Result<bool, LedgerError>;
}
