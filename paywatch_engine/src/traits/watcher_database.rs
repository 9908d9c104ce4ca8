use crate::traits::{CarrierQueue, DeliveryTracker, LedgerError, TransactionLedger, WatchAddressManagement};

/// This trait bundles the storage behaviour the combining orchestrator depends on.
///
/// * [`TransactionLedger`] records transactions to watched destinations.
/// * [`WatchAddressManagement`] manages the watch set.
/// * [`DeliveryTracker`] remembers which events have already been delivered.
/// * [`CarrierQueue`] holds native transactions whose carrier status is unresolved.
///
/// The orchestrator is the only writer of all four.
#[allow(async_fn_in_trait)]
pub trait WatcherDatabase: Clone + TransactionLedger + WatchAddressManagement + DeliveryTracker + CarrierQueue {
    /// The URL of the database
    fn url(&self) -> &str;

    async fn close(&mut self) -> Result<(), LedgerError>;
}
