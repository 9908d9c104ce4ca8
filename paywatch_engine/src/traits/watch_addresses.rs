use std::collections::HashSet;

use crate::traits::LedgerError;

/// The set of destination addresses the operator wants to hear about.
#[allow(async_fn_in_trait)]
pub trait WatchAddressManagement {
    /// Adds the address to the watch set. Adding an address twice is not an error.
    async fn add_watch_address(&self, address: &str) -> Result<(), LedgerError>;

    /// Removes the address. Returns false if it was not being watched.
    async fn remove_watch_address(&self, address: &str) -> Result<bool, LedgerError>;

    async fn clear_watch_addresses(&self) -> Result<(), LedgerError>;

    async fn is_watched(&self, address: &str) -> Result<bool, LedgerError>;

    /// The full watch set, for cheap membership tests while scanning every output of a block.
    async fn watch_address_snapshot(&self) -> Result<HashSet<String>, LedgerError>;
}
