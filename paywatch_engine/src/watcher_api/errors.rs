use thiserror::Error;

use crate::traits::LedgerError;

#[derive(Debug, Clone, Error)]
pub enum WatcherError {
    #[error("Database error: {0}")]
    Database(#[from] LedgerError),
    /// An upstream follower failed. The iteration is abandoned and should be retried on the next tick.
    #[error("Follower error: {0}")]
    Follower(String),
}
