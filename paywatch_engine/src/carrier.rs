//! # Carrier correlation
//!
//! Every token-layer send is physically carried by a native transaction that moves a dust amount to the same
//! destination. Left alone, that carrier would be reported as a tiny native payment next to the real token payment.
//!
//! [`CarrierCorrelation`] holds back any native transaction at or below the dust ceiling until either the token side
//! with the same hash shows up (it was a carrier, stay quiet forever) or the carrier timeout elapses (it was a real
//! small payment, release it).
use chrono::{DateTime, Duration, Utc};
use log::*;

use crate::{
    clock::Clock,
    db_types::{LedgerTransaction, PendingCarrier, Satoshis},
    traits::{LedgerError, WatcherDatabase},
};

/// Largest native amount that can be a token-layer carrier.
pub const DEFAULT_DUST_CEILING: Satoshis = Satoshis::new(7_800);
pub const DEFAULT_CARRIER_TIMEOUT_SECS: i64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrierStatus {
    /// The token-layer send with the same hash is in the ledger. Never deliver this native transaction.
    ConfirmedCarrier,
    /// Small enough to be a carrier and not yet resolved. Delivery is on hold.
    CarrierShaped,
    NotCarrier,
}

impl CarrierStatus {
    pub fn suppresses_delivery(&self) -> bool {
        !matches!(self, CarrierStatus::NotCarrier)
    }
}

#[derive(Debug, Clone)]
pub struct CarrierCorrelation<C> {
    clock: C,
    dust_ceiling: Satoshis,
    timeout: Duration,
}

impl<C: Clock> CarrierCorrelation<C> {
    pub fn new(clock: C) -> Self {
        Self { clock, dust_ceiling: DEFAULT_DUST_CEILING, timeout: Duration::seconds(DEFAULT_CARRIER_TIMEOUT_SECS) }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn dust_ceiling(&self) -> Satoshis {
        self.dust_ceiling
    }

    /// Decides whether delivery of `tx` must be held back.
    ///
    /// Token-layer rows are never carriers. A carrier-shaped native row is registered (or refreshed) in the pending
    /// queue. A small native row whose hash was released by an earlier timeout is treated as a normal payment from
    /// then on.
    pub async fn classify<B: WatcherDatabase>(&self, db: &B, tx: &LedgerTransaction) -> Result<CarrierStatus, LedgerError> {
        if !tx.is_native {
            return Ok(CarrierStatus::NotCarrier);
        }
        if db.token_counterpart_exists(&tx.tx_hash).await? {
            if db.remove_pending_carrier(&tx.tx_hash).await? {
                debug!("📦️ {} resolved as the carrier of a token send", tx.tx_hash);
            }
            return Ok(CarrierStatus::ConfirmedCarrier);
        }
        if tx.quantity > self.dust_ceiling {
            return Ok(CarrierStatus::NotCarrier);
        }
        if db.is_carrier_released(&tx.tx_hash).await? {
            trace!("📦️ {} was released earlier. Treating it as a payment.", tx.tx_hash);
            return Ok(CarrierStatus::NotCarrier);
        }
        let pending = PendingCarrier::new(tx.tx_hash.clone(), tx.block_id, tx.is_mempool, self.clock.now());
        db.save_pending_carrier(pending).await?;
        trace!("📦️ {} ({}) looks like a carrier. Holding it back.", tx.tx_hash, tx.quantity);
        Ok(CarrierStatus::CarrierShaped)
    }

    /// Removes every pending carrier older than the timeout and returns those that never found a token-layer
    /// counterpart. These are genuine small payments and should now be delivered. Each one is marked as released so
    /// that later sightings are not held back again.
    pub async fn release_timed_out<B: WatcherDatabase>(&self, db: &B) -> Result<Vec<PendingCarrier>, LedgerError> {
        let now = self.clock.now();
        let cutoff = now - self.timeout;
        let expired = db.take_expired_carriers(cutoff).await?;
        let mut released = Vec::with_capacity(expired.len());
        for carrier in expired {
            if db.token_counterpart_exists(&carrier.tx_hash).await? {
                trace!("📦️ {} timed out but has a token counterpart. Dropping it.", carrier.tx_hash);
            } else {
                debug!("📦️ {} was not matched by a token send in time. Releasing it.", carrier.tx_hash);
                db.mark_carrier_released(&carrier.tx_hash, now).await?;
                released.push(carrier);
            }
        }
        Ok(released)
    }
}
