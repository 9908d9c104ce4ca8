//! `SqliteDatabase` is the concrete storage backend for the combining orchestrator.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`] module.
use std::{collections::HashSet, fmt::Debug};

use chrono::{DateTime, Utc};
use log::*;
use sqlx::SqlitePool;

use super::db::{db_url, deliveries, new_pool, pending_carriers, transactions, watch_addresses};
use crate::{
    config::WatcherConfig,
    db_types::{Chain, DeliveryRecord, LedgerTransaction, NewLedgerTransaction, PendingCarrier},
    traits::{CarrierQueue, DeliveryTracker, LedgerError, TransactionLedger, WatchAddressManagement, WatcherDatabase},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl WatcherDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn close(&mut self) -> Result<(), LedgerError> {
        self.pool.close().await;
        Ok(())
    }
}

impl TransactionLedger for SqliteDatabase {
    async fn upsert_transaction(&self, tx: NewLedgerTransaction) -> Result<Option<LedgerTransaction>, LedgerError> {
        let mut db_tx = self.pool.begin().await?;
        let result = transactions::upsert(tx, &mut db_tx).await?;
        db_tx.commit().await?;
        if let Some(row) = &result {
            trace!("🧾️ Ledger row #{} stored: {row}", row.id);
        }
        Ok(result)
    }

    async fn fetch_transactions_for_destination(
        &self,
        destination: &str,
    ) -> Result<Vec<LedgerTransaction>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        transactions::fetch_for_destination(destination, &mut conn).await
    }

    async fn fetch_confirmed_in_window(
        &self,
        chain: Chain,
        low: i64,
        high: i64,
    ) -> Result<Vec<LedgerTransaction>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        transactions::fetch_confirmed_in_window(chain, low, high, &mut conn).await
    }

    async fn fetch_transactions_for_hash(
        &self,
        tx_hash: &str,
        chain: Chain,
    ) -> Result<Vec<LedgerTransaction>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        transactions::fetch_for_hash(tx_hash, chain, &mut conn).await
    }

    async fn delete_mempool_transactions(&self, chain: Chain) -> Result<u64, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let count = transactions::delete_mempool(chain, &mut conn).await?;
        if count > 0 {
            debug!("🧾️ Cleared {count} {chain} mempool transactions");
        }
        Ok(count)
    }

    async fn delete_transactions_at_block(&self, block_id: i64) -> Result<Vec<LedgerTransaction>, LedgerError> {
        let mut db_tx = self.pool.begin().await?;
        let removed = transactions::delete_at_block(block_id, &mut db_tx).await?;
        db_tx.commit().await?;
        debug!("🧾️ Removed {} ledger rows at block {block_id}", removed.len());
        Ok(removed)
    }

    async fn token_counterpart_exists(&self, tx_hash: &str) -> Result<bool, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        transactions::token_counterpart_exists(tx_hash, &mut conn).await
    }
}

impl WatchAddressManagement for SqliteDatabase {
    async fn add_watch_address(&self, address: &str) -> Result<(), LedgerError> {
        let mut conn = self.pool.acquire().await?;
        watch_addresses::insert(address, &mut conn).await?;
        debug!("👀️ Watching {address}");
        Ok(())
    }

    async fn remove_watch_address(&self, address: &str) -> Result<bool, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let removed = watch_addresses::remove(address, &mut conn).await?;
        if removed {
            debug!("👀️ No longer watching {address}");
        }
        Ok(removed)
    }

    async fn clear_watch_addresses(&self) -> Result<(), LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let count = watch_addresses::clear(&mut conn).await?;
        debug!("👀️ Cleared {count} watch addresses");
        Ok(())
    }

    async fn is_watched(&self, address: &str) -> Result<bool, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        watch_addresses::exists(address, &mut conn).await
    }

    async fn watch_address_snapshot(&self) -> Result<HashSet<String>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        watch_addresses::fetch_all(&mut conn).await
    }
}

impl DeliveryTracker for SqliteDatabase {
    async fn has_fired(&self, tx_hash: &str, destination: &str, confirmations: i64) -> Result<bool, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        deliveries::exists(tx_hash, destination, confirmations, &mut conn).await
    }

    async fn mark_fired(
        &self,
        tx_hash: &str,
        destination: &str,
        confirmations: i64,
        block_id: i64,
    ) -> Result<(), LedgerError> {
        let record = DeliveryRecord {
            tx_hash: tx_hash.to_string(),
            destination: destination.to_string(),
            confirmations,
            block_id,
        };
        let mut conn = self.pool.acquire().await?;
        deliveries::upsert(&record, &mut conn).await
    }

    async fn claim_delivery(
        &self,
        tx_hash: &str,
        destination: &str,
        confirmations: i64,
        block_id: i64,
    ) -> Result<bool, LedgerError> {
        let record = DeliveryRecord {
            tx_hash: tx_hash.to_string(),
            destination: destination.to_string(),
            confirmations,
            block_id,
        };
        let mut conn = self.pool.acquire().await?;
        deliveries::claim(&record, &mut conn).await
    }
}

impl CarrierQueue for SqliteDatabase {
    async fn save_pending_carrier(&self, carrier: PendingCarrier) -> Result<(), LedgerError> {
        let mut conn = self.pool.acquire().await?;
        pending_carriers::upsert(&carrier, &mut conn).await?;
        trace!("📦️ {} is pending as a possible carrier", carrier.tx_hash);
        Ok(())
    }

    async fn take_expired_carriers(&self, cutoff: DateTime<Utc>) -> Result<Vec<PendingCarrier>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        pending_carriers::take_expired(cutoff, &mut conn).await
    }

    async fn remove_pending_carrier(&self, tx_hash: &str) -> Result<bool, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        pending_carriers::remove(tx_hash, &mut conn).await
    }

    async fn delete_mempool_carriers(&self) -> Result<u64, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        pending_carriers::delete_mempool(&mut conn).await
    }

    async fn delete_carriers_from_block(&self, block_id: i64) -> Result<u64, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        pending_carriers::delete_from_block(block_id, &mut conn).await
    }

    async fn fetch_pending_carriers(&self) -> Result<Vec<PendingCarrier>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        pending_carriers::fetch_all(&mut conn).await
    }

    async fn mark_carrier_released(&self, tx_hash: &str, released_at: DateTime<Utc>) -> Result<(), LedgerError> {
        let mut conn = self.pool.acquire().await?;
        pending_carriers::mark_released(tx_hash, released_at, &mut conn).await?;
        debug!("📦️ {tx_hash} is now a released native payment");
        Ok(())
    }

    async fn is_carrier_released(&self, tx_hash: &str) -> Result<bool, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        pending_carriers::is_released(tx_hash, &mut conn).await
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using the URL in `PAYWATCH_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Connects using the database settings in `config`, running migrations first if the config asks for it.
    pub async fn from_config(config: &WatcherConfig) -> Result<Self, LedgerError> {
        let db = Self::new_with_url(&config.database_url, config.db_max_connections).await?;
        if config.run_migrations {
            db.migrate().await?;
        }
        Ok(db)
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date.
    pub async fn migrate(&self) -> Result<(), LedgerError> {
        sqlx::migrate!("./src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| LedgerError::DatabaseError(format!("Migration failed: {e}")))?;
        info!("🚀️ Migrations complete");
        Ok(())
    }
}
