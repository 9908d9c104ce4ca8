use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::{db_types::PendingCarrier, traits::LedgerError};

/// Records a carrier-shaped transaction. If the hash is already pending, its block and mempool flag are updated but
/// the original `first_seen_at` is kept, so repeated sightings do not postpone the timeout.
pub async fn upsert(carrier: &PendingCarrier, conn: &mut SqliteConnection) -> Result<(), LedgerError> {
    sqlx::query(
        r#"
            INSERT INTO pending_carriers (tx_hash, block_id, is_mempool, first_seen_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT(tx_hash) DO UPDATE SET block_id = excluded.block_id, is_mempool = excluded.is_mempool
        "#,
    )
    .bind(&carrier.tx_hash)
    .bind(carrier.block_id)
    .bind(carrier.is_mempool)
    .bind(carrier.first_seen_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Removes and returns every carrier first seen at or before `cutoff`, oldest first.
pub async fn take_expired(cutoff: DateTime<Utc>, conn: &mut SqliteConnection) -> Result<Vec<PendingCarrier>, LedgerError> {
    let mut expired: Vec<PendingCarrier> = sqlx::query_as(
        "DELETE FROM pending_carriers WHERE first_seen_at <= $1 RETURNING tx_hash, block_id, is_mempool, first_seen_at",
    )
    .bind(cutoff.timestamp())
    .fetch_all(conn)
    .await?;
    expired.sort_by(|a, b| a.first_seen_at.cmp(&b.first_seen_at).then_with(|| a.tx_hash.cmp(&b.tx_hash)));
    Ok(expired)
}

pub async fn remove(tx_hash: &str, conn: &mut SqliteConnection) -> Result<bool, LedgerError> {
    let result = sqlx::query("DELETE FROM pending_carriers WHERE tx_hash = $1").bind(tx_hash).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_mempool(conn: &mut SqliteConnection) -> Result<u64, LedgerError> {
    let result = sqlx::query("DELETE FROM pending_carriers WHERE is_mempool = 1").execute(conn).await?;
    Ok(result.rows_affected())
}

pub async fn delete_from_block(block_id: i64, conn: &mut SqliteConnection) -> Result<u64, LedgerError> {
    let result = sqlx::query("DELETE FROM pending_carriers WHERE block_id >= $1")
        .bind(block_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn fetch_all(conn: &mut SqliteConnection) -> Result<Vec<PendingCarrier>, LedgerError> {
    let rows = sqlx::query_as(
        "SELECT tx_hash, block_id, is_mempool, first_seen_at FROM pending_carriers ORDER BY first_seen_at, tx_hash",
    )
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

/// Remembers that the hash timed out without a token counterpart. The first release time is kept.
pub async fn mark_released(tx_hash: &str, released_at: DateTime<Utc>, conn: &mut SqliteConnection) -> Result<(), LedgerError> {
    sqlx::query("INSERT INTO released_carriers (tx_hash, released_at) VALUES ($1, $2) ON CONFLICT(tx_hash) DO NOTHING")
        .bind(tx_hash)
        .bind(released_at.timestamp())
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn is_released(tx_hash: &str, conn: &mut SqliteConnection) -> Result<bool, LedgerError> {
    let found: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM released_carriers WHERE tx_hash = $1)")
        .bind(tx_hash)
        .fetch_one(conn)
        .await?;
    Ok(found)
}
