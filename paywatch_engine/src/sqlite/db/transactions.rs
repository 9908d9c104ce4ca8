use log::trace;
use sqlx::{types::Json, SqliteConnection};

use crate::{
    db_types::{Chain, LedgerTransaction, NewLedgerTransaction},
    traits::LedgerError,
};

/// Stores the transaction unless it is a mempool echo of a transaction that is already confirmed on the same chain.
///
/// Any previous row for `(tx_hash, destination, chain)` is removed first. Run this inside a transaction so that the
/// delete and insert are atomic.
pub async fn upsert(
    tx: NewLedgerTransaction,
    conn: &mut SqliteConnection,
) -> Result<Option<LedgerTransaction>, LedgerError> {
    let is_native = tx.chain.is_native();
    if tx.is_mempool {
        let confirmed: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM ledger_transactions WHERE tx_hash = $1 AND is_native = $2 AND is_mempool = 0 LIMIT 1",
        )
        .bind(&tx.tx_hash)
        .bind(is_native)
        .fetch_optional(&mut *conn)
        .await?;
        if let Some(id) = confirmed {
            trace!("🧾️ {} is already confirmed as row #{id}. Ignoring the mempool sighting.", tx.tx_hash);
            return Ok(None);
        }
    }
    let removed = sqlx::query("DELETE FROM ledger_transactions WHERE tx_hash = $1 AND is_native = $2 AND destination = $3")
        .bind(&tx.tx_hash)
        .bind(is_native)
        .bind(&tx.destination)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    if removed > 0 {
        trace!("🧾️ Replacing previous ledger entry for {} to {}", tx.tx_hash, tx.destination);
    }
    let row = sqlx::query_as(
        r#"
            INSERT INTO ledger_transactions
                (tx_hash, tx_ref, is_native, is_mempool, block_id, destination, sources, asset, quantity, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *;
        "#,
    )
    .bind(tx.tx_hash)
    .bind(tx.tx_ref)
    .bind(is_native)
    .bind(tx.is_mempool)
    .bind(tx.block_id)
    .bind(tx.destination)
    .bind(Json(tx.sources))
    .bind(tx.asset)
    .bind(tx.quantity)
    .bind(tx.created_at)
    .fetch_one(conn)
    .await?;
    Ok(Some(row))
}

pub async fn fetch_for_destination(
    destination: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<LedgerTransaction>, LedgerError> {
    let rows = sqlx::query_as("SELECT * FROM ledger_transactions WHERE destination = $1 ORDER BY is_mempool ASC, id ASC")
        .bind(destination)
        .fetch_all(conn)
        .await?;
    Ok(rows)
}

pub async fn fetch_confirmed_in_window(
    chain: Chain,
    low: i64,
    high: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<LedgerTransaction>, LedgerError> {
    if low > high {
        return Err(LedgerError::InvalidBlockRange(low, high));
    }
    let rows = sqlx::query_as(
        r#"
            SELECT tx.* FROM ledger_transactions tx
            INNER JOIN watch_addresses wa ON wa.address = tx.destination
            WHERE tx.block_id >= $1
              AND tx.block_id <= $2
              AND tx.is_mempool = 0
              AND tx.is_native = $3
            ORDER BY tx.id ASC
        "#,
    )
    .bind(low)
    .bind(high)
    .bind(chain.is_native())
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

pub async fn fetch_for_hash(
    tx_hash: &str,
    chain: Chain,
    conn: &mut SqliteConnection,
) -> Result<Vec<LedgerTransaction>, LedgerError> {
    let rows = sqlx::query_as("SELECT * FROM ledger_transactions WHERE tx_hash = $1 AND is_native = $2 ORDER BY id ASC")
        .bind(tx_hash)
        .bind(chain.is_native())
        .fetch_all(conn)
        .await?;
    Ok(rows)
}

pub async fn delete_mempool(chain: Chain, conn: &mut SqliteConnection) -> Result<u64, LedgerError> {
    let result = sqlx::query("DELETE FROM ledger_transactions WHERE is_mempool = 1 AND is_native = $1")
        .bind(chain.is_native())
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Fetches, then removes, every row at `block_id`. Run this inside a transaction so that the snapshot matches what
/// was deleted.
pub async fn delete_at_block(block_id: i64, conn: &mut SqliteConnection) -> Result<Vec<LedgerTransaction>, LedgerError> {
    let rows: Vec<LedgerTransaction> =
        sqlx::query_as("SELECT * FROM ledger_transactions WHERE block_id = $1 ORDER BY id ASC")
            .bind(block_id)
            .fetch_all(&mut *conn)
            .await?;
    sqlx::query("DELETE FROM ledger_transactions WHERE block_id = $1").bind(block_id).execute(conn).await?;
    Ok(rows)
}

pub async fn token_counterpart_exists(tx_hash: &str, conn: &mut SqliteConnection) -> Result<bool, LedgerError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM ledger_transactions WHERE tx_hash = $1 AND is_native = 0)")
            .bind(tx_hash)
            .fetch_one(conn)
            .await?;
    Ok(exists)
}
