use sqlx::SqliteConnection;

use crate::{db_types::DeliveryRecord, traits::LedgerError};

pub async fn exists(
    tx_hash: &str,
    destination: &str,
    confirmations: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, LedgerError> {
    let found: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM delivery_records WHERE tx_hash = $1 AND destination = $2 AND confirmations = $3)",
    )
    .bind(tx_hash)
    .bind(destination)
    .bind(confirmations)
    .fetch_one(conn)
    .await?;
    Ok(found)
}

/// Writes the delivery record, replacing the block id if the record already exists.
pub async fn upsert(record: &DeliveryRecord, conn: &mut SqliteConnection) -> Result<(), LedgerError> {
    sqlx::query(
        r#"
            INSERT INTO delivery_records (tx_hash, destination, confirmations, block_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT(tx_hash, destination, confirmations) DO UPDATE SET block_id = excluded.block_id
        "#,
    )
    .bind(&record.tx_hash)
    .bind(&record.destination)
    .bind(record.confirmations)
    .bind(record.block_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Inserts the delivery record if it is not already present. Returns `true` if this call created the record, i.e.
/// the caller now owns the right to fire the event.
pub async fn claim(record: &DeliveryRecord, conn: &mut SqliteConnection) -> Result<bool, LedgerError> {
    let result = sqlx::query(
        r#"
            INSERT INTO delivery_records (tx_hash, destination, confirmations, block_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT(tx_hash, destination, confirmations) DO NOTHING
        "#,
    )
    .bind(&record.tx_hash)
    .bind(&record.destination)
    .bind(record.confirmations)
    .bind(record.block_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn fetch_for_hash(tx_hash: &str, conn: &mut SqliteConnection) -> Result<Vec<DeliveryRecord>, LedgerError> {
    let rows = sqlx::query_as(
        "SELECT tx_hash, destination, confirmations, block_id FROM delivery_records WHERE tx_hash = $1 ORDER BY \
         destination, confirmations",
    )
    .bind(tx_hash)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}
