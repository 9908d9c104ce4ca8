use std::collections::HashSet;

use sqlx::SqliteConnection;

use crate::traits::LedgerError;

/// Adds the address to the watch set. Adding an address twice is not an error.
pub async fn insert(address: &str, conn: &mut SqliteConnection) -> Result<(), LedgerError> {
    sqlx::query("INSERT INTO watch_addresses (address) VALUES ($1) ON CONFLICT(address) DO NOTHING")
        .bind(address)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn remove(address: &str, conn: &mut SqliteConnection) -> Result<bool, LedgerError> {
    let result = sqlx::query("DELETE FROM watch_addresses WHERE address = $1").bind(address).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

pub async fn clear(conn: &mut SqliteConnection) -> Result<u64, LedgerError> {
    let result = sqlx::query("DELETE FROM watch_addresses").execute(conn).await?;
    Ok(result.rows_affected())
}

pub async fn exists(address: &str, conn: &mut SqliteConnection) -> Result<bool, LedgerError> {
    let found: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM watch_addresses WHERE address = $1)")
        .bind(address)
        .fetch_one(conn)
        .await?;
    Ok(found)
}

pub async fn fetch_all(conn: &mut SqliteConnection) -> Result<HashSet<String>, LedgerError> {
    let addresses: Vec<String> = sqlx::query_scalar("SELECT address FROM watch_addresses").fetch_all(conn).await?;
    Ok(addresses.into_iter().collect())
}
