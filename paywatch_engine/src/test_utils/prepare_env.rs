use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

use crate::{traits::WatcherDatabase, SqliteDatabase};

/// Loads `.env.test`, starts logging, and creates a freshly migrated database at `url`.
pub async fn prepare_test_env(url: &str) {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    run_migrations(url).await;
}

pub fn random_db_path() -> String {
    format!("sqlite://{}/paywatch_test_{}.db", std::env::temp_dir().display(), rand::random::<u64>())
}

pub async fn run_migrations(url: &str) {
    let db = SqliteDatabase::new_with_url(url, 1).await.expect("Error creating connection to database");
    db.migrate().await.expect("Error running DB migrations");
    db.pool().close().await;
}

pub async fn create_database(url: &str) {
    if Sqlite::database_exists(url).await.unwrap_or(false) {
        if let Err(e) = Sqlite::drop_database(url).await {
            warn!("Error dropping database {url}: {e:?}");
        }
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    info!("Created Sqlite database {url}");
}

/// Closes the pool and deletes the database file.
pub async fn tear_down(mut db: SqliteDatabase) {
    let url = db.url().to_string();
    db.close().await.expect("Error closing database");
    if let Err(e) = Sqlite::drop_database(&url).await {
        warn!("Error dropping database {url}: {e:?}");
    }
}
