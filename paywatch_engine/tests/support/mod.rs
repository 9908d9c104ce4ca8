#![allow(dead_code)]
pub mod prepare_env;
pub mod recorder;
pub mod scripted_followers;

use chrono::{TimeZone, Utc};
use paywatch_engine::{clock::ManualClock, CombiningOrchestrator, SqliteDatabase};

use crate::support::{
    prepare_env::{prepare_test_env, random_db_path, tear_down_db},
    recorder::Recorder,
    scripted_followers::{ScriptedNativeFollower, ScriptedTokenFollower},
};

pub const GENESIS: i64 = 300_000;

pub type TestOrchestrator =
    CombiningOrchestrator<SqliteDatabase, ScriptedNativeFollower, ScriptedTokenFollower, ManualClock>;

/// A fresh orchestrator on its own database, floored at [`GENESIS`], with every hook wired to a [`Recorder`].
pub async fn setup() -> (TestOrchestrator, Recorder, ManualClock) {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating database");
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
    let recorder = Recorder::default();
    let mut orchestrator = CombiningOrchestrator::new_with_clock(
        db,
        ScriptedNativeFollower::native(),
        ScriptedTokenFollower::token(),
        clock.clone(),
    )
    .with_hooks(recorder.hooks());
    orchestrator.set_genesis_block(GENESIS);
    (orchestrator, recorder, clock)
}

pub async fn tear_down(orchestrator: TestOrchestrator) {
    tear_down_db(orchestrator.db().clone()).await;
}

pub async fn run_iterations(orchestrator: &mut TestOrchestrator, n: usize) {
    for _ in 0..n {
        orchestrator.run_one_iteration().await.expect("Iteration failed");
    }
}
