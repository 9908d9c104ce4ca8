use std::{future::Future, time::Duration};

use log::*;
use tokio::time::MissedTickBehavior;

use crate::{
    clock::Clock,
    follower::{ChainFollower, NativeTransaction, TokenSend},
    traits::WatcherDatabase,
    CombiningOrchestrator,
};

/// Drives `orchestrator` once per `interval` until `shutdown` resolves. Returns the number of iterations that
/// completed successfully.
///
/// A failed iteration is logged and retried on the next tick. `shutdown` is only checked between iterations, so a
/// running iteration always completes.
pub async fn run_watcher<B, N, T, C, F>(
    orchestrator: &mut CombiningOrchestrator<B, N, T, C>,
    interval: Duration,
    shutdown: F,
) -> u64
where
    B: WatcherDatabase,
    N: ChainFollower<Data = NativeTransaction>,
    T: ChainFollower<Data = TokenSend>,
    C: Clock,
    F: Future<Output = ()>,
{
    let mut timer = tokio::time::interval(interval);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);
    let mut completed = 0u64;
    info!("🕰️ Watcher started. Polling every {}ms", interval.as_millis());
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("🕰️ Watcher shutting down after {completed} iterations");
                break;
            },
            _ = timer.tick() => {
                match orchestrator.run_one_iteration().await {
                    Ok(()) => {
                        completed += 1;
                        trace!("🕰️ Iteration {completed} complete");
                    },
                    Err(e) => error!("🕰️ Error running watcher iteration: {e}"),
                }
            },
        }
    }
    completed
}
