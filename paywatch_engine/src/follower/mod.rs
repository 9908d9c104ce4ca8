//! # Upstream follower contract
//!
//! A follower walks one chain block by block and reports what it sees. The orchestrator owns two of them, one for the
//! native chain and one for the token layer, and consumes their events through a [`FollowerEventSink`].
//!
//! Talking to nodes, retries and block-hash bookkeeping are entirely the follower's business.
mod chain_follower;
mod data_objects;

pub use chain_follower::{ChainFollower, FollowerEvent, FollowerEventSink};
pub use data_objects::{NativeInput, NativeOutput, NativeTransaction, TokenSend};
