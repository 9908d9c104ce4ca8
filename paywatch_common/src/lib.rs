//! Value types shared by the paywatch crates.
mod satoshis;

pub mod helpers;
pub mod op;

pub use satoshis::{Satoshis, SatoshiConversionError, NATIVE_ASSET, SATOSHIS_PER_UNIT};
