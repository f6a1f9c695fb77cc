#![no_std]

mod pool;
mod reward;

pub use pool::*;
pub use reward::*;

/// Basis point denominator (100% = 10_000 bps)
pub const BASIS_POINTS: u128 = 10_000;

/// One USD in oracle units (prices carry 8 decimals)
pub const USD_UNIT: u128 = 100_000_000;

/// Scale factor for reward index accumulators (1e18)
pub const REWARD_SCALE: u128 = 1_000_000_000_000_000_000;

/// Fee or ratio expressed in basis points
pub type Bps = u32;
