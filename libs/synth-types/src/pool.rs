use soroban_sdk::{contracttype, Address, String};

use crate::Bps;

/// Static pool identity, set once at initialization (Instance storage)
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolConfig {
    /// Human-readable market name
    pub name: String,
    /// Short market symbol
    pub symbol: String,
    /// Protocol registry handling named addresses and reward accrual
    pub synthex: Address,
}

/// Mutable pool parameters (Instance storage)
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolParams {
    /// Lifecycle gate for deposits and issuance
    pub paused: bool,
    /// Price feed consulted for all valuations
    pub oracle: Address,
    /// Configured fee denomination asset
    pub fee_token: Option<Address>,
    /// Share of each fee (bps) withheld from the vault and destroyed at source
    pub issuer_alloc: Bps,
}

/// Per-asset collateral configuration
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CollateralConfig {
    /// Whether new entries/deposits are accepted for this asset
    pub is_active: bool,
    /// Maximum total deposits across all accounts
    pub cap: u128,
    /// Running sum of all deposited amounts
    pub total_deposits: u128,
    /// Max borrowable fraction of collateral value (bps)
    pub base_ltv: Bps,
    /// Fraction below which a position becomes liquidatable (bps)
    pub liq_threshold: Bps,
    /// Liquidator premium multiplier (bps, 10_000 = 1.0x)
    pub liq_bonus: Bps,
}

/// Per-synth fee configuration
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SynthConfig {
    pub mint_fee: Bps,
    pub burn_fee: Bps,
}

/// Account solvency snapshot, all figures in 8-decimal USD
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccountLiquidity {
    /// LTV-adjusted collateral value minus debt (negative when insolvent)
    pub liquidity: i128,
    /// Unweighted collateral value
    pub collateral: u128,
    /// Debt value across all enabled synths
    pub debt: u128,
}
