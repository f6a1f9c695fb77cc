use synth_types::{CollateralConfig, SynthConfig, BASIS_POINTS};

/// LTV must not exceed the liquidation threshold, all ratios bounded by
/// 100%, and the liquidation bonus is a premium (>= 1.0x).
pub fn collateral_config_valid(config: &CollateralConfig) -> bool {
    config.base_ltv as u128 <= BASIS_POINTS
        && config.liq_threshold as u128 <= BASIS_POINTS
        && config.liq_threshold >= config.base_ltv
        && config.liq_bonus as u128 >= BASIS_POINTS
}

pub fn synth_config_valid(config: &SynthConfig) -> bool {
    config.mint_fee as u128 <= BASIS_POINTS && config.burn_fee as u128 <= BASIS_POINTS
}

/// A deposit must keep total deposits within the configured cap
pub fn within_cap(config: &CollateralConfig, amount: u128) -> bool {
    config.total_deposits + amount <= config.cap
}
