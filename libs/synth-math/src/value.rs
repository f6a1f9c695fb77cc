use soroban_sdk::Env;
use synth_types::{Bps, BASIS_POINTS, USD_UNIT};

use crate::full_math::mul_div;

/// USD value (8 decimals) of `amount` token units at an 8-decimal price
pub fn usd_value(env: &Env, amount: u128, price: u128) -> u128 {
    mul_div(env, amount, price, USD_UNIT)
}

/// Token units worth `usd` at an 8-decimal price (rounds down)
pub fn from_usd_value(env: &Env, usd: u128, price: u128) -> u128 {
    mul_div(env, usd, USD_UNIT, price)
}

/// Convert an amount between two assets through their USD prices
pub fn convert(env: &Env, amount: u128, price_from: u128, price_to: u128) -> u128 {
    mul_div(env, amount, price_from, price_to)
}

/// Basis-point fraction of an amount (rounds down)
pub fn apply_bps(env: &Env, amount: u128, bps: Bps) -> u128 {
    mul_div(env, amount, bps as u128, BASIS_POINTS)
}
