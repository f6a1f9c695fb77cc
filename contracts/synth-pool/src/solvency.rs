use soroban_sdk::{Address, Env, IntoVal, Symbol};
use synth_math::{mul_div, usd_value};
use synth_types::{AccountLiquidity, BASIS_POINTS};

use crate::storage;

/// How collateral value is weighted when summing an account's holdings.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum CollateralWeight {
    /// Raw oracle value, no haircut
    Unweighted,
    /// Weighted by base LTV, used for borrow capacity
    BaseLtv,
    /// Weighted by liquidation threshold, used for liquidation eligibility
    LiqThreshold,
}

pub fn asset_price(env: &Env, oracle: &Address, asset: &Address) -> u128 {
    env.invoke_contract(
        oracle,
        &Symbol::new(env, "get_asset_price"),
        (asset.clone(),).into_val(env),
    )
}

pub fn synth_balance(env: &Env, synth: &Address, account: &Address) -> u128 {
    let balance: i128 = env.invoke_contract(
        synth,
        &Symbol::new(env, "balance"),
        (account.clone(),).into_val(env),
    );
    balance as u128
}

pub fn synth_supply(env: &Env, synth: &Address) -> u128 {
    let supply: i128 =
        env.invoke_contract(synth, &Symbol::new(env, "total_supply"), ().into_val(env));
    supply as u128
}

/// USD value of the account's entered collateral, weighted per `weight`.
pub fn collateral_usd(env: &Env, account: &Address, weight: CollateralWeight) -> u128 {
    let params = storage::get_params(env);
    let mut total: u128 = 0;

    for asset in storage::get_entered(env, account).iter() {
        let balance = storage::get_balance(env, &asset, account);
        if balance == 0 {
            continue;
        }
        let config = storage::get_collateral(env, &asset).expect("Asset not active");
        let price = asset_price(env, &params.oracle, &asset);
        let value = usd_value(env, balance, price);
        let weighted = match weight {
            CollateralWeight::Unweighted => value,
            CollateralWeight::BaseLtv => {
                mul_div(env, value, config.base_ltv as u128, BASIS_POINTS)
            }
            CollateralWeight::LiqThreshold => {
                mul_div(env, value, config.liq_threshold as u128, BASIS_POINTS)
            }
        };
        total += weighted;
    }
    total
}

/// USD debt across enabled synths, read from token balances.
///
/// `excl` skips one synth so its caller can substitute a balance it
/// already holds in hand (cross-contract reads of the calling synth
/// would re-enter it).
pub fn user_debt_usd(env: &Env, account: &Address, excl: Option<&Address>) -> u128 {
    let params = storage::get_params(env);
    let mut total: u128 = 0;

    for synth in storage::get_synths(env).iter() {
        if excl == Some(&synth) {
            continue;
        }
        let balance = synth_balance(env, &synth, account);
        if balance == 0 {
            continue;
        }
        let price = asset_price(env, &params.oracle, &synth);
        total += usd_value(env, balance, price);
    }
    total
}

/// Total USD debt across enabled synths, from token supplies.
pub fn total_debt_usd(env: &Env, excl: Option<&Address>) -> u128 {
    let params = storage::get_params(env);
    let mut total: u128 = 0;

    for synth in storage::get_synths(env).iter() {
        if excl == Some(&synth) {
            continue;
        }
        let supply = synth_supply(env, &synth);
        if supply == 0 {
            continue;
        }
        let price = asset_price(env, &params.oracle, &synth);
        total += usd_value(env, supply, price);
    }
    total
}

/// Health snapshot: LTV-adjusted collateral minus debt, plus the raw legs.
pub fn account_liquidity(env: &Env, account: &Address) -> AccountLiquidity {
    let collateral = collateral_usd(env, account, CollateralWeight::Unweighted);
    let adjusted = collateral_usd(env, account, CollateralWeight::BaseLtv);
    let debt = user_debt_usd(env, account, None);

    AccountLiquidity {
        liquidity: adjusted as i128 - debt as i128,
        collateral,
        debt,
    }
}
