use soroban_sdk::{token, Address, Env, IntoVal, Symbol};
use synth_math::{apply_bps, convert, mul_div, mul_div_rounding_up, usd_value};
use synth_types::{PoolParams, SynthConfig, BASIS_POINTS};

use crate::solvency::{self, CollateralWeight};
use crate::storage;

/// Where a fee's vault share ended up.
///
/// `mint_to` is set only when the calling synth has to mint the share
/// itself, which happens when routing through the pool would re-enter it.
pub struct FeeRoute {
    pub vault_share: u128,
    pub mint_to: Option<Address>,
}

impl FeeRoute {
    fn none() -> Self {
        FeeRoute {
            vault_share: 0,
            mint_to: None,
        }
    }
}

fn registry_address(env: &Env, name: &str) -> Option<Address> {
    let config = storage::get_config(env);
    env.invoke_contract(
        &config.synthex,
        &Symbol::new(env, "get_address"),
        (Symbol::new(env, name),).into_val(env),
    )
}

/// Settle reward accrual for `account` at the pre-operation debt figures.
pub fn accrue(env: &Env, account: &Address, account_debt: u128, total_debt: u128) {
    let config = storage::get_config(env);
    env.invoke_contract::<()>(
        &config.synthex,
        &Symbol::new(env, "accrue_account"),
        (
            env.current_contract_address(),
            account.clone(),
            account_debt,
            total_debt,
        )
            .into_val(env),
    );
}

fn pool_mint(env: &Env, synth: &Address, to: &Address, amount: u128) {
    env.invoke_contract::<()>(
        synth,
        &Symbol::new(env, "pool_mint"),
        (to.clone(), amount).into_val(env),
    );
}

fn require_enabled(env: &Env, synth: &Address) -> SynthConfig {
    storage::get_synth_config(env, synth).expect("Asset not enabled")
}

/// Split `fee` (denominated in `denom` units) between the vault and the
/// issuer allocation, then route the vault share: into the configured fee
/// token when one is set, otherwise into `denom` itself. The issuer share
/// is simply never minted. `caller` is the synth currently on the call
/// stack and must not be invoked again.
fn route_fee(
    env: &Env,
    params: &PoolParams,
    caller: &Address,
    denom: &Address,
    denom_price: u128,
    fee: u128,
) -> FeeRoute {
    if fee == 0 {
        return FeeRoute::none();
    }
    let vault = match registry_address(env, "vault") {
        Some(vault) => vault,
        None => return FeeRoute::none(),
    };
    let vault_share = mul_div(
        env,
        fee,
        BASIS_POINTS - params.issuer_alloc as u128,
        BASIS_POINTS,
    );
    if vault_share == 0 {
        return FeeRoute::none();
    }

    let target = params.fee_token.clone().unwrap_or_else(|| denom.clone());
    if target == *caller && denom == caller {
        return FeeRoute {
            vault_share,
            mint_to: Some(vault),
        };
    }
    if target == *denom || target == *caller {
        // A fee token equal to the caller cannot be invoked mid-call;
        // collect in the denomination synth instead.
        pool_mint(env, denom, &vault, vault_share);
        return FeeRoute {
            vault_share,
            mint_to: None,
        };
    }
    let target_price = solvency::asset_price(env, &params.oracle, &target);
    let converted = convert(env, vault_share, denom_price, target_price);
    pool_mint(env, &target, &vault, converted);
    FeeRoute {
        vault_share,
        mint_to: None,
    }
}

/// Solvency gate for issuing `amount` of `synth` against `account`'s
/// collateral. The caller supplies its own balance and supply figures so
/// they are never read back through a contract already on the stack.
pub fn commit_mint(
    env: &Env,
    synth: Address,
    account: Address,
    amount: u128,
    account_balance: u128,
    total_supply: u128,
) -> (u128, u128, Option<Address>) {
    synth.require_auth();
    let params = storage::get_params(env);
    if params.paused {
        panic!("Paused");
    }
    let config = require_enabled(env, &synth);
    let price = solvency::asset_price(env, &params.oracle, &synth);

    let user_debt = solvency::user_debt_usd(env, &account, Some(&synth))
        + usd_value(env, account_balance, price);
    let total_debt =
        solvency::total_debt_usd(env, Some(&synth)) + usd_value(env, total_supply, price);
    accrue(env, &account, user_debt, total_debt);

    let adjusted = solvency::collateral_usd(env, &account, CollateralWeight::BaseLtv);
    let mint_value = usd_value(env, amount, price);
    if user_debt + mint_value > adjusted {
        panic!("Insufficient collateral");
    }

    let fee = apply_bps(env, amount, config.mint_fee);
    let route = route_fee(env, &params, &synth, &synth, price, fee);

    match route.mint_to {
        Some(vault) => (amount - fee, route.vault_share, Some(vault)),
        None => (amount - fee, 0, None),
    }
}

/// Debt repayment bookkeeping. Burns are never pause-gated.
pub fn commit_burn(
    env: &Env,
    synth: Address,
    account: Address,
    amount: u128,
    account_balance: u128,
    total_supply: u128,
) -> (u128, Option<Address>) {
    synth.require_auth();
    let params = storage::get_params(env);
    let config = require_enabled(env, &synth);
    let price = solvency::asset_price(env, &params.oracle, &synth);

    let user_debt = solvency::user_debt_usd(env, &account, Some(&synth))
        + usd_value(env, account_balance, price);
    let total_debt =
        solvency::total_debt_usd(env, Some(&synth)) + usd_value(env, total_supply, price);
    accrue(env, &account, user_debt, total_debt);

    let fee = apply_bps(env, amount, config.burn_fee);
    let route = route_fee(env, &params, &synth, &synth, price, fee);

    (route.vault_share, route.mint_to)
}

/// Value-conserving debt rotation from `synth` into `to_synth`, modulo
/// fees. The pool mints the destination output itself.
pub fn commit_swap(
    env: &Env,
    synth: Address,
    account: Address,
    amount: u128,
    to_synth: Address,
    recipient: Address,
    account_balance: u128,
    total_supply: u128,
) -> (u128, u128) {
    synth.require_auth();
    if synth == to_synth {
        panic!("Identical synths");
    }
    let params = storage::get_params(env);
    if params.paused {
        panic!("Paused");
    }
    let src_config = require_enabled(env, &synth);
    let dst_config = require_enabled(env, &to_synth);

    let price_from = solvency::asset_price(env, &params.oracle, &synth);
    let price_to = solvency::asset_price(env, &params.oracle, &to_synth);

    let user_debt = solvency::user_debt_usd(env, &account, Some(&synth))
        + usd_value(env, account_balance, price_from);
    let total_debt =
        solvency::total_debt_usd(env, Some(&synth)) + usd_value(env, total_supply, price_from);
    accrue(env, &account, user_debt, total_debt);

    let out_total = convert(env, amount, price_from, price_to);
    let fee_out = apply_bps(env, out_total, src_config.burn_fee + dst_config.mint_fee);
    let out_net = out_total - fee_out;

    pool_mint(env, &to_synth, &recipient, out_net);
    let route = route_fee(env, &params, &synth, &to_synth, price_to, fee_out);

    (out_net, route.vault_share)
}

/// Seize collateral from an undercollateralized borrower against a synth
/// repayment by the liquidator. Allowed while paused.
#[allow(clippy::too_many_arguments)]
pub fn commit_liquidate(
    env: &Env,
    synth: Address,
    liquidator: Address,
    borrower: Address,
    amount: u128,
    collateral_asset: Address,
    borrower_balance: u128,
    liquidator_balance: u128,
    total_supply: u128,
) -> (u128, u128) {
    synth.require_auth();
    let params = storage::get_params(env);
    require_enabled(env, &synth);
    let mut coll_config =
        storage::get_collateral(env, &collateral_asset).expect("Asset not active");

    let price = solvency::asset_price(env, &params.oracle, &synth);

    let borrower_debt = solvency::user_debt_usd(env, &borrower, Some(&synth))
        + usd_value(env, borrower_balance, price);
    let threshold_value = solvency::collateral_usd(env, &borrower, CollateralWeight::LiqThreshold);
    if threshold_value >= borrower_debt {
        panic!("Account not liquidatable");
    }

    let total_debt =
        solvency::total_debt_usd(env, Some(&synth)) + usd_value(env, total_supply, price);
    let liquidator_debt = solvency::user_debt_usd(env, &liquidator, Some(&synth))
        + usd_value(env, liquidator_balance, price);
    accrue(env, &borrower, borrower_debt, total_debt);
    accrue(env, &liquidator, liquidator_debt, total_debt);

    let mut repay = amount.min(liquidator_balance).min(borrower_balance);
    if repay == 0 {
        panic!("Nothing to repay");
    }

    let coll_price = solvency::asset_price(env, &params.oracle, &collateral_asset);
    let mut seized = mul_div(
        env,
        convert(env, repay, price, coll_price),
        coll_config.liq_bonus as u128,
        BASIS_POINTS,
    );

    let available = storage::get_balance(env, &collateral_asset, &borrower);
    if seized > available {
        // Ceiling so the liquidator never gets collateral for a zero repay
        repay = mul_div_rounding_up(env, repay, available, seized);
        seized = available;
    }
    if seized == 0 {
        panic!("Nothing to seize");
    }

    storage::set_balance(env, &collateral_asset, &borrower, available - seized);
    coll_config.total_deposits -= seized;
    storage::set_collateral(env, &collateral_asset, &coll_config);

    token::Client::new(env, &collateral_asset).transfer(
        &env.current_contract_address(),
        &liquidator,
        &(seized as i128),
    );

    env.events().publish(
        (Symbol::new(env, "liquidate"),),
        (synth, liquidator, borrower, repay, collateral_asset, seized),
    );

    (repay, seized)
}
