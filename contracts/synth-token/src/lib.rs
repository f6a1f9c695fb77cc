#![no_std]

use soroban_sdk::{
    contract, contractimpl, contracttype, Address, Env, IntoVal, String, Symbol,
};
use stellar_tokens::fungible::{burnable::emit_burn, Base as TokenBase};

#[contract]
pub struct SynthToken;

/// Storage keys for the synth contract
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Owning pool address (Instance storage)
    Pool,
}

const DECIMALS: u32 = 7;
const INSTANCE_TTL_THRESHOLD: u32 = 17280;
const INSTANCE_TTL_EXTEND: u32 = 518400;

#[contractimpl]
impl SynthToken {
    pub fn initialize(env: Env, pool: Address, name: String, symbol: String) {
        if env.storage().instance().has(&DataKey::Pool) {
            panic!("Already initialized");
        }

        env.storage().instance().set(&DataKey::Pool, &pool);
        TokenBase::set_metadata(&env, DECIMALS, name, symbol);
        extend_instance_ttl(&env);
    }

    /// Issue synths against `from`'s collateral in the owning pool.
    ///
    /// The local balance and supply are handed to the pool so it never has
    /// to call back into this contract mid-flight.
    pub fn mint(
        env: Env,
        from: Address,
        amount: u128,
        recipient: Address,
        referred_by: Option<Address>,
    ) {
        from.require_auth();

        let pool = get_pool(&env);
        let (net, vault_share, vault): (u128, u128, Option<Address>) = env.invoke_contract(
            &pool,
            &Symbol::new(&env, "commit_mint"),
            (
                env.current_contract_address(),
                from.clone(),
                amount,
                balance_of(&env, &from),
                supply(&env),
            )
                .into_val(&env),
        );

        TokenBase::mint(&env, &recipient, net as i128);
        if let Some(vault) = vault {
            if vault_share > 0 {
                TokenBase::mint(&env, &vault, vault_share as i128);
            }
        }

        env.events().publish(
            (Symbol::new(&env, "mint"),),
            (from, recipient, amount, net, referred_by),
        );
        extend_instance_ttl(&env);
    }

    /// Repay debt by burning `amount` from `from`. The burn-fee vault share
    /// is minted back, so the net supply reduction is amount minus the fee.
    pub fn burn(env: Env, from: Address, amount: u128) {
        from.require_auth();

        if amount > balance_of(&env, &from) {
            panic!("Insufficient balance");
        }

        let pool = get_pool(&env);
        let (vault_share, vault): (u128, Option<Address>) = env.invoke_contract(
            &pool,
            &Symbol::new(&env, "commit_burn"),
            (
                env.current_contract_address(),
                from.clone(),
                amount,
                balance_of(&env, &from),
                supply(&env),
            )
                .into_val(&env),
        );

        TokenBase::update(&env, Some(&from), None, amount as i128);
        emit_burn(&env, &from, amount as i128);
        if let Some(vault) = vault {
            if vault_share > 0 {
                TokenBase::mint(&env, &vault, vault_share as i128);
            }
        }

        env.events()
            .publish((Symbol::new(&env, "burn"),), (from, amount));
        extend_instance_ttl(&env);
    }

    /// Rotate debt into another synth: burns `amount` here, the pool mints
    /// the converted output of `to_synth` to `recipient`.
    pub fn swap(
        env: Env,
        from: Address,
        amount: u128,
        to_synth: Address,
        recipient: Address,
        referred_by: Option<Address>,
    ) {
        from.require_auth();

        if amount > balance_of(&env, &from) {
            panic!("Insufficient balance");
        }

        let pool = get_pool(&env);
        let (out_net, _fee_to_vault): (u128, u128) = env.invoke_contract(
            &pool,
            &Symbol::new(&env, "commit_swap"),
            (
                env.current_contract_address(),
                from.clone(),
                amount,
                to_synth.clone(),
                recipient.clone(),
                balance_of(&env, &from),
                supply(&env),
            )
                .into_val(&env),
        );

        TokenBase::update(&env, Some(&from), None, amount as i128);
        emit_burn(&env, &from, amount as i128);

        env.events().publish(
            (Symbol::new(&env, "swap"),),
            (from, amount, to_synth, recipient, out_net, referred_by),
        );
        extend_instance_ttl(&env);
    }

    /// Repay an undercollateralized borrower's debt in this synth and take
    /// their collateral at the configured bonus.
    pub fn liquidate(
        env: Env,
        from: Address,
        borrower: Address,
        amount: u128,
        collateral_asset: Address,
    ) {
        from.require_auth();

        let pool = get_pool(&env);
        let (repay, seized): (u128, u128) = env.invoke_contract(
            &pool,
            &Symbol::new(&env, "commit_liquidate"),
            (
                env.current_contract_address(),
                from.clone(),
                borrower.clone(),
                amount,
                collateral_asset.clone(),
                balance_of(&env, &borrower),
                balance_of(&env, &from),
                supply(&env),
            )
                .into_val(&env),
        );

        TokenBase::update(&env, Some(&from), None, repay as i128);
        emit_burn(&env, &from, repay as i128);

        env.events().publish(
            (Symbol::new(&env, "liquidate"),),
            (from, borrower, repay, collateral_asset, seized),
        );
        extend_instance_ttl(&env);
    }

    /// Mint path used by the pool for swap output and fee routing
    pub fn pool_mint(env: Env, to: Address, amount: u128) {
        get_pool(&env).require_auth();

        TokenBase::mint(&env, &to, amount as i128);
        extend_instance_ttl(&env);
    }

    pub fn get_pool(env: Env) -> Address {
        get_pool(&env)
    }

    // === SEP-41 surface ===

    pub fn balance(env: Env, id: Address) -> i128 {
        TokenBase::balance(&env, &id)
    }

    pub fn total_supply(env: Env) -> i128 {
        TokenBase::total_supply(&env)
    }

    pub fn allowance(env: Env, from: Address, spender: Address) -> i128 {
        TokenBase::allowance(&env, &from, &spender)
    }

    pub fn approve(env: Env, from: Address, spender: Address, amount: i128, expiration_ledger: u32) {
        TokenBase::approve(&env, &from, &spender, amount, expiration_ledger);
    }

    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) {
        TokenBase::transfer(&env, &from, &to, amount);
    }

    pub fn transfer_from(env: Env, spender: Address, from: Address, to: Address, amount: i128) {
        TokenBase::transfer_from(&env, &spender, &from, &to, amount);
    }

    pub fn decimals(env: Env) -> u32 {
        TokenBase::decimals(&env)
    }

    pub fn name(env: Env) -> String {
        TokenBase::name(&env)
    }

    pub fn symbol(env: Env) -> String {
        TokenBase::symbol(&env)
    }
}

fn get_pool(env: &Env) -> Address {
    env.storage()
        .instance()
        .get(&DataKey::Pool)
        .expect("Not initialized")
}

fn balance_of(env: &Env, id: &Address) -> u128 {
    TokenBase::balance(env, id) as u128
}

fn supply(env: &Env) -> u128 {
    TokenBase::total_supply(env) as u128
}

fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}
