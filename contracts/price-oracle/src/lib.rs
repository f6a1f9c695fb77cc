#![no_std]

use soroban_sdk::{contract, contractimpl, contracttype, Address, Env, IntoVal, Symbol, Vec};
use synth_types::USD_UNIT;

#[contract]
pub struct PriceOracle;

/// Storage keys for the oracle contract
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Admin address (Instance storage)
    Admin,
    /// Direct price per asset, 8-decimal USD (Persistent storage)
    Price(Address),
    /// Secondary feed consulted when no direct price is set (Instance storage)
    Fallback,
}

// TTL constants
const INSTANCE_TTL_THRESHOLD: u32 = 17280;
const INSTANCE_TTL_EXTEND: u32 = 518400;
const PERSISTENT_TTL_THRESHOLD: u32 = 17280;
const PERSISTENT_TTL_EXTEND: u32 = 518400;

#[contractimpl]
impl PriceOracle {
    pub fn initialize(env: Env, admin: Address) {
        if env.storage().instance().has(&DataKey::Admin) {
            panic!("Already initialized");
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Admin, &admin);
        extend_instance_ttl(&env);
    }

    /// Set the direct price for an asset (8-decimal USD)
    pub fn set_asset_price(env: Env, asset: Address, price: u128) {
        require_admin(&env);

        let key = DataKey::Price(asset.clone());
        env.storage().persistent().set(&key, &price);
        extend_persistent_ttl(&env, &key);

        env.events()
            .publish((Symbol::new(&env, "price_set"),), (asset, price));

        extend_instance_ttl(&env);
    }

    /// Set the secondary oracle consulted for assets without a direct price
    pub fn set_fallback_oracle(env: Env, oracle: Address) {
        require_admin(&env);

        env.storage().instance().set(&DataKey::Fallback, &oracle);

        env.events()
            .publish((Symbol::new(&env, "fallback_set"),), (oracle,));

        extend_instance_ttl(&env);
    }

    /// Price of an asset in 8-decimal USD.
    /// Falls through to the secondary feed when no direct price exists.
    pub fn get_asset_price(env: Env, asset: Address) -> u128 {
        let key = DataKey::Price(asset.clone());
        if let Some(price) = env.storage().persistent().get::<_, u128>(&key) {
            return price;
        }

        let fallback: Option<Address> = env.storage().instance().get(&DataKey::Fallback);
        match fallback {
            Some(oracle) => env.invoke_contract(
                &oracle,
                &Symbol::new(&env, "get_asset_price"),
                (asset,).into_val(&env),
            ),
            None => panic!("Price not available"),
        }
    }

    /// Batch price read, order-aligned with the input
    pub fn get_asset_prices(env: Env, assets: Vec<Address>) -> Vec<u128> {
        let mut prices: Vec<u128> = Vec::new(&env);
        for asset in assets.iter() {
            prices.push_back(Self::get_asset_price(env.clone(), asset));
        }
        prices
    }

    /// Unit in which all prices are denominated (1e8)
    pub fn base_currency_unit(_env: Env) -> u128 {
        USD_UNIT
    }

    pub fn get_admin(env: Env) -> Address {
        extend_instance_ttl(&env);
        env.storage()
            .instance()
            .get(&DataKey::Admin)
            .expect("Not initialized")
    }
}

fn require_admin(env: &Env) {
    let admin: Address = env
        .storage()
        .instance()
        .get(&DataKey::Admin)
        .expect("Not initialized");
    admin.require_auth();
}

fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

fn extend_persistent_ttl(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_EXTEND);
}
