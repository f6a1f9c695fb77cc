use soroban_sdk::{contracttype, Address, Env, Vec};
use synth_types::{CollateralConfig, PoolConfig, PoolParams, SynthConfig};

/// Storage keys for the pool contract
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Pool identity (Instance storage)
    Config,
    /// Mutable pool parameters (Instance storage)
    Params,
    /// Admin address (Instance storage)
    Admin,
    /// Collateral configuration per asset (Persistent storage)
    Collateral(Address),
    /// Deposited amount: (asset, account) -> u128 (Persistent storage)
    Balance(Address, Address),
    /// Number of collaterals an account has entered (Persistent storage)
    EnteredCount(Address),
    /// Entered collateral at index: (account, i) -> asset (Persistent storage)
    EnteredAt(Address, u32),
    /// (account, asset) -> index in the entered list (Persistent storage)
    EnteredIndex(Address, Address),
    /// Number of enabled synths (Instance storage)
    SynthCount,
    /// Enabled synth at index (Persistent storage)
    SynthAt(u32),
    /// Synth -> index in the enabled list (Persistent storage)
    SynthIndex(Address),
    /// Synth fee configuration (Persistent storage)
    Synth(Address),
}

// TTL constants
const INSTANCE_TTL_THRESHOLD: u32 = 17280; // ~1 day
const INSTANCE_TTL_EXTEND: u32 = 518400; // ~30 days
const PERSISTENT_TTL_THRESHOLD: u32 = 17280;
const PERSISTENT_TTL_EXTEND: u32 = 518400;

pub fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

pub fn extend_persistent_ttl(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_EXTEND);
}

// === Config / Params / Admin ===

pub fn get_config(env: &Env) -> PoolConfig {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .expect("Not initialized")
}

pub fn set_config(env: &Env, config: &PoolConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    extend_instance_ttl(env);
}

pub fn get_params(env: &Env) -> PoolParams {
    extend_instance_ttl(env);
    env.storage()
        .instance()
        .get(&DataKey::Params)
        .expect("Not initialized")
}

pub fn set_params(env: &Env, params: &PoolParams) {
    env.storage().instance().set(&DataKey::Params, params);
    extend_instance_ttl(env);
}

pub fn get_admin(env: &Env) -> Address {
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .expect("Not initialized")
}

pub fn require_admin(env: &Env) {
    get_admin(env).require_auth();
}

// === Collateral config ===

pub fn get_collateral(env: &Env, asset: &Address) -> Option<CollateralConfig> {
    env.storage()
        .persistent()
        .get(&DataKey::Collateral(asset.clone()))
}

pub fn set_collateral(env: &Env, asset: &Address, config: &CollateralConfig) {
    let key = DataKey::Collateral(asset.clone());
    env.storage().persistent().set(&key, config);
    extend_persistent_ttl(env, &key);
}

// === Deposited balances ===

pub fn get_balance(env: &Env, asset: &Address, account: &Address) -> u128 {
    env.storage()
        .persistent()
        .get(&DataKey::Balance(asset.clone(), account.clone()))
        .unwrap_or(0)
}

/// Balances persist at zero once created; exit_collateral is the only
/// membership cleanup path.
pub fn set_balance(env: &Env, asset: &Address, account: &Address, amount: u128) {
    let key = DataKey::Balance(asset.clone(), account.clone());
    env.storage().persistent().set(&key, &amount);
    extend_persistent_ttl(env, &key);
}

// === Account collateral membership (indexed list, swap-with-last) ===

pub fn is_entered(env: &Env, account: &Address, asset: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::EnteredIndex(account.clone(), asset.clone()))
}

/// Append the asset to the account's entered list - O(1)
pub fn add_entered(env: &Env, account: &Address, asset: &Address) {
    let count: u32 = env
        .storage()
        .persistent()
        .get(&DataKey::EnteredCount(account.clone()))
        .unwrap_or(0);

    let at_key = DataKey::EnteredAt(account.clone(), count);
    env.storage().persistent().set(&at_key, asset);
    extend_persistent_ttl(env, &at_key);

    let index_key = DataKey::EnteredIndex(account.clone(), asset.clone());
    env.storage().persistent().set(&index_key, &count);
    extend_persistent_ttl(env, &index_key);

    let count_key = DataKey::EnteredCount(account.clone());
    env.storage().persistent().set(&count_key, &(count + 1));
    extend_persistent_ttl(env, &count_key);
}

/// Remove the asset from the account's entered list using swap-with-last - O(1)
pub fn remove_entered(env: &Env, account: &Address, asset: &Address) {
    let count: u32 = env
        .storage()
        .persistent()
        .get(&DataKey::EnteredCount(account.clone()))
        .unwrap_or(0);

    if count == 0 {
        return;
    }

    let index_to_remove: u32 = env
        .storage()
        .persistent()
        .get(&DataKey::EnteredIndex(account.clone(), asset.clone()))
        .unwrap_or(0);

    let last_index = count - 1;

    if index_to_remove != last_index {
        let last_asset: Address = env
            .storage()
            .persistent()
            .get(&DataKey::EnteredAt(account.clone(), last_index))
            .expect("Corrupt entered list");

        env.storage().persistent().set(
            &DataKey::EnteredAt(account.clone(), index_to_remove),
            &last_asset,
        );
        env.storage().persistent().set(
            &DataKey::EnteredIndex(account.clone(), last_asset),
            &index_to_remove,
        );
    }

    env.storage()
        .persistent()
        .remove(&DataKey::EnteredAt(account.clone(), last_index));
    env.storage()
        .persistent()
        .remove(&DataKey::EnteredIndex(account.clone(), asset.clone()));

    if count > 1 {
        env.storage()
            .persistent()
            .set(&DataKey::EnteredCount(account.clone()), &(count - 1));
    } else {
        env.storage()
            .persistent()
            .remove(&DataKey::EnteredCount(account.clone()));
    }
}

pub fn get_entered(env: &Env, account: &Address) -> Vec<Address> {
    let count: u32 = env
        .storage()
        .persistent()
        .get(&DataKey::EnteredCount(account.clone()))
        .unwrap_or(0);

    let mut assets: Vec<Address> = Vec::new(env);
    for i in 0..count {
        if let Some(asset) = env
            .storage()
            .persistent()
            .get(&DataKey::EnteredAt(account.clone(), i))
        {
            assets.push_back(asset);
        }
    }
    assets
}

// === Synth registry (indexed list, swap-with-last) ===

pub fn is_synth_enabled(env: &Env, synth: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::SynthIndex(synth.clone()))
}

pub fn get_synth_config(env: &Env, synth: &Address) -> Option<SynthConfig> {
    env.storage().persistent().get(&DataKey::Synth(synth.clone()))
}

pub fn set_synth_config(env: &Env, synth: &Address, config: &SynthConfig) {
    let key = DataKey::Synth(synth.clone());
    env.storage().persistent().set(&key, config);
    extend_persistent_ttl(env, &key);
}

/// Append the synth to the enabled list - O(1)
pub fn add_synth(env: &Env, synth: &Address, config: &SynthConfig) {
    let count: u32 = env
        .storage()
        .instance()
        .get(&DataKey::SynthCount)
        .unwrap_or(0);

    let at_key = DataKey::SynthAt(count);
    env.storage().persistent().set(&at_key, synth);
    extend_persistent_ttl(env, &at_key);

    let index_key = DataKey::SynthIndex(synth.clone());
    env.storage().persistent().set(&index_key, &count);
    extend_persistent_ttl(env, &index_key);

    env.storage()
        .instance()
        .set(&DataKey::SynthCount, &(count + 1));

    set_synth_config(env, synth, config);
}

/// Remove the synth from the enabled list using swap-with-last - O(1)
pub fn remove_synth(env: &Env, synth: &Address) {
    let count: u32 = env
        .storage()
        .instance()
        .get(&DataKey::SynthCount)
        .unwrap_or(0);

    if count == 0 {
        return;
    }

    let index_to_remove: u32 = env
        .storage()
        .persistent()
        .get(&DataKey::SynthIndex(synth.clone()))
        .unwrap_or(0);

    let last_index = count - 1;

    if index_to_remove != last_index {
        let last_synth: Address = env
            .storage()
            .persistent()
            .get(&DataKey::SynthAt(last_index))
            .expect("Corrupt synth list");

        env.storage()
            .persistent()
            .set(&DataKey::SynthAt(index_to_remove), &last_synth);
        env.storage()
            .persistent()
            .set(&DataKey::SynthIndex(last_synth), &index_to_remove);
    }

    env.storage()
        .persistent()
        .remove(&DataKey::SynthAt(last_index));
    env.storage()
        .persistent()
        .remove(&DataKey::SynthIndex(synth.clone()));
    env.storage()
        .persistent()
        .remove(&DataKey::Synth(synth.clone()));

    env.storage()
        .instance()
        .set(&DataKey::SynthCount, &(count - 1));
}

pub fn get_synths(env: &Env) -> Vec<Address> {
    let count: u32 = env
        .storage()
        .instance()
        .get(&DataKey::SynthCount)
        .unwrap_or(0);

    let mut synths: Vec<Address> = Vec::new(env);
    for i in 0..count {
        if let Some(synth) = env.storage().persistent().get(&DataKey::SynthAt(i)) {
            synths.push_back(synth);
        }
    }
    synths
}
