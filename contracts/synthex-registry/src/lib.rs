#![no_std]

use soroban_sdk::{
    contract, contractimpl, contracttype, token, Address, Env, IntoVal, Symbol, Vec,
};
use synth_math::mul_div;
use synth_types::{RewardState, REWARD_SCALE};

#[contract]
pub struct SynthexRegistry;

/// Storage keys for the registry contract
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Admin address (Instance storage)
    Admin,
    /// Named address slot, e.g. "vault" (Instance storage)
    AddressSlot(Symbol),
    /// (reward token, pool) -> emission per second (Persistent storage)
    Speed(Address, Address),
    /// (reward token, pool) -> global accrual state (Persistent storage)
    Reward(Address, Address),
    /// (reward token, pool, account) -> index at last user accrual (Persistent storage)
    UserIndex(Address, Address, Address),
    /// (reward token, account) -> banked unclaimed amount (Persistent storage)
    Accrued(Address, Address),
    /// Number of tracked reward tokens for a pool (Persistent storage)
    TokenCount(Address),
    /// Tracked reward token at index (Persistent storage)
    TokenAt(Address, u32),
    /// (pool, reward token) -> index in the tracked list (Persistent storage)
    TokenIndex(Address, Address),
}

// TTL constants
const INSTANCE_TTL_THRESHOLD: u32 = 17280;
const INSTANCE_TTL_EXTEND: u32 = 518400;
const PERSISTENT_TTL_THRESHOLD: u32 = 17280;
const PERSISTENT_TTL_EXTEND: u32 = 518400;

#[contractimpl]
impl SynthexRegistry {
    pub fn initialize(env: Env, admin: Address) {
        if env.storage().instance().has(&DataKey::Admin) {
            panic!("Already initialized");
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Admin, &admin);
        extend_instance_ttl(&env);
    }

    // === Named address slots ===

    pub fn set_address(env: Env, key: Symbol, addr: Address) {
        require_admin(&env);

        env.storage()
            .instance()
            .set(&DataKey::AddressSlot(key.clone()), &addr);

        env.events()
            .publish((Symbol::new(&env, "address_set"),), (key, addr));

        extend_instance_ttl(&env);
    }

    pub fn get_address(env: Env, key: Symbol) -> Option<Address> {
        extend_instance_ttl(&env);
        env.storage().instance().get(&DataKey::AddressSlot(key))
    }

    // === Reward configuration ===

    /// Set the emission rate for a (reward token, pool) pair.
    ///
    /// The global index is settled at the old rate first, so time elapsed
    /// before a speed change is always credited at the prior rate. Setting
    /// speed to zero freezes further accrual without forfeiting banked
    /// amounts.
    pub fn set_pool_speed(
        env: Env,
        reward_token: Address,
        pool: Address,
        speed: u128,
        add_to_list: bool,
    ) {
        require_admin(&env);

        let reward_key = DataKey::Reward(reward_token.clone(), pool.clone());
        if env.storage().persistent().has(&reward_key) {
            let total_debt = pool_total_debt(&env, &pool);
            settle_global(&env, &reward_token, &pool, total_debt);
        } else {
            let state = RewardState {
                index: 0,
                last_updated: env.ledger().timestamp(),
            };
            env.storage().persistent().set(&reward_key, &state);
            extend_persistent_ttl(&env, &reward_key);
        }

        let speed_key = DataKey::Speed(reward_token.clone(), pool.clone());
        env.storage().persistent().set(&speed_key, &speed);
        extend_persistent_ttl(&env, &speed_key);

        if add_to_list {
            track_reward_token(&env, &pool, &reward_token);
        }

        env.events().publish(
            (Symbol::new(&env, "speed_set"),),
            (reward_token, pool, speed),
        );

        extend_instance_ttl(&env);
    }

    pub fn get_pool_speed(env: Env, reward_token: Address, pool: Address) -> u128 {
        env.storage()
            .persistent()
            .get(&DataKey::Speed(reward_token, pool))
            .unwrap_or(0)
    }

    /// Reward tokens tracked for a pool, in insertion order
    pub fn get_reward_tokens(env: Env, pool: Address) -> Vec<Address> {
        let count: u32 = env
            .storage()
            .persistent()
            .get(&DataKey::TokenCount(pool.clone()))
            .unwrap_or(0);

        let mut tokens: Vec<Address> = Vec::new(&env);
        for i in 0..count {
            if let Some(token) = env
                .storage()
                .persistent()
                .get(&DataKey::TokenAt(pool.clone(), i))
            {
                tokens.push_back(token);
            }
        }
        tokens
    }

    // === Accrual ===

    /// Pool hook: settle rewards for an account before its debt changes.
    ///
    /// `account_debt` and `total_debt` are the pool's USD debt figures prior
    /// to the state change. Only the pool itself may invoke this.
    pub fn accrue_account(
        env: Env,
        pool: Address,
        account: Address,
        account_debt: u128,
        total_debt: u128,
    ) {
        pool.require_auth();

        let tokens = Self::get_reward_tokens(env.clone(), pool.clone());
        for token in tokens.iter() {
            let index = settle_global(&env, &token, &pool, total_debt);
            accrue_user(&env, &token, &pool, &account, account_debt, index);
        }
    }

    /// Unclaimed reward per token, banked plus accrual up to now.
    ///
    /// Read-only: the projection advances the global index virtually and
    /// writes nothing.
    pub fn get_rewards_accrued(
        env: Env,
        reward_tokens: Vec<Address>,
        account: Address,
        pools: Vec<Address>,
    ) -> Vec<u128> {
        let mut amounts: Vec<u128> = Vec::new(&env);

        for token in reward_tokens.iter() {
            let mut total: u128 = env
                .storage()
                .persistent()
                .get(&DataKey::Accrued(token.clone(), account.clone()))
                .unwrap_or(0);

            for pool in pools.iter() {
                let total_debt = pool_total_debt(&env, &pool);
                let index = projected_index(&env, &token, &pool, total_debt);

                let user_index: u128 = env
                    .storage()
                    .persistent()
                    .get(&DataKey::UserIndex(
                        token.clone(),
                        pool.clone(),
                        account.clone(),
                    ))
                    .unwrap_or(0);

                if index > user_index {
                    let user_debt = pool_user_debt(&env, &pool, &account);
                    total += mul_div(&env, user_debt, index - user_index, REWARD_SCALE);
                }
            }

            amounts.push_back(total);
        }

        amounts
    }

    /// Settle and pay out unclaimed rewards to `account`.
    /// A zero computed amount is a silent no-op for that token.
    pub fn claim_reward(
        env: Env,
        reward_tokens: Vec<Address>,
        account: Address,
        pools: Vec<Address>,
    ) {
        for token in reward_tokens.iter() {
            for pool in pools.iter() {
                let total_debt = pool_total_debt(&env, &pool);
                let index = settle_global(&env, &token, &pool, total_debt);
                let user_debt = pool_user_debt(&env, &pool, &account);
                accrue_user(&env, &token, &pool, &account, user_debt, index);
            }

            let accrued_key = DataKey::Accrued(token.clone(), account.clone());
            let amount: u128 = env.storage().persistent().get(&accrued_key).unwrap_or(0);
            if amount == 0 {
                continue;
            }

            env.storage().persistent().remove(&accrued_key);

            token::Client::new(&env, &token).transfer(
                &env.current_contract_address(),
                &account,
                &(amount as i128),
            );

            env.events().publish(
                (Symbol::new(&env, "claim"),),
                (token.clone(), account.clone(), amount),
            );
        }

        extend_instance_ttl(&env);
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

/// Settle the global index for (token, pool) up to the current timestamp
fn settle_global(env: &Env, token: &Address, pool: &Address, total_debt: u128) -> u128 {
    let now = env.ledger().timestamp();
    let key = DataKey::Reward(token.clone(), pool.clone());

    let mut state: RewardState = env.storage().persistent().get(&key).unwrap_or(RewardState {
        index: 0,
        last_updated: now,
    });

    if now > state.last_updated {
        state.index = advance_index(env, token, pool, &state, total_debt, now);
        state.last_updated = now;
    }

    env.storage().persistent().set(&key, &state);
    extend_persistent_ttl(env, &key);

    state.index
}

/// Index value as of `now` without writing anything back
fn projected_index(env: &Env, token: &Address, pool: &Address, total_debt: u128) -> u128 {
    let now = env.ledger().timestamp();
    let key = DataKey::Reward(token.clone(), pool.clone());

    match env.storage().persistent().get::<_, RewardState>(&key) {
        Some(state) => advance_index(env, token, pool, &state, total_debt, now),
        None => 0,
    }
}

fn advance_index(
    env: &Env,
    token: &Address,
    pool: &Address,
    state: &RewardState,
    total_debt: u128,
    now: u64,
) -> u128 {
    if now <= state.last_updated || total_debt == 0 {
        return state.index;
    }

    let speed: u128 = env
        .storage()
        .persistent()
        .get(&DataKey::Speed(token.clone(), pool.clone()))
        .unwrap_or(0);
    if speed == 0 {
        return state.index;
    }

    let elapsed = (now - state.last_updated) as u128;
    state.index + mul_div(env, speed * elapsed, REWARD_SCALE, total_debt)
}

/// Bank the user's share of index growth and advance their checkpoint
fn accrue_user(
    env: &Env,
    token: &Address,
    pool: &Address,
    account: &Address,
    account_debt: u128,
    global_index: u128,
) {
    let index_key = DataKey::UserIndex(token.clone(), pool.clone(), account.clone());
    let user_index: u128 = env.storage().persistent().get(&index_key).unwrap_or(0);

    if global_index > user_index && account_debt > 0 {
        let delta = mul_div(env, account_debt, global_index - user_index, REWARD_SCALE);
        if delta > 0 {
            let accrued_key = DataKey::Accrued(token.clone(), account.clone());
            let accrued: u128 = env.storage().persistent().get(&accrued_key).unwrap_or(0);
            env.storage().persistent().set(&accrued_key, &(accrued + delta));
            extend_persistent_ttl(env, &accrued_key);
        }
    }

    env.storage().persistent().set(&index_key, &global_index);
    extend_persistent_ttl(env, &index_key);
}

/// Append the token to the pool's tracked list if not already present - O(1)
fn track_reward_token(env: &Env, pool: &Address, token: &Address) {
    let index_key = DataKey::TokenIndex(pool.clone(), token.clone());
    if env.storage().persistent().has(&index_key) {
        return;
    }

    let count: u32 = env
        .storage()
        .persistent()
        .get(&DataKey::TokenCount(pool.clone()))
        .unwrap_or(0);

    let at_key = DataKey::TokenAt(pool.clone(), count);
    env.storage().persistent().set(&at_key, token);
    extend_persistent_ttl(env, &at_key);

    env.storage().persistent().set(&index_key, &count);
    extend_persistent_ttl(env, &index_key);

    let count_key = DataKey::TokenCount(pool.clone());
    env.storage().persistent().set(&count_key, &(count + 1));
    extend_persistent_ttl(env, &count_key);
}

fn pool_total_debt(env: &Env, pool: &Address) -> u128 {
    env.invoke_contract(pool, &Symbol::new(env, "get_total_debt_usd"), ().into_val(env))
}

fn pool_user_debt(env: &Env, pool: &Address, account: &Address) -> u128 {
    env.invoke_contract(
        pool,
        &Symbol::new(env, "get_user_debt_usd"),
        (account.clone(),).into_val(env),
    )
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
