#![no_std]

use soroban_sdk::{contract, contractimpl, contracttype, token, Address, Env, Symbol};

#[contract]
pub struct FeeVault;

/// Storage keys for the vault contract
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Admin address (Instance storage)
    Admin,
}

const INSTANCE_TTL_THRESHOLD: u32 = 17280;
const INSTANCE_TTL_EXTEND: u32 = 518400;

#[contractimpl]
impl FeeVault {
    pub fn initialize(env: Env, admin: Address) {
        if env.storage().instance().has(&DataKey::Admin) {
            panic!("Already initialized");
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Admin, &admin);
        extend_instance_ttl(&env);
    }

    /// Move accumulated fees out of the vault
    pub fn withdraw(env: Env, token: Address, to: Address, amount: u128) {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .expect("Not initialized");
        admin.require_auth();

        token::Client::new(&env, &token).transfer(
            &env.current_contract_address(),
            &to,
            &(amount as i128),
        );

        env.events()
            .publish((Symbol::new(&env, "withdraw"),), (token, to, amount));

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

fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::testutils::Address as _;
    use soroban_sdk::{token::StellarAssetClient, Address, Env};

    #[test]
    fn test_initialize_and_admin() {
        let env = Env::default();
        env.mock_all_auths();

        let admin = Address::generate(&env);
        let contract_id = env.register(FeeVault, ());
        let client = FeeVaultClient::new(&env, &contract_id);

        client.initialize(&admin);
        assert_eq!(client.get_admin(), admin);
    }

    #[test]
    #[should_panic(expected = "Already initialized")]
    fn test_initialize_twice_fails() {
        let env = Env::default();
        env.mock_all_auths();

        let admin = Address::generate(&env);
        let contract_id = env.register(FeeVault, ());
        let client = FeeVaultClient::new(&env, &contract_id);

        client.initialize(&admin);
        client.initialize(&admin);
    }

    #[test]
    fn test_withdraw_fees() {
        let env = Env::default();
        env.mock_all_auths();

        let admin = Address::generate(&env);
        let contract_id = env.register(FeeVault, ());
        let client = FeeVaultClient::new(&env, &contract_id);
        client.initialize(&admin);

        let issuer = Address::generate(&env);
        let sac = env.register_stellar_asset_contract_v2(issuer);
        let token_id = sac.address();
        StellarAssetClient::new(&env, &token_id).mint(&contract_id, &1_000);

        let recipient = Address::generate(&env);
        client.withdraw(&token_id, &recipient, &400);

        let token = token::Client::new(&env, &token_id);
        assert_eq!(token.balance(&recipient), 400);
        assert_eq!(token.balance(&contract_id), 600);
    }
}
