use soroban_sdk::contracttype;

/// Global accrual state for one (reward token, pool) pair.
/// The index accumulates reward-per-debt-unit scaled by REWARD_SCALE;
/// `last_updated` is the ledger timestamp of the last settlement.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardState {
    pub index: u128,
    pub last_updated: u64,
}
