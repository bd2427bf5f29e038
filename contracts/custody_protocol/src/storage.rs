//! # Storage
//!
//! Provides typed helpers over Soroban's two storage tiers used by the protocol:
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key              | Type      | Description                          |
//! |------------------|-----------|--------------------------------------|
//! | `Token`          | `Address` | Shared token every project pools in  |
//! | `ProjectCount`   | `u64`     | Auto-increment project ID counter    |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                  | Type            | Description                      |
//! |----------------------|-----------------|----------------------------------|
//! | `ProjConfig(id)`     | `ProjectConfig` | Immutable project terms          |
//! | `ProjState(id)`      | `ProjectState`  | Mutable project state            |
//! | `FinancierCount(id)` | `u32`           | Number of distinct contributors  |
//! | `Financier(id, n)`   | `Address`       | `n`-th contributor, first-seen   |
//! | `Capital(id, addr)`  | `i128`          | Cumulative capital per financier |
//! | `Tx(id, index)`      | `Transaction`   | Multisig transaction log entry   |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::types::{Project, ProjectConfig, ProjectState, Transaction};
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

/// Instance storage: bump by 7 days when below 1 day remaining.
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

/// Persistent storage: bump by 30 days when below 7 days remaining.
const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Shared token address (Instance).
    Token,
    /// Global auto-increment counter for project IDs (Instance).
    ProjectCount,
    /// Immutable project terms keyed by ID (Persistent).
    ProjConfig(u64),
    /// Mutable project state keyed by ID (Persistent).
    ProjState(u64),
    /// Number of distinct contributors of a project (Persistent).
    FinancierCount(u64),
    /// Contributor `n` of project `id`, in first-seen order (Persistent).
    Financier(u64, u32),
    /// Cumulative contribution of one financier to one project (Persistent).
    Capital(u64, Address),
    /// Transaction `index` of project `id` (Persistent).
    Tx(u64, u32),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn set_token(env: &Env, token: &Address) {
    env.storage().instance().set(&DataKey::Token, token);
    bump_instance(env);
}

/// Retrieve the shared token address written at deployment.
pub fn get_token(env: &Env) -> Result<Address, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Token)
        .ok_or(Error::NotInitialized)
}

pub fn get_project_count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::ProjectCount)
        .unwrap_or(0)
}

/// Atomically reads, increments, and stores the project counter.
/// Returns the ID to use for the *current* project (pre-increment value).
pub fn get_and_increment_project_id(env: &Env) -> u64 {
    bump_instance(env);
    let current = get_project_count(env);
    env.storage()
        .instance()
        .set(&DataKey::ProjectCount, &(current + 1));
    current
}

// ── Persistent Storage Helpers ───────────────────────────────────────

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Save the terms and initial state of a new project.
pub fn save_project(env: &Env, config: &ProjectConfig, state: &ProjectState) {
    let config_key = DataKey::ProjConfig(config.id);
    let state_key = DataKey::ProjState(config.id);

    env.storage().persistent().set(&config_key, config);
    env.storage().persistent().set(&state_key, state);
    bump_persistent(env, &config_key);
    bump_persistent(env, &state_key);
}

/// Load the full `Project` by combining config and state.
pub fn load_project(env: &Env, id: u64) -> Result<Project, Error> {
    let (config, state) = load_project_pair(env, id)?;
    Ok(Project {
        id: config.id,
        owner: config.owner,
        token: config.token,
        name: config.name,
        description: config.description,
        min_capital: config.min_capital,
        goal: config.goal,
        expiration: config.expiration,
        quorum: config.quorum,
        status: state.status,
        total_invested: state.total_invested,
        balance: state.balance,
        tx_count: state.tx_count,
    })
}

/// Load config and state in one go; the common pattern of every entry point.
pub fn load_project_pair(env: &Env, id: u64) -> Result<(ProjectConfig, ProjectState), Error> {
    Ok((load_project_config(env, id)?, load_project_state(env, id)?))
}

pub fn load_project_config(env: &Env, id: u64) -> Result<ProjectConfig, Error> {
    let key = DataKey::ProjConfig(id);
    let config: ProjectConfig = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(Error::ProjectNotFound)?;
    bump_persistent(env, &key);
    Ok(config)
}

pub fn load_project_state(env: &Env, id: u64) -> Result<ProjectState, Error> {
    let key = DataKey::ProjState(id);
    let state: ProjectState = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(Error::ProjectNotFound)?;
    bump_persistent(env, &key);
    Ok(state)
}

pub fn save_project_state(env: &Env, id: u64, state: &ProjectState) {
    let key = DataKey::ProjState(id);
    env.storage().persistent().set(&key, state);
    bump_persistent(env, &key);
}

// ── Contributor ledger ───────────────────────────────────────────────

pub fn get_financier_count(env: &Env, id: u64) -> u32 {
    let key = DataKey::FinancierCount(id);
    match env.storage().persistent().get(&key) {
        Some(count) => {
            bump_persistent(env, &key);
            count
        }
        None => 0,
    }
}

/// Append a first-time contributor. One small entry per financier, so the
/// write cost does not grow with the size of the project.
pub fn add_financier(env: &Env, id: u64, financier: &Address) -> Result<u32, Error> {
    let index = get_financier_count(env, id);
    let entry_key = DataKey::Financier(id, index);
    env.storage().persistent().set(&entry_key, financier);
    bump_persistent(env, &entry_key);

    let count = index.checked_add(1).ok_or(Error::Overflow)?;
    let count_key = DataKey::FinancierCount(id);
    env.storage().persistent().set(&count_key, &count);
    bump_persistent(env, &count_key);
    Ok(count)
}

/// All contributors in first-seen order. Reads one entry per financier;
/// meant for queries, not for the funding or multisig paths.
pub fn get_financiers(env: &Env, id: u64) -> Vec<Address> {
    let mut financiers = Vec::new(env);
    for index in 0..get_financier_count(env, id) {
        let key = DataKey::Financier(id, index);
        if let Some(financier) = env.storage().persistent().get::<_, Address>(&key) {
            bump_persistent(env, &key);
            financiers.push_back(financier);
        }
    }
    financiers
}

/// Cumulative capital of `financier`; `None` if they never contributed.
pub fn get_capital(env: &Env, id: u64, financier: &Address) -> Option<i128> {
    let key = DataKey::Capital(id, financier.clone());
    let capital = env.storage().persistent().get(&key);
    if capital.is_some() {
        bump_persistent(env, &key);
    }
    capital
}

pub fn set_capital(env: &Env, id: u64, financier: &Address, amount: i128) {
    let key = DataKey::Capital(id, financier.clone());
    env.storage().persistent().set(&key, &amount);
    bump_persistent(env, &key);
}

// ── Transaction log ──────────────────────────────────────────────────

pub fn load_transaction(env: &Env, id: u64, index: u32) -> Result<Transaction, Error> {
    let key = DataKey::Tx(id, index);
    let tx: Transaction = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(Error::TransactionNotExist)?;
    bump_persistent(env, &key);
    Ok(tx)
}

pub fn save_transaction(env: &Env, id: u64, index: u32, tx: &Transaction) {
    let key = DataKey::Tx(id, index);
    env.storage().persistent().set(&key, tx);
    bump_persistent(env, &key);
}
