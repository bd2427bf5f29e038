//! # Funding
//!
//! Contribution intake and the funding lifecycle of a single project.
//!
//! Expiry has two halves: [`is_expired`] is a pure time check,
//! [`change_status`] commits `Active → Expired` to storage. Until someone
//! calls `change_status`, the stored status may still read `Active` past the
//! deadline; [`fund`] therefore re-checks the deadline on every call.

use soroban_sdk::{token, Address, Env};

use crate::events;
use crate::storage;
use crate::types::{ProjectConfig, ProjectStatus};
use crate::Error;

/// `true` once the ledger clock has reached the project's deadline.
/// Projects without a deadline never expire.
pub fn is_expired(env: &Env, config: &ProjectConfig) -> bool {
    match config.expiration {
        Some(expiration) => env.ledger().timestamp() >= expiration,
        None => false,
    }
}

pub fn status_label(status: ProjectStatus) -> &'static str {
    match status {
        ProjectStatus::Active => "Active",
        ProjectStatus::Funded => "Funded",
        ProjectStatus::Expired => "Expired",
    }
}

/// Pull `amount` from `financier` into custody and credit it to the project.
///
/// Token calls happen before any project entry is written, so a failing
/// transfer leaves the project untouched. Returns the resulting status.
pub fn fund(
    env: &Env,
    project_id: u64,
    financier: &Address,
    amount: i128,
) -> Result<ProjectStatus, Error> {
    if amount <= 0 {
        return Err(Error::InvalidAmount);
    }

    let (config, mut state) = storage::load_project_pair(env, project_id)?;

    // Deadline first: the cached status may lag behind the clock.
    if is_expired(env, &config) {
        return Err(Error::Expired);
    }
    if state.status != ProjectStatus::Active {
        return Err(Error::NotActive);
    }

    let token_client = token::Client::new(env, &config.token);
    let custody = env.current_contract_address();

    if token_client.balance(financier) < amount {
        return Err(Error::InsufficientAmount);
    }
    if token_client.allowance(financier, &custody) < amount {
        return Err(Error::InsufficientAllowance);
    }

    let previous = storage::get_capital(env, project_id, financier);
    if previous.is_none() && amount < config.min_capital {
        return Err(Error::NotEnoughCapitalInvested);
    }

    let capital = previous
        .unwrap_or(0)
        .checked_add(amount)
        .ok_or(Error::Overflow)?;
    let total_invested = state
        .total_invested
        .checked_add(amount)
        .ok_or(Error::Overflow)?;
    let balance = state.balance.checked_add(amount).ok_or(Error::Overflow)?;

    token_client.transfer_from(&custody, financier, &custody, &amount);

    storage::set_capital(env, project_id, financier, capital);
    if previous.is_none() {
        storage::add_financier(env, project_id, financier)?;
    }

    state.total_invested = total_invested;
    state.balance = balance;

    let reached_goal = match config.goal {
        Some(goal) if total_invested >= goal => {
            state.status = ProjectStatus::Funded;
            Some(goal)
        }
        _ => None,
    };
    storage::save_project_state(env, project_id, &state);

    events::emit_invested(
        env,
        project_id,
        financier.clone(),
        amount,
        capital,
        total_invested,
    );
    if let Some(goal) = reached_goal {
        events::emit_project_funded(env, project_id, total_invested, goal);
    }

    Ok(state.status)
}

/// Commit `Active → Expired` if the deadline has passed. No-op otherwise.
pub fn change_status(env: &Env, project_id: u64) -> Result<ProjectStatus, Error> {
    let (config, mut state) = storage::load_project_pair(env, project_id)?;

    if let (ProjectStatus::Active, Some(expiration)) = (state.status, config.expiration) {
        if env.ledger().timestamp() >= expiration {
            state.status = ProjectStatus::Expired;
            storage::save_project_state(env, project_id, &state);
            events::emit_project_expired(env, project_id, expiration);
        }
    }

    Ok(state.status)
}
