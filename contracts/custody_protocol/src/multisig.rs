//! # Multisig
//!
//! Outbound transfers of pooled funds. The owner proposes, financiers other
//! than the owner confirm, and the owner executes once the project's
//! [`QuorumPolicy`] is met. Each log entry moves `Pending → Executed` or
//! `Pending → Revoked` and never leaves a terminal state.

use soroban_sdk::{token, Address, Env, Vec};

use crate::events;
use crate::storage;
use crate::types::{ProjectConfig, QuorumPolicy, Transaction, TransactionStatus};
use crate::Error;

pub fn status_label(status: TransactionStatus) -> &'static str {
    match status {
        TransactionStatus::Pending => "Pending",
        TransactionStatus::Executed => "Executed",
        TransactionStatus::Revoked => "Revoked",
    }
}

/// Confirmations a transaction of this project needs right now.
///
/// `Majority` counts financiers other than the owner; it reads the stored
/// contributor count instead of walking the contributor list.
pub fn required_confirmations(env: &Env, config: &ProjectConfig) -> u32 {
    match config.quorum {
        QuorumPolicy::Fixed(count) => count,
        QuorumPolicy::Majority => {
            let mut eligible = storage::get_financier_count(env, config.id);
            if storage::get_capital(env, config.id, &config.owner).is_some() {
                eligible = eligible.saturating_sub(1);
            }
            eligible / 2 + 1
        }
    }
}

fn require_owner(config: &ProjectConfig, caller: &Address) -> Result<(), Error> {
    if *caller != config.owner {
        return Err(Error::NotOwner);
    }
    Ok(())
}

fn require_pending(tx: &Transaction) -> Result<(), Error> {
    match tx.status {
        TransactionStatus::Pending => Ok(()),
        TransactionStatus::Executed => Err(Error::TransactionAlreadyExecuted),
        TransactionStatus::Revoked => Err(Error::TransactionNotPending),
    }
}

/// Append a new pending transaction; returns its index.
pub fn create(
    env: &Env,
    project_id: u64,
    owner: &Address,
    to: &Address,
    value: i128,
) -> Result<u32, Error> {
    let (config, mut state) = storage::load_project_pair(env, project_id)?;
    require_owner(&config, owner)?;
    if value <= 0 {
        return Err(Error::InvalidAmount);
    }

    let index = state.tx_count;
    state.tx_count = index.checked_add(1).ok_or(Error::Overflow)?;

    let tx = Transaction {
        to: to.clone(),
        value,
        executed: false,
        num_confirmations: 0,
        status: TransactionStatus::Pending,
        confirmed_by: Vec::new(env),
    };
    storage::save_transaction(env, project_id, index, &tx);
    storage::save_project_state(env, project_id, &state);

    events::emit_transaction_created(env, project_id, index, owner.clone(), to.clone(), value);
    Ok(index)
}

/// Record `signer`'s confirmation; returns the new confirmation count.
pub fn sign(env: &Env, project_id: u64, signer: &Address, index: u32) -> Result<u32, Error> {
    let config = storage::load_project_config(env, project_id)?;
    if *signer == config.owner {
        return Err(Error::IsOwner);
    }
    if storage::get_capital(env, project_id, signer).is_none() {
        return Err(Error::NotFinancier);
    }

    let mut tx = storage::load_transaction(env, project_id, index)?;
    require_pending(&tx)?;
    if tx.confirmed_by.contains(signer) {
        return Err(Error::TransactionAlreadyConfirmed);
    }

    tx.confirmed_by.push_back(signer.clone());
    tx.num_confirmations = tx.confirmed_by.len();
    storage::save_transaction(env, project_id, index, &tx);

    events::emit_transaction_signed(env, project_id, index, signer.clone(), tx.num_confirmations);
    Ok(tx.num_confirmations)
}

pub fn is_signed_by(env: &Env, project_id: u64, signer: &Address, index: u32) -> Result<bool, Error> {
    storage::load_project_config(env, project_id)?;
    let tx = storage::load_transaction(env, project_id, index)?;
    Ok(tx.confirmed_by.contains(signer))
}

/// Pay out a confirmed transaction from the project's custody.
///
/// The transfer runs before the log entry and project balance are written.
pub fn execute(env: &Env, project_id: u64, caller: &Address, index: u32) -> Result<(), Error> {
    let (config, mut state) = storage::load_project_pair(env, project_id)?;
    require_owner(&config, caller)?;

    let mut tx = storage::load_transaction(env, project_id, index)?;
    require_pending(&tx)?;

    if tx.num_confirmations < required_confirmations(env, &config) {
        return Err(Error::TransactionNotEnoughConfirmations);
    }
    if state.balance < tx.value {
        return Err(Error::InsufficientBalance);
    }

    let token_client = token::Client::new(env, &config.token);
    token_client.transfer(&env.current_contract_address(), &tx.to, &tx.value);

    tx.executed = true;
    tx.status = TransactionStatus::Executed;
    state.balance -= tx.value;
    storage::save_transaction(env, project_id, index, &tx);
    storage::save_project_state(env, project_id, &state);

    events::emit_transaction_executed(env, project_id, index, tx.to, tx.value);
    Ok(())
}

pub fn revoke(env: &Env, project_id: u64, owner: &Address, index: u32) -> Result<(), Error> {
    let config = storage::load_project_config(env, project_id)?;
    require_owner(&config, owner)?;

    let mut tx = storage::load_transaction(env, project_id, index)?;
    require_pending(&tx)?;

    tx.status = TransactionStatus::Revoked;
    storage::save_transaction(env, project_id, index, &tx);

    events::emit_transaction_revoked(env, project_id, index, owner.clone());
    Ok(())
}
