//! # Events
//!
//! Every successful state change publishes exactly one event (a contribution
//! that reaches the goal publishes two). Topics are `(symbol, project_id)`;
//! the data is one of the structs below.
//!
//! | Topic       | Data                    |
//! |-------------|-------------------------|
//! | `created`   | [`ProjectCreated`]      |
//! | `invested`  | [`InvestedInProject`]   |
//! | `funded`    | [`ProjectFunded`]       |
//! | `expired`   | [`ProjectExpired`]      |
//! | `tx_new`    | [`TransactionCreated`]  |
//! | `tx_sign`   | [`TransactionSigned`]   |
//! | `tx_exec`   | [`TransactionExecuted`] |
//! | `tx_revoke` | [`TransactionRevoked`]  |

use soroban_sdk::{contracttype, symbol_short, Address, Env};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectCreated {
    pub project_id: u64,
    pub owner: Address,
    pub token: Address,
    pub min_capital: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InvestedInProject {
    pub project_id: u64,
    pub financier: Address,
    pub amount: i128,
    /// Financier's cumulative capital after this contribution.
    pub capital_invested: i128,
    /// Project total after this contribution.
    pub total_invested: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectFunded {
    pub project_id: u64,
    pub total_invested: i128,
    pub goal: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectExpired {
    pub project_id: u64,
    pub expiration: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransactionCreated {
    pub project_id: u64,
    pub index: u32,
    pub owner: Address,
    pub to: Address,
    pub value: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransactionSigned {
    pub project_id: u64,
    pub index: u32,
    pub signer: Address,
    pub num_confirmations: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransactionExecuted {
    pub project_id: u64,
    pub index: u32,
    pub to: Address,
    pub value: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransactionRevoked {
    pub project_id: u64,
    pub index: u32,
    pub owner: Address,
}

pub fn emit_project_created(env: &Env, project_id: u64, owner: Address, token: Address, min_capital: i128) {
    env.events().publish(
        (symbol_short!("created"), project_id),
        ProjectCreated {
            project_id,
            owner,
            token,
            min_capital,
        },
    );
}

pub fn emit_invested(
    env: &Env,
    project_id: u64,
    financier: Address,
    amount: i128,
    capital_invested: i128,
    total_invested: i128,
) {
    env.events().publish(
        (symbol_short!("invested"), project_id),
        InvestedInProject {
            project_id,
            financier,
            amount,
            capital_invested,
            total_invested,
        },
    );
}

pub fn emit_project_funded(env: &Env, project_id: u64, total_invested: i128, goal: i128) {
    env.events().publish(
        (symbol_short!("funded"), project_id),
        ProjectFunded {
            project_id,
            total_invested,
            goal,
        },
    );
}

pub fn emit_project_expired(env: &Env, project_id: u64, expiration: u64) {
    env.events().publish(
        (symbol_short!("expired"), project_id),
        ProjectExpired {
            project_id,
            expiration,
        },
    );
}

pub fn emit_transaction_created(
    env: &Env,
    project_id: u64,
    index: u32,
    owner: Address,
    to: Address,
    value: i128,
) {
    env.events().publish(
        (symbol_short!("tx_new"), project_id),
        TransactionCreated {
            project_id,
            index,
            owner,
            to,
            value,
        },
    );
}

pub fn emit_transaction_signed(
    env: &Env,
    project_id: u64,
    index: u32,
    signer: Address,
    num_confirmations: u32,
) {
    env.events().publish(
        (symbol_short!("tx_sign"), project_id),
        TransactionSigned {
            project_id,
            index,
            signer,
            num_confirmations,
        },
    );
}

pub fn emit_transaction_executed(env: &Env, project_id: u64, index: u32, to: Address, value: i128) {
    env.events().publish(
        (symbol_short!("tx_exec"), project_id),
        TransactionExecuted {
            project_id,
            index,
            to,
            value,
        },
    );
}

pub fn emit_transaction_revoked(env: &Env, project_id: u64, index: u32, owner: Address) {
    env.events().publish(
        (symbol_short!("tx_revoke"), project_id),
        TransactionRevoked {
            project_id,
            index,
            owner,
        },
    );
}
