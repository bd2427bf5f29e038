//! # Custody Protocol Contract
//!
//! Pooled-custody crowdfunding with multisig-gated withdrawals. The contract
//! instance is the project registry (the "manager"); every project is an
//! entry with a stable `u64` id, its own funding terms, contributor ledger
//! and transaction log. All projects pool the single token passed to the
//! constructor at deployment.
//!
//! | Phase        | Entry Point(s)                                                   |
//! |--------------|------------------------------------------------------------------|
//! | Bootstrap    | `__constructor` (token fixed at deployment)                      |
//! | Registry     | `create_project`, `get_all_projects`, `get_usdt_token_address`   |
//! | Funding      | [`CustodyProtocol::fund_project`], `change_status`, `is_expired` |
//! | Multisig     | `create_transaction`, `sign_transaction`, `execute_transaction`, `revoke_transaction` |
//! | Queries      | `get_project`, `get_status`, `get_usdt_balance`, `get_financiers`, `get_transaction`, ... |
//!
//! ## Architecture
//!
//! Funding rules live in [`funding`], the transaction log in [`multisig`],
//! storage access in [`storage`]. This file contains the public entry points
//! and caller authentication; the acting address is always an explicit
//! argument.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, token, Address, Env, String, Vec};

pub mod events;
mod funding;
mod multisig;
mod storage;
mod types;

#[cfg(test)]
mod test_multisig;

pub use types::{Project, ProjectStatus, QuorumPolicy, Transaction, TransactionStatus};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    /// The instance entry holding the token could not be read.
    NotInitialized = 2,
    ProjectNotFound = 3,
    InvalidAmount = 4,
    InvalidGoal = 5,
    InvalidDeadline = 6,
    InvalidQuorum = 7,
    Overflow = 8,

    // Funding
    NotActive = 10,
    Expired = 11,
    InsufficientAmount = 12,
    InsufficientAllowance = 13,
    NotEnoughCapitalInvested = 14,

    // Multisig
    NotOwner = 20,
    IsOwner = 21,
    NotFinancier = 22,
    TransactionNotExist = 23,
    TransactionNotPending = 24,
    TransactionAlreadyExecuted = 25,
    TransactionAlreadyConfirmed = 26,
    TransactionNotEnoughConfirmations = 27,
    InsufficientBalance = 28,
}

#[contract]
pub struct CustodyProtocol;

#[contractimpl]
impl CustodyProtocol {
    // ─────────────────────────────────────────────────────────
    // Initialisation
    // ─────────────────────────────────────────────────────────

    /// Fix the token every project pools in.
    ///
    /// Runs once, atomically with deployment; the token cannot be changed
    /// afterwards.
    pub fn __constructor(env: Env, token: Address) {
        storage::set_token(&env, &token);
    }

    // ─────────────────────────────────────────────────────────
    // Registry
    // ─────────────────────────────────────────────────────────

    /// Create a project owned by `owner`, bound to the configured token.
    ///
    /// - `goal`: funding target; reaching it moves the project to `Funded`.
    /// - `duration`: seconds from now until contributions close.
    ///
    /// Both are optional; without them the project stays `Active` forever.
    #[allow(clippy::too_many_arguments)]
    pub fn create_project(
        env: Env,
        owner: Address,
        name: String,
        description: String,
        min_capital: i128,
        goal: Option<i128>,
        duration: Option<u64>,
        quorum: QuorumPolicy,
    ) -> Result<u64, Error> {
        owner.require_auth();
        let token = storage::get_token(&env)?;

        if min_capital < 0 {
            return Err(Error::InvalidAmount);
        }
        if matches!(goal, Some(g) if g <= 0) {
            return Err(Error::InvalidGoal);
        }
        if quorum == QuorumPolicy::Fixed(0) {
            return Err(Error::InvalidQuorum);
        }
        let expiration = match duration {
            Some(0) => return Err(Error::InvalidDeadline),
            Some(seconds) => Some(
                env.ledger()
                    .timestamp()
                    .checked_add(seconds)
                    .ok_or(Error::Overflow)?,
            ),
            None => None,
        };

        let id = storage::get_and_increment_project_id(&env);

        let config = types::ProjectConfig {
            id,
            owner: owner.clone(),
            token: token.clone(),
            name,
            description,
            min_capital,
            goal,
            expiration,
            quorum,
        };
        let state = types::ProjectState {
            status: ProjectStatus::Active,
            total_invested: 0,
            balance: 0,
            tx_count: 0,
        };
        storage::save_project(&env, &config, &state);

        events::emit_project_created(&env, id, owner, token, min_capital);
        Ok(id)
    }

    /// Ids of every project, in creation order.
    pub fn get_all_projects(env: Env) -> Vec<u64> {
        let mut ids = Vec::new(&env);
        for id in 0..storage::get_project_count(&env) {
            ids.push_back(id);
        }
        ids
    }

    pub fn get_project_count(env: Env) -> u64 {
        storage::get_project_count(&env)
    }

    pub fn get_usdt_token_address(env: Env) -> Result<Address, Error> {
        storage::get_token(&env)
    }

    /// Token balance held by the contract across all projects.
    pub fn get_vault_balance(env: Env) -> Result<i128, Error> {
        let token = storage::get_token(&env)?;
        Ok(token::Client::new(&env, &token).balance(&env.current_contract_address()))
    }

    // ─────────────────────────────────────────────────────────
    // Funding
    // ─────────────────────────────────────────────────────────

    /// Contribute `amount` to a project.
    ///
    /// `financier` must have approved the contract for at least `amount` on
    /// the token. A financier's first contribution must be at least the
    /// project's `min_capital`.
    pub fn fund_project(
        env: Env,
        project_id: u64,
        financier: Address,
        amount: i128,
    ) -> Result<ProjectStatus, Error> {
        financier.require_auth();
        funding::fund(&env, project_id, &financier, amount)
    }

    /// Commit the `Expired` status if the deadline has passed. Anyone may call.
    pub fn change_status(env: Env, project_id: u64) -> Result<ProjectStatus, Error> {
        funding::change_status(&env, project_id)
    }

    /// Pure deadline check; never writes the status.
    pub fn is_expired(env: Env, project_id: u64) -> Result<bool, Error> {
        let config = storage::load_project_config(&env, project_id)?;
        Ok(funding::is_expired(&env, &config))
    }

    // ─────────────────────────────────────────────────────────
    // Multisig
    // ─────────────────────────────────────────────────────────

    /// Propose sending `value` of the project's pool to `to`. Owner only.
    pub fn create_transaction(
        env: Env,
        project_id: u64,
        owner: Address,
        to: Address,
        value: i128,
    ) -> Result<u32, Error> {
        owner.require_auth();
        multisig::create(&env, project_id, &owner, &to, value)
    }

    /// Confirm a pending transaction. Financiers other than the owner only.
    pub fn sign_transaction(
        env: Env,
        project_id: u64,
        signer: Address,
        index: u32,
    ) -> Result<u32, Error> {
        signer.require_auth();
        multisig::sign(&env, project_id, &signer, index)
    }

    pub fn is_transaction_signed_by(
        env: Env,
        project_id: u64,
        signer: Address,
        index: u32,
    ) -> Result<bool, Error> {
        multisig::is_signed_by(&env, project_id, &signer, index)
    }

    /// Pay out a pending transaction that has reached quorum. Owner only.
    pub fn execute_transaction(
        env: Env,
        project_id: u64,
        caller: Address,
        index: u32,
    ) -> Result<(), Error> {
        caller.require_auth();
        multisig::execute(&env, project_id, &caller, index)
    }

    /// Permanently cancel a pending transaction. Owner only.
    pub fn revoke_transaction(
        env: Env,
        project_id: u64,
        owner: Address,
        index: u32,
    ) -> Result<(), Error> {
        owner.require_auth();
        multisig::revoke(&env, project_id, &owner, index)
    }

    pub fn get_transaction_count(env: Env, project_id: u64) -> Result<u32, Error> {
        Ok(storage::load_project_state(&env, project_id)?.tx_count)
    }

    pub fn get_transaction(env: Env, project_id: u64, index: u32) -> Result<Transaction, Error> {
        storage::load_project_config(&env, project_id)?;
        storage::load_transaction(&env, project_id, index)
    }

    /// Confirmations a transaction of this project currently needs.
    pub fn get_required_confirmations(env: Env, project_id: u64) -> Result<u32, Error> {
        let config = storage::load_project_config(&env, project_id)?;
        Ok(multisig::required_confirmations(&env, &config))
    }

    pub fn transaction_status_label(env: Env, status: TransactionStatus) -> String {
        String::from_str(&env, multisig::status_label(status))
    }

    // ─────────────────────────────────────────────────────────
    // Project queries
    // ─────────────────────────────────────────────────────────

    pub fn get_project(env: Env, project_id: u64) -> Result<Project, Error> {
        storage::load_project(&env, project_id)
    }

    pub fn get_name(env: Env, project_id: u64) -> Result<String, Error> {
        Ok(storage::load_project_config(&env, project_id)?.name)
    }

    pub fn get_description(env: Env, project_id: u64) -> Result<String, Error> {
        Ok(storage::load_project_config(&env, project_id)?.description)
    }

    pub fn get_min_capital(env: Env, project_id: u64) -> Result<i128, Error> {
        Ok(storage::load_project_config(&env, project_id)?.min_capital)
    }

    pub fn get_goal(env: Env, project_id: u64) -> Result<Option<i128>, Error> {
        Ok(storage::load_project_config(&env, project_id)?.goal)
    }

    pub fn get_expiration(env: Env, project_id: u64) -> Result<Option<u64>, Error> {
        Ok(storage::load_project_config(&env, project_id)?.expiration)
    }

    pub fn get_owner(env: Env, project_id: u64) -> Result<Address, Error> {
        Ok(storage::load_project_config(&env, project_id)?.owner)
    }

    /// Stored status; may read `Active` past the deadline until
    /// `change_status` is called.
    pub fn get_status(env: Env, project_id: u64) -> Result<ProjectStatus, Error> {
        Ok(storage::load_project_state(&env, project_id)?.status)
    }

    /// `"Active"`, `"Funded"` or `"Expired"`.
    pub fn get_status_label(env: Env, project_id: u64) -> Result<String, Error> {
        let status = storage::load_project_state(&env, project_id)?.status;
        Ok(String::from_str(&env, funding::status_label(status)))
    }

    /// Amount held in custody for this project: contributions minus executed
    /// payouts, as recorded by this contract.
    ///
    /// All projects share one custody address, so this is the project's own
    /// ledger and not a token balance query. Tokens sent straight to the
    /// contract are not counted towards any project; see `get_vault_balance`
    /// for the raw holding.
    pub fn get_usdt_balance(env: Env, project_id: u64) -> Result<i128, Error> {
        Ok(storage::load_project_state(&env, project_id)?.balance)
    }

    pub fn get_total_invested(env: Env, project_id: u64) -> Result<i128, Error> {
        Ok(storage::load_project_state(&env, project_id)?.total_invested)
    }

    /// Cumulative contribution of `financier`; zero if they never contributed.
    pub fn get_capital_invested(env: Env, project_id: u64, financier: Address) -> Result<i128, Error> {
        storage::load_project_config(&env, project_id)?;
        Ok(storage::get_capital(&env, project_id, &financier).unwrap_or(0))
    }

    /// Financiers in order of their first contribution.
    pub fn get_financiers(env: Env, project_id: u64) -> Result<Vec<Address>, Error> {
        storage::load_project_config(&env, project_id)?;
        Ok(storage::get_financiers(&env, project_id))
    }
}
