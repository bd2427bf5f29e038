//! # Types
//!
//! Shared data structures used across all modules of the custody protocol.
//!
//! ## Design decisions
//!
//! ### Config / State split
//!
//! A `Project` is internally stored as two separate ledger entries:
//!
//! - [`ProjectConfig`]: the funding terms, written once at creation; never mutated.
//! - [`ProjectState`]: written on every contribution and every multisig transition.
//!
//! The contributor ledger (`financiers`, per-financier capital) and the
//! transaction log live under their own keys; see [`crate::storage`].
//! The public API exposes the reconstructed [`Project`] struct for convenience.
//!
//! ### Funding status
//!
//! [`ProjectStatus`] is forward-only:
//!
//! ```text
//! Active ──► Funded    (goal configured and reached)
//!    └─────► Expired   (deadline configured and passed, committed lazily)
//! ```
//!
//! ### Transaction status
//!
//! [`TransactionStatus`] is forward-only as well:
//!
//! ```text
//! Pending ──► Executed
//!    └──────► Revoked
//! ```

use soroban_sdk::{contracttype, Address, String, Vec};

/// Funding lifecycle of a project.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProjectStatus {
    /// Accepting contributions.
    Active,
    /// Goal reached; no further contributions.
    Funded,
    /// Deadline passed before the goal was reached.
    Expired,
}

/// Lifecycle of a proposed outbound transfer.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransactionStatus {
    Pending,
    Executed,
    Revoked,
}

/// How many distinct non-owner confirmations a transaction needs before
/// it can be executed.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QuorumPolicy {
    /// A fixed number of confirmations (must be at least 1).
    Fixed(u32),
    /// Strictly more than half of the project's non-owner financiers,
    /// evaluated at execution time.
    Majority,
}

/// Immutable project terms, written once at creation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectConfig {
    pub id: u64,
    pub owner: Address,
    pub token: Address,
    pub name: String,
    pub description: String,
    pub min_capital: i128,
    pub goal: Option<i128>,
    pub expiration: Option<u64>,
    pub quorum: QuorumPolicy,
}

/// Mutable project state.
///
/// `total_invested` only ever grows; `balance` is the part of the pool
/// still in custody (it shrinks when a transaction executes).
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectState {
    pub status: ProjectStatus,
    pub total_invested: i128,
    pub balance: i128,
    pub tx_count: u32,
}

/// Full representation of a project.
///
/// Used as the public API return type; reconstructed internally from
/// the split `ProjectConfig` + `ProjectState` storage entries.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Project {
    /// Stable identifier inside the registry (auto-incremented).
    pub id: u64,
    /// Creator; the only address that may propose, execute or revoke transactions.
    pub owner: Address,
    /// Token the pool is denominated in.
    pub token: Address,
    pub name: String,
    pub description: String,
    /// Floor for a financier's first contribution.
    pub min_capital: i128,
    /// Funding target, if any.
    pub goal: Option<i128>,
    /// Absolute ledger timestamp after which contributions are refused, if any.
    pub expiration: Option<u64>,
    pub quorum: QuorumPolicy,
    pub status: ProjectStatus,
    /// Sum of every contribution ever received.
    pub total_invested: i128,
    /// Amount still held in custody for this project.
    pub balance: i128,
    /// Number of entries in the transaction log.
    pub tx_count: u32,
}

/// One entry of a project's multisig transaction log.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transaction {
    pub to: Address,
    pub value: i128,
    pub executed: bool,
    pub num_confirmations: u32,
    pub status: TransactionStatus,
    /// Signers in confirmation order; never contains duplicates.
    pub confirmed_by: Vec<Address>,
}
