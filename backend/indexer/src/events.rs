//! Canonical event types emitted by the custody protocol contract.
//!
//! These mirror the Soroban contract events defined in
//! `contracts/custody_protocol/src/events.rs`.

use serde::{Deserialize, Serialize};

/// All recognised event kinds from the custody contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A new project was registered (`created` topic).
    ProjectCreated,
    /// A financier contributed to a project (`invested` topic).
    Invested,
    /// A project reached its goal (`funded` topic).
    ProjectFunded,
    /// A project's expiry was committed (`expired` topic).
    ProjectExpired,
    /// The owner proposed an outbound transfer (`tx_new` topic).
    TransactionCreated,
    /// A financier confirmed a transfer (`tx_sign` topic).
    TransactionSigned,
    /// A transfer left custody (`tx_exec` topic).
    TransactionExecuted,
    /// The owner cancelled a transfer (`tx_revoke` topic).
    TransactionRevoked,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol string produced by Soroban into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "created" => Self::ProjectCreated,
            "invested" => Self::Invested,
            "funded" => Self::ProjectFunded,
            "expired" => Self::ProjectExpired,
            "tx_new" => Self::TransactionCreated,
            "tx_sign" => Self::TransactionSigned,
            "tx_exec" => Self::TransactionExecuted,
            "tx_revoke" => Self::TransactionRevoked,
            _ => Self::Unknown,
        }
    }

    /// Return a short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectCreated => "project_created",
            Self::Invested => "invested",
            Self::ProjectFunded => "project_funded",
            Self::ProjectExpired => "project_expired",
            Self::TransactionCreated => "transaction_created",
            Self::TransactionSigned => "transaction_signed",
            Self::TransactionExecuted => "transaction_executed",
            Self::TransactionRevoked => "transaction_revoked",
            Self::Unknown => "unknown",
        }
    }

    /// `true` for events that refer to one entry of a project's transaction log.
    pub fn is_transaction(&self) -> bool {
        matches!(
            self,
            Self::TransactionCreated
                | Self::TransactionSigned
                | Self::TransactionExecuted
                | Self::TransactionRevoked
        )
    }
}

/// A fully decoded custody event, ready to be stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustodyEvent {
    /// Idempotency key: the RPC event id, or a key derived from the event itself.
    pub event_id: String,
    pub event_type: String,
    pub project_id: Option<String>,
    pub tx_index: Option<i64>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// A raw event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_id: String,
    pub event_type: String,
    pub project_id: Option<String>,
    pub tx_index: Option<i64>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}
