//! Canonical event types emitted by the Momentum escrow contract.
//!
//! These mirror the Soroban contract events defined in
//! `contracts/momentum_escrow/src/events.rs`.

use serde::{Deserialize, Serialize};

/// All recognised event kinds from the escrow contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A campaign was opened by the registry (`created` topic).
    CampaignCreated,
    /// A backer contributed to a campaign (`funded` topic).
    CampaignFunded,
    /// Funding closed with an outcome (`finalized` topic).
    CampaignFinalized,
    /// The researcher withdrew a successful campaign (`withdrawn` topic).
    FundsWithdrawn,
    /// A backer reclaimed a contribution (`refunded` topic).
    RefundClaimed,
    /// The researcher published a research update (`update` topic).
    ResearchUpdate,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol string produced by Soroban into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "created" => Self::CampaignCreated,
            "funded" => Self::CampaignFunded,
            "finalized" => Self::CampaignFinalized,
            "withdrawn" => Self::FundsWithdrawn,
            "refunded" => Self::RefundClaimed,
            "update" => Self::ResearchUpdate,
            _ => Self::Unknown,
        }
    }

    /// Return a short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CampaignCreated => "campaign_created",
            Self::CampaignFunded => "campaign_funded",
            Self::CampaignFinalized => "campaign_finalized",
            Self::FundsWithdrawn => "funds_withdrawn",
            Self::RefundClaimed => "refund_claimed",
            Self::ResearchUpdate => "research_update",
            Self::Unknown => "unknown",
        }
    }

    /// Inverse of [`EventKind::as_str`], used when reading rows back.
    pub fn from_stored(s: &str) -> Self {
        match s {
            "campaign_created" => Self::CampaignCreated,
            "campaign_funded" => Self::CampaignFunded,
            "campaign_finalized" => Self::CampaignFinalized,
            "funds_withdrawn" => Self::FundsWithdrawn,
            "refund_claimed" => Self::RefundClaimed,
            "research_update" => Self::ResearchUpdate,
            _ => Self::Unknown,
        }
    }
}

/// Campaign status as published in `finalized` events (`#[repr(u32)]` on chain).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Open,
    Successful,
    Failed,
    PaidOut,
}

impl CampaignStatus {
    pub fn from_discriminant(value: u64) -> Option<Self> {
        match value {
            0 => Some(Self::Open),
            1 => Some(Self::Successful),
            2 => Some(Self::Failed),
            3 => Some(Self::PaidOut),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Successful => "successful",
            Self::Failed => "failed",
            Self::PaidOut => "paid_out",
        }
    }

    pub fn from_stored(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "successful" => Some(Self::Successful),
            "failed" => Some(Self::Failed),
            "paid_out" => Some(Self::PaidOut),
            _ => None,
        }
    }
}

/// A fully decoded escrow event, ready to be stored in the database.
///
/// `detail` carries the kind-specific extra field: the deadline for
/// `created`, the running total for `funded`, the outcome for `finalized`
/// and the content reference for `update`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowEvent {
    pub event_id: String,
    pub event_type: String,
    pub campaign_id: Option<i64>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub detail: Option<String>,
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
    pub campaign_id: Option<i64>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub detail: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}

impl EventRecord {
    pub fn kind(&self) -> EventKind {
        EventKind::from_stored(&self.event_type)
    }

    /// The `amount` column as an integer, if present and well-formed.
    pub fn amount_value(&self) -> Option<i128> {
        self.amount.as_deref().and_then(|a| a.parse().ok())
    }
}
