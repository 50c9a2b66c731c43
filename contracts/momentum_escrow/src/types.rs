//! # Types
//!
//! Shared data structures used across the registry and campaign modules.
//!
//! ## Config / State split
//!
//! A campaign is stored as separate ledger entries:
//!
//! - [`CampaignConfig`]: written once by the registry; never mutated.
//! - [`CampaignState`]: written on every contribution, finalization,
//!   withdrawal and refund.
//! - [`CampaignMetadata`]: descriptive data for clients; never mutated.
//!
//! Queries return the reconstructed [`CampaignDetails`] view.
//!
//! ## Status as a Finite-State Machine
//!
//! [`CampaignStatus`] only ever moves forward:
//!
//! ```text
//! Open ──► Successful ──► PaidOut
//!   └────► Failed
//! ```
//!
//! `Failed` is terminal for the state machine; refunds drain the escrow
//! backer by backer without leaving it.

use soroban_sdk::{contracttype, Address, String};

/// Registry-assigned campaign identifier (sequential from 0).
pub type CampaignId = u64;

/// Lifecycle status of a campaign.
///
/// Discriminants are stable and form part of the event payloads.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum CampaignStatus {
    /// Accepting contributions until the deadline.
    Open = 0,
    /// Goal reached at finalization; researcher may withdraw.
    Successful = 1,
    /// Goal missed at finalization; backers may reclaim contributions.
    Failed = 2,
    /// Escrow released to the researcher.
    PaidOut = 3,
}

/// Immutable campaign configuration, written once at creation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CampaignConfig {
    pub id: u64,
    pub researcher: Address,
    pub funding_goal: i128,
    pub deadline: u64,
}

/// Mutable campaign state.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CampaignState {
    pub status: CampaignStatus,
    /// Sum of all live backer contributions.
    pub total_funded: i128,
    /// Value currently held in escrow for this campaign.
    pub escrow_balance: i128,
    /// Distinct backers that have ever contributed.
    pub backer_count: u32,
}

/// Descriptive campaign data recorded by the registry.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CampaignMetadata {
    pub title: String,
    pub description: String,
    pub category: String,
    pub created_at: u64,
    pub researcher: Address,
}

/// Full read view of a campaign.
///
/// Reconstructed from the split [`CampaignConfig`] + [`CampaignState`]
/// entries.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CampaignDetails {
    /// Registry identifier.
    pub id: u64,
    /// Address that created the campaign and may withdraw on success.
    pub researcher: Address,
    /// Amount that must be raised by the deadline.
    pub funding_goal: i128,
    /// Ledger timestamp at which funding closes.
    pub deadline: u64,
    /// Current lifecycle status.
    pub state: CampaignStatus,
    /// Total contributed (net of refunds).
    pub total_funded: i128,
    /// Value still held in escrow.
    pub escrow_balance: i128,
    /// Distinct backers.
    pub backer_count: u32,
}

/// Creation bounds enforced by the registry.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegistryLimits {
    pub min_funding_goal: i128,
    pub max_funding_goal: i128,
    pub min_deadline: u64,
    pub max_deadline: u64,
}

impl CampaignDetails {
    pub fn from_parts(config: CampaignConfig, state: CampaignState) -> Self {
        CampaignDetails {
            id: config.id,
            researcher: config.researcher,
            funding_goal: config.funding_goal,
            deadline: config.deadline,
            state: state.status,
            total_funded: state.total_funded,
            escrow_balance: state.escrow_balance,
            backer_count: state.backer_count,
        }
    }
}
