//! # Events
//!
//! Every registry creation and campaign transition publishes one event.
//! Topics are `(symbol, campaign_id)` so off-chain consumers can filter by
//! campaign; the payload is a `#[contracttype]` struct.
//!
//! | Topic       | Payload                     | Transition               |
//! |-------------|-----------------------------|--------------------------|
//! | `created`   | [`CampaignCreated`]         | NONE → Open              |
//! | `funded`    | [`CampaignFunded`]          | Open → Open              |
//! | `finalized` | [`CampaignFinalized`]       | Open → Successful/Failed |
//! | `withdrawn` | [`FundsWithdrawn`]          | Successful → PaidOut     |
//! | `refunded`  | [`RefundClaimed`]           | Failed → Failed          |
//! | `update`    | [`ResearchUpdateSubmitted`] | (no transition)          |
//!
//! Delivery is at-least-once from a consumer's point of view; consumers
//! deduplicate by the RPC event id.

use soroban_sdk::{contracttype, symbol_short, Address, Env, String};

use crate::types::CampaignStatus;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CampaignCreated {
    pub campaign_id: u64,
    pub researcher: Address,
    pub funding_goal: i128,
    pub deadline: u64,
    pub title: String,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CampaignFunded {
    pub campaign_id: u64,
    pub backer: Address,
    pub amount: i128,
    /// Campaign total after this contribution.
    pub total_funded: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CampaignFinalized {
    pub campaign_id: u64,
    pub state: CampaignStatus,
    pub total_funded: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundsWithdrawn {
    pub campaign_id: u64,
    pub researcher: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RefundClaimed {
    pub campaign_id: u64,
    pub backer: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResearchUpdateSubmitted {
    pub campaign_id: u64,
    pub researcher: Address,
    pub content_ref: String,
    pub index: u32,
}

pub fn emit_campaign_created(env: &Env, event: CampaignCreated) {
    let topics = (symbol_short!("created"), event.campaign_id);
    env.events().publish(topics, event);
}

pub fn emit_campaign_funded(env: &Env, event: CampaignFunded) {
    let topics = (symbol_short!("funded"), event.campaign_id);
    env.events().publish(topics, event);
}

pub fn emit_campaign_finalized(env: &Env, event: CampaignFinalized) {
    let topics = (symbol_short!("finalized"), event.campaign_id);
    env.events().publish(topics, event);
}

pub fn emit_funds_withdrawn(env: &Env, event: FundsWithdrawn) {
    let topics = (symbol_short!("withdrawn"), event.campaign_id);
    env.events().publish(topics, event);
}

pub fn emit_refund_claimed(env: &Env, event: RefundClaimed) {
    let topics = (symbol_short!("refunded"), event.campaign_id);
    env.events().publish(topics, event);
}

pub fn emit_research_update(env: &Env, event: ResearchUpdateSubmitted) {
    let topics = (symbol_short!("update"), event.campaign_id);
    env.events().publish(topics, event);
}
