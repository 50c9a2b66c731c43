//! # Momentum Research Escrow
//!
//! Crowdfunding escrow for research campaigns. A researcher opens a campaign
//! with a funding goal and a deadline, backers contribute the funding token
//! before the deadline, and once the deadline passes the campaign is
//! finalized into exactly one outcome: the researcher withdraws, or every
//! backer reclaims their own contribution.
//!
//! | Phase        | Entry Point(s)                                              |
//! |--------------|-------------------------------------------------------------|
//! | Deployment   | `__constructor`                                             |
//! | Registry     | [`MomentumEscrow::create_campaign`]                         |
//! | Funding      | [`MomentumEscrow::fund`]                                    |
//! | Settlement   | `finalize_campaign`, `withdraw_funds`, `claim_refund`       |
//! | Research log | `submit_research_update`                                    |
//! | Queries      | `get_campaign_details`, `get_campaign_metadata`, `get_all_campaigns`, `get_campaigns_by_researcher`, `get_deployed_campaigns`, `is_valid_campaign`, ... |
//!
//! ## Architecture
//!
//! Creation and lookups live in [`registry`], the state machine and ledger
//! in [`campaign`], storage access in [`storage`] and the reentrancy flag in
//! [`guard`]. This file contains only the public entry points and the
//! authorization checks on identity arguments.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, Address, Env, String, Vec};

mod campaign;
pub mod events;
mod guard;
mod registry;
mod storage;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;
#[cfg(test)]
mod test_registry;

pub use registry::{MAX_DEADLINE, MAX_FUNDING_GOAL, MIN_DEADLINE, MIN_FUNDING_GOAL};
pub use types::{
    CampaignDetails, CampaignId, CampaignMetadata, CampaignStatus, RegistryLimits,
};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // Registry
    InvalidFundingGoal         = 1,
    InvalidDeadline            = 2,
    CreationFailed             = 3,
    CampaignNotFound           = 4,
    InvalidPagination          = 5,
    NotInitialized             = 6,
    // Campaign validation
    MustSendMoreThanZero       = 10,
    // Campaign state guards
    DeadlineHasPassed          = 11,
    DeadlineNotPassed          = 12,
    NotInOpenState             = 13,
    NotInSuccessfulState       = 14,
    NotInFailedState           = 15,
    AlreadyFinalized           = 16,
    NotResearcher              = 17,
    NoFundsToRefund            = 18,
    NotInCorrectStateForUpdate = 19,
    UpdateNotFound             = 20,
    // Transfer / execution
    TransferFailed             = 30,
    ReentrantCall              = 31,
    ArithmeticOverflow         = 32,
}

#[contract]
pub struct MomentumEscrow;

#[contractimpl]
impl MomentumEscrow {
    // ─────────────────────────────────────────────────────────
    // Deployment
    // ─────────────────────────────────────────────────────────

    /// Bind the escrow to the token it holds. Runs once, at deployment.
    pub fn __constructor(env: Env, token: Address) {
        storage::set_token(&env, &token);
    }

    // ─────────────────────────────────────────────────────────
    // Registry
    // ─────────────────────────────────────────────────────────

    /// Open a new campaign owned by `researcher`.
    ///
    /// - `funding_goal` must lie in `[MIN_FUNDING_GOAL, MAX_FUNDING_GOAL]`.
    /// - `deadline_offset` (seconds from now) must lie in
    ///   `[MIN_DEADLINE, MAX_DEADLINE]`.
    /// - `title`, `description` and `category` are stored verbatim.
    pub fn create_campaign(
        env: Env,
        researcher: Address,
        funding_goal: i128,
        deadline_offset: u64,
        title: String,
        description: String,
        category: String,
    ) -> Result<u64, Error> {
        researcher.require_auth();
        registry::create(
            &env,
            researcher,
            funding_goal,
            deadline_offset,
            title,
            description,
            category,
        )
    }

    pub fn get_campaign_details(env: Env, campaign_id: u64) -> Result<CampaignDetails, Error> {
        registry::details(&env, campaign_id)
    }

    pub fn get_campaign_metadata(env: Env, campaign_id: u64) -> Result<CampaignMetadata, Error> {
        registry::metadata(&env, campaign_id)
    }

    /// All campaign ids in creation order.
    pub fn get_all_campaigns(env: Env) -> Vec<u64> {
        registry::all(&env)
    }

    pub fn get_campaigns_by_researcher(env: Env, researcher: Address) -> Vec<u64> {
        registry::by_researcher(&env, &researcher)
    }

    /// Paginated campaign ids. Fails with `InvalidPagination` when
    /// `limit == 0` or `offset` exceeds the campaign count.
    pub fn get_deployed_campaigns(env: Env, offset: u64, limit: u64) -> Result<Vec<u64>, Error> {
        registry::page(&env, offset, limit)
    }

    pub fn get_total_campaigns(env: Env) -> u64 {
        registry::total(&env)
    }

    /// `true` iff `campaign_id` was created by this registry.
    pub fn is_valid_campaign(env: Env, campaign_id: u64) -> bool {
        registry::is_valid(&env, campaign_id)
    }

    pub fn limits(_env: Env) -> RegistryLimits {
        registry::limits()
    }

    /// The funding token held in escrow.
    pub fn token(env: Env) -> Result<Address, Error> {
        storage::get_token(&env)
    }

    // ─────────────────────────────────────────────────────────
    // Campaign
    // ─────────────────────────────────────────────────────────

    /// Contribute `amount` of the funding token to an `Open` campaign.
    pub fn fund(env: Env, campaign_id: u64, backer: Address, amount: i128) -> Result<(), Error> {
        backer.require_auth();
        campaign::fund(&env, campaign_id, backer, amount)
    }

    /// Settle an `Open` campaign whose deadline has passed. Callable by anyone.
    pub fn finalize_campaign(env: Env, campaign_id: u64) -> Result<CampaignStatus, Error> {
        campaign::finalize(&env, campaign_id)
    }

    /// Pay the escrow of a `Successful` campaign out to its researcher.
    pub fn withdraw_funds(env: Env, campaign_id: u64, caller: Address) -> Result<i128, Error> {
        caller.require_auth();
        campaign::withdraw(&env, campaign_id, caller)
    }

    /// Reclaim `backer`'s contribution from a `Failed` campaign.
    pub fn claim_refund(env: Env, campaign_id: u64, backer: Address) -> Result<i128, Error> {
        backer.require_auth();
        campaign::claim_refund(&env, campaign_id, backer)
    }

    /// Publish a research update (an opaque content reference such as an
    /// IPFS CID). Returns the update's index.
    pub fn submit_research_update(
        env: Env,
        campaign_id: u64,
        caller: Address,
        content_ref: String,
    ) -> Result<u32, Error> {
        caller.require_auth();
        campaign::submit_research_update(&env, campaign_id, caller, content_ref)
    }

    pub fn get_contribution(env: Env, campaign_id: u64, backer: Address) -> Result<i128, Error> {
        campaign::contribution(&env, campaign_id, &backer)
    }

    pub fn get_research_updates(env: Env, campaign_id: u64) -> Result<Vec<String>, Error> {
        campaign::research_updates(&env, campaign_id)
    }

    pub fn get_research_update(env: Env, campaign_id: u64, index: u32) -> Result<String, Error> {
        campaign::research_update(&env, campaign_id, index)
    }
}
