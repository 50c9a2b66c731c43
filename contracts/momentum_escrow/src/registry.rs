//! # Registry
//!
//! Creates campaigns and answers "does this campaign exist" and "who created
//! it". Creation is the only mutating operation; everything else here is a
//! read-only lookup.
//!
//! Campaign ids are handed out sequentially, so the ordered `campaigns`
//! sequence is the range `0..campaign_count` and validity is the presence of
//! the campaign's config entry.

use soroban_sdk::{Address, Env, String, Vec};

use crate::events::{self, CampaignCreated};
use crate::storage;
use crate::types::{
    CampaignConfig, CampaignDetails, CampaignId, CampaignMetadata, CampaignState,
    CampaignStatus, RegistryLimits,
};
use crate::Error;

/// Smallest accepted funding goal, in token base units.
pub const MIN_FUNDING_GOAL: i128 = 100;
/// Largest accepted funding goal (10^8 whole tokens at 7 decimals).
pub const MAX_FUNDING_GOAL: i128 = 1_000_000_000_000_000;
/// Shortest campaign duration: 1 day.
pub const MIN_DEADLINE: u64 = 86_400;
/// Longest campaign duration: 365 days.
pub const MAX_DEADLINE: u64 = 365 * 86_400;

pub fn limits() -> RegistryLimits {
    RegistryLimits {
        min_funding_goal: MIN_FUNDING_GOAL,
        max_funding_goal: MAX_FUNDING_GOAL,
        min_deadline: MIN_DEADLINE,
        max_deadline: MAX_DEADLINE,
    }
}

/// Validate the creation parameters and record a new `Open` campaign owned by
/// `researcher`. Authorization is checked by the caller.
pub fn create(
    env: &Env,
    researcher: Address,
    funding_goal: i128,
    deadline_offset: u64,
    title: String,
    description: String,
    category: String,
) -> Result<CampaignId, Error> {
    if !(MIN_FUNDING_GOAL..=MAX_FUNDING_GOAL).contains(&funding_goal) {
        return Err(Error::InvalidFundingGoal);
    }
    if !(MIN_DEADLINE..=MAX_DEADLINE).contains(&deadline_offset) {
        return Err(Error::InvalidDeadline);
    }

    let now = env.ledger().timestamp();
    let deadline = now
        .checked_add(deadline_offset)
        .ok_or(Error::CreationFailed)?;
    let id = storage::next_campaign_id(env)?;

    let config = CampaignConfig {
        id,
        researcher: researcher.clone(),
        funding_goal,
        deadline,
    };
    let state = CampaignState {
        status: CampaignStatus::Open,
        total_funded: 0,
        escrow_balance: 0,
        backer_count: 0,
    };
    let metadata = CampaignMetadata {
        title: title.clone(),
        description,
        category,
        created_at: now,
        researcher: researcher.clone(),
    };

    storage::save_campaign(env, &config, &state, &metadata);
    storage::add_creator_campaign(env, &researcher, id);

    events::emit_campaign_created(
        env,
        CampaignCreated {
            campaign_id: id,
            researcher,
            funding_goal,
            deadline,
            title,
        },
    );

    Ok(id)
}

pub fn details(env: &Env, id: CampaignId) -> Result<CampaignDetails, Error> {
    let config = storage::load_config(env, id)?;
    let state = storage::load_state(env, id)?;
    Ok(CampaignDetails::from_parts(config, state))
}

pub fn metadata(env: &Env, id: CampaignId) -> Result<CampaignMetadata, Error> {
    storage::load_metadata(env, id)
}

pub fn is_valid(env: &Env, id: CampaignId) -> bool {
    storage::has_campaign(env, id)
}

pub fn total(env: &Env) -> u64 {
    storage::campaign_count(env)
}

/// Every campaign id in creation order.
pub fn all(env: &Env) -> Vec<CampaignId> {
    ids_in_range(env, 0, storage::campaign_count(env))
}

pub fn by_researcher(env: &Env, researcher: &Address) -> Vec<CampaignId> {
    storage::campaigns_by_creator(env, researcher)
}

/// A window of at most `limit` ids starting at `offset`.
///
/// `offset == count` yields an empty page; `offset > count` or `limit == 0`
/// is rejected.
pub fn page(env: &Env, offset: u64, limit: u64) -> Result<Vec<CampaignId>, Error> {
    let count = storage::campaign_count(env);
    if limit == 0 || offset > count {
        return Err(Error::InvalidPagination);
    }
    let end = offset.saturating_add(limit).min(count);
    Ok(ids_in_range(env, offset, end))
}

fn ids_in_range(env: &Env, start: u64, end: u64) -> Vec<CampaignId> {
    let mut ids = Vec::new(env);
    for id in start..end {
        ids.push_back(id);
    }
    ids
}
