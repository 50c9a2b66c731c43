//! # Storage
//!
//! Typed helpers over the three Soroban storage tiers used by the escrow.
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key              | Type      | Description                          |
//! |------------------|-----------|--------------------------------------|
//! | `Token`          | `Address` | Funding asset held in escrow         |
//! | `CampaignCount`  | `u64`     | Next campaign id / total campaigns   |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                  | Type               | Description                   |
//! |----------------------|--------------------|-------------------------------|
//! | `Config(id)`         | `CampaignConfig`   | Immutable campaign terms      |
//! | `State(id)`          | `CampaignState`    | Status and escrow totals      |
//! | `Metadata(id)`       | `CampaignMetadata` | Title, description, category  |
//! | `Backer(id, addr)`   | `i128`             | One ledger slot per backer    |
//! | `Updates(id)`        | `Vec<String>`      | Research update references    |
//! | `ByCreator(addr)`    | `Vec<u64>`         | Campaigns created by `addr`   |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.
//!
//! ## Temporary storage
//!
//! `Guard(id)` marks a campaign as mid-operation; see [`crate::guard`].

use soroban_sdk::{contracttype, Address, Env, String, Vec};

use crate::types::{CampaignConfig, CampaignId, CampaignMetadata, CampaignState};
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

/// Instance storage: bump by 7 days when below 1 day remaining.
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

/// Persistent storage: bump by 30 days when below 7 days remaining.
const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Funding token (Instance).
    Token,
    /// Campaign id counter (Instance).
    CampaignCount,
    /// Immutable campaign configuration (Persistent).
    Config(u64),
    /// Mutable campaign state (Persistent).
    State(u64),
    /// Registry metadata (Persistent).
    Metadata(u64),
    /// A backer's accumulated contribution (Persistent).
    Backer(u64, Address),
    /// Research update content references (Persistent).
    Updates(u64),
    /// Per-creator campaign index (Persistent).
    ByCreator(Address),
    /// Reentrancy flag (Temporary).
    Guard(u64),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn set_token(env: &Env, token: &Address) {
    env.storage().instance().set(&DataKey::Token, token);
    bump_instance(env);
}

pub fn get_token(env: &Env) -> Result<Address, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Token)
        .ok_or(Error::NotInitialized)
}

/// Number of campaigns created so far. Ids `0..count` are all valid.
pub fn campaign_count(env: &Env) -> u64 {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::CampaignCount)
        .unwrap_or(0)
}

/// Reads, increments, and stores the campaign counter.
/// Returns the id to use for the *current* campaign (pre-increment value).
pub fn next_campaign_id(env: &Env) -> Result<CampaignId, Error> {
    let current = campaign_count(env);
    let next = current.checked_add(1).ok_or(Error::CreationFailed)?;
    env.storage()
        .instance()
        .set(&DataKey::CampaignCount, &next);
    Ok(current)
}

// ── Persistent Storage Helpers ───────────────────────────────────────

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

fn read_persistent<V>(env: &Env, key: &DataKey) -> Option<V>
where
    V: soroban_sdk::TryFromVal<Env, soroban_sdk::Val>,
{
    let value = env.storage().persistent().get(key);
    if value.is_some() {
        bump_persistent(env, key);
    }
    value
}

/// Write config, initial state and metadata for a freshly created campaign.
pub fn save_campaign(
    env: &Env,
    config: &CampaignConfig,
    state: &CampaignState,
    metadata: &CampaignMetadata,
) {
    let config_key = DataKey::Config(config.id);
    let metadata_key = DataKey::Metadata(config.id);

    env.storage().persistent().set(&config_key, config);
    env.storage().persistent().set(&metadata_key, metadata);
    bump_persistent(env, &config_key);
    bump_persistent(env, &metadata_key);
    save_state(env, config.id, state);
}

pub fn has_campaign(env: &Env, id: CampaignId) -> bool {
    env.storage().persistent().has(&DataKey::Config(id))
}

pub fn load_config(env: &Env, id: CampaignId) -> Result<CampaignConfig, Error> {
    read_persistent(env, &DataKey::Config(id)).ok_or(Error::CampaignNotFound)
}

pub fn load_state(env: &Env, id: CampaignId) -> Result<CampaignState, Error> {
    read_persistent(env, &DataKey::State(id)).ok_or(Error::CampaignNotFound)
}

pub fn save_state(env: &Env, id: CampaignId, state: &CampaignState) {
    let key = DataKey::State(id);
    env.storage().persistent().set(&key, state);
    bump_persistent(env, &key);
}

pub fn load_metadata(env: &Env, id: CampaignId) -> Result<CampaignMetadata, Error> {
    read_persistent(env, &DataKey::Metadata(id)).ok_or(Error::CampaignNotFound)
}

/// A backer's current contribution, `0` when they hold no slot.
pub fn get_contribution(env: &Env, id: CampaignId, backer: &Address) -> i128 {
    read_persistent(env, &DataKey::Backer(id, backer.clone())).unwrap_or(0)
}

/// Store a backer's contribution. A zero amount frees the slot.
pub fn set_contribution(env: &Env, id: CampaignId, backer: &Address, amount: i128) {
    let key = DataKey::Backer(id, backer.clone());
    if amount == 0 {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &amount);
        bump_persistent(env, &key);
    }
}

pub fn load_updates(env: &Env, id: CampaignId) -> Vec<String> {
    read_persistent(env, &DataKey::Updates(id)).unwrap_or_else(|| Vec::new(env))
}

/// Append a research update and return its index.
pub fn push_update(env: &Env, id: CampaignId, content_ref: String) -> u32 {
    let key = DataKey::Updates(id);
    let mut updates = load_updates(env, id);
    updates.push_back(content_ref);
    env.storage().persistent().set(&key, &updates);
    bump_persistent(env, &key);
    updates.len() - 1
}

pub fn campaigns_by_creator(env: &Env, creator: &Address) -> Vec<CampaignId> {
    read_persistent(env, &DataKey::ByCreator(creator.clone())).unwrap_or_else(|| Vec::new(env))
}

pub fn add_creator_campaign(env: &Env, creator: &Address, id: CampaignId) {
    let key = DataKey::ByCreator(creator.clone());
    let mut ids = campaigns_by_creator(env, creator);
    ids.push_back(id);
    env.storage().persistent().set(&key, &ids);
    bump_persistent(env, &key);
}
