//! Per-campaign reentrancy guard.
//!
//! Every mutating campaign entry point runs inside [`non_reentrant`]. The
//! flag lives in temporary storage under `DataKey::Guard(id)` and is only
//! present while an operation on that campaign is in flight, so a token
//! callback that tries to re-enter a mutating call is rejected with
//! [`Error::ReentrantCall`] before it can touch the ledger.

use soroban_sdk::Env;

use crate::storage::DataKey;
use crate::types::CampaignId;
use crate::Error;

pub fn is_locked(env: &Env, id: CampaignId) -> bool {
    env.storage().temporary().has(&DataKey::Guard(id))
}

fn enter(env: &Env, id: CampaignId) -> Result<(), Error> {
    if is_locked(env, id) {
        return Err(Error::ReentrantCall);
    }
    env.storage().temporary().set(&DataKey::Guard(id), &true);
    Ok(())
}

fn exit(env: &Env, id: CampaignId) {
    env.storage().temporary().remove(&DataKey::Guard(id));
}

/// Run `op` with campaign `id` locked. The lock is released whether `op`
/// succeeds or fails.
pub fn non_reentrant<T, F>(env: &Env, id: CampaignId, op: F) -> Result<T, Error>
where
    F: FnOnce() -> Result<T, Error>,
{
    enter(env, id)?;
    let result = op();
    exit(env, id);
    result
}
