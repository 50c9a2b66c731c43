//! # Campaign
//!
//! The escrow state machine and its funding ledger.
//!
//! | From       | Call                     | To                   |
//! |------------|--------------------------|----------------------|
//! | Open       | `fund`                   | Open                 |
//! | Open       | `finalize`               | Successful / Failed  |
//! | Successful | `withdraw`               | PaidOut              |
//! | Failed     | `claim_refund`           | Failed               |
//! | Open, Successful | `submit_research_update` | unchanged      |
//!
//! Every mutating call runs under [`guard::non_reentrant`] and writes the
//! post-transfer ledger and state *before* moving tokens. If the token
//! transfer fails the previous ledger slot and state are written back and
//! the call reports [`Error::TransferFailed`].

use soroban_sdk::{token, Address, Env, String, Vec};

use crate::events::{
    self, CampaignFinalized, CampaignFunded, FundsWithdrawn, RefundClaimed,
    ResearchUpdateSubmitted,
};
use crate::guard;
use crate::storage;
use crate::types::{CampaignId, CampaignStatus};
use crate::Error;

/// Record a contribution of `amount` from `backer` and pull the tokens into
/// escrow.
pub fn fund(env: &Env, id: CampaignId, backer: Address, amount: i128) -> Result<(), Error> {
    guard::non_reentrant(env, id, || {
        let config = storage::load_config(env, id)?;
        if amount <= 0 {
            return Err(Error::MustSendMoreThanZero);
        }
        let before = storage::load_state(env, id)?;
        if before.status != CampaignStatus::Open {
            return Err(Error::NotInOpenState);
        }
        if env.ledger().timestamp() >= config.deadline {
            return Err(Error::DeadlineHasPassed);
        }

        let previous = storage::get_contribution(env, id, &backer);
        let contribution = previous
            .checked_add(amount)
            .ok_or(Error::ArithmeticOverflow)?;

        let mut state = before.clone();
        state.total_funded = state
            .total_funded
            .checked_add(amount)
            .ok_or(Error::ArithmeticOverflow)?;
        state.escrow_balance = state
            .escrow_balance
            .checked_add(amount)
            .ok_or(Error::ArithmeticOverflow)?;
        if previous == 0 {
            state.backer_count = state
                .backer_count
                .checked_add(1)
                .ok_or(Error::ArithmeticOverflow)?;
        }

        storage::set_contribution(env, id, &backer, contribution);
        storage::save_state(env, id, &state);

        if let Err(err) = transfer(env, &backer, &env.current_contract_address(), amount) {
            storage::set_contribution(env, id, &backer, previous);
            storage::save_state(env, id, &before);
            return Err(err);
        }

        events::emit_campaign_funded(
            env,
            CampaignFunded {
                campaign_id: id,
                backer,
                amount,
                total_funded: state.total_funded,
            },
        );
        Ok(())
    })
}

/// Close funding once the deadline has passed. Anyone may call this.
///
/// The outcome depends only on `total_funded` against the goal at the time
/// of the call.
pub fn finalize(env: &Env, id: CampaignId) -> Result<CampaignStatus, Error> {
    guard::non_reentrant(env, id, || {
        let config = storage::load_config(env, id)?;
        let mut state = storage::load_state(env, id)?;
        if state.status != CampaignStatus::Open {
            return Err(Error::AlreadyFinalized);
        }
        if env.ledger().timestamp() < config.deadline {
            return Err(Error::DeadlineNotPassed);
        }

        state.status = if state.total_funded >= config.funding_goal {
            CampaignStatus::Successful
        } else {
            CampaignStatus::Failed
        };
        storage::save_state(env, id, &state);

        events::emit_campaign_finalized(
            env,
            CampaignFinalized {
                campaign_id: id,
                state: state.status,
                total_funded: state.total_funded,
            },
        );
        Ok(state.status)
    })
}

/// Release the whole escrow of a `Successful` campaign to its researcher.
/// Returns the amount transferred.
pub fn withdraw(env: &Env, id: CampaignId, caller: Address) -> Result<i128, Error> {
    guard::non_reentrant(env, id, || {
        let config = storage::load_config(env, id)?;
        if caller != config.researcher {
            return Err(Error::NotResearcher);
        }
        let before = storage::load_state(env, id)?;
        if before.status != CampaignStatus::Successful {
            return Err(Error::NotInSuccessfulState);
        }

        let amount = before.escrow_balance;
        let mut state = before.clone();
        state.status = CampaignStatus::PaidOut;
        state.escrow_balance = 0;
        storage::save_state(env, id, &state);

        if let Err(err) = transfer(env, &env.current_contract_address(), &config.researcher, amount)
        {
            storage::save_state(env, id, &before);
            return Err(err);
        }

        events::emit_funds_withdrawn(
            env,
            FundsWithdrawn {
                campaign_id: id,
                researcher: config.researcher,
                amount,
            },
        );
        Ok(amount)
    })
}

/// Return `backer`'s whole contribution from a `Failed` campaign.
/// Returns the amount transferred.
pub fn claim_refund(env: &Env, id: CampaignId, backer: Address) -> Result<i128, Error> {
    guard::non_reentrant(env, id, || {
        storage::load_config(env, id)?;
        let before = storage::load_state(env, id)?;
        if before.status != CampaignStatus::Failed {
            return Err(Error::NotInFailedState);
        }
        let amount = storage::get_contribution(env, id, &backer);
        if amount <= 0 {
            return Err(Error::NoFundsToRefund);
        }

        let mut state = before.clone();
        state.total_funded = state
            .total_funded
            .checked_sub(amount)
            .ok_or(Error::ArithmeticOverflow)?;
        state.escrow_balance = state
            .escrow_balance
            .checked_sub(amount)
            .ok_or(Error::ArithmeticOverflow)?;

        storage::set_contribution(env, id, &backer, 0);
        storage::save_state(env, id, &state);

        if let Err(err) = transfer(env, &env.current_contract_address(), &backer, amount) {
            storage::set_contribution(env, id, &backer, amount);
            storage::save_state(env, id, &before);
            return Err(err);
        }

        events::emit_refund_claimed(
            env,
            RefundClaimed {
                campaign_id: id,
                backer,
                amount,
            },
        );
        Ok(amount)
    })
}

/// Append a content reference to the campaign's research log.
/// Only allowed while the campaign is alive (`Open` or `Successful`).
pub fn submit_research_update(
    env: &Env,
    id: CampaignId,
    caller: Address,
    content_ref: String,
) -> Result<u32, Error> {
    guard::non_reentrant(env, id, || {
        let config = storage::load_config(env, id)?;
        if caller != config.researcher {
            return Err(Error::NotResearcher);
        }
        let state = storage::load_state(env, id)?;
        match state.status {
            CampaignStatus::Open | CampaignStatus::Successful => {}
            CampaignStatus::Failed | CampaignStatus::PaidOut => {
                return Err(Error::NotInCorrectStateForUpdate)
            }
        }

        let index = storage::push_update(env, id, content_ref.clone());

        events::emit_research_update(
            env,
            ResearchUpdateSubmitted {
                campaign_id: id,
                researcher: caller,
                content_ref,
                index,
            },
        );
        Ok(index)
    })
}

pub fn contribution(env: &Env, id: CampaignId, backer: &Address) -> Result<i128, Error> {
    storage::load_config(env, id)?;
    Ok(storage::get_contribution(env, id, backer))
}

pub fn research_updates(env: &Env, id: CampaignId) -> Result<Vec<String>, Error> {
    storage::load_config(env, id)?;
    Ok(storage::load_updates(env, id))
}

pub fn research_update(env: &Env, id: CampaignId, index: u32) -> Result<String, Error> {
    research_updates(env, id)?
        .get(index)
        .ok_or(Error::UpdateNotFound)
}

fn transfer(env: &Env, from: &Address, to: &Address, amount: i128) -> Result<(), Error> {
    let token = token::Client::new(env, &storage::get_token(env)?);
    match token.try_transfer(from, to, &amount) {
        Ok(Ok(())) => Ok(()),
        _ => Err(Error::TransferFailed),
    }
}
