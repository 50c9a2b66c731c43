#![allow(dead_code)]

extern crate std;

use soroban_sdk::Address;

use crate::types::{CampaignDetails, CampaignMetadata, CampaignStatus};
use crate::MomentumEscrowClient;

/// INV-1: Campaign goal must always be positive.
pub fn assert_goal_positive(campaign: &CampaignDetails) {
    assert!(
        campaign.funding_goal > 0,
        "INV-1 violated: campaign {} has non-positive goal ({})",
        campaign.id,
        campaign.funding_goal
    );
}

/// INV-2: Totals are never negative and escrow never exceeds the total
/// contributed.
pub fn assert_totals_sane(campaign: &CampaignDetails) {
    assert!(
        campaign.total_funded >= 0 && campaign.escrow_balance >= 0,
        "INV-2 violated: campaign {} has negative totals ({}, {})",
        campaign.id,
        campaign.total_funded,
        campaign.escrow_balance
    );
    assert!(
        campaign.escrow_balance <= campaign.total_funded,
        "INV-2 violated: campaign {} escrow {} exceeds total {}",
        campaign.id,
        campaign.escrow_balance,
        campaign.total_funded
    );
}

/// INV-3: `total_funded` equals the sum of every backer's ledger slot.
pub fn assert_ledger_balanced(
    client: &MomentumEscrowClient,
    campaign_id: u64,
    backers: &[Address],
) {
    let campaign = client.get_campaign_details(&campaign_id);
    let sum: i128 = backers
        .iter()
        .map(|b| client.get_contribution(&campaign_id, b))
        .sum();
    assert_eq!(
        campaign.total_funded, sum,
        "INV-3 violated: campaign {} total {} != ledger sum {}",
        campaign_id, campaign.total_funded, sum
    );
}

/// INV-4: A paid-out campaign holds nothing in escrow.
pub fn assert_paid_out_drained(campaign: &CampaignDetails) {
    if campaign.state == CampaignStatus::PaidOut {
        assert_eq!(
            campaign.escrow_balance, 0,
            "INV-4 violated: campaign {} paid out with {} left in escrow",
            campaign.id, campaign.escrow_balance
        );
    }
}

/// INV-5: Status transition validity. Only forward transitions are allowed:
///   Open       -> Successful | Failed
///   Successful -> PaidOut
///   Failed     -> (none)
///   PaidOut    -> (none)
pub fn assert_valid_status_transition(from: &CampaignStatus, to: &CampaignStatus) {
    let valid = from == to
        || matches!(
            (from, to),
            (CampaignStatus::Open, CampaignStatus::Successful)
                | (CampaignStatus::Open, CampaignStatus::Failed)
                | (CampaignStatus::Successful, CampaignStatus::PaidOut)
        );

    assert!(
        valid,
        "INV-5 violated: invalid status transition from {:?} to {:?}",
        from, to
    );
}

/// INV-6: Fields fixed at creation never change.
pub fn assert_immutable_fields(original: &CampaignDetails, current: &CampaignDetails) {
    assert_eq!(original.id, current.id, "INV-6 violated: campaign id changed");
    assert_eq!(
        original.researcher, current.researcher,
        "INV-6 violated: campaign researcher changed"
    );
    assert_eq!(
        original.funding_goal, current.funding_goal,
        "INV-6 violated: campaign funding_goal changed"
    );
    assert_eq!(
        original.deadline, current.deadline,
        "INV-6 violated: campaign deadline changed"
    );
}

/// INV-7: Registry ids are sequential from 0 and every id has metadata.
pub fn assert_registry_bijection(client: &MomentumEscrowClient) {
    let ids = client.get_all_campaigns();
    assert_eq!(ids.len() as u64, client.get_total_campaigns());
    for (i, id) in ids.iter().enumerate() {
        assert_eq!(id, i as u64, "INV-7 violated: expected id {}, got {}", i, id);
        assert!(
            client.is_valid_campaign(&id),
            "INV-7 violated: listed campaign {} is not valid",
            id
        );
        let metadata: CampaignMetadata = client.get_campaign_metadata(&id);
        assert_eq!(
            metadata.researcher,
            client.get_campaign_details(&id).researcher,
            "INV-7 violated: metadata researcher mismatch for {}",
            id
        );
    }
}

/// Run all stateless campaign invariants.
pub fn assert_all_campaign_invariants(campaign: &CampaignDetails) {
    assert_goal_positive(campaign);
    assert_totals_sane(campaign);
    assert_paid_out_drained(campaign);
}
