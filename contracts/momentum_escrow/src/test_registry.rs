extern crate std;

use soroban_sdk::{
    testutils::{Address as _, Ledger},
    vec, Address, Env, String,
};

use crate::invariants::assert_registry_bijection;
use crate::{
    CampaignStatus, Error, MomentumEscrow, MomentumEscrowClient, MAX_DEADLINE, MAX_FUNDING_GOAL,
    MIN_DEADLINE, MIN_FUNDING_GOAL,
};

const START: u64 = 1_700_000_000;

fn setup() -> (Env, MomentumEscrowClient<'static>) {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(START);
    let token_admin = Address::generate(&env);
    let asset = env.register_stellar_asset_contract_v2(token_admin);
    let contract_id = env.register(MomentumEscrow, (asset.address(),));
    let client = MomentumEscrowClient::new(&env, &contract_id);
    (env, client)
}

fn text(env: &Env, s: &str) -> String {
    String::from_str(env, s)
}

fn create(
    env: &Env,
    client: &MomentumEscrowClient,
    researcher: &Address,
    goal: i128,
    offset: u64,
) -> Result<u64, Error> {
    match client.try_create_campaign(
        researcher,
        &goal,
        &offset,
        &text(env, "Soil microbiome survey"),
        &text(env, "Sequencing samples from twelve field sites."),
        &text(env, "ecology"),
    ) {
        Ok(Ok(id)) => Ok(id),
        Err(Ok(err)) => Err(err),
        other => panic!("unexpected invocation result: {:?}", other),
    }
}

#[test]
fn test_create_campaign_records_everything() {
    let (env, client) = setup();
    let researcher = Address::generate(&env);

    let id = create(&env, &client, &researcher, 5_000, 30 * 86_400).unwrap();
    assert_eq!(id, 0);

    let details = client.get_campaign_details(&id);
    assert_eq!(details.id, 0);
    assert_eq!(details.researcher, researcher);
    assert_eq!(details.funding_goal, 5_000);
    assert_eq!(details.deadline, START + 30 * 86_400);
    assert_eq!(details.state, CampaignStatus::Open);
    assert_eq!(details.total_funded, 0);
    assert_eq!(details.escrow_balance, 0);
    assert_eq!(details.backer_count, 0);

    let metadata = client.get_campaign_metadata(&id);
    assert_eq!(metadata.title, text(&env, "Soil microbiome survey"));
    assert_eq!(
        metadata.description,
        text(&env, "Sequencing samples from twelve field sites.")
    );
    assert_eq!(metadata.category, text(&env, "ecology"));
    assert_eq!(metadata.created_at, START);
    assert_eq!(metadata.researcher, researcher);

    assert!(client.is_valid_campaign(&id));
    assert_eq!(client.get_total_campaigns(), 1);
}

#[test]
fn test_funding_goal_bounds_are_inclusive() {
    let (env, client) = setup();
    let researcher = Address::generate(&env);

    assert!(create(&env, &client, &researcher, MIN_FUNDING_GOAL, MIN_DEADLINE).is_ok());
    assert!(create(&env, &client, &researcher, MAX_FUNDING_GOAL, MIN_DEADLINE).is_ok());
    assert_eq!(
        create(&env, &client, &researcher, MIN_FUNDING_GOAL - 1, MIN_DEADLINE),
        Err(Error::InvalidFundingGoal)
    );
    assert_eq!(
        create(&env, &client, &researcher, MAX_FUNDING_GOAL + 1, MIN_DEADLINE),
        Err(Error::InvalidFundingGoal)
    );
    assert_eq!(
        create(&env, &client, &researcher, 0, MIN_DEADLINE),
        Err(Error::InvalidFundingGoal)
    );
    assert_eq!(client.get_total_campaigns(), 2);
}

#[test]
fn test_deadline_bounds_are_inclusive() {
    let (env, client) = setup();
    let researcher = Address::generate(&env);

    assert!(create(&env, &client, &researcher, 1_000, MIN_DEADLINE).is_ok());
    assert!(create(&env, &client, &researcher, 1_000, MAX_DEADLINE).is_ok());
    assert_eq!(
        create(&env, &client, &researcher, 1_000, MIN_DEADLINE - 1),
        Err(Error::InvalidDeadline)
    );
    assert_eq!(
        create(&env, &client, &researcher, 1_000, MAX_DEADLINE + 1),
        Err(Error::InvalidDeadline)
    );
    assert_eq!(client.get_total_campaigns(), 2);
}

#[test]
fn test_rejected_creation_leaves_registry_untouched() {
    let (env, client) = setup();
    let researcher = Address::generate(&env);

    let _ = create(&env, &client, &researcher, 1, MIN_DEADLINE);
    assert_eq!(client.get_total_campaigns(), 0);
    assert_eq!(client.get_campaigns_by_researcher(&researcher).len(), 0);
    assert!(!client.is_valid_campaign(&0));
}

#[test]
fn test_limits_query_matches_constants() {
    let (_env, client) = setup();
    let limits = client.limits();
    assert_eq!(limits.min_funding_goal, MIN_FUNDING_GOAL);
    assert_eq!(limits.max_funding_goal, MAX_FUNDING_GOAL);
    assert_eq!(limits.min_deadline, MIN_DEADLINE);
    assert_eq!(limits.max_deadline, MAX_DEADLINE);
}

#[test]
fn test_campaigns_indexed_by_creator_in_order() {
    let (env, client) = setup();
    let alice = Address::generate(&env);
    let bob = Address::generate(&env);

    create(&env, &client, &alice, 1_000, MIN_DEADLINE).unwrap();
    create(&env, &client, &bob, 1_000, MIN_DEADLINE).unwrap();
    create(&env, &client, &alice, 1_000, MIN_DEADLINE).unwrap();

    assert_eq!(client.get_campaigns_by_researcher(&alice), vec![&env, 0u64, 2u64]);
    assert_eq!(client.get_campaigns_by_researcher(&bob), vec![&env, 1u64]);
    assert_eq!(
        client.get_campaigns_by_researcher(&Address::generate(&env)).len(),
        0
    );
    assert_eq!(client.get_all_campaigns(), vec![&env, 0u64, 1u64, 2u64]);
    assert_registry_bijection(&client);
}

#[test]
fn test_pagination() {
    let (env, client) = setup();
    let researcher = Address::generate(&env);
    for _ in 0..5 {
        create(&env, &client, &researcher, 1_000, MIN_DEADLINE).unwrap();
    }

    assert_eq!(client.get_deployed_campaigns(&0, &2), vec![&env, 0u64, 1u64]);
    assert_eq!(client.get_deployed_campaigns(&3, &10), vec![&env, 3u64, 4u64]);
    assert_eq!(client.get_deployed_campaigns(&5, &1).len(), 0);
    assert_eq!(
        client.get_deployed_campaigns(&0, &u64::MAX),
        client.get_all_campaigns()
    );

    assert_eq!(
        client.try_get_deployed_campaigns(&6, &1),
        Err(Ok(Error::InvalidPagination))
    );
    assert_eq!(
        client.try_get_deployed_campaigns(&0, &0),
        Err(Ok(Error::InvalidPagination))
    );
}

#[test]
fn test_unknown_campaign_lookups() {
    let (env, client) = setup();
    let backer = Address::generate(&env);

    assert!(!client.is_valid_campaign(&0));
    assert!(!client.is_valid_campaign(&u64::MAX));
    assert_eq!(
        client.try_get_campaign_details(&0),
        Err(Ok(Error::CampaignNotFound))
    );
    assert_eq!(
        client.try_get_campaign_metadata(&3),
        Err(Ok(Error::CampaignNotFound))
    );
    assert_eq!(
        client.try_get_contribution(&0, &backer),
        Err(Ok(Error::CampaignNotFound))
    );
    assert_eq!(
        client.try_get_research_updates(&0),
        Err(Ok(Error::CampaignNotFound))
    );
    assert_eq!(client.get_all_campaigns().len(), 0);
}

#[test]
fn test_metadata_unchanged_by_lifecycle() {
    let (env, client) = setup();
    let researcher = Address::generate(&env);
    let id = create(&env, &client, &researcher, 1_000, MIN_DEADLINE).unwrap();
    let metadata = client.get_campaign_metadata(&id);

    env.ledger().set_timestamp(START + MIN_DEADLINE);
    client.finalize_campaign(&id);

    assert_eq!(client.get_campaign_metadata(&id), metadata);
}

#[test]
fn test_token_is_fixed_at_deployment() {
    let env = Env::default();
    let token_admin = Address::generate(&env);
    let asset = env.register_stellar_asset_contract_v2(token_admin);
    let contract_id = env.register(MomentumEscrow, (asset.address(),));
    let client = MomentumEscrowClient::new(&env, &contract_id);

    assert_eq!(client.token(), asset.address());
}
