extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events, Ledger},
    token, vec, Address, Env, IntoVal, String, Symbol, TryIntoVal, Val, Vec,
};

use crate::events::{
    CampaignCreated, CampaignFinalized, CampaignFunded, FundsWithdrawn, RefundClaimed,
    ResearchUpdateSubmitted,
};
use crate::{CampaignStatus, MomentumEscrow, MomentumEscrowClient};

const START: u64 = 1_700_000_000;
const DURATION: u64 = 7 * 86_400;

fn setup() -> (Env, MomentumEscrowClient<'static>, token::StellarAssetClient<'static>) {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(START);
    let token_admin = Address::generate(&env);
    let asset = env.register_stellar_asset_contract_v2(token_admin);
    let sac = token::StellarAssetClient::new(&env, &asset.address());
    let contract_id = env.register(MomentumEscrow, (asset.address(),));
    let client = MomentumEscrowClient::new(&env, &contract_id);
    (env, client, sac)
}

fn create_campaign(env: &Env, client: &MomentumEscrowClient, researcher: &Address, goal: i128) -> u64 {
    client.create_campaign(
        researcher,
        &goal,
        &DURATION,
        &String::from_str(env, "Tidal energy prototype"),
        &String::from_str(env, "A 1:10 scale turbine test in open water."),
        &String::from_str(env, "engineering"),
    )
}

/// Returns `(topics, data)` of the most recent event, asserting it came from
/// the escrow contract.
fn last_event(env: &Env, client: &MomentumEscrowClient) -> (Vec<Val>, Val) {
    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");
    assert_eq!(last_event.0, client.address);
    (last_event.1, last_event.2)
}

fn topics(env: &Env, name: Symbol, campaign_id: u64) -> Vec<Val> {
    vec![env, name.into_val(env), campaign_id.into_val(env)]
}

#[test]
fn test_campaign_created_event() {
    let (env, client, _sac) = setup();
    let researcher = Address::generate(&env);

    let id = create_campaign(&env, &client, &researcher, 2_500);

    let (event_topics, data) = last_event(&env, &client);
    assert_eq!(event_topics, topics(&env, symbol_short!("created"), id));

    let event_data: CampaignCreated = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        CampaignCreated {
            campaign_id: id,
            researcher,
            funding_goal: 2_500,
            deadline: START + DURATION,
            title: String::from_str(&env, "Tidal energy prototype"),
        }
    );
}

#[test]
fn test_campaign_funded_event() {
    let (env, client, sac) = setup();
    let researcher = Address::generate(&env);
    let backer = Address::generate(&env);
    let id = create_campaign(&env, &client, &researcher, 2_500);
    sac.mint(&backer, &1_000);

    client.fund(&id, &backer, &400);
    client.fund(&id, &backer, &100);

    let (event_topics, data) = last_event(&env, &client);
    assert_eq!(event_topics, topics(&env, symbol_short!("funded"), id));

    let event_data: CampaignFunded = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        CampaignFunded {
            campaign_id: id,
            backer,
            amount: 100,
            total_funded: 500,
        }
    );
}

#[test]
fn test_campaign_finalized_and_withdrawn_events() {
    let (env, client, sac) = setup();
    let researcher = Address::generate(&env);
    let backer = Address::generate(&env);
    let id = create_campaign(&env, &client, &researcher, 500);
    sac.mint(&backer, &800);
    client.fund(&id, &backer, &800);

    env.ledger().set_timestamp(START + DURATION);
    client.finalize_campaign(&id);

    let (event_topics, data) = last_event(&env, &client);
    assert_eq!(event_topics, topics(&env, symbol_short!("finalized"), id));
    let event_data: CampaignFinalized = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        CampaignFinalized {
            campaign_id: id,
            state: CampaignStatus::Successful,
            total_funded: 800,
        }
    );

    client.withdraw_funds(&id, &researcher);

    let (event_topics, data) = last_event(&env, &client);
    assert_eq!(event_topics, topics(&env, symbol_short!("withdrawn"), id));
    let event_data: FundsWithdrawn = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        FundsWithdrawn {
            campaign_id: id,
            researcher,
            amount: 800,
        }
    );
}

#[test]
fn test_refund_claimed_event() {
    let (env, client, sac) = setup();
    let researcher = Address::generate(&env);
    let backer = Address::generate(&env);
    let id = create_campaign(&env, &client, &researcher, 5_000);
    sac.mint(&backer, &300);
    client.fund(&id, &backer, &300);

    env.ledger().set_timestamp(START + DURATION);
    client.finalize_campaign(&id);
    client.claim_refund(&id, &backer);

    let (event_topics, data) = last_event(&env, &client);
    assert_eq!(event_topics, topics(&env, symbol_short!("refunded"), id));
    let event_data: RefundClaimed = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        RefundClaimed {
            campaign_id: id,
            backer,
            amount: 300,
        }
    );
}

#[test]
fn test_research_update_event() {
    let (env, client, _sac) = setup();
    let researcher = Address::generate(&env);
    let id = create_campaign(&env, &client, &researcher, 5_000);
    let cid = String::from_str(&env, "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi");

    client.submit_research_update(&id, &researcher, &cid);

    let (event_topics, data) = last_event(&env, &client);
    assert_eq!(event_topics, topics(&env, symbol_short!("update"), id));
    let event_data: ResearchUpdateSubmitted = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        ResearchUpdateSubmitted {
            campaign_id: id,
            researcher,
            content_ref: cid,
            index: 0,
        }
    );
}
