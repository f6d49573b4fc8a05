use alloy::primitives::utils::parse_ether;
use dotenv::dotenv;
use std::sync::Arc;
use submitter::{
    analysis, chain,
    config::Config,
    coordinator::ProposalCoordinator,
    ipfs::IpfsFetcher,
    proposal,
};

fn coordinator_from_env() -> (ProposalCoordinator, Config) {
    let config = Config::from_env().expect("submitter env not configured");
    let (dao, sender) = chain::connect(
        &config.rpc_url,
        &config.private_key,
        &config.contract_address,
    )
    .expect("failed to connect");
    let join_stake = parse_ether(&config.join_stake_ether).expect("bad stake");
    (
        ProposalCoordinator::new(Arc::new(dao), sender, config.auto_join, join_stake),
        config,
    )
}

#[ignore = "needs live chain"]
#[tokio::test]
async fn membership_status_resolves() {
    let _ = dotenv().ok();

    let (coordinator, _) = coordinator_from_env();
    let status = coordinator.membership_status().await.unwrap();

    assert_eq!(status.address, coordinator.sender());
    assert!(status.minimum_stake > alloy::primitives::U256::ZERO);
}

#[ignore = "needs live chain"]
#[tokio::test]
async fn full_submission_flow() {
    let _ = dotenv().ok();

    let image_cid = std::env::var("TEST_IMAGE_CID").expect("TEST_IMAGE_CID not set");
    let analysis_cid = std::env::var("TEST_ANALYSIS_CID").expect("TEST_ANALYSIS_CID not set");

    let (coordinator, config) = coordinator_from_env();
    let fetcher = IpfsFetcher::new(&config.ipfs_gateway);

    let raw = fetcher.fetch_analysis(&analysis_cid).await.unwrap();
    let doc = analysis::validate(&raw).unwrap();
    let description =
        proposal::format_description(&doc, &image_cid, &analysis_cid, &config.ipfs_gateway);

    let submitted = coordinator.submit(&description).await.unwrap();
    assert_ne!(submitted.proposal_id, alloy::primitives::B256::ZERO);
    assert!(submitted.block_number > 0);
}
