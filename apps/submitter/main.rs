#![warn(unused_extern_crates)]
use alloy::primitives::utils::parse_ether;
use anyhow::{Context, Result};
use dotenv::dotenv;
use std::{sync::Arc, time::Duration};
use submitter::{
    SESSION_SWEEP_INTERVAL_SECS, chain, config,
    coordinator::ProposalCoordinator,
    http::{AppState, router},
    ipfs::IpfsFetcher,
    session::InMemorySessionStore,
};
use tracing::info;
use utils::tracing::setup_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    setup_tracing();

    let config = config::load()?;
    info!("Submitter service starting up");

    let (dao, sender) = chain::connect(
        &config.rpc_url,
        &config.private_key,
        &config.contract_address,
    )?;
    let join_stake = parse_ether(&config.join_stake_ether).context("Invalid JOIN_STAKE_ETHER")?;
    let coordinator = Arc::new(ProposalCoordinator::new(
        Arc::new(dao),
        sender,
        config.auto_join,
        join_stake,
    ));
    info!(sender = %sender, contract = %config.contract_address, "Connected to DAO contract");

    let sessions = Arc::new(InMemorySessionStore::new(config.session_ttl));
    let sweeper = Arc::clone(&sessions);
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(Duration::from_secs(SESSION_SWEEP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            sweeper.sweep().await;
        }
    });

    let state = AppState {
        coordinator,
        fetcher: IpfsFetcher::new(&config.ipfs_gateway),
        sessions,
        gateway_base: config.ipfs_gateway.clone(),
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .context("Failed to bind listener")?;
    info!(address = %listener.local_addr()?, "Serving submission API");

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;

    Ok(())
}
