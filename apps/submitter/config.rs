use crate::DEFAULT_IPFS_GATEWAY;
use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use std::{env, time::Duration};
use utils::errors::{
    CREATE_PROPOSAL_PRIVATE_KEY_NOT_SET, DAO_CHAIN_RPC_URL_NOT_SET, DAO_CONTRACT_ADDRESS_NOT_SET,
};

pub static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub contract_address: String,
    pub private_key: String,
    pub ipfs_gateway: String,
    pub auto_join: bool,
    pub join_stake_ether: String,
    pub session_ttl: Duration,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            rpc_url: env::var("DAO_CHAIN_RPC_URL").context(DAO_CHAIN_RPC_URL_NOT_SET)?,
            contract_address: env::var("DAO_CONTRACT_ADDRESS")
                .context(DAO_CONTRACT_ADDRESS_NOT_SET)?,
            private_key: env::var("CREATE_PROPOSAL_PRIVATE_KEY")
                .context(CREATE_PROPOSAL_PRIVATE_KEY_NOT_SET)?,
            ipfs_gateway: env::var("IPFS_GATEWAY_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_IPFS_GATEWAY.to_string()),
            auto_join: env::var("AUTO_JOIN_DAO")
                .map(|v| parse_bool(&v))
                .unwrap_or(true),
            join_stake_ether: env::var("JOIN_STAKE_ETHER").unwrap_or_else(|_| "0.0001".to_string()),
            session_ttl: Duration::from_secs(
                env::var("SESSION_TTL_SECONDS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(3600),
            ),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
        })
    }
}

fn parse_bool(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}

pub fn load() -> Result<&'static Config> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| anyhow!("Submitter config already initialized"))?;
    Ok(get_config())
}

pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Submitter config not initialized")
}
