use crate::errors::{ChainCallKind, SubmitError};
use alloy::{
    network::EthereumWallet,
    primitives::{Address, B256, U256},
    providers::{PendingTransactionError, Provider, ProviderBuilder},
    rpc::types::{Log, TransactionReceipt},
    signers::local::PrivateKeySigner,
    sol,
    sol_types::SolEvent,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::BoxFuture;
use tracing::{debug, info, instrument};

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    impact_dao,
    "./abis/impact_dao.json"
);

pub use impact_dao::{MemberJoined, ProposalCreated};

type ImpactDao = impact_dao::impact_daoInstance<alloy::providers::DynProvider>;

/// A transaction that has been mined, reduced to what the coordinator
/// needs: outcome, block and emitted logs.
#[derive(Debug, Clone)]
pub struct MinedTransaction {
    pub tx_hash: B256,
    pub block_number: u64,
    pub succeeded: bool,
    pub logs: Vec<Log>,
}

/// A broadcast transaction whose hash is known immediately; awaiting
/// `mined` suspends until the network confirms it.
pub struct SentTransaction {
    pub tx_hash: B256,
    pub mined: BoxFuture<'static, Result<MinedTransaction, SubmitError>>,
}

/// Seam between the submission coordinator and the governance contract.
#[async_trait]
pub trait DaoGateway: Send + Sync {
    async fn is_member(&self, account: Address) -> Result<bool, SubmitError>;
    async fn minimum_stake(&self) -> Result<U256, SubmitError>;
    async fn join(&self, stake: U256) -> Result<MinedTransaction, SubmitError>;
    async fn send_proposal(&self, description: String) -> Result<SentTransaction, SubmitError>;
}

pub struct OnchainDao {
    contract: ImpactDao,
}

/// Builds the wallet-backed contract handle. Returns the handle and the
/// signing address the membership check runs against.
pub fn connect(
    rpc_url: &str,
    private_key: &str,
    contract_address: &str,
) -> Result<(OnchainDao, Address)> {
    let signer: PrivateKeySigner = private_key
        .parse()
        .context("Invalid CREATE_PROPOSAL_PRIVATE_KEY")?;
    let sender = signer.address();
    let wallet = EthereumWallet::from(signer);

    let provider = ProviderBuilder::new()
        .wallet(wallet)
        .connect_http(rpc_url.parse().context("Invalid DAO_CHAIN_RPC_URL")?)
        .erased();

    let address: Address = contract_address
        .parse()
        .context("Invalid DAO_CONTRACT_ADDRESS")?;

    Ok((
        OnchainDao {
            contract: impact_dao::new(address, provider),
        },
        sender,
    ))
}

#[async_trait]
impl DaoGateway for OnchainDao {
    #[instrument(skip(self))]
    async fn is_member(&self, account: Address) -> Result<bool, SubmitError> {
        self.contract
            .isMember(account)
            .call()
            .await
            .map_err(classify_contract_error)
    }

    #[instrument(skip(self))]
    async fn minimum_stake(&self) -> Result<U256, SubmitError> {
        self.contract
            .MINIMUM_STAKE()
            .call()
            .await
            .map_err(classify_contract_error)
    }

    #[instrument(skip(self))]
    async fn join(&self, stake: U256) -> Result<MinedTransaction, SubmitError> {
        let pending = self
            .contract
            .joinDAO()
            .value(stake)
            .send()
            .await
            .map_err(classify_contract_error)?;

        let tx_hash = *pending.tx_hash();
        debug!(tx_hash = %tx_hash, "joinDAO transaction sent");

        let receipt = pending
            .get_receipt()
            .await
            .map_err(classify_pending_error)?;

        Ok(reduce_receipt(tx_hash, receipt))
    }

    #[instrument(skip_all)]
    async fn send_proposal(&self, description: String) -> Result<SentTransaction, SubmitError> {
        let pending = self
            .contract
            .createProposal(description)
            .send()
            .await
            .map_err(classify_contract_error)?;

        let tx_hash = *pending.tx_hash();
        info!(tx_hash = %tx_hash, "createProposal transaction sent");

        let mined: BoxFuture<'static, Result<MinedTransaction, SubmitError>> =
            Box::pin(async move {
                let receipt = pending
                    .get_receipt()
                    .await
                    .map_err(classify_pending_error)?;
                Ok(reduce_receipt(tx_hash, receipt))
            });

        Ok(SentTransaction { tx_hash, mined })
    }
}

fn reduce_receipt(tx_hash: B256, receipt: TransactionReceipt) -> MinedTransaction {
    MinedTransaction {
        tx_hash,
        block_number: receipt.block_number.unwrap_or_default(),
        succeeded: receipt.status(),
        logs: receipt.inner.logs().to_vec(),
    }
}

/// Scans a receipt's logs for the first ProposalCreated entry. The
/// event is not assumed to be at any particular position, and zero
/// matches is not an error here.
pub fn extract_proposal_created(logs: &[Log]) -> Option<ProposalCreated> {
    logs.iter().find_map(|log| {
        if log.inner.data.topics().first() == Some(&ProposalCreated::SIGNATURE_HASH) {
            log.log_decode::<ProposalCreated>()
                .ok()
                .map(|decoded| decoded.inner.data)
        } else {
            None
        }
    })
}

fn classify_contract_error(err: alloy::contract::Error) -> SubmitError {
    let message = err.to_string();
    let kind = if message.contains("Proposal already exists") {
        ChainCallKind::DuplicateProposal
    } else if matches!(err, alloy::contract::Error::TransportError(_)) {
        ChainCallKind::Transport
    } else {
        ChainCallKind::CallFailed
    };

    SubmitError::ChainCall { kind, message }
}

fn classify_pending_error(err: PendingTransactionError) -> SubmitError {
    SubmitError::ChainCall {
        kind: ChainCallKind::Transport,
        message: err.to_string(),
    }
}
