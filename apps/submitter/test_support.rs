use crate::chain::{
    DaoGateway, MemberJoined, MinedTransaction, ProposalCreated, SentTransaction,
};
use crate::errors::SubmitError;
use alloy::primitives::{Address, B256, LogData, U256};
use alloy::rpc::types::Log;
use alloy::sol_types::SolEvent;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn proposal_created_log(proposal_id: B256, description: &str) -> Log {
    let event = ProposalCreated {
        proposalId: proposal_id,
        description: description.to_string(),
        deadline: U256::from(1_700_000_000u64),
    };
    wrap_log(event.encode_log_data())
}

pub fn foreign_log() -> Log {
    let event = MemberJoined {
        member: Address::ZERO,
        stake: U256::from(1u64),
    };
    wrap_log(event.encode_log_data())
}

fn wrap_log(data: LogData) -> Log {
    Log {
        inner: alloy::primitives::Log {
            address: Address::ZERO,
            data,
        },
        ..Default::default()
    }
}

/// Gateway double that records which chain writes were attempted.
pub struct MockDao {
    pub member: bool,
    pub succeed: bool,
    pub proposal_logs: Vec<Log>,
    pub minimum_stake: U256,
    pub join_calls: AtomicUsize,
    pub submit_calls: AtomicUsize,
}

impl MockDao {
    pub fn member() -> Self {
        Self::new(true)
    }

    pub fn non_member() -> Self {
        Self::new(false)
    }

    fn new(member: bool) -> Self {
        Self {
            member,
            succeed: true,
            proposal_logs: vec![proposal_created_log(B256::repeat_byte(1), "desc")],
            minimum_stake: U256::from(100_000_000_000_000u64),
            join_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DaoGateway for MockDao {
    async fn is_member(&self, _account: Address) -> Result<bool, SubmitError> {
        Ok(self.member)
    }

    async fn minimum_stake(&self) -> Result<U256, SubmitError> {
        Ok(self.minimum_stake)
    }

    async fn join(&self, _stake: U256) -> Result<MinedTransaction, SubmitError> {
        self.join_calls.fetch_add(1, Ordering::SeqCst);
        Ok(MinedTransaction {
            tx_hash: B256::repeat_byte(0xaa),
            block_number: 1,
            succeeded: true,
            logs: vec![],
        })
    }

    async fn send_proposal(&self, _description: String) -> Result<SentTransaction, SubmitError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        let mined = MinedTransaction {
            tx_hash: B256::repeat_byte(0xbb),
            block_number: 42,
            succeeded: self.succeed,
            logs: self.proposal_logs.clone(),
        };
        let mined: futures::future::BoxFuture<'static, Result<MinedTransaction, SubmitError>> =
            Box::pin(async move { Ok(mined) });
        Ok(SentTransaction {
            tx_hash: B256::repeat_byte(0xbb),
            mined,
        })
    }
}
