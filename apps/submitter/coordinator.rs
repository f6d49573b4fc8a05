use crate::chain::{DaoGateway, extract_proposal_created};
use crate::errors::{ChainCallKind, SubmitError};
use alloy::primitives::{Address, B256, U256};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Per-attempt submission lifecycle. Membership is read fresh on every
/// attempt; it can change between attempts and is never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    CheckingMembership,
    Joining,
    Submitting,
    Confirming,
    Completed,
    Rejected,
    Failed,
}

impl SubmissionState {
    /// Next state once the membership read has resolved.
    pub fn after_membership(is_member: bool, auto_join: bool) -> Self {
        if is_member {
            SubmissionState::Submitting
        } else if auto_join {
            SubmissionState::Joining
        } else {
            SubmissionState::Rejected
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SubmissionState::Completed | SubmissionState::Rejected | SubmissionState::Failed
        )
    }
}

#[derive(Debug, Clone)]
pub struct SubmittedProposal {
    pub proposal_id: B256,
    pub tx_hash: B256,
    pub block_number: u64,
}

#[derive(Debug, Clone)]
pub struct MembershipStatus {
    pub address: Address,
    pub is_member: bool,
    pub minimum_stake: U256,
}

pub struct ProposalCoordinator {
    gateway: Arc<dyn DaoGateway>,
    sender: Address,
    auto_join: bool,
    join_stake: U256,
}

impl ProposalCoordinator {
    pub fn new(
        gateway: Arc<dyn DaoGateway>,
        sender: Address,
        auto_join: bool,
        join_stake: U256,
    ) -> Self {
        Self {
            gateway,
            sender,
            auto_join,
            join_stake,
        }
    }

    pub fn sender(&self) -> Address {
        self.sender
    }

    #[instrument(skip(self))]
    pub async fn membership_status(&self) -> Result<MembershipStatus, SubmitError> {
        let is_member = self.gateway.is_member(self.sender).await?;
        let minimum_stake = self.gateway.minimum_stake().await?;

        Ok(MembershipStatus {
            address: self.sender,
            is_member,
            minimum_stake,
        })
    }

    /// Runs one submission attempt to a terminal state. Not idempotent:
    /// the contract rejects duplicate text, so a retry must go through
    /// the formatter again for a fresh description.
    #[instrument(skip_all)]
    pub async fn submit(&self, description: &str) -> Result<SubmittedProposal, SubmitError> {
        match self.run(description).await {
            Ok(submitted) => Ok(submitted),
            Err(e) => {
                let state = if matches!(e, SubmitError::Membership(_)) {
                    SubmissionState::Rejected
                } else {
                    SubmissionState::Failed
                };
                warn!(state = ?state, error = %e, "Submission did not complete");
                Err(e)
            }
        }
    }

    async fn run(&self, description: &str) -> Result<SubmittedProposal, SubmitError> {
        let mut state = SubmissionState::CheckingMembership;
        info!(state = ?state, sender = %self.sender, "Checking DAO membership");

        let is_member = self.gateway.is_member(self.sender).await?;

        state = SubmissionState::after_membership(is_member, self.auto_join);
        match state {
            SubmissionState::Rejected => {
                return Err(SubmitError::Membership(self.sender));
            }
            SubmissionState::Joining => {
                info!(state = ?state, stake = %self.join_stake, "Sender is not a member, joining DAO");
                let joined = self.gateway.join(self.join_stake).await?;
                if !joined.succeeded {
                    return Err(SubmitError::ChainCall {
                        kind: ChainCallKind::CallFailed,
                        message: "joinDAO transaction reverted".to_string(),
                    });
                }
                info!(tx_hash = %joined.tx_hash, "Joined DAO");
                state = SubmissionState::Submitting;
            }
            _ => {}
        }

        info!(state = ?state, "Submitting proposal");
        let sent = self.gateway.send_proposal(description.to_string()).await?;

        state = SubmissionState::Confirming;
        info!(state = ?state, tx_hash = %sent.tx_hash, "Waiting for confirmation");

        let mined = sent.mined.await?;
        if !mined.succeeded {
            return Err(SubmitError::ChainCall {
                kind: ChainCallKind::CallFailed,
                message: "createProposal transaction reverted".to_string(),
            });
        }

        let Some(event) = extract_proposal_created(&mined.logs) else {
            warn!(tx_hash = %mined.tx_hash, "Transaction mined but ProposalCreated event is missing");
            return Err(SubmitError::EventNotFound);
        };

        state = SubmissionState::Completed;
        info!(
            state = ?state,
            proposal_id = %event.proposalId,
            tx_hash = %mined.tx_hash,
            block = mined.block_number,
            "Proposal created"
        );

        Ok(SubmittedProposal {
            proposal_id: event.proposalId,
            tx_hash: mined.tx_hash,
            block_number: mined.block_number,
        })
    }
}
