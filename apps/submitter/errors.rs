use alloy::primitives::Address;
use thiserror::Error;

/// Classification of a failed chain interaction. Transport problems and
/// call-level failures get different user guidance, and the contract's
/// duplicate-description revert gets its own bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainCallKind {
    DuplicateProposal,
    CallFailed,
    Transport,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Failed to fetch from IPFS: {0}")]
    Fetch(String),

    #[error("Analysis data validation failed:\n{}", .0.join("\n"))]
    Validation(Vec<String>),

    #[error("Address {0} is not a DAO member")]
    Membership(Address),

    #[error("{message}")]
    ChainCall {
        kind: ChainCallKind,
        message: String,
    },

    #[error("Proposal creation event not found in transaction receipt")]
    EventNotFound,

    #[error("No proposal data found for session {0}")]
    UnknownSession(String),
}

impl SubmitError {
    /// Actionable guidance for errors with a known remedy. Everything
    /// else surfaces its message verbatim.
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            SubmitError::ChainCall {
                kind: ChainCallKind::DuplicateProposal,
                ..
            } => Some("This proposal already exists. Each proposal must be unique."),
            SubmitError::ChainCall {
                kind: ChainCallKind::CallFailed,
                ..
            } => Some(
                "Transaction failed. Possible reasons:\n- Proposal is not unique\n- Network congestion\n- Wait a few seconds and try again",
            ),
            SubmitError::Membership(_) => {
                Some("Join the DAO with the minimum stake, or enable auto-join.")
            }
            SubmitError::EventNotFound => Some(
                "The transaction was mined but the proposal identifier could not be recovered. Retry to submit a fresh proposal.",
            ),
            SubmitError::UnknownSession(_) => {
                Some("Analyze a submission first before creating a proposal.")
            }
            _ => None,
        }
    }
}
