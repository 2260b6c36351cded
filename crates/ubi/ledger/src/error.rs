use serde::{Deserialize, Serialize};
use thiserror::Error;
use ubi_types::{Amount, Height, Identity, ProposalId};

use crate::custody::TransferError;
use crate::registry::IneligibleReason;

/// Errors from ledger transitions.
///
/// Every variant aborts the whole transition; the ledger is left exactly as
/// it was before the request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    // --- Authorization ---
    #[error("unauthorized: {caller} is not the administrator")]
    Unauthorized { caller: Identity },

    // --- Registry ---
    #[error("participant already registered: {0}")]
    AlreadyRegistered(Identity),

    #[error("participant not registered: {0}")]
    NotRegistered(Identity),

    #[error("participant {identity} is not eligible to claim: {reason}")]
    Ineligible {
        identity: Identity,
        reason: IneligibleReason,
    },

    // --- Treasury ---
    #[error("insufficient funds: balance {balance}, payout {required}")]
    InsufficientFunds { balance: Amount, required: Amount },

    #[error("invalid amount {amount}: {reason}")]
    InvalidAmount { amount: Amount, reason: String },

    #[error("transfer rejected: {0}")]
    TransferRejected(#[from] TransferError),

    // --- Governance ---
    #[error("invalid proposal type: {0}")]
    InvalidProposalType(String),

    #[error("proposed value {value} outside (0, {max}]")]
    InvalidValue { value: Amount, max: Amount },

    #[error("invalid proposal {id}: {reason}")]
    InvalidProposal { id: ProposalId, reason: String },

    #[error("proposal {id} expired at height {expiry_height}")]
    ExpiredProposal {
        id: ProposalId,
        expiry_height: Height,
    },

    #[error("{voter} already voted on proposal {id}")]
    AlreadyVoted { id: ProposalId, voter: Identity },

    // --- Host ---
    #[error("system paused")]
    SystemPaused,

    #[error("height regression: request at {requested}, ledger already at {observed}")]
    HeightRegression { requested: Height, observed: Height },

    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

impl LedgerError {
    /// Stable machine-readable code of the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::Unauthorized { .. } => "unauthorized",
            LedgerError::AlreadyRegistered(_) => "already-registered",
            LedgerError::NotRegistered(_) => "not-registered",
            LedgerError::Ineligible { .. } => "ineligible",
            LedgerError::InsufficientFunds { .. } => "insufficient-funds",
            LedgerError::InvalidAmount { .. } => "invalid-amount",
            LedgerError::TransferRejected(_) => "transfer-rejected",
            LedgerError::InvalidProposalType(_) => "invalid-proposal-type",
            LedgerError::InvalidValue { .. } => "invalid-value",
            LedgerError::InvalidProposal { .. } => "invalid-proposal",
            LedgerError::ExpiredProposal { .. } => "expired-proposal",
            LedgerError::AlreadyVoted { .. } => "already-voted",
            LedgerError::SystemPaused => "system-paused",
            LedgerError::HeightRegression { .. } => "height-regression",
            LedgerError::Unavailable(_) => "unavailable",
        }
    }

    pub(crate) fn invalid_proposal(id: ProposalId, reason: impl Into<String>) -> Self {
        LedgerError::InvalidProposal {
            id,
            reason: reason.into(),
        }
    }
}

/// Wire form of a rejected request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl From<&LedgerError> for ErrorBody {
    fn from(err: &LedgerError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}
