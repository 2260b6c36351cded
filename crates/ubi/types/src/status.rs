//! Read-model snapshots returned by ledger queries.

use serde::{Deserialize, Serialize};

use crate::ids::{Amount, BlockDelta, Count, Height, Identity};
use crate::proposal::{Proposal, ProposalOutcome, ProposalStatus};

/// Payout policy and pool accounting at a point in time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionInfo {
    pub balance: Amount,
    pub payout_amount: Amount,
    pub payout_interval: BlockDelta,
    pub minimum_reserve: Amount,
    pub last_distribution_height: Height,
    pub total_contributed: Amount,
    pub total_distributed: Amount,
    /// Whether the pool currently sits at or above the minimum reserve.
    pub reserve_met: bool,
}

/// Global ledger status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractStatus {
    pub paused: bool,
    pub administrator: Identity,
    pub participant_count: Count,
    pub proposal_count: Count,
    pub balance: Amount,
    /// Highest height any accepted request has carried.
    pub height: Height,
}

/// A proposal together with its height-dependent status and outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalView {
    pub proposal: Proposal,
    pub effective_status: ProposalStatus,
    pub outcome: ProposalOutcome,
}

impl ProposalView {
    pub fn at(proposal: Proposal, height: Height) -> Self {
        Self {
            effective_status: proposal.effective_status(height),
            outcome: proposal.outcome(height),
            proposal,
        }
    }
}
