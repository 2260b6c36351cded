use serde::{Deserialize, Serialize};

use crate::ids::{Amount, Count, Height, Identity, ProposalId};
use crate::policy::ParameterKind;

/// Stored lifecycle flag of a proposal.
///
/// Only an explicit finalize flips it to `Closed`. Whether a proposal still
/// accepts votes is decided by [`Proposal::is_open`], which also consults the
/// height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Active,
    Closed,
}

/// Key of a vote record. At most one record exists per key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VoteKey {
    pub proposal: ProposalId,
    pub voter: Identity,
}

impl VoteKey {
    pub fn new(proposal: ProposalId, voter: Identity) -> Self {
        Self { proposal, voter }
    }
}

/// Vote counts of a proposal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub votes_for: Count,
    pub votes_against: Count,
}

impl Tally {
    pub fn total(&self) -> Count {
        self.votes_for + self.votes_against
    }

    /// Strict majority of votes for. A tie does not pass.
    pub fn passes(&self) -> bool {
        self.votes_for > self.votes_against
    }
}

/// Outcome of a proposal as read at a given height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalOutcome {
    /// Voting is still open.
    Pending,
    Passed,
    Rejected,
}

/// A governance proposal to change one treasury parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub proposer: Identity,
    pub kind: ParameterKind,
    pub proposed_value: Amount,
    pub votes_for: Count,
    pub votes_against: Count,
    pub status: ProposalStatus,
    pub created_height: Height,
    /// First height at which the proposal no longer accepts votes.
    pub expiry_height: Height,
    /// Whether finalization wrote `proposed_value` into the treasury policy.
    pub applied: bool,
}

impl Proposal {
    pub fn tally(&self) -> Tally {
        Tally {
            votes_for: self.votes_for,
            votes_against: self.votes_against,
        }
    }

    pub fn is_expired(&self, height: Height) -> bool {
        height >= self.expiry_height
    }

    /// Accepts votes: stored status is active and the expiry height is not
    /// yet reached.
    pub fn is_open(&self, height: Height) -> bool {
        self.status == ProposalStatus::Active && !self.is_expired(height)
    }

    /// Status as observed at `height`; expiry reads as closed even when the
    /// stored flag is still active.
    pub fn effective_status(&self, height: Height) -> ProposalStatus {
        if self.is_open(height) {
            ProposalStatus::Active
        } else {
            ProposalStatus::Closed
        }
    }

    pub fn outcome(&self, height: Height) -> ProposalOutcome {
        if self.is_open(height) {
            ProposalOutcome::Pending
        } else if self.tally().passes() {
            ProposalOutcome::Passed
        } else {
            ProposalOutcome::Rejected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proposal(votes_for: Count, votes_against: Count) -> Proposal {
        Proposal {
            id: ProposalId::FIRST,
            proposer: Identity::new("alice"),
            kind: ParameterKind::PayoutAmount,
            proposed_value: 2_000_000,
            votes_for,
            votes_against,
            status: ProposalStatus::Active,
            created_height: 1_000,
            expiry_height: 2_440,
            applied: false,
        }
    }

    #[test]
    fn open_until_expiry_height() {
        let p = proposal(0, 0);
        assert!(p.is_open(2_439));
        assert!(!p.is_open(2_440));
        assert_eq!(p.effective_status(2_440), ProposalStatus::Closed);
        assert_eq!(p.status, ProposalStatus::Active);
    }

    #[test]
    fn stored_close_wins_before_expiry() {
        let mut p = proposal(0, 0);
        p.status = ProposalStatus::Closed;
        assert!(!p.is_open(1_500));
    }

    #[test]
    fn tie_does_not_pass() {
        assert_eq!(proposal(2, 2).outcome(3_000), ProposalOutcome::Rejected);
        assert_eq!(proposal(0, 0).outcome(3_000), ProposalOutcome::Rejected);
    }

    #[test]
    fn strict_majority_passes_after_expiry() {
        let p = proposal(3, 1);
        assert_eq!(p.outcome(2_000), ProposalOutcome::Pending);
        assert_eq!(p.outcome(2_440), ProposalOutcome::Passed);
        assert_eq!(p.tally().total(), 4);
    }
}
