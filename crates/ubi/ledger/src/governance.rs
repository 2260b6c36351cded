//! Governance Engine: parameter-change proposals and one-identity-one-vote
//! tallies.
//!
//! A proposal accepts votes while its stored status is active and the height
//! is below `expiry_height`. Expiry is a height comparison; nothing ticks in
//! the background. Finalization is an explicit administrative step that
//! closes the stored status and, for a passing tally, writes the proposed
//! value into the treasury policy.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;
use ubi_types::{
    Amount, Count, Height, Identity, ParameterKind, Proposal, ProposalId, ProposalOutcome,
    ProposalStatus, ProposalView, Tally, VoteKey,
};

use crate::config::GovernanceConfig;
use crate::error::LedgerError;
use crate::journal::LedgerEvent;
use crate::registry::ParticipantRegistry;
use crate::staging::{Effect, UnitOfWork};
use crate::treasury::Treasury;

#[derive(Debug)]
pub struct GovernanceEngine {
    config: GovernanceConfig,
    proposals: BTreeMap<ProposalId, Proposal>,
    /// Permanent, including after the proposal closes.
    votes: HashMap<VoteKey, bool>,
    /// Highest identifier issued so far; 0 before the first proposal.
    last_proposal_id: u64,
}

impl GovernanceEngine {
    pub fn new(config: GovernanceConfig) -> Self {
        Self {
            config,
            proposals: BTreeMap::new(),
            votes: HashMap::new(),
            last_proposal_id: 0,
        }
    }

    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    pub fn proposal(&self, id: ProposalId) -> Option<&Proposal> {
        self.proposals.get(&id)
    }

    pub fn proposal_view(&self, id: ProposalId, height: Height) -> Option<ProposalView> {
        self.proposal(id)
            .cloned()
            .map(|proposal| ProposalView::at(proposal, height))
    }

    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.values()
    }

    pub fn proposal_count(&self) -> Count {
        self.last_proposal_id
    }

    pub fn tally(&self, id: ProposalId) -> Option<Tally> {
        self.proposal(id).map(Proposal::tally)
    }

    /// Outcome as read at `height`: pending while voting is open, then
    /// passed on a strict majority for, rejected otherwise (ties included).
    pub fn outcome(&self, id: ProposalId, height: Height) -> Option<ProposalOutcome> {
        self.proposal(id).map(|p| p.outcome(height))
    }

    pub fn vote_of(&self, id: ProposalId, voter: &Identity) -> Option<bool> {
        self.votes
            .get(&VoteKey::new(id, voter.clone()))
            .copied()
    }

    pub fn has_voted(&self, id: ProposalId, voter: &Identity) -> bool {
        self.vote_of(id, voter).is_some()
    }

    pub(crate) fn plan_submit(
        &self,
        registry: &ParticipantRegistry,
        treasury: &Treasury,
        proposer: &Identity,
        kind: ParameterKind,
        value: Amount,
        height: Height,
    ) -> Result<(UnitOfWork, ProposalId), LedgerError> {
        registry.require(proposer)?;
        if value == 0 || value > self.config.max_proposed_value {
            return Err(LedgerError::InvalidValue {
                value,
                max: self.config.max_proposed_value,
            });
        }
        if treasury.is_paused() {
            return Err(LedgerError::SystemPaused);
        }

        let id = ProposalId(self.last_proposal_id + 1);
        let proposal = Proposal {
            id,
            proposer: proposer.clone(),
            kind,
            proposed_value: value,
            votes_for: 0,
            votes_against: 0,
            status: ProposalStatus::Active,
            created_height: height,
            expiry_height: height.saturating_add(self.config.voting_period),
            applied: false,
        };

        debug!(%id, proposer = %proposer, %kind, value, expiry = proposal.expiry_height, "Proposal planned");
        let work = UnitOfWork::new()
            .effect(Effect::SetLastProposalId(id.0))
            .effect(Effect::WriteProposal(proposal))
            .event(LedgerEvent::ProposalSubmitted {
                id,
                proposer: proposer.clone(),
                kind,
                value,
            });
        Ok((work, id))
    }

    pub(crate) fn plan_vote(
        &self,
        registry: &ParticipantRegistry,
        treasury: &Treasury,
        voter: &Identity,
        id: ProposalId,
        support: bool,
        height: Height,
    ) -> Result<(UnitOfWork, Tally), LedgerError> {
        if self.config.pause_blocks_voting && treasury.is_paused() {
            return Err(LedgerError::SystemPaused);
        }
        registry.require(voter)?;
        let proposal = self
            .proposal(id)
            .filter(|_| id.0 <= self.last_proposal_id)
            .ok_or_else(|| LedgerError::invalid_proposal(id, "no such proposal"))?;
        if self.has_voted(id, voter) {
            return Err(LedgerError::AlreadyVoted {
                id,
                voter: voter.clone(),
            });
        }
        if proposal.is_expired(height) {
            return Err(LedgerError::ExpiredProposal {
                id,
                expiry_height: proposal.expiry_height,
            });
        }
        if proposal.status != ProposalStatus::Active {
            return Err(LedgerError::invalid_proposal(id, "proposal is closed"));
        }

        let mut updated = proposal.clone();
        if support {
            updated.votes_for += 1;
        } else {
            updated.votes_against += 1;
        }
        let tally = updated.tally();

        let work = UnitOfWork::new()
            .effect(Effect::RecordVote {
                key: VoteKey::new(id, voter.clone()),
                support,
            })
            .effect(Effect::WriteProposal(updated))
            .event(LedgerEvent::VoteCast {
                id,
                voter: voter.clone(),
                support,
            });
        Ok((work, tally))
    }

    /// Authorization is checked by the caller.
    pub(crate) fn plan_finalize(
        &self,
        treasury: &Treasury,
        id: ProposalId,
        height: Height,
    ) -> Result<(UnitOfWork, ProposalOutcome), LedgerError> {
        let proposal = self
            .proposal(id)
            .ok_or_else(|| LedgerError::invalid_proposal(id, "no such proposal"))?;
        if proposal.status == ProposalStatus::Closed {
            return Err(LedgerError::invalid_proposal(id, "already finalized"));
        }
        if !proposal.is_expired(height) {
            return Err(LedgerError::invalid_proposal(
                id,
                format!("voting open until height {}", proposal.expiry_height),
            ));
        }

        let outcome = proposal.outcome(height);
        let mut closed = proposal.clone();
        closed.status = ProposalStatus::Closed;
        closed.applied = outcome == ProposalOutcome::Passed;

        let mut work = UnitOfWork::new()
            .effect(Effect::WriteProposal(closed))
            .event(LedgerEvent::ProposalFinalized { id, outcome });
        if outcome == ProposalOutcome::Passed {
            work = work
                .effect(Effect::SetPolicy {
                    kind: proposal.kind,
                    value: proposal.proposed_value,
                })
                .event(LedgerEvent::PolicyUpdated {
                    kind: proposal.kind,
                    previous: treasury.policy_value(proposal.kind),
                    value: proposal.proposed_value,
                });
        }
        Ok((work, outcome))
    }

    pub(crate) fn write_proposal(&mut self, proposal: Proposal) {
        self.proposals.insert(proposal.id, proposal);
    }

    pub(crate) fn set_last_proposal_id(&mut self, id: u64) {
        self.last_proposal_id = self.last_proposal_id.max(id);
    }

    pub(crate) fn record_vote(&mut self, key: VoteKey, support: bool) {
        self.votes.entry(key).or_insert(support);
    }
}
