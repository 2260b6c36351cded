//! Request/response surface: one request is one atomic transition or one
//! read.

use serde::{Deserialize, Serialize};
use ubi_types::{
    Amount, ContractStatus, DistributionInfo, Height, Identity, Participant, ProposalId,
    ProposalOutcome, ProposalView, Tally,
};

use crate::custody::AssetTransfer;
use crate::error::LedgerError;
use crate::journal::JournalEntry;
use crate::ledger::{RequestContext, UbiLedger};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Request {
    Register,
    VerifyParticipant { identity: Identity },
    ClaimUbi,
    Contribute { amount: Amount },
    /// `kind` is the wire name of a [`ubi_types::ParameterKind`].
    SubmitProposal { kind: String, value: Amount },
    Vote { proposal_id: ProposalId, support: bool },
    FinalizeProposal { proposal_id: ProposalId },
    Pause,
    Unpause,
    GetParticipant { identity: Identity },
    GetTreasuryBalance,
    GetProposal { proposal_id: ProposalId },
    GetProposalOutcome { proposal_id: ProposalId },
    HasVoted { proposal_id: ProposalId, voter: Identity },
    GetDistributionInfo,
    CanClaim { identity: Identity },
    GetContractStatus,
    /// Journal entries accepted at or after `since`.
    GetEvents { since: Height },
}

impl Request {
    /// Whether serving this request can change ledger state.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Request::Register
                | Request::VerifyParticipant { .. }
                | Request::ClaimUbi
                | Request::Contribute { .. }
                | Request::SubmitProposal { .. }
                | Request::Vote { .. }
                | Request::FinalizeProposal { .. }
                | Request::Pause
                | Request::Unpause
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "kebab-case")]
pub enum Response {
    Ok,
    Claimed { amount: Amount },
    Contributed { balance: Amount },
    ProposalSubmitted { proposal_id: ProposalId },
    Voted { tally: Tally },
    Finalized { outcome: ProposalOutcome },
    Participant { participant: Option<Participant> },
    Balance { balance: Amount },
    Proposal { proposal: Option<ProposalView> },
    Outcome { outcome: Option<ProposalOutcome> },
    HasVoted { voted: bool },
    DistributionInfo { info: DistributionInfo },
    CanClaim { eligible: bool },
    Status { status: ContractStatus },
    Events { entries: Vec<JournalEntry> },
}

impl<T: AssetTransfer> UbiLedger<T> {
    /// Serve one request. Reads are evaluated at `ctx.height` and never
    /// fail.
    pub fn dispatch(
        &mut self,
        ctx: &RequestContext,
        request: Request,
    ) -> Result<Response, LedgerError> {
        let height = ctx.height;
        let response = match request {
            Request::Register => {
                self.register(ctx)?;
                Response::Ok
            }
            Request::VerifyParticipant { identity } => {
                self.verify_participant(ctx, &identity)?;
                Response::Ok
            }
            Request::ClaimUbi => Response::Claimed {
                amount: self.claim_ubi(ctx)?,
            },
            Request::Contribute { amount } => Response::Contributed {
                balance: self.contribute(ctx, amount)?,
            },
            Request::SubmitProposal { kind, value } => Response::ProposalSubmitted {
                proposal_id: self.submit_proposal_named(ctx, &kind, value)?,
            },
            Request::Vote {
                proposal_id,
                support,
            } => Response::Voted {
                tally: self.vote(ctx, proposal_id, support)?,
            },
            Request::FinalizeProposal { proposal_id } => Response::Finalized {
                outcome: self.finalize_proposal(ctx, proposal_id)?,
            },
            Request::Pause => {
                self.pause(ctx)?;
                Response::Ok
            }
            Request::Unpause => {
                self.unpause(ctx)?;
                Response::Ok
            }
            Request::GetParticipant { identity } => Response::Participant {
                participant: self.get_participant(&identity).cloned(),
            },
            Request::GetTreasuryBalance => Response::Balance {
                balance: self.get_treasury_balance(),
            },
            Request::GetProposal { proposal_id } => Response::Proposal {
                proposal: self.get_proposal(proposal_id, height),
            },
            Request::GetProposalOutcome { proposal_id } => Response::Outcome {
                outcome: self.get_proposal_outcome(proposal_id, height),
            },
            Request::HasVoted { proposal_id, voter } => Response::HasVoted {
                voted: self.has_voted(proposal_id, &voter),
            },
            Request::GetDistributionInfo => Response::DistributionInfo {
                info: self.get_distribution_info(),
            },
            Request::CanClaim { identity } => Response::CanClaim {
                eligible: self.can_claim(&identity, height),
            },
            Request::GetContractStatus => Response::Status {
                status: self.get_contract_status(),
            },
            Request::GetEvents { since } => Response::Events {
                entries: self.journal().since(since).cloned().collect(),
            },
        };
        Ok(response)
    }
}
