//! Core type definitions for the UBI treasury ledger.
//!
//! This crate provides the shared record, identifier and policy types. No
//! business logic, only types. The ledger crate and any host embedding it
//! depend on this crate.

pub mod ids;
pub mod participant;
pub mod policy;
pub mod proposal;
pub mod status;

// Re-export primary types at crate root for ergonomic use.
pub use ids::{Amount, BlockDelta, Count, Height, Identity, ProposalId};
pub use participant::Participant;
pub use policy::{
    ParameterKind, ParseParameterKindError, DEFAULT_MINIMUM_RESERVE, DEFAULT_PAYOUT_AMOUNT,
    DEFAULT_PAYOUT_INTERVAL, MAX_PROPOSED_VALUE, PROPOSAL_VOTING_PERIOD,
};
pub use proposal::{Proposal, ProposalOutcome, ProposalStatus, Tally, VoteKey};
pub use status::{ContractStatus, DistributionInfo, ProposalView};
