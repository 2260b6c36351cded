//! Tunable treasury parameters and the protocol constants that bound them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{Amount, BlockDelta};

/// Payout granted per accepted claim at genesis.
pub const DEFAULT_PAYOUT_AMOUNT: Amount = 1_000_000;

/// Height units a participant must wait between claims at genesis.
pub const DEFAULT_PAYOUT_INTERVAL: BlockDelta = 144;

/// Reserve level the community targets at genesis.
pub const DEFAULT_MINIMUM_RESERVE: Amount = 5_000_000;

/// Height units a proposal stays open for voting.
pub const PROPOSAL_VOTING_PERIOD: BlockDelta = 1_440;

/// Inclusive upper bound of a proposed parameter value.
pub const MAX_PROPOSED_VALUE: Amount = 1_000_000_000_000;

/// The closed set of treasury parameters subject to governance change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParameterKind {
    PayoutAmount,
    PayoutInterval,
    MinimumReserve,
}

impl ParameterKind {
    pub const ALL: [ParameterKind; 3] = [
        ParameterKind::PayoutAmount,
        ParameterKind::PayoutInterval,
        ParameterKind::MinimumReserve,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::PayoutAmount => "payout-amount",
            ParameterKind::PayoutInterval => "payout-interval",
            ParameterKind::MinimumReserve => "minimum-reserve",
        }
    }
}

impl std::fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A proposal kind string outside the closed enumeration.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown parameter kind: {0}")]
pub struct ParseParameterKindError(pub String);

impl std::str::FromStr for ParameterKind {
    type Err = ParseParameterKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParameterKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseParameterKindError(s.to_string()))
    }
}
