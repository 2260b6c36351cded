use serde::{Deserialize, Serialize};

/// Logical clock tick supplied by the host (analogous to a block number).
pub type Height = u64;

/// Number of height units between two points on the logical clock.
pub type BlockDelta = u64;

/// Quantity of the pooled asset in minor units.
pub type Amount = u64;

/// Monotonic counter value.
pub type Count = u64;

/// An opaque, externally authenticated actor reference.
///
/// The ledger never inspects the contents; equality is the only operation
/// it relies on.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(pub String);

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Proposal identifier. Issued from a counter starting at 1; never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalId(pub u64);

impl ProposalId {
    /// The identifier issued to the first proposal.
    pub const FIRST: ProposalId = ProposalId(1);

    /// The identifier that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for ProposalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "prop:{}", self.0)
    }
}
