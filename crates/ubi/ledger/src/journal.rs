use serde::{Deserialize, Serialize};
use ubi_types::{Amount, Height, Identity, ParameterKind, ProposalId, ProposalOutcome};

/// An accepted ledger transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum LedgerEvent {
    Registered {
        identity: Identity,
    },
    Verified {
        identity: Identity,
    },
    Contributed {
        from: Identity,
        amount: Amount,
        transfer_reference: u64,
    },
    Claimed {
        identity: Identity,
        amount: Amount,
        transfer_reference: u64,
    },
    ProposalSubmitted {
        id: ProposalId,
        proposer: Identity,
        kind: ParameterKind,
        value: Amount,
    },
    VoteCast {
        id: ProposalId,
        voter: Identity,
        support: bool,
    },
    ProposalFinalized {
        id: ProposalId,
        outcome: ProposalOutcome,
    },
    PolicyUpdated {
        kind: ParameterKind,
        previous: Amount,
        value: Amount,
    },
    Paused {
        by: Identity,
    },
    Unpaused {
        by: Identity,
    },
}

/// A journal entry: the event plus where it sits in the ledger history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub sequence: u64,
    pub height: Height,
    pub event: LedgerEvent,
}

/// Append-only record of accepted transitions.
///
/// Rejected transitions never reach the journal.
#[derive(Debug, Default)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, height: Height, event: LedgerEvent) {
        let sequence = self.entries.len() as u64 + 1;
        self.entries.push(JournalEntry {
            sequence,
            height,
            event,
        });
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries accepted at or after `height`.
    pub fn since(&self, height: Height) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter().filter(move |e| e.height >= height)
    }
}
