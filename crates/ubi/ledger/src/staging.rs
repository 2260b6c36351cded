//! Unit of work for a single ledger transition.
//!
//! Planning reads the ledger as of the start of the transition and produces a
//! [`UnitOfWork`]: an optional transfer plus absolute state writes. Commit
//! runs the transfer first and applies the writes only once it confirms, so
//! the debit and the record update land together or not at all.

use ubi_types::{Amount, Count, Height, Identity, ParameterKind, Participant, Proposal, VoteKey};

use crate::custody::{TransferReceipt, TransferRequest};
use crate::journal::LedgerEvent;

/// A state write. Values are absolute, computed at plan time; applying an
/// effect cannot fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Effect {
    WriteParticipant {
        identity: Identity,
        record: Participant,
    },
    SetParticipantCount(Count),
    SetPoolAccounting {
        balance: Amount,
        total_contributed: Amount,
        total_distributed: Amount,
    },
    SetLastDistributionHeight(Height),
    SetPolicy {
        kind: ParameterKind,
        value: Amount,
    },
    SetPaused(bool),
    WriteProposal(Proposal),
    SetLastProposalId(u64),
    RecordVote {
        key: VoteKey,
        support: bool,
    },
}

#[derive(Debug, Default)]
pub(crate) struct UnitOfWork {
    transfer: Option<TransferRequest>,
    effects: Vec<Effect>,
    events: Vec<LedgerEvent>,
}

impl UnitOfWork {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn transfer(mut self, request: TransferRequest) -> Self {
        self.transfer = Some(request);
        self
    }

    pub(crate) fn effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub(crate) fn event(mut self, event: LedgerEvent) -> Self {
        self.events.push(event);
        self
    }

    pub(crate) fn transfer_request(&self) -> Option<&TransferRequest> {
        self.transfer.as_ref()
    }

    /// Hand over the writes and the journal events, with transfer
    /// references filled in from the receipt.
    pub(crate) fn into_parts(
        self,
        receipt: Option<&TransferReceipt>,
    ) -> (Vec<Effect>, Vec<LedgerEvent>) {
        let reference = receipt.map(|r| r.reference).unwrap_or_default();
        let events = self
            .events
            .into_iter()
            .map(|event| stamp_reference(event, reference))
            .collect();
        (self.effects, events)
    }
}

fn stamp_reference(event: LedgerEvent, reference: u64) -> LedgerEvent {
    match event {
        LedgerEvent::Contributed { from, amount, .. } => LedgerEvent::Contributed {
            from,
            amount,
            transfer_reference: reference,
        },
        LedgerEvent::Claimed {
            identity, amount, ..
        } => LedgerEvent::Claimed {
            identity,
            amount,
            transfer_reference: reference,
        },
        other => other,
    }
}
