use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use ubi_types::{Amount, BlockDelta, Height, Identity, Participant};

use crate::error::LedgerError;
use crate::journal::LedgerEvent;
use crate::staging::{Effect, UnitOfWork};
use crate::treasury::Treasury;

/// Why a participant cannot claim right now.
///
/// Gates are evaluated in declaration order; the first failing gate wins.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum IneligibleReason {
    Paused,
    NotRegistered,
    NotVerified,
    CooldownActive { remaining: BlockDelta },
    TreasuryInsufficient { balance: Amount, payout: Amount },
}

impl std::fmt::Display for IneligibleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IneligibleReason::Paused => write!(f, "system paused"),
            IneligibleReason::NotRegistered => write!(f, "not registered"),
            IneligibleReason::NotVerified => write!(f, "not verified"),
            IneligibleReason::CooldownActive { remaining } => {
                write!(f, "cooldown active for {remaining} more blocks")
            }
            IneligibleReason::TreasuryInsufficient { balance, payout } => {
                write!(f, "treasury holds {balance}, payout is {payout}")
            }
        }
    }
}

/// Result of evaluating the claim gate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Eligibility {
    Eligible,
    Ineligible(IneligibleReason),
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

/// Participant Registry: owns participant records.
#[derive(Debug, Default)]
pub struct ParticipantRegistry {
    participants: HashMap<Identity, Participant>,
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identity: &Identity) -> Option<&Participant> {
        self.participants.get(identity)
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.participants.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Identity, &Participant)> {
        self.participants.iter()
    }

    /// Look up a participant or fail with `NotRegistered`.
    pub fn require(&self, identity: &Identity) -> Result<&Participant, LedgerError> {
        self.get(identity)
            .ok_or_else(|| LedgerError::NotRegistered(identity.clone()))
    }

    /// The claim gate: the single predicate both claiming and eligibility
    /// queries go through.
    pub fn eligibility(
        &self,
        identity: &Identity,
        height: Height,
        treasury: &Treasury,
    ) -> Eligibility {
        if treasury.is_paused() {
            return Eligibility::Ineligible(IneligibleReason::Paused);
        }
        let Some(participant) = self.get(identity) else {
            return Eligibility::Ineligible(IneligibleReason::NotRegistered);
        };
        if !participant.verified {
            return Eligibility::Ineligible(IneligibleReason::NotVerified);
        }
        let elapsed = participant.blocks_since_claim(height);
        if elapsed < treasury.payout_interval() {
            return Eligibility::Ineligible(IneligibleReason::CooldownActive {
                remaining: treasury.payout_interval() - elapsed,
            });
        }
        if treasury.balance() < treasury.payout_amount() {
            return Eligibility::Ineligible(IneligibleReason::TreasuryInsufficient {
                balance: treasury.balance(),
                payout: treasury.payout_amount(),
            });
        }
        Eligibility::Eligible
    }

    pub fn is_eligible(&self, identity: &Identity, height: Height, treasury: &Treasury) -> bool {
        self.eligibility(identity, height, treasury).is_eligible()
    }

    pub(crate) fn plan_register(
        &self,
        identity: &Identity,
        height: Height,
        treasury: &Treasury,
    ) -> Result<UnitOfWork, LedgerError> {
        if self.contains(identity) {
            return Err(LedgerError::AlreadyRegistered(identity.clone()));
        }
        if treasury.is_paused() {
            return Err(LedgerError::SystemPaused);
        }

        debug!(identity = %identity, height, "Registration planned");
        Ok(UnitOfWork::new()
            .effect(Effect::WriteParticipant {
                identity: identity.clone(),
                record: Participant::new(height),
            })
            .effect(Effect::SetParticipantCount(
                treasury.participant_count().saturating_add(1),
            ))
            .event(LedgerEvent::Registered {
                identity: identity.clone(),
            }))
    }

    /// Authorization is checked by the caller; this only needs the record.
    pub(crate) fn plan_verify(&self, identity: &Identity) -> Result<UnitOfWork, LedgerError> {
        let mut record = self.require(identity)?.clone();
        record.verified = true;

        Ok(UnitOfWork::new()
            .effect(Effect::WriteParticipant {
                identity: identity.clone(),
                record,
            })
            .event(LedgerEvent::Verified {
                identity: identity.clone(),
            }))
    }

    /// The participant record as it reads after an accepted claim.
    pub(crate) fn claimed_record(
        &self,
        identity: &Identity,
        height: Height,
        amount: Amount,
    ) -> Result<Participant, LedgerError> {
        let mut record = self.require(identity)?.clone();
        record.last_claim_height = record.last_claim_height.max(height);
        record.total_claimed = record.total_claimed.saturating_add(amount);
        record.claims_count = record.claims_count.saturating_add(1);
        Ok(record)
    }

    pub(crate) fn write(&mut self, identity: Identity, record: Participant) {
        self.participants.insert(identity, record);
    }
}
