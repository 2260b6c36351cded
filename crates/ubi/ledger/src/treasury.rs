use tracing::{debug, warn};
use ubi_types::{Amount, BlockDelta, Count, DistributionInfo, Height, Identity, ParameterKind};

use crate::config::PolicyConfig;
use crate::custody::TransferRequest;
use crate::error::LedgerError;
use crate::journal::LedgerEvent;
use crate::registry::{Eligibility, ParticipantRegistry};
use crate::staging::{Effect, UnitOfWork};

/// Treasury Ledger: the pooled balance and the payout policy.
///
/// `balance` moves only through accepted contributions and claims, so
/// `balance == total_contributed - total_distributed` at all times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Treasury {
    balance: Amount,
    payout_amount: Amount,
    payout_interval: BlockDelta,
    minimum_reserve: Amount,
    last_distribution_height: Height,
    participant_count: Count,
    paused: bool,
    total_contributed: Amount,
    total_distributed: Amount,
}

impl Treasury {
    /// Empty pool with the genesis policy.
    pub fn genesis(policy: &PolicyConfig) -> Self {
        Self {
            balance: 0,
            payout_amount: policy.payout_amount,
            payout_interval: policy.payout_interval,
            minimum_reserve: policy.minimum_reserve,
            last_distribution_height: 0,
            participant_count: 0,
            paused: false,
            total_contributed: 0,
            total_distributed: 0,
        }
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn payout_amount(&self) -> Amount {
        self.payout_amount
    }

    pub fn payout_interval(&self) -> BlockDelta {
        self.payout_interval
    }

    pub fn minimum_reserve(&self) -> Amount {
        self.minimum_reserve
    }

    pub fn last_distribution_height(&self) -> Height {
        self.last_distribution_height
    }

    pub fn participant_count(&self) -> Count {
        self.participant_count
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn total_contributed(&self) -> Amount {
        self.total_contributed
    }

    pub fn total_distributed(&self) -> Amount {
        self.total_distributed
    }

    /// Current value of a governable parameter.
    pub fn policy_value(&self, kind: ParameterKind) -> Amount {
        match kind {
            ParameterKind::PayoutAmount => self.payout_amount,
            ParameterKind::PayoutInterval => self.payout_interval,
            ParameterKind::MinimumReserve => self.minimum_reserve,
        }
    }

    pub fn distribution_info(&self) -> DistributionInfo {
        DistributionInfo {
            balance: self.balance,
            payout_amount: self.payout_amount,
            payout_interval: self.payout_interval,
            minimum_reserve: self.minimum_reserve,
            last_distribution_height: self.last_distribution_height,
            total_contributed: self.total_contributed,
            total_distributed: self.total_distributed,
            reserve_met: self.balance >= self.minimum_reserve,
        }
    }

    pub(crate) fn plan_contribute(
        &self,
        from: &Identity,
        amount: Amount,
        pool_account: &Identity,
    ) -> Result<UnitOfWork, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount {
                amount,
                reason: "contribution must be positive".into(),
            });
        }
        if self.paused {
            return Err(LedgerError::SystemPaused);
        }

        let overflow = || LedgerError::InvalidAmount {
            amount,
            reason: "contribution overflows the pool balance".into(),
        };
        let balance = self.balance.checked_add(amount).ok_or_else(overflow)?;
        let total_contributed = self
            .total_contributed
            .checked_add(amount)
            .ok_or_else(overflow)?;

        debug!(from = %from, amount, new_balance = balance, "Contribution planned");
        Ok(UnitOfWork::new()
            .transfer(TransferRequest {
                from: from.clone(),
                to: pool_account.clone(),
                amount,
            })
            .effect(Effect::SetPoolAccounting {
                balance,
                total_contributed,
                total_distributed: self.total_distributed,
            })
            .event(LedgerEvent::Contributed {
                from: from.clone(),
                amount,
                transfer_reference: 0,
            }))
    }

    /// Plan a claim of the current payout amount. The returned amount is
    /// what the participant will be paid once the transfer confirms.
    pub(crate) fn plan_claim(
        &self,
        registry: &ParticipantRegistry,
        identity: &Identity,
        height: Height,
        pool_account: &Identity,
    ) -> Result<(UnitOfWork, Amount), LedgerError> {
        if self.paused {
            return Err(LedgerError::SystemPaused);
        }
        if let Eligibility::Ineligible(reason) = registry.eligibility(identity, height, self) {
            debug!(identity = %identity, height, %reason, "Claim gate closed");
            return Err(LedgerError::Ineligible {
                identity: identity.clone(),
                reason,
            });
        }

        let payout = self.payout_amount;
        if self.balance < payout {
            warn!(balance = self.balance, payout, "Balance fell below payout after eligibility");
            return Err(LedgerError::InsufficientFunds {
                balance: self.balance,
                required: payout,
            });
        }
        let balance = self.balance - payout;
        let total_distributed = self.total_distributed.saturating_add(payout);
        let record = registry.claimed_record(identity, height, payout)?;

        let work = UnitOfWork::new()
            .transfer(TransferRequest {
                from: pool_account.clone(),
                to: identity.clone(),
                amount: payout,
            })
            .effect(Effect::SetPoolAccounting {
                balance,
                total_contributed: self.total_contributed,
                total_distributed,
            })
            .effect(Effect::WriteParticipant {
                identity: identity.clone(),
                record,
            })
            .effect(Effect::SetLastDistributionHeight(height))
            .event(LedgerEvent::Claimed {
                identity: identity.clone(),
                amount: payout,
                transfer_reference: 0,
            });
        Ok((work, payout))
    }

    pub(crate) fn set_pool_accounting(
        &mut self,
        balance: Amount,
        total_contributed: Amount,
        total_distributed: Amount,
    ) {
        self.balance = balance;
        self.total_contributed = total_contributed;
        self.total_distributed = total_distributed;
    }

    pub(crate) fn set_participant_count(&mut self, count: Count) {
        self.participant_count = count;
    }

    pub(crate) fn set_last_distribution_height(&mut self, height: Height) {
        self.last_distribution_height = height;
    }

    pub(crate) fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Overwrite a governable parameter. Reached only through proposal
    /// finalization.
    pub(crate) fn set_policy(&mut self, kind: ParameterKind, value: Amount) {
        match kind {
            ParameterKind::PayoutAmount => self.payout_amount = value,
            ParameterKind::PayoutInterval => self.payout_interval = value,
            ParameterKind::MinimumReserve => self.minimum_reserve = value,
        }
    }
}
