use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use ubi_types::{
    Amount, ContractStatus, DistributionInfo, Height, Identity, ParameterKind, Participant,
    ProposalId, ProposalOutcome, ProposalView, Tally,
};

use crate::config::LedgerConfig;
use crate::custody::{AssetTransfer, TransferReceipt};
use crate::error::LedgerError;
use crate::governance::GovernanceEngine;
use crate::journal::{Journal, LedgerEvent};
use crate::registry::{Eligibility, ParticipantRegistry};
use crate::staging::{Effect, UnitOfWork};
use crate::treasury::Treasury;

/// Who is calling and at what height. Supplied by the host per request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub caller: Identity,
    pub height: Height,
}

impl RequestContext {
    pub fn new(caller: impl Into<Identity>, height: Height) -> Self {
        Self {
            caller: caller.into(),
            height,
        }
    }
}

/// The ledger aggregate: registry, treasury and governance under one
/// exclusive owner.
///
/// Each mutating call is one transition: it plans against the state as it
/// stands, runs the external transfer if the plan has one, and only then
/// applies the planned writes. Any failure returns before the first write.
pub struct UbiLedger<T: AssetTransfer> {
    administrator: Identity,
    pool_account: Identity,
    registry: ParticipantRegistry,
    treasury: Treasury,
    governance: GovernanceEngine,
    journal: Journal,
    /// Highest height carried by an accepted transition.
    observed_height: Height,
    custody: T,
}

impl<T: AssetTransfer> UbiLedger<T> {
    /// Genesis ledger.
    pub fn new(config: &LedgerConfig, custody: T) -> Self {
        info!(
            administrator = %config.administrator,
            pool = %config.pool_account,
            payout = config.policy.payout_amount,
            interval = config.policy.payout_interval,
            "Ledger initialized"
        );
        Self {
            administrator: config.administrator.clone(),
            pool_account: config.pool_account.clone(),
            registry: ParticipantRegistry::new(),
            treasury: Treasury::genesis(&config.policy),
            governance: GovernanceEngine::new(config.governance),
            journal: Journal::new(),
            observed_height: 0,
            custody,
        }
    }

    // --- Registry ---

    pub fn register(&mut self, ctx: &RequestContext) -> Result<(), LedgerError> {
        self.transition("register", ctx, |ledger| {
            ledger.reject_pool_caller(&ctx.caller)?;
            ledger
                .registry
                .plan_register(&ctx.caller, ctx.height, &ledger.treasury)
                .map(|work| (work, ()))
        })
    }

    pub fn verify_participant(
        &mut self,
        ctx: &RequestContext,
        identity: &Identity,
    ) -> Result<(), LedgerError> {
        self.transition("verify", ctx, |ledger| {
            ledger.require_admin(&ctx.caller)?;
            ledger.registry.plan_verify(identity).map(|work| (work, ()))
        })
    }

    // --- Treasury ---

    /// Move `amount` from the caller into the pool. Returns the new balance.
    pub fn contribute(
        &mut self,
        ctx: &RequestContext,
        amount: Amount,
    ) -> Result<Amount, LedgerError> {
        self.transition("contribute", ctx, |ledger| {
            ledger.reject_pool_caller(&ctx.caller)?;
            let work = ledger
                .treasury
                .plan_contribute(&ctx.caller, amount, &ledger.pool_account)?;
            Ok((work, ()))
        })?;
        Ok(self.treasury.balance())
    }

    /// Pay the current payout to the caller. Returns the amount paid.
    pub fn claim_ubi(&mut self, ctx: &RequestContext) -> Result<Amount, LedgerError> {
        self.transition("claim", ctx, |ledger| {
            ledger.treasury.plan_claim(
                &ledger.registry,
                &ctx.caller,
                ctx.height,
                &ledger.pool_account,
            )
        })
    }

    // --- Governance ---

    pub fn submit_proposal(
        &mut self,
        ctx: &RequestContext,
        kind: ParameterKind,
        value: Amount,
    ) -> Result<ProposalId, LedgerError> {
        self.transition("submit-proposal", ctx, |ledger| {
            ledger.governance.plan_submit(
                &ledger.registry,
                &ledger.treasury,
                &ctx.caller,
                kind,
                value,
                ctx.height,
            )
        })
    }

    /// Submit with the kind in its wire form (`"payout-amount"`, ...).
    /// Unknown kinds never reach storage.
    pub fn submit_proposal_named(
        &mut self,
        ctx: &RequestContext,
        kind: &str,
        value: Amount,
    ) -> Result<ProposalId, LedgerError> {
        self.transition("submit-proposal", ctx, |ledger| {
            ledger.registry.require(&ctx.caller)?;
            let kind = kind
                .parse::<ParameterKind>()
                .map_err(|err| LedgerError::InvalidProposalType(err.0))?;
            ledger.governance.plan_submit(
                &ledger.registry,
                &ledger.treasury,
                &ctx.caller,
                kind,
                value,
                ctx.height,
            )
        })
    }

    /// Cast the caller's vote. Returns the tally after the vote.
    pub fn vote(
        &mut self,
        ctx: &RequestContext,
        id: ProposalId,
        support: bool,
    ) -> Result<Tally, LedgerError> {
        self.transition("vote", ctx, |ledger| {
            ledger.governance.plan_vote(
                &ledger.registry,
                &ledger.treasury,
                &ctx.caller,
                id,
                support,
                ctx.height,
            )
        })
    }

    /// Close an expired proposal and, if it passed, apply its value to the
    /// treasury policy. Administrator only.
    pub fn finalize_proposal(
        &mut self,
        ctx: &RequestContext,
        id: ProposalId,
    ) -> Result<ProposalOutcome, LedgerError> {
        self.transition("finalize-proposal", ctx, |ledger| {
            ledger.require_admin(&ctx.caller)?;
            ledger
                .governance
                .plan_finalize(&ledger.treasury, id, ctx.height)
        })
    }

    // --- Administrative controls ---

    /// Idempotent: pausing a paused ledger succeeds without a new event.
    pub fn pause(&mut self, ctx: &RequestContext) -> Result<(), LedgerError> {
        self.set_paused(ctx, true)
    }

    /// Idempotent, like [`UbiLedger::pause`].
    pub fn unpause(&mut self, ctx: &RequestContext) -> Result<(), LedgerError> {
        self.set_paused(ctx, false)
    }

    fn set_paused(&mut self, ctx: &RequestContext, paused: bool) -> Result<(), LedgerError> {
        let op = if paused { "pause" } else { "unpause" };
        self.transition(op, ctx, |ledger| {
            ledger.require_admin(&ctx.caller)?;
            let mut work = UnitOfWork::new();
            if ledger.treasury.is_paused() != paused {
                let by = ctx.caller.clone();
                let event = if paused {
                    LedgerEvent::Paused { by }
                } else {
                    LedgerEvent::Unpaused { by }
                };
                work = work.effect(Effect::SetPaused(paused)).event(event);
            }
            Ok((work, ()))
        })
    }

    // --- Queries ---

    pub fn get_participant(&self, identity: &Identity) -> Option<&Participant> {
        self.registry.get(identity)
    }

    pub fn get_treasury_balance(&self) -> Amount {
        self.treasury.balance()
    }

    pub fn get_proposal(&self, id: ProposalId, height: Height) -> Option<ProposalView> {
        self.governance.proposal_view(id, height)
    }

    pub fn get_proposal_outcome(&self, id: ProposalId, height: Height) -> Option<ProposalOutcome> {
        self.governance.outcome(id, height)
    }

    pub fn has_voted(&self, id: ProposalId, voter: &Identity) -> bool {
        self.governance.has_voted(id, voter)
    }

    pub fn get_distribution_info(&self) -> DistributionInfo {
        self.treasury.distribution_info()
    }

    /// Same predicate the claim path uses.
    pub fn can_claim(&self, identity: &Identity, height: Height) -> bool {
        self.eligibility(identity, height).is_eligible()
    }

    pub fn eligibility(&self, identity: &Identity, height: Height) -> Eligibility {
        self.registry.eligibility(identity, height, &self.treasury)
    }

    pub fn get_contract_status(&self) -> ContractStatus {
        ContractStatus {
            paused: self.treasury.is_paused(),
            administrator: self.administrator.clone(),
            participant_count: self.treasury.participant_count(),
            proposal_count: self.governance.proposal_count(),
            balance: self.treasury.balance(),
            height: self.observed_height,
        }
    }

    pub fn administrator(&self) -> &Identity {
        &self.administrator
    }

    pub fn pool_account(&self) -> &Identity {
        &self.pool_account
    }

    pub fn registry(&self) -> &ParticipantRegistry {
        &self.registry
    }

    pub fn treasury(&self) -> &Treasury {
        &self.treasury
    }

    pub fn governance(&self) -> &GovernanceEngine {
        &self.governance
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn custody(&self) -> &T {
        &self.custody
    }

    /// Direct access to the transfer rail, for hosts that fund accounts
    /// outside of ledger transitions.
    pub fn custody_mut(&mut self) -> &mut T {
        &mut self.custody
    }

    // --- Transition machinery ---

    fn require_admin(&self, caller: &Identity) -> Result<(), LedgerError> {
        if *caller != self.administrator {
            return Err(LedgerError::Unauthorized {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    /// The pool account moves funds only through ledger transitions, never
    /// as a caller.
    fn reject_pool_caller(&self, caller: &Identity) -> Result<(), LedgerError> {
        if *caller == self.pool_account {
            return Err(LedgerError::Unauthorized {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    fn transition<R>(
        &mut self,
        op: &'static str,
        ctx: &RequestContext,
        plan: impl FnOnce(&Self) -> Result<(UnitOfWork, R), LedgerError>,
    ) -> Result<R, LedgerError> {
        let result = self.run(ctx, plan);
        if let Err(err) = &result {
            warn!(op, caller = %ctx.caller, height = ctx.height, code = err.code(), error = %err, "Transition rejected");
        }
        result
    }

    fn run<R>(
        &mut self,
        ctx: &RequestContext,
        plan: impl FnOnce(&Self) -> Result<(UnitOfWork, R), LedgerError>,
    ) -> Result<R, LedgerError> {
        self.check_height(ctx.height)?;
        let (work, output) = plan(self)?;
        self.commit(ctx.height, work)?;
        Ok(output)
    }

    fn check_height(&self, height: Height) -> Result<(), LedgerError> {
        if height < self.observed_height {
            return Err(LedgerError::HeightRegression {
                requested: height,
                observed: self.observed_height,
            });
        }
        Ok(())
    }

    fn commit(
        &mut self,
        height: Height,
        work: UnitOfWork,
    ) -> Result<Option<TransferReceipt>, LedgerError> {
        let receipt = match work.transfer_request() {
            Some(request) => Some(self.custody.transfer(request)?),
            None => None,
        };

        let (effects, events) = work.into_parts(receipt.as_ref());
        for effect in effects {
            self.apply(effect);
        }
        for event in events {
            info!(height, event = ?event, "Transition accepted");
            self.journal.append(height, event);
        }
        self.observed_height = self.observed_height.max(height);
        Ok(receipt)
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::WriteParticipant { identity, record } => self.registry.write(identity, record),
            Effect::SetParticipantCount(count) => self.treasury.set_participant_count(count),
            Effect::SetPoolAccounting {
                balance,
                total_contributed,
                total_distributed,
            } => self
                .treasury
                .set_pool_accounting(balance, total_contributed, total_distributed),
            Effect::SetLastDistributionHeight(height) => {
                self.treasury.set_last_distribution_height(height)
            }
            Effect::SetPolicy { kind, value } => self.treasury.set_policy(kind, value),
            Effect::SetPaused(paused) => self.treasury.set_paused(paused),
            Effect::WriteProposal(proposal) => self.governance.write_proposal(proposal),
            Effect::SetLastProposalId(id) => self.governance.set_last_proposal_id(id),
            Effect::RecordVote { key, support } => self.governance.record_vote(key, support),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::custody::InMemoryCustody;

    const ADMIN: &str = "ubi-admin";

    fn ledger() -> UbiLedger<InMemoryCustody> {
        UbiLedger::new(&LedgerConfig::default(), InMemoryCustody::new())
    }

    fn at(caller: &str, height: Height) -> RequestContext {
        RequestContext::new(caller, height)
    }

    #[test]
    fn verify_requires_administrator() {
        let mut ledger = ledger();
        ledger.register(&at("alice", 1)).unwrap();

        let err = ledger
            .verify_participant(&at("alice", 2), &Identity::new("alice"))
            .unwrap_err();
        assert_eq!(err.code(), "unauthorized");

        ledger
            .verify_participant(&at(ADMIN, 2), &Identity::new("alice"))
            .unwrap();
        // Re-verification is a no-op success.
        ledger
            .verify_participant(&at(ADMIN, 3), &Identity::new("alice"))
            .unwrap();
        assert!(ledger.get_participant(&Identity::new("alice")).unwrap().verified);
    }

    #[test]
    fn verify_unknown_is_not_registered() {
        let mut ledger = ledger();
        assert_eq!(
            ledger
                .verify_participant(&at(ADMIN, 1), &Identity::new("ghost"))
                .unwrap_err(),
            LedgerError::NotRegistered(Identity::new("ghost"))
        );
    }

    #[test]
    fn pause_is_idempotent_and_admin_only() {
        let mut ledger = ledger();
        assert!(ledger.pause(&at("alice", 1)).is_err());

        ledger.pause(&at(ADMIN, 1)).unwrap();
        ledger.pause(&at(ADMIN, 2)).unwrap();
        assert!(ledger.get_contract_status().paused);
        assert_eq!(ledger.journal().len(), 1);

        ledger.unpause(&at(ADMIN, 3)).unwrap();
        ledger.unpause(&at(ADMIN, 4)).unwrap();
        assert!(!ledger.get_contract_status().paused);
    }

    #[test]
    fn height_regression_is_rejected_without_effect() {
        let mut ledger = ledger();
        ledger.register(&at("alice", 100)).unwrap();

        assert_eq!(
            ledger.register(&at("bob", 99)).unwrap_err(),
            LedgerError::HeightRegression {
                requested: 99,
                observed: 100
            }
        );
        assert!(ledger.get_participant(&Identity::new("bob")).is_none());
        assert_eq!(ledger.get_contract_status().height, 100);
    }

    #[test]
    fn rejected_transitions_do_not_advance_height() {
        let mut ledger = ledger();
        ledger.register(&at("alice", 10)).unwrap();
        assert!(ledger.register(&at("alice", 50)).is_err());
        assert_eq!(ledger.get_contract_status().height, 10);
        ledger.register(&at("bob", 20)).unwrap();
    }

    #[test]
    fn named_submit_checks_registration_before_kind() {
        let mut ledger = ledger();
        assert_eq!(
            ledger
                .submit_proposal_named(&at("ghost", 1), "bogus", 5)
                .unwrap_err(),
            LedgerError::NotRegistered(Identity::new("ghost"))
        );

        ledger.register(&at("alice", 1)).unwrap();
        assert_eq!(
            ledger
                .submit_proposal_named(&at("alice", 2), "bogus", 5)
                .unwrap_err(),
            LedgerError::InvalidProposalType("bogus".into())
        );
        assert_eq!(ledger.governance().proposal_count(), 0);

        let id = ledger
            .submit_proposal_named(&at("alice", 2), "payout-interval", 72)
            .unwrap();
        assert_eq!(
            ledger.get_proposal(id, 2).unwrap().proposal.kind,
            ParameterKind::PayoutInterval
        );
    }

    #[test]
    fn named_submit_below_observed_height_is_a_regression() {
        let mut ledger = ledger();
        ledger.register(&at("alice", 50)).unwrap();

        let attempts = [
            ("ghost", "payout-amount"),
            ("alice", "bogus"),
            ("alice", "payout-amount"),
        ];
        for (caller, kind) in attempts {
            assert_eq!(
                ledger
                    .submit_proposal_named(&at(caller, 40), kind, 5)
                    .unwrap_err(),
                LedgerError::HeightRegression {
                    requested: 40,
                    observed: 50
                }
            );
        }
        assert_eq!(ledger.governance().proposal_count(), 0);
    }

    #[test]
    fn pool_account_cannot_register_or_contribute() {
        let mut ledger = ledger();
        ledger.custody_mut().fund(&Identity::new("ubi-pool"), 1_000_000);

        let unauthorized = LedgerError::Unauthorized {
            caller: Identity::new("ubi-pool"),
        };
        assert_eq!(ledger.register(&at("ubi-pool", 1)).unwrap_err(), unauthorized);
        assert_eq!(
            ledger.contribute(&at("ubi-pool", 1), 1_000_000).unwrap_err(),
            unauthorized
        );

        assert!(ledger.get_participant(&Identity::new("ubi-pool")).is_none());
        assert_eq!(ledger.get_treasury_balance(), 0);
        assert!(ledger.custody().receipts().is_empty());
        assert!(ledger.journal().is_empty());
    }
}
