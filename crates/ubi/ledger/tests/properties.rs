//! Property tests: any random sequence of ledger requests keeps the pool
//! accounting consistent with the transfer rail.

use proptest::prelude::*;
use ubi_ledger::{InMemoryCustody, LedgerConfig, RequestContext, UbiLedger};
use ubi_types::{Identity, ParameterKind, ProposalId};

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

const ADMIN: &str = "ubi-admin";
const POOL: &str = "ubi-pool";
const ACTORS: [&str; 5] = ["alice", "bob", "carol", "dave", POOL];

#[derive(Clone, Debug)]
enum Op {
    Register(usize),
    Verify(usize),
    Contribute(usize, u64),
    Claim(usize),
    Propose(usize, u64),
    Vote(usize, u64, bool),
    Finalize(u64),
    Pause,
    Unpause,
}

fn arb_actor() -> impl Strategy<Value = usize> {
    0..ACTORS.len()
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        arb_actor().prop_map(Op::Register),
        arb_actor().prop_map(Op::Verify),
        (arb_actor(), 0u64..5_000_000).prop_map(|(a, amount)| Op::Contribute(a, amount)),
        arb_actor().prop_map(Op::Claim),
        (arb_actor(), 1u64..3_000_000).prop_map(|(a, value)| Op::Propose(a, value)),
        (arb_actor(), 1u64..4, any::<bool>()).prop_map(|(a, id, support)| Op::Vote(a, id, support)),
        (1u64..4).prop_map(Op::Finalize),
        Just(Op::Pause),
        Just(Op::Unpause),
    ]
}

/// Operations paired with the height step taken before each one.
fn arb_script() -> impl Strategy<Value = Vec<(u64, Op)>> {
    prop::collection::vec((0u64..400, arb_op()), 1..60)
}

fn funded_ledger() -> UbiLedger<InMemoryCustody> {
    let mut ledger = UbiLedger::new(&LedgerConfig::default(), InMemoryCustody::new());
    for actor in ACTORS.into_iter().filter(|actor| *actor != POOL) {
        ledger.custody_mut().fund(&Identity::new(actor), 20_000_000);
    }
    ledger
}

fn apply(ledger: &mut UbiLedger<InMemoryCustody>, height: u64, op: &Op) {
    let ctx = |actor: usize| RequestContext::new(ACTORS[actor], height);
    let admin = RequestContext::new(ADMIN, height);
    // Rejections are expected; only the resulting state is checked.
    let _ = match op {
        Op::Register(a) => ledger.register(&ctx(*a)).map(drop),
        Op::Verify(a) => ledger
            .verify_participant(&admin, &Identity::new(ACTORS[*a]))
            .map(drop),
        Op::Contribute(a, amount) => ledger.contribute(&ctx(*a), *amount).map(drop),
        Op::Claim(a) => ledger.claim_ubi(&ctx(*a)).map(drop),
        Op::Propose(a, value) => ledger
            .submit_proposal(&ctx(*a), ParameterKind::PayoutAmount, *value)
            .map(drop),
        Op::Vote(a, id, support) => ledger.vote(&ctx(*a), ProposalId(*id), *support).map(drop),
        Op::Finalize(id) => ledger.finalize_proposal(&admin, ProposalId(*id)).map(drop),
        Op::Pause => ledger.pause(&admin),
        Op::Unpause => ledger.unpause(&admin),
    };
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// The pool balance always equals contributions minus payouts and
    /// matches what the rail holds for the pool account.
    #[test]
    fn pool_balance_matches_accounting_and_rail(script in arb_script()) {
        let mut ledger = funded_ledger();
        let pool = ledger.pool_account().clone();
        let mut height = 0u64;

        for (step, op) in &script {
            height += step;
            apply(&mut ledger, height, op);

            let info = ledger.get_distribution_info();
            prop_assert_eq!(info.balance, info.total_contributed - info.total_distributed);
            prop_assert_eq!(info.balance, ledger.custody().balance_of(&pool));

            let claimed: u64 = ledger
                .registry()
                .iter()
                .map(|(_, participant)| participant.total_claimed)
                .sum();
            prop_assert_eq!(claimed, info.total_distributed);
        }
    }

    /// Registration counters and vote records stay consistent with the
    /// stored records.
    #[test]
    fn counters_track_stored_records(script in arb_script()) {
        let mut ledger = funded_ledger();
        let mut height = 0u64;

        for (step, op) in &script {
            height += step;
            apply(&mut ledger, height, op);

            let status = ledger.get_contract_status();
            prop_assert_eq!(status.participant_count, ledger.registry().len() as u64);

            for proposal in ledger.governance().proposals() {
                let voters = ACTORS
                    .iter()
                    .filter(|actor| ledger.has_voted(proposal.id, &Identity::new(**actor)))
                    .count() as u64;
                prop_assert_eq!(proposal.tally().total(), voters);
            }
        }
    }

    /// A claim is only ever paid once per interval to the same identity.
    #[test]
    fn claims_respect_cooldown(script in arb_script()) {
        let mut ledger = funded_ledger();
        let mut height = 0u64;
        let mut last_paid: Vec<Option<u64>> = vec![None; ACTORS.len()];

        for (step, op) in &script {
            height += step;
            let before = ledger.get_distribution_info().total_distributed;
            let interval = ledger.get_distribution_info().payout_interval;
            apply(&mut ledger, height, op);

            if let Op::Claim(a) = op {
                if ledger.get_distribution_info().total_distributed > before {
                    if let Some(previous) = last_paid[*a] {
                        prop_assert!(height - previous >= interval);
                    }
                    last_paid[*a] = Some(height);
                }
            }
        }
    }
}
