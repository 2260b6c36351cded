//! # ubi-ledger
//!
//! Application-level state machine of a community-governed, periodic-payout
//! treasury:
//!
//! - **Participant Registry**: registration, one-way verification, and the
//!   claim eligibility gate
//! - **Treasury Ledger**: the pooled balance, contributions, cooldown-gated
//!   claims, and the payout policy
//! - **Governance Engine**: time-boxed parameter-change proposals with one
//!   vote per registered identity
//!
//! ## Invariants
//!
//! - The pool balance never goes negative and always equals accepted
//!   contributions minus accepted payouts.
//! - A claim debits the pool and updates the participant record together,
//!   and only after the external transfer confirms.
//! - At most one vote record exists per (proposal, voter); records are never
//!   removed.
//! - Policy parameters change only by finalizing a passing proposal.
//!
//! ## Host integration
//!
//! The host supplies the caller identity and height per request
//! ([`RequestContext`]) and moves value through an [`AssetTransfer`]
//! implementation. [`InMemoryCustody`] is the bundled in-process rail.
//! [`SharedLedger`] serializes concurrently arriving requests.

pub mod config;
pub mod custody;
pub mod error;
pub mod governance;
pub mod journal;
pub mod ledger;
pub mod registry;
pub mod request;
pub mod shared;
mod staging;
pub mod telemetry;
pub mod treasury;

pub use config::{ConfigError, GovernanceConfig, LedgerConfig, LoggingConfig, PolicyConfig};
pub use custody::{AssetTransfer, InMemoryCustody, TransferError, TransferReceipt, TransferRequest};
pub use error::{ErrorBody, LedgerError};
pub use governance::GovernanceEngine;
pub use journal::{Journal, JournalEntry, LedgerEvent};
pub use ledger::{RequestContext, UbiLedger};
pub use registry::{Eligibility, IneligibleReason, ParticipantRegistry};
pub use request::{Request, Response};
pub use shared::SharedLedger;
pub use telemetry::init_tracing;
pub use treasury::Treasury;
