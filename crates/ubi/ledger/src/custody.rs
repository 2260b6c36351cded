//! Asset movement: the host-provided transfer seam and an in-memory rail.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use ubi_types::{Amount, Identity};

/// A request to move `amount` from one account to another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from: Identity,
    pub to: Identity,
    pub amount: Amount,
}

/// Confirmation of a completed transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// Reference assigned by the transfer rail.
    pub reference: u64,
    pub request: TransferRequest,
}

/// Errors reported by a transfer rail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("insufficient funds in {account}: available {available}, requested {requested}")]
    InsufficientFunds {
        account: Identity,
        available: Amount,
        requested: Amount,
    },

    #[error("transfer declined: {0}")]
    Declined(String),
}

/// Moves value between accounts on behalf of the ledger.
///
/// Implementations confirm or fail synchronously within the calling
/// transition. A returned error means no value moved.
pub trait AssetTransfer {
    fn transfer(&mut self, request: &TransferRequest) -> Result<TransferReceipt, TransferError>;
}

impl<T: AssetTransfer + ?Sized> AssetTransfer for Box<T> {
    fn transfer(&mut self, request: &TransferRequest) -> Result<TransferReceipt, TransferError> {
        (**self).transfer(request)
    }
}

/// In-memory account balances with scriptable failures.
///
/// Used by tests and by hosts that keep custody inside the same process.
#[derive(Debug, Default)]
pub struct InMemoryCustody {
    balances: HashMap<Identity, Amount>,
    receipts: Vec<TransferReceipt>,
    pending_declines: Vec<String>,
    next_reference: u64,
}

impl InMemoryCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint `amount` into `account` outside of any ledger transition.
    pub fn fund(&mut self, account: &Identity, amount: Amount) {
        let balance = self.balances.entry(account.clone()).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    pub fn balance_of(&self, account: &Identity) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Decline the next transfer with `reason`. Calls queue up.
    pub fn decline_next(&mut self, reason: impl Into<String>) {
        self.pending_declines.push(reason.into());
    }

    /// Every confirmed transfer, oldest first.
    pub fn receipts(&self) -> &[TransferReceipt] {
        &self.receipts
    }
}

impl AssetTransfer for InMemoryCustody {
    fn transfer(&mut self, request: &TransferRequest) -> Result<TransferReceipt, TransferError> {
        if !self.pending_declines.is_empty() {
            let reason = self.pending_declines.remove(0);
            warn!(from = %request.from, to = %request.to, amount = request.amount, %reason, "Transfer declined");
            return Err(TransferError::Declined(reason));
        }

        let available = self.balance_of(&request.from);
        if available < request.amount {
            return Err(TransferError::InsufficientFunds {
                account: request.from.clone(),
                available,
                requested: request.amount,
            });
        }

        self.balances
            .insert(request.from.clone(), available - request.amount);
        self.fund(&request.to, request.amount);

        self.next_reference += 1;
        let receipt = TransferReceipt {
            reference: self.next_reference,
            request: request.clone(),
        };
        debug!(
            reference = receipt.reference,
            from = %request.from,
            to = %request.to,
            amount = request.amount,
            "Transfer confirmed"
        );
        self.receipts.push(receipt.clone());
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(from: &str, to: &str, amount: Amount) -> TransferRequest {
        TransferRequest {
            from: Identity::new(from),
            to: Identity::new(to),
            amount,
        }
    }

    #[test]
    fn transfer_moves_value_and_issues_receipt() {
        let mut custody = InMemoryCustody::new();
        custody.fund(&Identity::new("alice"), 100);

        let receipt = custody.transfer(&request("alice", "pool", 60)).unwrap();
        assert_eq!(receipt.reference, 1);
        assert_eq!(custody.balance_of(&Identity::new("alice")), 40);
        assert_eq!(custody.balance_of(&Identity::new("pool")), 60);
        assert_eq!(custody.receipts().len(), 1);
    }

    #[test]
    fn overdraft_is_rejected_without_movement() {
        let mut custody = InMemoryCustody::new();
        custody.fund(&Identity::new("alice"), 10);

        let err = custody.transfer(&request("alice", "pool", 11)).unwrap_err();
        assert!(matches!(err, TransferError::InsufficientFunds { available: 10, .. }));
        assert_eq!(custody.balance_of(&Identity::new("alice")), 10);
        assert!(custody.receipts().is_empty());
    }

    #[test]
    fn scripted_decline_applies_once() {
        let mut custody = InMemoryCustody::new();
        custody.fund(&Identity::new("alice"), 10);
        custody.decline_next("rail offline");

        assert_eq!(
            custody.transfer(&request("alice", "pool", 5)),
            Err(TransferError::Declined("rail offline".into()))
        );
        assert!(custody.transfer(&request("alice", "pool", 5)).is_ok());
    }
}
