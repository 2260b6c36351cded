use serde::{Deserialize, Serialize};

use crate::ids::{Amount, Count, Height};

/// A registered participant.
///
/// Created on registration and never deleted. `last_claim_height` and
/// `total_claimed` only ever increase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub registered: bool,
    /// One-way flag; there is no un-verify path.
    pub verified: bool,
    pub join_height: Height,
    pub last_claim_height: Height,
    /// Sum of every accepted claim paid to this participant.
    pub total_claimed: Amount,
    pub claims_count: Count,
}

impl Participant {
    /// A freshly registered, unverified participant.
    pub fn new(join_height: Height) -> Self {
        Self {
            registered: true,
            verified: false,
            join_height,
            last_claim_height: 0,
            total_claimed: 0,
            claims_count: 0,
        }
    }

    /// Height units elapsed since the last accepted claim.
    pub fn blocks_since_claim(&self, height: Height) -> Height {
        height.saturating_sub(self.last_claim_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_participant_is_unverified_and_has_never_claimed() {
        let p = Participant::new(42);
        assert!(p.registered);
        assert!(!p.verified);
        assert_eq!(p.join_height, 42);
        assert_eq!(p.last_claim_height, 0);
        assert_eq!(p.total_claimed, 0);
        assert_eq!(p.claims_count, 0);
    }

    #[test]
    fn blocks_since_claim_never_underflows() {
        let mut p = Participant::new(0);
        p.last_claim_height = 500;
        assert_eq!(p.blocks_since_claim(644), 144);
        assert_eq!(p.blocks_since_claim(10), 0);
    }
}
