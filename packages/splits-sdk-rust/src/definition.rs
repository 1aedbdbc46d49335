//! Desired split configuration, validated at construction.
//!
//! A `SplitDefinition` is valid by construction: the engine never re-checks
//! recipient invariants at reconciliation time, and malformed input fails
//! synchronously here instead of surfacing as a runtime outcome.

use solana_sdk::pubkey::Pubkey;

use crate::{
    codec::RecipientEntry,
    constants::{MAX_RECIPIENTS, MIN_RECIPIENTS, REQUIRED_SPLIT_TOTAL},
    distribution::share_to_basis_points,
    errors::SplitsError,
};

/// A desired recipient, stored in on-chain basis points regardless of which
/// constructor produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesiredRecipient {
    pub address: Pubkey,
    pub percentage_bps: u16,
}

impl DesiredRecipient {
    /// From a human-facing 1-100 share.
    pub fn from_share(address: Pubkey, share: u8) -> Result<Self, SplitsError> {
        Ok(Self {
            address,
            percentage_bps: share_to_basis_points(share)?,
        })
    }

    /// From raw basis points (1-9900).
    pub fn from_basis_points(address: Pubkey, bps: u16) -> Result<Self, SplitsError> {
        if bps == 0 || bps > REQUIRED_SPLIT_TOTAL {
            return Err(SplitsError::InvalidBasisPoints(bps as u32));
        }
        Ok(Self {
            address,
            percentage_bps: bps,
        })
    }
}

/// The desired on-chain state of one split: who controls it, which token it
/// splits, its unique id, and the recipient set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitDefinition {
    pub authority: Pubkey,
    pub mint: Pubkey,
    pub unique_id: Pubkey,
    recipients: Vec<DesiredRecipient>,
}

impl SplitDefinition {
    /// Validates the recipient list the way the program will: 1-20 unique,
    /// non-zero addresses whose basis points sum to exactly 9900.
    pub fn new(
        authority: Pubkey,
        mint: Pubkey,
        unique_id: Pubkey,
        recipients: Vec<DesiredRecipient>,
    ) -> Result<Self, SplitsError> {
        if !(MIN_RECIPIENTS..=MAX_RECIPIENTS).contains(&recipients.len()) {
            return Err(SplitsError::InvalidRecipientCount(recipients.len()));
        }
        if recipients.iter().any(|r| r.address == Pubkey::default()) {
            return Err(SplitsError::ZeroAddress);
        }
        for (i, recipient) in recipients.iter().enumerate() {
            if recipients[i + 1..].iter().any(|r| r.address == recipient.address) {
                return Err(SplitsError::DuplicateRecipient);
            }
        }

        let total_bps: u32 = recipients.iter().map(|r| r.percentage_bps as u32).sum();
        if total_bps != REQUIRED_SPLIT_TOTAL as u32 {
            return Err(SplitsError::InvalidSplitTotal(total_bps));
        }

        Ok(Self {
            authority,
            mint,
            unique_id,
            recipients,
        })
    }

    pub fn recipients(&self) -> &[DesiredRecipient] {
        &self.recipients
    }

    pub(crate) fn recipient_entries(&self) -> Vec<RecipientEntry> {
        self.recipients
            .iter()
            .map(|r| RecipientEntry {
                address: r.address,
                percentage_bps: r.percentage_bps,
            })
            .collect()
    }

    /// Order-independent comparison against a decoded on-chain recipient
    /// list.
    pub(crate) fn matches_recipients(&self, on_chain: &[RecipientEntry]) -> bool {
        if self.recipients.len() != on_chain.len() {
            return false;
        }
        let mut desired: Vec<(Pubkey, u16)> = self
            .recipients
            .iter()
            .map(|r| (r.address, r.percentage_bps))
            .collect();
        let mut current: Vec<(Pubkey, u16)> = on_chain
            .iter()
            .map(|r| (r.address, r.percentage_bps))
            .collect();
        desired.sort_unstable();
        current.sort_unstable();
        desired == current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipient(share: u8) -> DesiredRecipient {
        DesiredRecipient::from_share(Pubkey::new_unique(), share).unwrap()
    }

    #[test]
    fn accepts_valid_definition() {
        let def = SplitDefinition::new(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            vec![recipient(60), recipient(40)],
        )
        .unwrap();
        assert_eq!(def.recipients().len(), 2);
    }

    #[test]
    fn rejects_bad_totals_and_duplicates() {
        let authority = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let id = Pubkey::new_unique();

        assert_eq!(
            SplitDefinition::new(authority, mint, id, vec![]),
            Err(SplitsError::InvalidRecipientCount(0))
        );
        assert_eq!(
            SplitDefinition::new(authority, mint, id, vec![recipient(60), recipient(30)]),
            Err(SplitsError::InvalidSplitTotal(8910))
        );

        let dup = Pubkey::new_unique();
        assert_eq!(
            SplitDefinition::new(
                authority,
                mint,
                id,
                vec![
                    DesiredRecipient::from_share(dup, 60).unwrap(),
                    DesiredRecipient::from_share(dup, 40).unwrap(),
                ],
            ),
            Err(SplitsError::DuplicateRecipient)
        );
    }

    #[test]
    fn recipient_comparison_is_order_independent() {
        let a = DesiredRecipient::from_share(Pubkey::new_unique(), 70).unwrap();
        let b = DesiredRecipient::from_share(Pubkey::new_unique(), 30).unwrap();
        let def = SplitDefinition::new(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            vec![a, b],
        )
        .unwrap();

        let reversed = vec![
            RecipientEntry { address: b.address, percentage_bps: b.percentage_bps },
            RecipientEntry { address: a.address, percentage_bps: a.percentage_bps },
        ];
        assert!(def.matches_recipients(&reversed));

        let different = vec![
            RecipientEntry { address: a.address, percentage_bps: a.percentage_bps },
            RecipientEntry { address: Pubkey::new_unique(), percentage_bps: b.percentage_bps },
        ];
        assert!(!def.matches_recipients(&different));
    }
}
