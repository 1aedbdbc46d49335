//! Share / basis-point conversion and payout math.
//!
//! Shares are the human-facing 1-100 percentages; the program stores basis
//! points out of 10,000 with 100 bps reserved as the protocol fee, so one
//! share is worth 99 bps. Payouts round down per recipient, with the final
//! recipient absorbing the rounding remainder of the recipient pool so no
//! unit is ever lost.

use solana_sdk::pubkey::Pubkey;

use crate::{
    constants::{BPS_DENOMINATOR, BPS_PER_SHARE, MAX_RECIPIENTS, REQUIRED_SPLIT_TOTAL},
    errors::SplitsError,
};

/// A recipient's human-facing percentage share (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareAssignment {
    pub address: Pubkey,
    pub share: u8,
}

/// One recipient's computed payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payout {
    pub recipient: Pubkey,
    pub amount: u64,
}

/// Result of distributing a balance: per-recipient payouts plus the protocol
/// fee. Never persisted; recomputed from the live balance on every use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    pub payouts: Vec<Payout>,
    pub protocol_fee: u64,
}

impl Distribution {
    /// Total paid to recipients.
    pub fn total_distributed(&self) -> u64 {
        self.payouts.iter().map(|p| p.amount).sum()
    }
}

/// Convert a 1-100 share to basis points (share x 99).
pub fn share_to_basis_points(share: u8) -> Result<u16, SplitsError> {
    if share == 0 || share > 100 {
        return Err(SplitsError::InvalidShare(share as u32));
    }
    Ok(share as u16 * BPS_PER_SHARE)
}

/// Convert basis points back to the nearest 1-100 share, ties rounding up.
pub fn basis_points_to_share(bps: u16) -> Result<u8, SplitsError> {
    if bps == 0 || bps > REQUIRED_SPLIT_TOTAL {
        return Err(SplitsError::InvalidBasisPoints(bps as u32));
    }
    // round(bps / 99), ties up
    let share = (bps as u32 * 2 + BPS_PER_SHARE as u32) / (BPS_PER_SHARE as u32 * 2);
    Ok(share as u8)
}

/// Compute exact per-recipient amounts for a vault balance, from 1-100
/// shares summing to exactly 100.
pub fn calculate_distribution(
    balance: u64,
    recipients: &[ShareAssignment],
) -> Result<Distribution, SplitsError> {
    if recipients.is_empty() {
        return Err(SplitsError::EmptyRecipients);
    }
    if recipients.len() > MAX_RECIPIENTS {
        return Err(SplitsError::InvalidRecipientCount(recipients.len()));
    }

    if let Some(bad) = recipients.iter().find(|r| r.share == 0 || r.share > 100) {
        return Err(SplitsError::InvalidShare(bad.share as u32));
    }

    let total_shares: u32 = recipients.iter().map(|r| r.share as u32).sum();
    if total_shares != 100 {
        return Err(SplitsError::SharesNotHundred(total_shares));
    }

    let in_bps: Vec<(Pubkey, u16)> = recipients
        .iter()
        .map(|r| Ok((r.address, share_to_basis_points(r.share)?)))
        .collect::<Result<_, SplitsError>>()?;
    distribute_basis_points(balance, &in_bps)
}

/// Compute exact per-recipient amounts from raw basis points summing to the
/// 9900-bps recipient pool (the form stored on-chain).
///
/// Every non-final recipient receives `floor(balance * bps / 10000)`; the
/// final recipient in input order receives the exact remainder of the
/// recipient pool (`floor(balance * 9900 / 10000)` minus prior allocations).
/// The protocol fee is whatever is left of the balance, so the sum of all
/// payouts plus the fee always equals the input balance.
pub fn distribute_basis_points(
    balance: u64,
    recipients: &[(Pubkey, u16)],
) -> Result<Distribution, SplitsError> {
    if recipients.is_empty() {
        return Err(SplitsError::EmptyRecipients);
    }
    if recipients.len() > MAX_RECIPIENTS {
        return Err(SplitsError::InvalidRecipientCount(recipients.len()));
    }

    let total_bps: u32 = recipients.iter().map(|(_, bps)| *bps as u32).sum();
    if total_bps != REQUIRED_SPLIT_TOTAL as u32 {
        return Err(SplitsError::InvalidSplitTotal(total_bps));
    }

    let recipient_pool = pool_of(balance, REQUIRED_SPLIT_TOTAL);
    let mut payouts = Vec::with_capacity(recipients.len());
    let mut allocated = 0u64;

    for (i, (address, bps)) in recipients.iter().enumerate() {
        let amount = if i == recipients.len() - 1 {
            recipient_pool - allocated
        } else {
            pool_of(balance, *bps)
        };
        allocated += amount;
        payouts.push(Payout {
            recipient: *address,
            amount,
        });
    }

    Ok(Distribution {
        payouts,
        protocol_fee: balance - recipient_pool,
    })
}

/// floor(balance * bps / 10000), widened to u128 so u64::MAX balances cannot
/// overflow.
fn pool_of(balance: u64, bps: u16) -> u64 {
    ((balance as u128 * bps as u128) / BPS_DENOMINATOR as u128) as u64
}
