//! Tagged outcomes of the reconciliation operations.
//!
//! Expected divergence (no change, not found, blocked, skipped) is data,
//! not an error: callers branch on these variants for routine flows.
//! `Failed` is reserved for transport, signing, and program rejections;
//! `Aborted` for cancellation.

use solana_sdk::{pubkey::Pubkey, signature::Signature};

use crate::errors::program_error;

/// Outcome of `ensure`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// The split did not exist and was created.
    Created {
        record: Pubkey,
        vault: Pubkey,
        signature: Signature,
        /// Lamports paid for rent exemption of the record and its vault.
        rent_paid: u64,
    },
    /// The split exists and already matches the desired recipients.
    NoChange { record: Pubkey, vault: Pubkey },
    /// The split existed with different recipients and was updated.
    Updated {
        record: Pubkey,
        vault: Pubkey,
        signature: Signature,
    },
    Blocked(Blocked),
    /// Cancelled before the transaction was accepted.
    Aborted,
    Failed(Failure),
}

/// Outcome of `update` (like `ensure`, but never creates).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated {
        record: Pubkey,
        vault: Pubkey,
        signature: Signature,
    },
    NoChange { record: Pubkey, vault: Pubkey },
    /// No record exists at the derived address.
    NotFound { record: Pubkey },
    Blocked(Blocked),
    Aborted,
    Failed(Failure),
}

/// Outcome of `execute`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecuteOutcome {
    Executed { signature: Signature },
    Skipped(SkipReason),
    Aborted,
    Failed(Failure),
}

/// Outcome of `close`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed {
        signature: Signature,
        /// Lamports returned to the recorded rent payer.
        rent_recovered: u64,
        /// Where the rent went: the payer recorded at creation, not
        /// necessarily the caller.
        rent_payer: Pubkey,
    },
    AlreadyClosed,
    Blocked(Blocked),
    Aborted,
    Failed(Failure),
}

/// Why `execute` did not submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotFound,
    NotASplit,
    BelowThreshold { balance: u64, threshold: u64 },
}

/// Caller action is required before the operation can proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blocked {
    pub reason: BlockReason,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    VaultNotEmpty,
    UnclaimedPending,
    NotAuthority,
    ReceivingAccountsMissing { missing: Vec<Pubkey> },
}

impl Blocked {
    pub fn vault_not_empty(vault: &Pubkey, balance: u64) -> Self {
        Self {
            reason: BlockReason::VaultNotEmpty,
            message: format!(
                "vault {} holds {} tokens; execute the split first",
                short_address(vault),
                balance
            ),
        }
    }

    pub fn unclaimed_pending(record: &Pubkey, total: u64) -> Self {
        Self {
            reason: BlockReason::UnclaimedPending,
            message: format!(
                "split {} carries {} tokens of unclaimed amounts; execute once the \
                 receiving accounts exist",
                short_address(record),
                total
            ),
        }
    }

    pub fn not_authority(record: &Pubkey, caller: &Pubkey, authority: &Pubkey) -> Self {
        Self {
            reason: BlockReason::NotAuthority,
            message: format!(
                "split {} is controlled by {}, caller is {}",
                short_address(record),
                short_address(authority),
                short_address(caller)
            ),
        }
    }

    pub fn receiving_accounts_missing(missing: Vec<Pubkey>) -> Self {
        let listed = missing
            .iter()
            .map(short_address)
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            message: format!("receiving accounts do not exist: {listed}"),
            reason: BlockReason::ReceivingAccountsMissing { missing },
        }
    }
}

/// Transport, signing, or ledger rejection. Returned, never thrown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    WalletRejected,
    WalletDisconnected,
    NetworkError(String),
    TransactionExpired,
    /// The program (or ledger state) rejected the operation. `code` is the
    /// program's numeric error when decodable.
    ProgramError { code: Option<u32>, message: String },
}

impl Failure {
    pub(crate) fn program(code: u32, message: String) -> Self {
        let message = match program_error::describe(code) {
            Some(known) if message.is_empty() => known.to_string(),
            _ => message,
        };
        Failure::ProgramError { code: Some(code), message }
    }

    /// The stale protocol-fee-recipient rejection that warrants the single
    /// cache-invalidating retry.
    pub(crate) fn is_stale_fee_recipient(&self) -> bool {
        matches!(
            self,
            Failure::ProgramError { code: Some(code), .. }
                if *code == program_error::INVALID_PROTOCOL_FEE_RECIPIENT
        )
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Failure::WalletRejected => write!(f, "wallet rejected the transaction"),
            Failure::WalletDisconnected => write!(f, "wallet is disconnected"),
            Failure::NetworkError(detail) => write!(f, "network error: {detail}"),
            Failure::TransactionExpired => write!(f, "transaction expired before confirmation"),
            Failure::ProgramError { code: Some(code), message } => {
                write!(f, "program error {code}: {message}")
            }
            Failure::ProgramError { code: None, message } => {
                write!(f, "program error: {message}")
            }
        }
    }
}

/// First and last four base58 characters, for log and message contexts.
pub(crate) fn short_address(address: &Pubkey) -> String {
    let full = address.to_string();
    format!("{}..{}", &full[..4], &full[full.len() - 4..])
}
