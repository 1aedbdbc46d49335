//! Input-validation errors and the on-chain error code table.
//!
//! `SplitsError` covers caller bugs only: malformed labels, shares, or
//! recipient lists are rejected synchronously before anything touches the
//! ledger. Runtime divergence (not-found, blocked, transport failures) is
//! never an error here — it comes back as a tagged outcome (see `outcome`).

use thiserror::Error;

use crate::constants::{MAX_LABEL_LEN, MAX_RECIPIENTS, MIN_RECIPIENTS, REQUIRED_SPLIT_TOTAL};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitsError {
    #[error("label is {0} bytes, max is {MAX_LABEL_LEN}")]
    LabelTooLong(usize),

    #[error("share must be between 1 and 100, got {0}")]
    InvalidShare(u32),

    #[error("basis points must be between 1 and {REQUIRED_SPLIT_TOTAL}, got {0}")]
    InvalidBasisPoints(u32),

    #[error("recipient list is empty")]
    EmptyRecipients,

    #[error("recipient shares must sum to 100, got {0}")]
    SharesNotHundred(u32),

    #[error("recipient count must be between {MIN_RECIPIENTS} and {MAX_RECIPIENTS}, got {0}")]
    InvalidRecipientCount(usize),

    #[error("recipient basis points must sum to {REQUIRED_SPLIT_TOTAL}, got {0}")]
    InvalidSplitTotal(u32),

    #[error("duplicate recipient address")]
    DuplicateRecipient,

    #[error("recipient address cannot be the zero address")]
    ZeroAddress,
}

/// Error codes of the deployed program (Anchor custom errors start at 6000,
/// in declaration order of the program's `ErrorCode` enum).
pub mod program_error {
    pub const INVALID_RECIPIENT_COUNT: u32 = 6000;
    pub const INVALID_SPLIT_TOTAL: u32 = 6001;
    pub const DUPLICATE_RECIPIENT: u32 = 6002;
    pub const ZERO_ADDRESS: u32 = 6003;
    pub const ZERO_PERCENTAGE: u32 = 6004;
    pub const RECIPIENT_ATA_DOES_NOT_EXIST: u32 = 6005;
    pub const RECIPIENT_ATA_INVALID: u32 = 6006;
    pub const RECIPIENT_ATA_WRONG_OWNER: u32 = 6007;
    pub const RECIPIENT_ATA_WRONG_MINT: u32 = 6008;
    pub const VAULT_NOT_EMPTY: u32 = 6009;
    pub const INVALID_VAULT: u32 = 6010;
    pub const INSUFFICIENT_REMAINING_ACCOUNTS: u32 = 6011;
    pub const MATH_OVERFLOW: u32 = 6012;
    pub const MATH_UNDERFLOW: u32 = 6013;
    pub const INVALID_PROTOCOL_FEE_RECIPIENT: u32 = 6014;
    pub const UNAUTHORIZED: u32 = 6015;
    pub const ALREADY_INITIALIZED: u32 = 6016;
    pub const UNCLAIMED_NOT_EMPTY: u32 = 6017;
    pub const INVALID_TOKEN_PROGRAM: u32 = 6018;
    pub const NO_PENDING_TRANSFER: u32 = 6019;
    pub const INVALID_RENT_DESTINATION: u32 = 6020;

    /// Message for a known program error code, mirroring the program's
    /// `#[msg]` strings.
    pub fn describe(code: u32) -> Option<&'static str> {
        Some(match code {
            INVALID_RECIPIENT_COUNT => "Recipient count must be between 1 and 20",
            INVALID_SPLIT_TOTAL => "Recipient percentages must sum to 9900 bps (99%)",
            DUPLICATE_RECIPIENT => "Duplicate recipient address",
            ZERO_ADDRESS => "Recipient address cannot be zero",
            ZERO_PERCENTAGE => "Recipient percentage cannot be zero",
            RECIPIENT_ATA_DOES_NOT_EXIST => "Recipient ATA does not exist",
            RECIPIENT_ATA_INVALID => "Recipient ATA is invalid",
            RECIPIENT_ATA_WRONG_OWNER => "Recipient ATA has wrong owner",
            RECIPIENT_ATA_WRONG_MINT => "Recipient ATA has wrong mint",
            VAULT_NOT_EMPTY => "Vault must be empty for this operation",
            INVALID_VAULT => "Invalid vault account",
            INSUFFICIENT_REMAINING_ACCOUNTS => {
                "Not enough accounts provided in remaining_accounts"
            }
            MATH_OVERFLOW => "Math overflow",
            MATH_UNDERFLOW => "Math underflow",
            INVALID_PROTOCOL_FEE_RECIPIENT => "Invalid protocol fee recipient",
            UNAUTHORIZED => "Unauthorized",
            ALREADY_INITIALIZED => "Protocol already initialized",
            UNCLAIMED_NOT_EMPTY => "Unclaimed amounts must be zero to close",
            INVALID_TOKEN_PROGRAM => "Invalid token program",
            NO_PENDING_TRANSFER => "No pending authority transfer",
            INVALID_RENT_DESTINATION => "Rent destination does not match recorded rent payer",
            _ => return None,
        })
    }
}
