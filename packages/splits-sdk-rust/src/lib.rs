//! Rust client SDK for Cascade Splits on Solana.
//!
//! A split is an on-chain record dividing future token inflows among up to
//! 20 recipients by percentage, enforced by the deployed Cascade Splits
//! program. This crate is the reconciliation and codec layer: it derives
//! the deterministic addresses, speaks the program's exact byte format, and
//! drives idempotent `ensure` / `update` / `execute` / `close` operations
//! whose outcomes are tagged results rather than exceptions.
//!
//! ```no_run
//! use std::sync::Arc;
//! use cascade_splits_sdk::{
//!     label_to_unique_id, CancellationToken, DesiredRecipient, EnsureOutcome,
//!     SplitDefinition, SplitsClient,
//! };
//! # use cascade_splits_sdk::ledger::{LedgerClient, WalletSigner};
//! # async fn demo(
//! #     ledger: Arc<dyn LedgerClient>,
//! #     wallet: Arc<dyn WalletSigner>,
//! #     alice: solana_sdk::pubkey::Pubkey,
//! #     bob: solana_sdk::pubkey::Pubkey,
//! #     usdc: solana_sdk::pubkey::Pubkey,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let client = SplitsClient::new(ledger, wallet.clone());
//! let desired = SplitDefinition::new(
//!     wallet.address(),
//!     usdc,
//!     label_to_unique_id("team-payouts")?,
//!     vec![
//!         DesiredRecipient::from_share(alice, 60)?,
//!         DesiredRecipient::from_share(bob, 40)?,
//!     ],
//! )?;
//!
//! match client.ensure(&desired, &CancellationToken::new()).await {
//!     EnsureOutcome::Created { record, .. } => println!("created {record}"),
//!     EnsureOutcome::NoChange { .. } => println!("already in sync"),
//!     other => println!("{other:?}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod codec;
pub mod constants;
pub mod definition;
pub mod distribution;
pub mod errors;
pub mod ledger;
pub mod outcome;
pub mod pda;

mod client;

pub use client::{
    ClientConfig, ExecutionPreview, SplitLookup, SplitsClient, DEFAULT_CONFIRMATION_TIMEOUT,
};
pub use codec::{Decoded, ProtocolConfigAccount, RecipientEntry, SplitConfigAccount, UnclaimedEntry};
pub use definition::{DesiredRecipient, SplitDefinition};
pub use distribution::{calculate_distribution, Distribution, Payout, ShareAssignment};
pub use errors::SplitsError;
pub use ledger::Commitment;
pub use outcome::{
    BlockReason, Blocked, CloseOutcome, EnsureOutcome, ExecuteOutcome, Failure, SkipReason,
    UpdateOutcome,
};
pub use pda::{
    derive_protocol_config, derive_recipient_ata, derive_split_config, derive_vault,
    label_to_unique_id, unique_id_to_label, TokenProgram,
};

// Re-exported so callers don't need a direct tokio-util dependency for the
// cancellation parameter.
pub use tokio_util::sync::CancellationToken;
