//! Capability boundary to the ledger and the signing wallet.
//!
//! The reconciliation engine is written against these traits, not against a
//! concrete RPC client, so the same outcome semantics can be implemented
//! once per chain adapter. Implementations translate their transport's
//! failures into the variants here; the engine maps them onto the outcome
//! taxonomy and never lets one escape as a panic or an unhandled error.

use async_trait::async_trait;
use solana_sdk::{hash::Hash, instruction::Instruction, pubkey::Pubkey, signature::Signature};
use thiserror::Error;

/// Confirmation strength for `confirm_transaction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Commitment {
    /// Lowest effort: the transaction was processed by a node.
    Processed,
    /// Standard: voted on by a supermajority (default).
    #[default]
    Confirmed,
    /// Strongest: rooted, will not be rolled back.
    Finalized,
}

/// Raw account snapshot as fetched from the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountData {
    pub lamports: u64,
    pub owner: Pubkey,
    pub data: Vec<u8>,
}

/// Recency token required to build a valid submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionContext {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

/// An unsigned instruction set assembled by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionPlan {
    pub instructions: Vec<Instruction>,
    pub payer: Pubkey,
}

/// A wallet-signed transaction ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub signature: Signature,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("network error: {0}")]
    Network(String),

    #[error("transaction expired before confirmation")]
    TransactionExpired,

    #[error("program rejected transaction: code {code}, {message}")]
    ProgramRejected { code: u32, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("user rejected the transaction")]
    Rejected,

    #[error("wallet is disconnected")]
    Disconnected,

    #[error("wallet error: {0}")]
    Other(String),
}

/// Read and submission capabilities of the ledger.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Fetch an account by address; `None` when it does not exist.
    async fn get_account(&self, address: &Pubkey) -> Result<Option<AccountData>, LedgerError>;

    /// Fetch a token account's balance; `None` when the account does not
    /// exist.
    async fn get_token_balance(&self, address: &Pubkey) -> Result<Option<u64>, LedgerError>;

    /// Fetch the recency token for a new submission.
    async fn latest_context(&self) -> Result<TransactionContext, LedgerError>;

    /// Submit a signed transaction, returning its reference.
    async fn submit_transaction(&self, tx: &SignedTransaction) -> Result<Signature, LedgerError>;

    /// Wait until the transaction reaches the given commitment.
    ///
    /// Implementations may block until expiry; the engine bounds the wait
    /// with its own timeout.
    async fn confirm_transaction(
        &self,
        signature: &Signature,
        commitment: Commitment,
    ) -> Result<(), LedgerError>;
}

/// Transaction signing capability of the wallet.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// The wallet's public address (fee payer and default authority).
    fn address(&self) -> Pubkey;

    /// Sign an assembled plan against a recency token.
    async fn sign_transaction(
        &self,
        plan: &TransactionPlan,
        context: &TransactionContext,
    ) -> Result<SignedTransaction, WalletError>;
}
