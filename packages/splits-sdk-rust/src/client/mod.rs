//! The reconciliation engine.
//!
//! `SplitsClient` reads authoritative state through the ledger trait,
//! decides the minimal action, and drives it through sign -> submit ->
//! confirm. Every public operation is stateless across calls (the two
//! caches are the only shared state), re-reads before deciding, and holds
//! no lock across an await.

mod close;
mod ensure;
mod execute;

use std::{sync::Arc, time::Duration};

use log::{debug, warn};
use solana_sdk::{
    compute_budget::ComputeBudgetInstruction, instruction::Instruction, pubkey::Pubkey,
    signature::Signature,
};
use tokio_util::sync::CancellationToken;

use crate::{
    cache::{ProtocolConfigCache, SplitIdentityCache},
    codec::{
        decode_protocol_config, decode_split_config, Decoded, ProtocolConfigAccount,
        SplitConfigAccount,
    },
    constants::PROGRAM_ID,
    distribution::{distribute_basis_points, Distribution},
    errors::program_error,
    ledger::{
        AccountData, Commitment, LedgerClient, LedgerError, TransactionPlan, WalletError,
        WalletSigner,
    },
    outcome::{short_address, Failure},
    pda::{derive_protocol_config, derive_recipient_ata, TokenProgram},
};

/// Default bound on the submit-and-confirm wait.
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Confirmation strength to wait for after submission.
    pub commitment: Commitment,
    /// Optional compute budget hints, passed through when set.
    pub compute_unit_price: Option<u64>,
    pub compute_unit_limit: Option<u32>,
    /// Create missing receiving accounts inside the same transaction
    /// (`ensure`/`update`); when off, missing accounts block instead.
    pub create_missing_receiving_accounts: bool,
    /// Run an inline execute when `close` finds a non-empty vault or
    /// pending unclaimed amounts; when off, those block instead.
    pub auto_execute_on_close: bool,
    /// Skip `execute` submission below this vault balance, to batch many
    /// small inflows before paying transaction cost.
    pub min_balance_threshold: Option<u64>,
    /// Maximum wait for confirmation before `transaction_expired`.
    pub confirmation_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            commitment: Commitment::Confirmed,
            compute_unit_price: None,
            compute_unit_limit: None,
            create_missing_receiving_accounts: true,
            auto_execute_on_close: true,
            min_balance_threshold: None,
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
        }
    }
}

/// What a record lookup found. Re-fetched at the start of every operation;
/// never carried across calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitLookup {
    Missing,
    NotASplit,
    Valid {
        account: Box<SplitConfigAccount>,
        lamports: u64,
    },
}

/// Client-side preview of what an execute would distribute right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPreview {
    /// Vault balance not reserved by unclaimed carry-overs.
    pub available: u64,
    pub distribution: Distribution,
    /// Unclaimed carry-overs an execute would additionally try to clear.
    pub pending_unclaimed: u64,
    pub pending_protocol_unclaimed: u64,
}

/// Internal short-circuit for operations: cancelled or failed.
pub(crate) enum OpError {
    Aborted,
    Failed(Failure),
}

impl From<Failure> for OpError {
    fn from(failure: Failure) -> Self {
        OpError::Failed(failure)
    }
}

pub(crate) fn classify_ledger(error: LedgerError) -> Failure {
    match error {
        LedgerError::Network(detail) => Failure::NetworkError(detail),
        LedgerError::TransactionExpired => Failure::TransactionExpired,
        LedgerError::ProgramRejected { code, message } => Failure::program(code, message),
    }
}

pub(crate) fn classify_wallet(error: WalletError) -> Failure {
    match error {
        WalletError::Rejected => Failure::WalletRejected,
        WalletError::Disconnected => Failure::WalletDisconnected,
        WalletError::Other(detail) => Failure::NetworkError(detail),
    }
}

/// Reconciliation client for Cascade splits.
pub struct SplitsClient {
    ledger: Arc<dyn LedgerClient>,
    wallet: Arc<dyn WalletSigner>,
    config: ClientConfig,
    identity_cache: SplitIdentityCache,
    protocol_cache: ProtocolConfigCache,
}

impl SplitsClient {
    pub fn new(ledger: Arc<dyn LedgerClient>, wallet: Arc<dyn WalletSigner>) -> Self {
        Self::with_config(ledger, wallet, ClientConfig::default())
    }

    pub fn with_config(
        ledger: Arc<dyn LedgerClient>,
        wallet: Arc<dyn WalletSigner>,
        config: ClientConfig,
    ) -> Self {
        Self {
            ledger,
            wallet,
            config,
            identity_cache: SplitIdentityCache::new(),
            protocol_cache: ProtocolConfigCache::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The positive-only split identity cache.
    pub fn identity_cache(&self) -> &SplitIdentityCache {
        &self.identity_cache
    }

    /// The protocol config cache. Invalidate after an admin fee-wallet
    /// rotation to avoid the one stale-submit round trip.
    pub fn protocol_cache(&self) -> &ProtocolConfigCache {
        &self.protocol_cache
    }

    /// Check whether an address holds a valid split record.
    ///
    /// Positive answers are cached; a cached hit performs no ledger read.
    /// Negative answers are always re-read, because the record may be
    /// created later.
    pub async fn is_split(&self, address: &Pubkey) -> Result<bool, Failure> {
        if self.identity_cache.contains(address) {
            debug!("split identity cache hit for {}", short_address(address));
            return Ok(true);
        }
        Ok(matches!(
            self.lookup_split(address).await?,
            SplitLookup::Valid { .. }
        ))
    }

    /// Fetch and decode a split record.
    pub async fn get_split_config(&self, address: &Pubkey) -> Result<SplitLookup, Failure> {
        self.lookup_split(address).await
    }

    /// Vault balance of a split; `None` when no split record exists at the
    /// address.
    pub async fn get_split_balance(&self, address: &Pubkey) -> Result<Option<u64>, Failure> {
        match self.lookup_split(address).await? {
            SplitLookup::Valid { account, .. } => {
                let balance = self.token_balance(&account.vault).await?;
                Ok(Some(balance))
            }
            _ => Ok(None),
        }
    }

    /// Preview what an execute would distribute from the current vault
    /// balance; `None` when no split record exists at the address.
    pub async fn preview_execution(
        &self,
        address: &Pubkey,
    ) -> Result<Option<ExecutionPreview>, Failure> {
        let account = match self.lookup_split(address).await? {
            SplitLookup::Valid { account, .. } => account,
            _ => return Ok(None),
        };

        let balance = self.token_balance(&account.vault).await?;
        let pending_unclaimed: u64 = account.unclaimed.iter().map(|u| u.amount).sum();
        let available = balance
            .saturating_sub(pending_unclaimed)
            .saturating_sub(account.protocol_unclaimed);

        let in_bps: Vec<(Pubkey, u16)> = account
            .recipients
            .iter()
            .map(|r| (r.address, r.percentage_bps))
            .collect();
        let distribution = distribute_basis_points(available, &in_bps).map_err(|e| {
            // A decoded record violating its own invariant is ledger drift,
            // not caller input
            Failure::ProgramError {
                code: None,
                message: format!("split {} is malformed: {e}", short_address(address)),
            }
        })?;

        Ok(Some(ExecutionPreview {
            available,
            distribution,
            pending_unclaimed,
            pending_protocol_unclaimed: account.protocol_unclaimed,
        }))
    }

    // ---- shared internals ----

    pub(crate) async fn fetch_account(
        &self,
        address: &Pubkey,
    ) -> Result<Option<AccountData>, Failure> {
        self.ledger
            .get_account(address)
            .await
            .map_err(classify_ledger)
    }

    pub(crate) async fn token_balance(&self, address: &Pubkey) -> Result<u64, Failure> {
        Ok(self
            .ledger
            .get_token_balance(address)
            .await
            .map_err(classify_ledger)?
            .unwrap_or(0))
    }

    /// Fetch-and-classify a split record, maintaining the identity cache:
    /// confirmed positives are inserted, anything else invalidates a stale
    /// entry.
    pub(crate) async fn lookup_split(&self, address: &Pubkey) -> Result<SplitLookup, Failure> {
        let Some(raw) = self.fetch_account(address).await? else {
            self.identity_cache.invalidate(address);
            return Ok(SplitLookup::Missing);
        };

        if raw.owner != PROGRAM_ID {
            self.identity_cache.invalidate(address);
            return Ok(SplitLookup::NotASplit);
        }

        match decode_split_config(&raw.data) {
            Decoded::Valid(account) => {
                self.identity_cache.insert(*address);
                Ok(SplitLookup::Valid {
                    account: Box::new(account),
                    lamports: raw.lamports,
                })
            }
            Decoded::WrongSize { .. } | Decoded::WrongDiscriminator { .. } => {
                self.identity_cache.invalidate(address);
                Ok(SplitLookup::NotASplit)
            }
        }
    }

    /// Protocol config through the single-slot cache.
    pub(crate) async fn protocol_config(&self) -> Result<ProtocolConfigAccount, Failure> {
        if let Some(config) = self.protocol_cache.get() {
            debug!("protocol config cache hit");
            return Ok(config);
        }

        let (address, _) = derive_protocol_config();
        let raw = self.fetch_account(&address).await?.ok_or_else(|| {
            Failure::ProgramError {
                code: None,
                message: "protocol config is not initialized".to_string(),
            }
        })?;

        match decode_protocol_config(&raw.data) {
            Decoded::Valid(config) => {
                self.protocol_cache.store(config);
                Ok(config)
            }
            Decoded::WrongSize { actual, expected } => Err(Failure::ProgramError {
                code: None,
                message: format!(
                    "protocol config has unexpected size {actual} (expected {expected})"
                ),
            }),
            Decoded::WrongDiscriminator { .. } => Err(Failure::ProgramError {
                code: None,
                message: "protocol config has unexpected discriminator".to_string(),
            }),
        }
    }

    /// Resolve which token program owns the mint.
    pub(crate) async fn token_program_for_mint(
        &self,
        mint: &Pubkey,
    ) -> Result<TokenProgram, Failure> {
        let raw = self
            .fetch_account(mint)
            .await?
            .ok_or_else(|| Failure::ProgramError {
                code: None,
                message: format!("mint {} does not exist", short_address(mint)),
            })?;
        TokenProgram::from_owner(&raw.owner).ok_or_else(|| Failure::ProgramError {
            code: Some(program_error::INVALID_TOKEN_PROGRAM),
            message: format!("mint {} is not owned by a token program", short_address(mint)),
        })
    }

    /// Receiving accounts that do not exist yet, as (owner, ata) pairs.
    pub(crate) async fn missing_receiving_accounts(
        &self,
        owners: &[Pubkey],
        mint: &Pubkey,
        token_program: TokenProgram,
    ) -> Result<Vec<(Pubkey, Pubkey)>, Failure> {
        let mut missing = Vec::new();
        for owner in owners {
            let ata = derive_recipient_ata(owner, mint, token_program);
            if self.fetch_account(&ata).await?.is_none() {
                missing.push((*owner, ata));
            }
        }
        Ok(missing)
    }

    /// Compute budget hints, when configured, ahead of the main instruction.
    pub(crate) fn base_instructions(&self) -> Vec<Instruction> {
        let mut instructions = Vec::new();
        if let Some(limit) = self.config.compute_unit_limit {
            instructions.push(ComputeBudgetInstruction::set_compute_unit_limit(limit));
        }
        if let Some(price) = self.config.compute_unit_price {
            instructions.push(ComputeBudgetInstruction::set_compute_unit_price(price));
        }
        instructions
    }

    pub(crate) fn wallet_address(&self) -> Pubkey {
        self.wallet.address()
    }

    /// Race a fallible read against cancellation.
    pub(crate) async fn guard<T>(
        &self,
        cancel: &CancellationToken,
        fut: impl std::future::Future<Output = Result<T, Failure>>,
    ) -> Result<T, OpError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(OpError::Aborted),
            result = fut => result.map_err(OpError::Failed),
        }
    }

    /// The submit-and-confirm round trip.
    ///
    /// Cancellation before submission aborts without submitting anything;
    /// cancellation between submission and confirmation returns `Aborted`
    /// without trying to cancel a transaction the ledger may already have
    /// accepted. The confirmation wait is bounded by the configured timeout.
    pub(crate) async fn sign_submit_confirm(
        &self,
        cancel: &CancellationToken,
        plan: TransactionPlan,
    ) -> Result<Signature, OpError> {
        let context = self
            .guard(cancel, async {
                self.ledger.latest_context().await.map_err(classify_ledger)
            })
            .await?;

        let signed = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(OpError::Aborted),
            result = self.wallet.sign_transaction(&plan, &context) => {
                result.map_err(|e| OpError::Failed(classify_wallet(e)))?
            }
        };

        if cancel.is_cancelled() {
            return Err(OpError::Aborted);
        }

        // Point of no return: once submitted, the transaction may land even
        // if this call stops waiting for it
        let signature = self
            .ledger
            .submit_transaction(&signed)
            .await
            .map_err(|e| OpError::Failed(classify_ledger(e)))?;

        debug!("submitted {signature}, awaiting {:?}", self.config.commitment);

        let confirm = self
            .ledger
            .confirm_transaction(&signature, self.config.commitment);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(OpError::Aborted),
            result = tokio::time::timeout(self.config.confirmation_timeout, confirm) => {
                match result {
                    Err(_elapsed) => Err(OpError::Failed(Failure::TransactionExpired)),
                    Ok(confirmed) => {
                        confirmed.map_err(|e| OpError::Failed(classify_ledger(e)))?;
                        Ok(signature)
                    }
                }
            }
        }
    }

    /// Submit with at most one retry, gated by a failure classifier.
    ///
    /// The plan is rebuilt for the retry after invalidating the protocol
    /// config cache, so a submission that failed against a rotated fee
    /// wallet is retried against the refetched one. This is the only
    /// implicit retry in the engine.
    pub(crate) async fn submit_with_retry<F, Fut>(
        &self,
        cancel: &CancellationToken,
        build_plan: F,
        should_retry: impl Fn(&Failure) -> bool,
    ) -> Result<Signature, OpError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<TransactionPlan, OpError>>,
    {
        let plan = build_plan().await?;
        match self.sign_submit_confirm(cancel, plan).await {
            Err(OpError::Failed(failure)) if should_retry(&failure) => {
                warn!("retrying once after: {failure}");
                self.protocol_cache.invalidate();
                let plan = build_plan().await?;
                self.sign_submit_confirm(cancel, plan).await
            }
            other => other,
        }
    }
}
