//! Test doubles for the ledger and wallet traits, plus account fixtures.
//!
//! `MockLedger` plays the role the SVM harness plays for the on-chain
//! program: tests script account states, stage the state a submission
//! confirms into, inject failures, and count reads and submissions.
#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use solana_sdk::{hash::Hash, pubkey::Pubkey, rent::Rent, signature::Signature};

use cascade_splits_sdk::{
    codec::{encode_protocol_config, encode_split_config},
    constants::{PROGRAM_ID, SPLIT_CONFIG_SIZE, TOKEN_ACCOUNT_SIZE},
    derive_protocol_config, derive_split_config, derive_vault,
    ledger::{
        AccountData, Commitment, LedgerClient, LedgerError, SignedTransaction, TransactionContext,
        TransactionPlan, WalletError, WalletSigner,
    },
    ClientConfig, ProtocolConfigAccount, RecipientEntry, SplitConfigAccount, SplitsClient,
    TokenProgram,
};

/// State applied to the ledger when a submission succeeds, modeling the
/// confirmed effect of that transaction.
#[derive(Default)]
pub struct Staged {
    pub accounts: Vec<(Pubkey, AccountData)>,
    pub balances: Vec<(Pubkey, u64)>,
}

#[derive(Default)]
struct LedgerState {
    accounts: HashMap<Pubkey, AccountData>,
    balances: HashMap<Pubkey, u64>,
    reads: HashMap<Pubkey, usize>,
    submit_failures: VecDeque<LedgerError>,
    staged: VecDeque<Staged>,
    submissions: usize,
}

#[derive(Default)]
pub struct MockLedger {
    state: Mutex<LedgerState>,
    confirm_hangs: AtomicBool,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap()
    }

    pub fn add_account(&self, address: Pubkey, account: AccountData) {
        self.lock().accounts.insert(address, account);
    }

    /// An SPL mint account (only its owner matters to the client).
    pub fn add_mint(&self, mint: Pubkey) {
        self.add_account(
            mint,
            AccountData {
                lamports: 1_000_000,
                owner: spl_token::id(),
                data: vec![0u8; 82],
            },
        );
    }

    /// A token account with a balance (vault or receiving account).
    pub fn add_token_account(&self, address: Pubkey, balance: u64) {
        let mut state = self.lock();
        state.accounts.insert(
            address,
            AccountData {
                lamports: Rent::default().minimum_balance(TOKEN_ACCOUNT_SIZE),
                owner: spl_token::id(),
                data: vec![0u8; TOKEN_ACCOUNT_SIZE],
            },
        );
        state.balances.insert(address, balance);
    }

    /// A split config record, program-owned and rent exempt.
    pub fn add_split_config(&self, record: Pubkey, account: &SplitConfigAccount) {
        self.add_account(
            record,
            AccountData {
                lamports: Rent::default().minimum_balance(SPLIT_CONFIG_SIZE),
                owner: PROGRAM_ID,
                data: encode_split_config(account).unwrap(),
            },
        );
    }

    /// The protocol config singleton; returns its PDA.
    pub fn add_protocol_config(&self, authority: Pubkey, fee_wallet: Pubkey) -> Pubkey {
        let (address, bump) = derive_protocol_config();
        self.add_account(
            address,
            AccountData {
                lamports: 1_000_000,
                owner: PROGRAM_ID,
                data: encode_protocol_config(&ProtocolConfigAccount {
                    authority,
                    pending_authority: Pubkey::default(),
                    fee_wallet,
                    bump,
                }),
            },
        );
        address
    }

    /// Queue state to apply when the next submission succeeds.
    pub fn stage_on_submit(&self, staged: Staged) {
        self.lock().staged.push_back(staged);
    }

    /// Queue a failure for the next submission attempt.
    pub fn fail_next_submit(&self, error: LedgerError) {
        self.lock().submit_failures.push_back(error);
    }

    /// Make `confirm_transaction` block until the caller's timeout or
    /// cancellation fires.
    pub fn hang_confirmations(&self) {
        self.confirm_hangs.store(true, Ordering::SeqCst);
    }

    pub fn submissions(&self) -> usize {
        self.lock().submissions
    }

    pub fn reads_of(&self, address: &Pubkey) -> usize {
        self.lock().reads.get(address).copied().unwrap_or(0)
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<AccountData>, LedgerError> {
        let mut state = self.lock();
        *state.reads.entry(*address).or_insert(0) += 1;
        Ok(state.accounts.get(address).cloned())
    }

    async fn get_token_balance(&self, address: &Pubkey) -> Result<Option<u64>, LedgerError> {
        Ok(self.lock().balances.get(address).copied())
    }

    async fn latest_context(&self) -> Result<TransactionContext, LedgerError> {
        Ok(TransactionContext {
            blockhash: Hash::new_unique(),
            last_valid_block_height: 100,
        })
    }

    async fn submit_transaction(&self, _tx: &SignedTransaction) -> Result<Signature, LedgerError> {
        let mut state = self.lock();
        if let Some(error) = state.submit_failures.pop_front() {
            return Err(error);
        }
        state.submissions += 1;
        if let Some(staged) = state.staged.pop_front() {
            for (address, account) in staged.accounts {
                state.accounts.insert(address, account);
            }
            for (address, balance) in staged.balances {
                state.balances.insert(address, balance);
            }
        }
        Ok(Signature::new_unique())
    }

    async fn confirm_transaction(
        &self,
        _signature: &Signature,
        _commitment: Commitment,
    ) -> Result<(), LedgerError> {
        if self.confirm_hangs.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        Ok(())
    }
}

pub struct MockWallet {
    pub address: Pubkey,
    fail_with: Mutex<Option<WalletError>>,
    pub signed: Mutex<Vec<TransactionPlan>>,
}

impl MockWallet {
    pub fn new() -> Self {
        Self {
            address: Pubkey::new_unique(),
            fail_with: Mutex::new(None),
            signed: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_signing_with(&self, error: WalletError) {
        *self.fail_with.lock().unwrap() = Some(error);
    }

    pub fn signed_plans(&self) -> Vec<TransactionPlan> {
        self.signed.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletSigner for MockWallet {
    fn address(&self) -> Pubkey {
        self.address
    }

    async fn sign_transaction(
        &self,
        plan: &TransactionPlan,
        _context: &TransactionContext,
    ) -> Result<SignedTransaction, WalletError> {
        if let Some(error) = self.fail_with.lock().unwrap().clone() {
            return Err(error);
        }
        self.signed.lock().unwrap().push(plan.clone());
        Ok(SignedTransaction {
            signature: Signature::new_unique(),
            payload: vec![],
        })
    }
}

pub fn setup() -> (Arc<MockLedger>, Arc<MockWallet>, SplitsClient) {
    setup_with_config(ClientConfig::default())
}

pub fn setup_with_config(
    config: ClientConfig,
) -> (Arc<MockLedger>, Arc<MockWallet>, SplitsClient) {
    let ledger = Arc::new(MockLedger::new());
    let wallet = Arc::new(MockWallet::new());
    let client = SplitsClient::with_config(ledger.clone(), wallet.clone(), config);
    (ledger, wallet, client)
}

/// A well-formed split record and its derived addresses.
pub fn split_fixture(
    authority: Pubkey,
    mint: Pubkey,
    unique_id: Pubkey,
    recipients: &[(Pubkey, u16)],
) -> (Pubkey, SplitConfigAccount) {
    let (record, bump) = derive_split_config(&authority, &mint, &unique_id);
    let vault = derive_vault(&record, &mint, TokenProgram::Token);
    (
        record,
        SplitConfigAccount {
            version: 1,
            authority,
            mint,
            vault,
            unique_id,
            bump,
            recipients: recipients
                .iter()
                .map(|(address, percentage_bps)| RecipientEntry {
                    address: *address,
                    percentage_bps: *percentage_bps,
                })
                .collect(),
            unclaimed: vec![],
            protocol_unclaimed: 0,
            last_activity: 0,
            rent_payer: authority,
        },
    )
}
