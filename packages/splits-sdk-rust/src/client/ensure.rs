//! Idempotent creation and update.
//!
//! `ensure` reconciles the desired recipient set against the record at the
//! derived address: create it, update it, or report that nothing needs to
//! change. `update` runs the same path but reports `NotFound` instead of
//! creating. Re-running either with an unchanged definition never submits
//! a second transaction.

use log::{debug, info};
use solana_sdk::{pubkey::Pubkey, rent::Rent, signature::Signature};
use spl_associated_token_account::instruction::create_associated_token_account_idempotent;
use tokio_util::sync::CancellationToken;

use crate::{
    client::{OpError, SplitLookup, SplitsClient},
    codec::{build_create_split_config, build_update_split_config, SplitConfigAccount},
    constants::{SPLIT_CONFIG_SIZE, TOKEN_ACCOUNT_SIZE},
    definition::SplitDefinition,
    ledger::TransactionPlan,
    outcome::{short_address, Blocked, EnsureOutcome, Failure, UpdateOutcome},
    pda::{derive_recipient_ata, derive_split_config, derive_vault, TokenProgram},
};

enum ReconcileStep {
    Created {
        record: Pubkey,
        vault: Pubkey,
        signature: Signature,
        rent_paid: u64,
    },
    NoChange {
        record: Pubkey,
        vault: Pubkey,
    },
    Updated {
        record: Pubkey,
        vault: Pubkey,
        signature: Signature,
    },
    NotFound {
        record: Pubkey,
    },
    Blocked(Blocked),
}

/// Either the instructions that make every receiving account exist, or the
/// blocker to report when auto-creation is disabled.
enum ReceivingAccounts {
    Ready,
    Blocked(Blocked),
}

impl SplitsClient {
    /// Make the ledger match the desired split, creating it if necessary.
    pub async fn ensure(
        &self,
        desired: &SplitDefinition,
        cancel: &CancellationToken,
    ) -> EnsureOutcome {
        match self.reconcile(desired, cancel, true).await {
            Ok(ReconcileStep::Created { record, vault, signature, rent_paid }) => {
                EnsureOutcome::Created { record, vault, signature, rent_paid }
            }
            Ok(ReconcileStep::NoChange { record, vault }) => {
                EnsureOutcome::NoChange { record, vault }
            }
            Ok(ReconcileStep::Updated { record, vault, signature }) => {
                EnsureOutcome::Updated { record, vault, signature }
            }
            Ok(ReconcileStep::NotFound { .. }) => {
                unreachable!("ensure creates missing records")
            }
            Ok(ReconcileStep::Blocked(blocked)) => EnsureOutcome::Blocked(blocked),
            Err(OpError::Aborted) => EnsureOutcome::Aborted,
            Err(OpError::Failed(failure)) => EnsureOutcome::Failed(failure),
        }
    }

    /// Like [`ensure`](Self::ensure), but never creates: a missing record
    /// reports `NotFound`.
    pub async fn update(
        &self,
        desired: &SplitDefinition,
        cancel: &CancellationToken,
    ) -> UpdateOutcome {
        match self.reconcile(desired, cancel, false).await {
            Ok(ReconcileStep::Created { .. }) => {
                unreachable!("update never creates records")
            }
            Ok(ReconcileStep::NoChange { record, vault }) => {
                UpdateOutcome::NoChange { record, vault }
            }
            Ok(ReconcileStep::Updated { record, vault, signature }) => {
                UpdateOutcome::Updated { record, vault, signature }
            }
            Ok(ReconcileStep::NotFound { record }) => UpdateOutcome::NotFound { record },
            Ok(ReconcileStep::Blocked(blocked)) => UpdateOutcome::Blocked(blocked),
            Err(OpError::Aborted) => UpdateOutcome::Aborted,
            Err(OpError::Failed(failure)) => UpdateOutcome::Failed(failure),
        }
    }

    async fn reconcile(
        &self,
        desired: &SplitDefinition,
        cancel: &CancellationToken,
        create_if_missing: bool,
    ) -> Result<ReconcileStep, OpError> {
        let (record, _) =
            derive_split_config(&desired.authority, &desired.mint, &desired.unique_id);

        match self.guard(cancel, self.lookup_split(&record)).await? {
            SplitLookup::Missing if create_if_missing => self.create(desired, record, cancel).await,
            SplitLookup::Missing => Ok(ReconcileStep::NotFound { record }),
            SplitLookup::NotASplit => Err(OpError::Failed(Failure::ProgramError {
                code: None,
                message: format!(
                    "account {} at the derived address is not a split record",
                    short_address(&record)
                ),
            })),
            SplitLookup::Valid { account, .. } => {
                self.apply_diff(desired, record, &account, cancel).await
            }
        }
    }

    async fn create(
        &self,
        desired: &SplitDefinition,
        record: Pubkey,
        cancel: &CancellationToken,
    ) -> Result<ReconcileStep, OpError> {
        // The authority co-signs creation, and this wallet is the only
        // signer available
        if desired.authority != self.wallet_address() {
            return Ok(ReconcileStep::Blocked(Blocked::not_authority(
                &record,
                &self.wallet_address(),
                &desired.authority,
            )));
        }

        let token_program = self
            .guard(cancel, self.token_program_for_mint(&desired.mint))
            .await?;
        let vault = derive_vault(&record, &desired.mint, token_program);

        let mut instructions = self.base_instructions();
        match self
            .prepare_receiving_accounts(desired, token_program, cancel, &mut instructions)
            .await?
        {
            ReceivingAccounts::Ready => {}
            ReceivingAccounts::Blocked(blocked) => return Ok(ReconcileStep::Blocked(blocked)),
        }

        let recipient_atas = self.receiving_addresses(desired, token_program);
        instructions.push(build_create_split_config(
            record,
            desired.unique_id,
            desired.authority,
            self.wallet_address(),
            desired.mint,
            vault,
            token_program,
            &desired.recipient_entries(),
            &recipient_atas,
        ));

        let plan = TransactionPlan {
            instructions,
            payer: self.wallet_address(),
        };
        let signature = self.sign_submit_confirm(cancel, plan).await?;
        self.identity_cache().insert(record);

        let rent = Rent::default();
        let rent_paid =
            rent.minimum_balance(SPLIT_CONFIG_SIZE) + rent.minimum_balance(TOKEN_ACCOUNT_SIZE);

        info!(
            "created split {} with {} recipients",
            short_address(&record),
            desired.recipients().len()
        );
        Ok(ReconcileStep::Created {
            record,
            vault,
            signature,
            rent_paid,
        })
    }

    async fn apply_diff(
        &self,
        desired: &SplitDefinition,
        record: Pubkey,
        account: &SplitConfigAccount,
        cancel: &CancellationToken,
    ) -> Result<ReconcileStep, OpError> {
        let vault = account.vault;

        if desired.matches_recipients(&account.recipients) {
            debug!("split {} already matches, no change", short_address(&record));
            return Ok(ReconcileStep::NoChange { record, vault });
        }

        // Blockers, cheapest first: authority, vault emptiness, unclaimed
        if account.authority != self.wallet_address() {
            return Ok(ReconcileStep::Blocked(Blocked::not_authority(
                &record,
                &self.wallet_address(),
                &account.authority,
            )));
        }

        let balance = self.guard(cancel, self.token_balance(&vault)).await?;
        if balance > 0 {
            return Ok(ReconcileStep::Blocked(Blocked::vault_not_empty(
                &vault, balance,
            )));
        }

        let unclaimed = account.total_unclaimed();
        if unclaimed > 0 {
            return Ok(ReconcileStep::Blocked(Blocked::unclaimed_pending(
                &record, unclaimed,
            )));
        }

        let token_program = self
            .guard(cancel, self.token_program_for_mint(&desired.mint))
            .await?;

        let mut instructions = self.base_instructions();
        match self
            .prepare_receiving_accounts(desired, token_program, cancel, &mut instructions)
            .await?
        {
            ReceivingAccounts::Ready => {}
            ReceivingAccounts::Blocked(blocked) => return Ok(ReconcileStep::Blocked(blocked)),
        }

        let recipient_atas = self.receiving_addresses(desired, token_program);
        instructions.push(build_update_split_config(
            record,
            vault,
            desired.mint,
            account.authority,
            token_program,
            &desired.recipient_entries(),
            &recipient_atas,
        ));

        let plan = TransactionPlan {
            instructions,
            payer: self.wallet_address(),
        };
        let signature = self.sign_submit_confirm(cancel, plan).await?;

        info!(
            "updated split {} to {} recipients",
            short_address(&record),
            desired.recipients().len()
        );
        Ok(ReconcileStep::Updated {
            record,
            vault,
            signature,
        })
    }

    /// Check the desired recipients' receiving accounts. Missing ones are
    /// either created inline (idempotent ATA instructions appended to
    /// `instructions`) or reported as a blocker, per configuration.
    async fn prepare_receiving_accounts(
        &self,
        desired: &SplitDefinition,
        token_program: TokenProgram,
        cancel: &CancellationToken,
        instructions: &mut Vec<solana_sdk::instruction::Instruction>,
    ) -> Result<ReceivingAccounts, OpError> {
        let owners: Vec<Pubkey> = desired.recipients().iter().map(|r| r.address).collect();
        let missing = self
            .guard(
                cancel,
                self.missing_receiving_accounts(&owners, &desired.mint, token_program),
            )
            .await?;

        if missing.is_empty() {
            return Ok(ReceivingAccounts::Ready);
        }

        if !self.config().create_missing_receiving_accounts {
            let atas = missing.iter().map(|(_, ata)| *ata).collect();
            return Ok(ReceivingAccounts::Blocked(
                Blocked::receiving_accounts_missing(atas),
            ));
        }

        debug!("creating {} missing receiving accounts", missing.len());
        let payer = self.wallet_address();
        for (owner, _) in &missing {
            instructions.push(create_associated_token_account_idempotent(
                &payer,
                owner,
                &desired.mint,
                &token_program.id(),
            ));
        }
        Ok(ReceivingAccounts::Ready)
    }

    fn receiving_addresses(
        &self,
        desired: &SplitDefinition,
        token_program: TokenProgram,
    ) -> Vec<Pubkey> {
        desired
            .recipients()
            .iter()
            .map(|r| derive_recipient_ata(&r.address, &desired.mint, token_program))
            .collect()
    }
}
