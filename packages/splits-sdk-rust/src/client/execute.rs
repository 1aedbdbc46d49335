//! Permissionless execution.
//!
//! Anyone may execute any split; the program enforces correctness, this
//! layer only decides whether submitting is worthwhile and wires the right
//! accounts. Execution submits even when the vault is empty, because
//! unclaimed carry-overs can be cleared with no new inflow; only an
//! explicit `min_balance_threshold` turns that into a skip.

use log::info;
use solana_sdk::{pubkey::Pubkey, signature::Signature};
use tokio_util::sync::CancellationToken;

use crate::{
    client::{OpError, SplitLookup, SplitsClient},
    codec::build_execute_split,
    ledger::TransactionPlan,
    outcome::{short_address, ExecuteOutcome, Failure, SkipReason},
    pda::{derive_protocol_config, derive_recipient_ata},
};

pub(crate) enum ExecuteStep {
    Executed(Signature),
    Skipped(SkipReason),
}

impl SplitsClient {
    /// Distribute a split's vault and clear what unclaimed amounts it can.
    pub async fn execute(&self, record: &Pubkey, cancel: &CancellationToken) -> ExecuteOutcome {
        let threshold = self.config().min_balance_threshold;
        match self.execute_inner(record, cancel, threshold).await {
            Ok(ExecuteStep::Executed(signature)) => ExecuteOutcome::Executed { signature },
            Ok(ExecuteStep::Skipped(reason)) => ExecuteOutcome::Skipped(reason),
            Err(OpError::Aborted) => ExecuteOutcome::Aborted,
            Err(OpError::Failed(failure)) => ExecuteOutcome::Failed(failure),
        }
    }

    /// Shared by `execute` and close's inline auto-execute (which passes no
    /// threshold: closing must clear the vault regardless of batching
    /// economics).
    pub(crate) async fn execute_inner(
        &self,
        record: &Pubkey,
        cancel: &CancellationToken,
        threshold: Option<u64>,
    ) -> Result<ExecuteStep, OpError> {
        let account = match self.guard(cancel, self.lookup_split(record)).await? {
            SplitLookup::Missing => return Ok(ExecuteStep::Skipped(SkipReason::NotFound)),
            SplitLookup::NotASplit => return Ok(ExecuteStep::Skipped(SkipReason::NotASplit)),
            SplitLookup::Valid { account, .. } => account,
        };

        if let Some(threshold) = threshold {
            let balance = self.guard(cancel, self.token_balance(&account.vault)).await?;
            if balance < threshold {
                return Ok(ExecuteStep::Skipped(SkipReason::BelowThreshold {
                    balance,
                    threshold,
                }));
            }
        }

        let token_program = self
            .guard(cancel, self.token_program_for_mint(&account.mint))
            .await?;
        let recipient_atas: Vec<Pubkey> = account
            .recipients
            .iter()
            .map(|r| derive_recipient_ata(&r.address, &account.mint, token_program))
            .collect();
        let (protocol_config, _) = derive_protocol_config();

        // The plan builder is re-run on the single stale-fee retry, after
        // the wrapper invalidates the protocol cache, so the fee ATA is
        // re-derived from a fresh fee wallet
        let build_plan = || async {
            let protocol = self.guard(cancel, self.protocol_config()).await?;
            let protocol_ata =
                derive_recipient_ata(&protocol.fee_wallet, &account.mint, token_program);

            let mut instructions = self.base_instructions();
            instructions.push(build_execute_split(
                *record,
                account.vault,
                account.mint,
                protocol_config,
                self.wallet_address(),
                token_program,
                &recipient_atas,
                protocol_ata,
            ));
            Ok(TransactionPlan {
                instructions,
                payer: self.wallet_address(),
            })
        };

        let signature = self
            .submit_with_retry(cancel, build_plan, Failure::is_stale_fee_recipient)
            .await?;

        info!("executed split {}", short_address(record));
        Ok(ExecuteStep::Executed(signature))
    }
}
