//! Authority-gated close with rent recovery.
//!
//! The program refuses to close a record whose vault or unclaimed ledger is
//! nonzero, so by default the client runs one inline execute to drain them
//! first. Rent goes to the rent payer recorded at creation, which is not
//! necessarily the caller.

use log::{debug, info};
use solana_sdk::pubkey::Pubkey;
use tokio_util::sync::CancellationToken;

use crate::{
    client::{execute::ExecuteStep, OpError, SplitLookup, SplitsClient},
    codec::{build_close_split_config, SplitConfigAccount},
    ledger::TransactionPlan,
    outcome::{short_address, Blocked, CloseOutcome},
};

enum CloseStep {
    Closed(CloseOutcome),
    Proceed {
        account: Box<SplitConfigAccount>,
        lamports: u64,
    },
}

impl SplitsClient {
    /// Close a split record and recover its rent.
    ///
    /// An address that holds no split record — never created, or already
    /// closed and since reassigned — counts as `AlreadyClosed`.
    pub async fn close(&self, record: &Pubkey, cancel: &CancellationToken) -> CloseOutcome {
        match self.close_inner(record, cancel).await {
            Ok(outcome) => outcome,
            Err(OpError::Aborted) => CloseOutcome::Aborted,
            Err(OpError::Failed(failure)) => CloseOutcome::Failed(failure),
        }
    }

    async fn close_inner(
        &self,
        record: &Pubkey,
        cancel: &CancellationToken,
    ) -> Result<CloseOutcome, OpError> {
        let (account, lamports) = match self.precheck(record, cancel).await? {
            CloseStep::Closed(outcome) => return Ok(outcome),
            CloseStep::Proceed { account, lamports } => (account, lamports),
        };

        if account.authority != self.wallet_address() {
            return Ok(CloseOutcome::Blocked(Blocked::not_authority(
                record,
                &self.wallet_address(),
                &account.authority,
            )));
        }

        let balance = self.guard(cancel, self.token_balance(&account.vault)).await?;
        let unclaimed = account.total_unclaimed();

        let (account, lamports) = if balance > 0 || unclaimed > 0 {
            if !self.config().auto_execute_on_close {
                return Ok(CloseOutcome::Blocked(if balance > 0 {
                    Blocked::vault_not_empty(&account.vault, balance)
                } else {
                    Blocked::unclaimed_pending(record, unclaimed)
                }));
            }

            debug!(
                "auto-executing split {} before close (balance {balance}, unclaimed {unclaimed})",
                short_address(record)
            );
            if let ExecuteStep::Skipped(_) = self.execute_inner(record, cancel, None).await? {
                // The record vanished between reads; nothing left to close
                return Ok(CloseOutcome::AlreadyClosed);
            }

            // Re-read: the execute may not have cleared everything (e.g.
            // receiving accounts still missing keep amounts unclaimed)
            let (account, lamports) = match self.precheck(record, cancel).await? {
                CloseStep::Closed(outcome) => return Ok(outcome),
                CloseStep::Proceed { account, lamports } => (account, lamports),
            };

            let balance = self.guard(cancel, self.token_balance(&account.vault)).await?;
            if balance > 0 {
                return Ok(CloseOutcome::Blocked(Blocked::vault_not_empty(
                    &account.vault,
                    balance,
                )));
            }
            let unclaimed = account.total_unclaimed();
            if unclaimed > 0 {
                return Ok(CloseOutcome::Blocked(Blocked::unclaimed_pending(
                    record, unclaimed,
                )));
            }
            (account, lamports)
        } else {
            (account, lamports)
        };

        let mut instructions = self.base_instructions();
        instructions.push(build_close_split_config(
            *record,
            account.vault,
            account.authority,
            account.rent_payer,
        ));

        let plan = TransactionPlan {
            instructions,
            payer: self.wallet_address(),
        };
        let signature = self.sign_submit_confirm(cancel, plan).await?;
        self.identity_cache().invalidate(record);

        info!(
            "closed split {}, {} lamports returned to {}",
            short_address(record),
            lamports,
            short_address(&account.rent_payer)
        );
        Ok(CloseOutcome::Closed {
            signature,
            rent_recovered: lamports,
            rent_payer: account.rent_payer,
        })
    }

    async fn precheck(
        &self,
        record: &Pubkey,
        cancel: &CancellationToken,
    ) -> Result<CloseStep, OpError> {
        match self.guard(cancel, self.lookup_split(record)).await? {
            SplitLookup::Missing | SplitLookup::NotASplit => {
                Ok(CloseStep::Closed(CloseOutcome::AlreadyClosed))
            }
            SplitLookup::Valid { account, lamports } => {
                Ok(CloseStep::Proceed { account, lamports })
            }
        }
    }
}
