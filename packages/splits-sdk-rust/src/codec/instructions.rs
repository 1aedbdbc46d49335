//! Instruction builders.
//!
//! Payloads are the Anchor wire format: an 8-byte discriminator followed by
//! borsh-style arguments (Vec<T> as u32 LE length prefix + entries). Account
//! orders must match the deployed contexts exactly.

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use crate::{
    codec::accounts::RecipientEntry,
    constants::{
        DISCRIMINATOR_CLOSE_SPLIT_CONFIG, DISCRIMINATOR_CREATE_SPLIT_CONFIG,
        DISCRIMINATOR_EXECUTE_SPLIT, DISCRIMINATOR_UPDATE_SPLIT_CONFIG, PROGRAM_ID,
    },
    pda::TokenProgram,
};

fn serialize_recipients(data: &mut Vec<u8>, recipients: &[RecipientEntry]) {
    data.extend_from_slice(&(recipients.len() as u32).to_le_bytes());
    for recipient in recipients {
        data.extend_from_slice(&recipient.address.to_bytes());
        data.extend_from_slice(&recipient.percentage_bps.to_le_bytes());
    }
}

/// Build `create_split_config`.
///
/// Accounts (per the CreateSplitConfig context):
/// 0. split_config (writable) - init
/// 1. unique_id (readonly, seed only)
/// 2. authority (signer)
/// 3. payer (writable, signer) - recorded as rent_payer
/// 4. mint (readonly)
/// 5. vault (writable) - init
/// 6. token_program
/// 7. associated_token_program
/// 8. system_program
/// remaining: one receiving ATA per recipient, in recipient order
#[allow(clippy::too_many_arguments)]
pub fn build_create_split_config(
    split_config: Pubkey,
    unique_id: Pubkey,
    authority: Pubkey,
    payer: Pubkey,
    mint: Pubkey,
    vault: Pubkey,
    token_program: TokenProgram,
    recipients: &[RecipientEntry],
    recipient_atas: &[Pubkey],
) -> Instruction {
    let mut data = Vec::with_capacity(8 + 32 + 4 + recipients.len() * 34);
    data.extend_from_slice(&DISCRIMINATOR_CREATE_SPLIT_CONFIG);
    data.extend_from_slice(&mint.to_bytes());
    serialize_recipients(&mut data, recipients);

    let mut accounts = vec![
        AccountMeta::new(split_config, false),
        AccountMeta::new_readonly(unique_id, false),
        AccountMeta::new_readonly(authority, true),
        AccountMeta::new(payer, true),
        AccountMeta::new_readonly(mint, false),
        AccountMeta::new(vault, false),
        AccountMeta::new_readonly(token_program.id(), false),
        AccountMeta::new_readonly(spl_associated_token_account::id(), false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    for ata in recipient_atas {
        accounts.push(AccountMeta::new_readonly(*ata, false));
    }

    Instruction { program_id: PROGRAM_ID, accounts, data }
}

/// Build `update_split_config`.
///
/// Accounts (per the UpdateSplitConfig context):
/// 0. split_config (writable)
/// 1. vault (readonly, emptiness checked on-chain)
/// 2. mint (readonly)
/// 3. authority (signer)
/// 4. token_program
/// remaining: receiving ATAs of the new recipients, in order
pub fn build_update_split_config(
    split_config: Pubkey,
    vault: Pubkey,
    mint: Pubkey,
    authority: Pubkey,
    token_program: TokenProgram,
    new_recipients: &[RecipientEntry],
    recipient_atas: &[Pubkey],
) -> Instruction {
    let mut data = Vec::with_capacity(8 + 4 + new_recipients.len() * 34);
    data.extend_from_slice(&DISCRIMINATOR_UPDATE_SPLIT_CONFIG);
    serialize_recipients(&mut data, new_recipients);

    let mut accounts = vec![
        AccountMeta::new(split_config, false),
        AccountMeta::new_readonly(vault, false),
        AccountMeta::new_readonly(mint, false),
        AccountMeta::new_readonly(authority, true),
        AccountMeta::new_readonly(token_program.id(), false),
    ];
    for ata in recipient_atas {
        accounts.push(AccountMeta::new_readonly(*ata, false));
    }

    Instruction { program_id: PROGRAM_ID, accounts, data }
}

/// Build `execute_split` (permissionless; executor is attribution only).
///
/// Accounts:
/// 0. split_config (writable)
/// 1. vault (writable)
/// 2. mint (readonly)
/// 3. protocol_config (readonly)
/// 4. executor (readonly)
/// 5. token_program
/// remaining: recipient ATAs (writable, record order) + protocol fee ATA last
#[allow(clippy::too_many_arguments)]
pub fn build_execute_split(
    split_config: Pubkey,
    vault: Pubkey,
    mint: Pubkey,
    protocol_config: Pubkey,
    executor: Pubkey,
    token_program: TokenProgram,
    recipient_atas: &[Pubkey],
    protocol_ata: Pubkey,
) -> Instruction {
    let mut accounts = vec![
        AccountMeta::new(split_config, false),
        AccountMeta::new(vault, false),
        AccountMeta::new_readonly(mint, false),
        AccountMeta::new_readonly(protocol_config, false),
        AccountMeta::new_readonly(executor, false),
        AccountMeta::new_readonly(token_program.id(), false),
    ];
    for ata in recipient_atas {
        accounts.push(AccountMeta::new(*ata, false));
    }
    accounts.push(AccountMeta::new(protocol_ata, false));

    Instruction {
        program_id: PROGRAM_ID,
        accounts,
        data: DISCRIMINATOR_EXECUTE_SPLIT.to_vec(),
    }
}

/// Build `close_split_config`.
///
/// Accounts:
/// 0. split_config (writable, closed to rent_destination)
/// 1. vault (readonly, emptiness checked on-chain)
/// 2. authority (signer)
/// 3. rent_destination (writable) - must equal the recorded rent_payer
pub fn build_close_split_config(
    split_config: Pubkey,
    vault: Pubkey,
    authority: Pubkey,
    rent_destination: Pubkey,
) -> Instruction {
    Instruction {
        program_id: PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(split_config, false),
            AccountMeta::new_readonly(vault, false),
            AccountMeta::new_readonly(authority, true),
            AccountMeta::new(rent_destination, false),
        ],
        data: DISCRIMINATOR_CLOSE_SPLIT_CONFIG.to_vec(),
    }
}
