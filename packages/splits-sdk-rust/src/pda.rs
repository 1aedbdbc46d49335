//! Deterministic address derivation.
//!
//! Every address this SDK touches is derived from logical identifiers, never
//! chosen: the split config is a PDA of (authority, mint, unique_id), the
//! vault is the config's associated token account, and receiving accounts are
//! the recipients' ATAs. Identical inputs always derive identical addresses,
//! which is what makes `ensure` idempotent.

use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address_with_program_id;

use crate::{
    constants::{
        LABEL_PREFIX, MAX_LABEL_LEN, PROGRAM_ID, PROTOCOL_CONFIG_SEED, SPLIT_CONFIG_SEED,
        TOKEN_2022_PROGRAM_ID,
    },
    errors::SplitsError,
};

/// Which token program owns the mint (and therefore the vault and every
/// receiving account derived for it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenProgram {
    Token,
    Token2022,
}

impl TokenProgram {
    pub fn id(&self) -> Pubkey {
        match self {
            TokenProgram::Token => spl_token::id(),
            TokenProgram::Token2022 => TOKEN_2022_PROGRAM_ID,
        }
    }

    /// Resolve the variant from a mint account's owner.
    pub fn from_owner(owner: &Pubkey) -> Option<Self> {
        if *owner == spl_token::id() {
            Some(TokenProgram::Token)
        } else if *owner == TOKEN_2022_PROGRAM_ID {
            Some(TokenProgram::Token2022)
        } else {
            None
        }
    }
}

/// Derive the split config PDA for (authority, mint, unique_id).
pub fn derive_split_config(authority: &Pubkey, mint: &Pubkey, unique_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            SPLIT_CONFIG_SEED,
            authority.as_ref(),
            mint.as_ref(),
            unique_id.as_ref(),
        ],
        &PROGRAM_ID,
    )
}

/// Derive the protocol config singleton PDA.
pub fn derive_protocol_config() -> (Pubkey, u8) {
    Pubkey::find_program_address(&[PROTOCOL_CONFIG_SEED], &PROGRAM_ID)
}

/// Derive the vault address: the ATA owned by the split config PDA.
pub fn derive_vault(split_config: &Pubkey, mint: &Pubkey, token_program: TokenProgram) -> Pubkey {
    get_associated_token_address_with_program_id(split_config, mint, &token_program.id())
}

/// Derive a recipient's receiving account (their ATA for the mint).
pub fn derive_recipient_ata(
    recipient: &Pubkey,
    mint: &Pubkey,
    token_program: TokenProgram,
) -> Pubkey {
    get_associated_token_address_with_program_id(recipient, mint, &token_program.id())
}

/// Encode a human-readable label into a 32-byte unique id.
///
/// Layout: `b"splt"` prefix (4) + length (1) + UTF-8 label bytes (<= 27),
/// zero-padded to 32. The prefix makes labeled ids recognizable so
/// [`unique_id_to_label`] can reject arbitrary ids.
pub fn label_to_unique_id(label: &str) -> Result<Pubkey, SplitsError> {
    let bytes = label.as_bytes();
    if bytes.len() > MAX_LABEL_LEN {
        return Err(SplitsError::LabelTooLong(bytes.len()));
    }

    let mut id = [0u8; 32];
    id[..4].copy_from_slice(&LABEL_PREFIX);
    id[4] = bytes.len() as u8;
    id[5..5 + bytes.len()].copy_from_slice(bytes);
    Ok(Pubkey::new_from_array(id))
}

/// Decode a label-encoded unique id back to its label.
///
/// Returns `None` for ids that were not produced by [`label_to_unique_id`]:
/// wrong prefix, out-of-range length byte, non-zero padding, or invalid UTF-8.
pub fn unique_id_to_label(unique_id: &Pubkey) -> Option<String> {
    let bytes = unique_id.to_bytes();
    if bytes[..4] != LABEL_PREFIX {
        return None;
    }

    let len = bytes[4] as usize;
    if len > MAX_LABEL_LEN {
        return None;
    }
    if bytes[5 + len..].iter().any(|&b| b != 0) {
        return None;
    }

    std::str::from_utf8(&bytes[5..5 + len])
        .ok()
        .map(str::to_owned)
}
