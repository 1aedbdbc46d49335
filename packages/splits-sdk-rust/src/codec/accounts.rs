//! Fixed-layout account record codec.
//!
//! The program stores accounts as `#[repr(C)]` zero-copy structs behind an
//! 8-byte Anchor discriminator. Field order, little-endian integers, and the
//! alignment padding bytes are all part of the wire contract: one byte off
//! and every field after it decodes as garbage. Offsets below are asserted
//! against the account sizes at compile time.
//!
//! Decoding is total over well-formed buffers: the exact length is checked
//! first, then the discriminator, and only then are fields read. There is no
//! partial decode.

use solana_sdk::pubkey::Pubkey;

use crate::{
    constants::{
        MAX_RECIPIENTS, PROTOCOL_CONFIG_DISCRIMINATOR, PROTOCOL_CONFIG_SIZE,
        SPLIT_CONFIG_DISCRIMINATOR, SPLIT_CONFIG_SIZE,
    },
    errors::SplitsError,
};

// SplitConfig field offsets (from the start of the account, discriminator
// included). Two pad bytes regions: one byte after recipient_count to align
// the u16 in Recipient, four bytes after the recipients array to align the
// u64/i64 in UnclaimedAmount.
const OFF_VERSION: usize = 8;
const OFF_AUTHORITY: usize = 9;
const OFF_MINT: usize = 41;
const OFF_VAULT: usize = 73;
const OFF_UNIQUE_ID: usize = 105;
const OFF_BUMP: usize = 137;
const OFF_RECIPIENT_COUNT: usize = 138;
const OFF_RECIPIENTS: usize = 140; // 139 is padding
const RECIPIENT_STRIDE: usize = 34; // address (32) + percentage_bps (2)
const OFF_UNCLAIMED: usize = OFF_RECIPIENTS + RECIPIENT_STRIDE * MAX_RECIPIENTS + 4; // 4 pad
const UNCLAIMED_STRIDE: usize = 48; // recipient (32) + amount (8) + timestamp (8)
const OFF_PROTOCOL_UNCLAIMED: usize = OFF_UNCLAIMED + UNCLAIMED_STRIDE * MAX_RECIPIENTS;
const OFF_LAST_ACTIVITY: usize = OFF_PROTOCOL_UNCLAIMED + 8;
const OFF_RENT_PAYER: usize = OFF_LAST_ACTIVITY + 8;

const _: () = assert!(OFF_UNCLAIMED == 824);
const _: () = assert!(OFF_PROTOCOL_UNCLAIMED == 1784);
const _: () = assert!(OFF_RENT_PAYER + 32 == SPLIT_CONFIG_SIZE);

/// An active recipient slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipientEntry {
    pub address: Pubkey,
    pub percentage_bps: u16,
}

/// A live unclaimed carry-over (amount > 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnclaimedEntry {
    pub recipient: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

/// Decoded split config record.
///
/// `recipients` and `unclaimed` hold only the live entries; the zero-filled
/// fixed-array slots of the on-chain record are filtered out on decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitConfigAccount {
    pub version: u8,
    pub authority: Pubkey,
    pub mint: Pubkey,
    pub vault: Pubkey,
    pub unique_id: Pubkey,
    pub bump: u8,
    pub recipients: Vec<RecipientEntry>,
    pub unclaimed: Vec<UnclaimedEntry>,
    pub protocol_unclaimed: u64,
    pub last_activity: i64,
    pub rent_payer: Pubkey,
}

impl SplitConfigAccount {
    /// Sum of all pending unclaimed carry-overs, protocol entry included.
    pub fn total_unclaimed(&self) -> u64 {
        self.unclaimed.iter().map(|u| u.amount).sum::<u64>() + self.protocol_unclaimed
    }
}

/// Decoded protocol config singleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolConfigAccount {
    pub authority: Pubkey,
    pub pending_authority: Pubkey,
    pub fee_wallet: Pubkey,
    pub bump: u8,
}

/// Tagged decode result. Callers branch exhaustively instead of
/// interpreting errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<T> {
    Valid(T),
    WrongSize { actual: usize, expected: usize },
    WrongDiscriminator { found: [u8; 8] },
}

impl<T> Decoded<T> {
    pub fn valid(self) -> Option<T> {
        match self {
            Decoded::Valid(record) => Some(record),
            _ => None,
        }
    }
}

fn read_pubkey(data: &[u8], offset: usize) -> Pubkey {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&data[offset..offset + 32]);
    Pubkey::new_from_array(bytes)
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_u64(data: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[offset..offset + 8]);
    u64::from_le_bytes(bytes)
}

fn read_i64(data: &[u8], offset: usize) -> i64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[offset..offset + 8]);
    i64::from_le_bytes(bytes)
}

/// Decode a split config account buffer.
pub fn decode_split_config(data: &[u8]) -> Decoded<SplitConfigAccount> {
    if data.len() != SPLIT_CONFIG_SIZE {
        return Decoded::WrongSize {
            actual: data.len(),
            expected: SPLIT_CONFIG_SIZE,
        };
    }
    if data[..8] != SPLIT_CONFIG_DISCRIMINATOR {
        let mut found = [0u8; 8];
        found.copy_from_slice(&data[..8]);
        return Decoded::WrongDiscriminator { found };
    }

    let recipient_count = (data[OFF_RECIPIENT_COUNT] as usize).min(MAX_RECIPIENTS);

    let recipients = (0..recipient_count)
        .map(|i| {
            let offset = OFF_RECIPIENTS + i * RECIPIENT_STRIDE;
            RecipientEntry {
                address: read_pubkey(data, offset),
                percentage_bps: read_u16(data, offset + 32),
            }
        })
        .collect();

    // Zero-amount slots are dead entries, not live carry-overs
    let unclaimed = (0..MAX_RECIPIENTS)
        .filter_map(|i| {
            let offset = OFF_UNCLAIMED + i * UNCLAIMED_STRIDE;
            let amount = read_u64(data, offset + 32);
            (amount > 0).then(|| UnclaimedEntry {
                recipient: read_pubkey(data, offset),
                amount,
                timestamp: read_i64(data, offset + 40),
            })
        })
        .collect();

    Decoded::Valid(SplitConfigAccount {
        version: data[OFF_VERSION],
        authority: read_pubkey(data, OFF_AUTHORITY),
        mint: read_pubkey(data, OFF_MINT),
        vault: read_pubkey(data, OFF_VAULT),
        unique_id: read_pubkey(data, OFF_UNIQUE_ID),
        bump: data[OFF_BUMP],
        recipients,
        unclaimed,
        protocol_unclaimed: read_u64(data, OFF_PROTOCOL_UNCLAIMED),
        last_activity: read_i64(data, OFF_LAST_ACTIVITY),
        rent_payer: read_pubkey(data, OFF_RENT_PAYER),
    })
}

/// Decode the protocol config singleton buffer.
pub fn decode_protocol_config(data: &[u8]) -> Decoded<ProtocolConfigAccount> {
    if data.len() != PROTOCOL_CONFIG_SIZE {
        return Decoded::WrongSize {
            actual: data.len(),
            expected: PROTOCOL_CONFIG_SIZE,
        };
    }
    if data[..8] != PROTOCOL_CONFIG_DISCRIMINATOR {
        let mut found = [0u8; 8];
        found.copy_from_slice(&data[..8]);
        return Decoded::WrongDiscriminator { found };
    }

    Decoded::Valid(ProtocolConfigAccount {
        authority: read_pubkey(data, 8),
        pending_authority: read_pubkey(data, 40),
        fee_wallet: read_pubkey(data, 72),
        bump: data[104],
    })
}

/// Encode a split config record to its exact on-chain byte layout.
///
/// Unused recipient and unclaimed slots are zero-filled; unclaimed entries
/// are placed at their recipients' slot indices when the recipient is known,
/// otherwise in the first free slot (the program indexes unclaimed by
/// recipient position).
pub fn encode_split_config(account: &SplitConfigAccount) -> Result<Vec<u8>, SplitsError> {
    if account.recipients.len() > MAX_RECIPIENTS {
        return Err(SplitsError::InvalidRecipientCount(account.recipients.len()));
    }
    if account.unclaimed.len() > MAX_RECIPIENTS {
        return Err(SplitsError::InvalidRecipientCount(account.unclaimed.len()));
    }

    let mut data = vec![0u8; SPLIT_CONFIG_SIZE];
    data[..8].copy_from_slice(&SPLIT_CONFIG_DISCRIMINATOR);
    data[OFF_VERSION] = account.version;
    data[OFF_AUTHORITY..OFF_AUTHORITY + 32].copy_from_slice(&account.authority.to_bytes());
    data[OFF_MINT..OFF_MINT + 32].copy_from_slice(&account.mint.to_bytes());
    data[OFF_VAULT..OFF_VAULT + 32].copy_from_slice(&account.vault.to_bytes());
    data[OFF_UNIQUE_ID..OFF_UNIQUE_ID + 32].copy_from_slice(&account.unique_id.to_bytes());
    data[OFF_BUMP] = account.bump;
    data[OFF_RECIPIENT_COUNT] = account.recipients.len() as u8;

    for (i, recipient) in account.recipients.iter().enumerate() {
        let offset = OFF_RECIPIENTS + i * RECIPIENT_STRIDE;
        data[offset..offset + 32].copy_from_slice(&recipient.address.to_bytes());
        data[offset + 32..offset + 34].copy_from_slice(&recipient.percentage_bps.to_le_bytes());
    }

    let mut spill = account.recipients.len();
    for entry in &account.unclaimed {
        let slot = account
            .recipients
            .iter()
            .position(|r| r.address == entry.recipient)
            .unwrap_or_else(|| {
                let s = spill;
                spill += 1;
                s
            });
        let offset = OFF_UNCLAIMED + slot.min(MAX_RECIPIENTS - 1) * UNCLAIMED_STRIDE;
        data[offset..offset + 32].copy_from_slice(&entry.recipient.to_bytes());
        data[offset + 32..offset + 40].copy_from_slice(&entry.amount.to_le_bytes());
        data[offset + 40..offset + 48].copy_from_slice(&entry.timestamp.to_le_bytes());
    }

    data[OFF_PROTOCOL_UNCLAIMED..OFF_PROTOCOL_UNCLAIMED + 8]
        .copy_from_slice(&account.protocol_unclaimed.to_le_bytes());
    data[OFF_LAST_ACTIVITY..OFF_LAST_ACTIVITY + 8]
        .copy_from_slice(&account.last_activity.to_le_bytes());
    data[OFF_RENT_PAYER..OFF_RENT_PAYER + 32].copy_from_slice(&account.rent_payer.to_bytes());

    Ok(data)
}

/// Encode the protocol config singleton.
pub fn encode_protocol_config(account: &ProtocolConfigAccount) -> Vec<u8> {
    let mut data = vec![0u8; PROTOCOL_CONFIG_SIZE];
    data[..8].copy_from_slice(&PROTOCOL_CONFIG_DISCRIMINATOR);
    data[8..40].copy_from_slice(&account.authority.to_bytes());
    data[40..72].copy_from_slice(&account.pending_authority.to_bytes());
    data[72..104].copy_from_slice(&account.fee_wallet.to_bytes());
    data[104] = account.bump;
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_split_config() -> SplitConfigAccount {
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();
        SplitConfigAccount {
            version: 1,
            authority: Pubkey::new_unique(),
            mint: Pubkey::new_unique(),
            vault: Pubkey::new_unique(),
            unique_id: Pubkey::new_unique(),
            bump: 254,
            recipients: vec![
                RecipientEntry { address: alice, percentage_bps: 5940 },
                RecipientEntry { address: bob, percentage_bps: 3960 },
            ],
            unclaimed: vec![UnclaimedEntry {
                recipient: bob,
                amount: 42_000,
                timestamp: 1_700_000_000,
            }],
            protocol_unclaimed: 777,
            last_activity: 1_700_000_123,
            rent_payer: Pubkey::new_unique(),
        }
    }

    #[test]
    fn split_config_round_trip() {
        let account = sample_split_config();
        let data = encode_split_config(&account).unwrap();
        assert_eq!(data.len(), SPLIT_CONFIG_SIZE);
        assert_eq!(decode_split_config(&data), Decoded::Valid(account));
    }

    /// Regression guard for the fields after the padding regions: corrupting
    /// a pad byte must not shift any later field.
    #[test]
    fn fields_after_padding_decode_correctly() {
        let account = sample_split_config();
        let data = encode_split_config(&account).unwrap();

        // The two pad regions are zero
        assert_eq!(data[139], 0);
        assert_eq!(&data[820..824], &[0, 0, 0, 0]);

        let decoded = decode_split_config(&data).valid().unwrap();
        assert_eq!(decoded.protocol_unclaimed, 777);
        assert_eq!(decoded.last_activity, 1_700_000_123);
        assert_eq!(decoded.rent_payer, account.rent_payer);
    }

    #[test]
    fn split_config_wrong_size() {
        let account = sample_split_config();
        let mut data = encode_split_config(&account).unwrap();
        data.pop();
        assert_eq!(
            decode_split_config(&data),
            Decoded::WrongSize { actual: SPLIT_CONFIG_SIZE - 1, expected: SPLIT_CONFIG_SIZE }
        );
    }

    #[test]
    fn split_config_wrong_discriminator() {
        let mut data = encode_split_config(&sample_split_config()).unwrap();
        data[..8].copy_from_slice(&PROTOCOL_CONFIG_DISCRIMINATOR);
        assert_eq!(
            decode_split_config(&data),
            Decoded::WrongDiscriminator { found: PROTOCOL_CONFIG_DISCRIMINATOR }
        );
    }

    #[test]
    fn zero_unclaimed_slots_are_filtered() {
        let mut account = sample_split_config();
        account.unclaimed.clear();
        let data = encode_split_config(&account).unwrap();
        let decoded = decode_split_config(&data).valid().unwrap();
        assert!(decoded.unclaimed.is_empty());
        assert_eq!(decoded.total_unclaimed(), account.protocol_unclaimed);
    }

    #[test]
    fn full_recipient_array_round_trips() {
        let mut account = sample_split_config();
        account.recipients = (0..MAX_RECIPIENTS)
            .map(|_| RecipientEntry { address: Pubkey::new_unique(), percentage_bps: 495 })
            .collect();
        account.unclaimed.clear();

        let data = encode_split_config(&account).unwrap();
        assert_eq!(decode_split_config(&data), Decoded::Valid(account));
    }

    #[test]
    fn too_many_recipients_rejected() {
        let mut account = sample_split_config();
        account.recipients = (0..MAX_RECIPIENTS + 1)
            .map(|_| RecipientEntry { address: Pubkey::new_unique(), percentage_bps: 1 })
            .collect();
        assert!(encode_split_config(&account).is_err());
    }

    #[test]
    fn protocol_config_round_trip() {
        let account = ProtocolConfigAccount {
            authority: Pubkey::new_unique(),
            pending_authority: Pubkey::default(),
            fee_wallet: Pubkey::new_unique(),
            bump: 253,
        };
        let data = encode_protocol_config(&account);
        assert_eq!(data.len(), PROTOCOL_CONFIG_SIZE);
        assert_eq!(decode_protocol_config(&data), Decoded::Valid(account));
    }

    #[test]
    fn protocol_config_wrong_size() {
        let data = vec![0u8; PROTOCOL_CONFIG_SIZE + 1];
        assert_eq!(
            decode_protocol_config(&data),
            Decoded::WrongSize { actual: PROTOCOL_CONFIG_SIZE + 1, expected: PROTOCOL_CONFIG_SIZE }
        );
    }
}
