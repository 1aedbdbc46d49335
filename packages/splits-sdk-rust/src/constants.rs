//! Wire contract with the deployed Cascade Splits program.
//!
//! Everything in this module is pinned to the on-chain program and must be
//! versioned together with it: PDA seeds, account sizes (including alignment
//! padding), and the Anchor discriminators for accounts and instructions.

use solana_sdk::pubkey::Pubkey;

/// Deployed program ID.
pub const PROGRAM_ID: Pubkey = solana_sdk::pubkey!("SPL1T3rERcu6P6dyBiG7K8LUr21CssZqDAszwANzNMB");

/// Token-2022 program ID (the interface-compatible successor to SPL Token).
pub const TOKEN_2022_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");

// PDA seeds
pub const SPLIT_CONFIG_SEED: &[u8] = b"split_config";
pub const PROTOCOL_CONFIG_SEED: &[u8] = b"protocol_config";

// Fee configuration
pub const PROTOCOL_FEE_BPS: u16 = 100; // 1%
pub const REQUIRED_SPLIT_TOTAL: u16 = 9900; // Recipients must total 99%
pub const BPS_DENOMINATOR: u64 = 10_000;

// A 1-100 share maps onto the 9900-bps recipient pool, so 1 share = 99 bps
pub const BPS_PER_SHARE: u16 = 99;

// Recipient limits
pub const MIN_RECIPIENTS: usize = 1;
pub const MAX_RECIPIENTS: usize = 20;

// Label-encoded unique ids: 4-byte prefix + 1 length byte + up to 27 label bytes
pub const LABEL_PREFIX: [u8; 4] = *b"splt";
pub const MAX_LABEL_LEN: usize = 27;

// ProtocolConfig: discriminator (8) + authority (32) + pending_authority (32)
// + fee_wallet (32) + bump (1)
pub const PROTOCOL_CONFIG_SIZE: usize = 8 + 32 + 32 + 32 + 1; // 105 bytes

// SplitConfig size calculation:
// - discriminator: 8
// - version: 1
// - authority: 32
// - mint: 32
// - vault: 32
// - unique_id: 32
// - bump: 1
// - recipient_count: 1
// - padding for 2-byte alignment: 1
// - recipients: [Recipient; 20] = (32 + 2) * 20 = 680
// - padding for 8-byte alignment: 4
// - unclaimed_amounts: [UnclaimedAmount; 20] = (32 + 8 + 8) * 20 = 960
// - protocol_unclaimed: 8
// - last_activity: 8
// - rent_payer: 32
// Total: 8 + 1 + 32 + 32 + 32 + 32 + 1 + 1 + 1 + 680 + 4 + 960 + 8 + 8 + 32 = 1832
// NOTE: #[repr(C)] on the program side requires the alignment padding
pub const SPLIT_CONFIG_SIZE: usize = 1832;

/// SPL token account size (the vault and every receiving account).
pub const TOKEN_ACCOUNT_SIZE: usize = 165;

// Anchor account discriminators (first 8 bytes of sha256("account:<Name>"))
pub const PROTOCOL_CONFIG_DISCRIMINATOR: [u8; 8] =
    [0xcf, 0x5b, 0xfa, 0x1c, 0x98, 0xb3, 0xd7, 0xd1];
pub const SPLIT_CONFIG_DISCRIMINATOR: [u8; 8] = [0x31, 0xc9, 0x32, 0xe4, 0x16, 0x8e, 0x0c, 0xde];

// Anchor instruction discriminators (first 8 bytes of sha256("global:<name>"))
pub const DISCRIMINATOR_CREATE_SPLIT_CONFIG: [u8; 8] =
    [0x80, 0x2a, 0x3c, 0x6a, 0x04, 0xe9, 0x12, 0xbe];
pub const DISCRIMINATOR_EXECUTE_SPLIT: [u8; 8] = [0x06, 0x2d, 0xab, 0x28, 0x31, 0x81, 0x17, 0x59];
pub const DISCRIMINATOR_UPDATE_SPLIT_CONFIG: [u8; 8] =
    [0x2f, 0x67, 0x4a, 0xaa, 0x37, 0xfb, 0x82, 0x92];
pub const DISCRIMINATOR_CLOSE_SPLIT_CONFIG: [u8; 8] =
    [0xaa, 0xca, 0xfc, 0x5c, 0xc4, 0xa0, 0xf7, 0xe5];
