//! Binary codec for the program's wire format.
//!
//! `accounts` decodes (and, for fixtures, encodes) the fixed-layout zero-copy
//! account records; `instructions` builds discriminator-prefixed instruction
//! payloads with the exact account orders the deployed contexts expect.

pub mod accounts;
pub mod instructions;

pub use accounts::{
    decode_protocol_config, decode_split_config, encode_protocol_config, encode_split_config,
    Decoded, ProtocolConfigAccount, RecipientEntry, SplitConfigAccount, UnclaimedEntry,
};
pub use instructions::{
    build_close_split_config, build_create_split_config, build_execute_split,
    build_update_split_config,
};
