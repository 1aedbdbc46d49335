//! Process-wide caches for read-mostly ledger facts.
//!
//! Both caches store only positive, confirmed facts. A negative lookup
//! (not found, wrong shape, transport error) is never cached: the account
//! may be created a moment later, and caching its absence would make
//! `ensure` permanently blind to it.
//!
//! These are plain instance-owned structs, injected into the client; there
//! is no module-level singleton, so tests construct isolated instances.

use std::sync::RwLock;

use dashmap::DashMap;
use solana_sdk::pubkey::Pubkey;

use crate::codec::ProtocolConfigAccount;

/// "Address X is a confirmed split config record."
///
/// Per-key entries: invalidating one address never locks out reads of
/// unrelated addresses.
#[derive(Debug, Default)]
pub struct SplitIdentityCache {
    entries: DashMap<Pubkey, ()>,
}

impl SplitIdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a confirmed positive identity.
    pub fn insert(&self, address: Pubkey) {
        self.entries.insert(address, ());
    }

    pub fn contains(&self, address: &Pubkey) -> bool {
        self.entries.contains_key(address)
    }

    pub fn invalidate(&self, address: &Pubkey) {
        self.entries.remove(address);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

/// Single-slot cache of the protocol config singleton.
///
/// Valid until explicitly invalidated. The client invalidates it when the
/// program rejects a submission with the stale-fee-recipient error, then
/// refetches and retries exactly once.
#[derive(Debug, Default)]
pub struct ProtocolConfigCache {
    slot: RwLock<Option<ProtocolConfigAccount>>,
}

impl ProtocolConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<ProtocolConfigAccount> {
        *self.slot.read().expect("protocol config cache poisoned")
    }

    pub fn store(&self, config: ProtocolConfigAccount) {
        *self.slot.write().expect("protocol config cache poisoned") = Some(config);
    }

    pub fn invalidate(&self) {
        *self.slot.write().expect("protocol config cache poisoned") = None;
    }
}
