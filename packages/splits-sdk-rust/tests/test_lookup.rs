//! Tests for the read helpers and the asymmetric identity cache.

mod helpers;

use helpers::{setup, split_fixture};
use solana_sdk::pubkey::Pubkey;

use cascade_splits_sdk::{SplitLookup, UnclaimedEntry};

/// A confirmed positive identity is cached: the second lookup performs zero
/// ledger reads. Negative lookups are never cached and always re-read.
#[tokio::test]
async fn identity_cache_is_positive_only() {
    let (ledger, _wallet, client) = setup();

    let authority = Pubkey::new_unique();
    let mint = Pubkey::new_unique();
    let unique_id = Pubkey::new_unique();
    let alice = Pubkey::new_unique();

    let (record, account) = split_fixture(authority, mint, unique_id, &[(alice, 9900)]);
    ledger.add_split_config(record, &account);

    assert!(client.is_split(&record).await.unwrap());
    assert_eq!(ledger.reads_of(&record), 1);
    assert!(client.is_split(&record).await.unwrap());
    assert_eq!(ledger.reads_of(&record), 1);

    // A record that does not exist yet is re-read every time
    let absent = Pubkey::new_unique();
    assert!(!client.is_split(&absent).await.unwrap());
    assert!(!client.is_split(&absent).await.unwrap());
    assert_eq!(ledger.reads_of(&absent), 2);
}

#[tokio::test]
async fn invalidated_identity_is_re_read() {
    let (ledger, _wallet, client) = setup();

    let (record, account) = split_fixture(
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        &[(Pubkey::new_unique(), 9900)],
    );
    ledger.add_split_config(record, &account);

    assert!(client.is_split(&record).await.unwrap());
    client.identity_cache().invalidate(&record);
    assert!(client.is_split(&record).await.unwrap());
    assert_eq!(ledger.reads_of(&record), 2);
}

#[tokio::test]
async fn get_split_config_classifies_lookups() {
    let (ledger, _wallet, client) = setup();

    let (record, account) = split_fixture(
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        &[(Pubkey::new_unique(), 9900)],
    );
    ledger.add_split_config(record, &account);

    match client.get_split_config(&record).await.unwrap() {
        SplitLookup::Valid { account: decoded, .. } => {
            assert_eq!(*decoded, account);
        }
        other => panic!("expected Valid, got {other:?}"),
    }

    assert_eq!(
        client.get_split_config(&Pubkey::new_unique()).await.unwrap(),
        SplitLookup::Missing
    );
}

#[tokio::test]
async fn split_balance_reads_the_vault() {
    let (ledger, _wallet, client) = setup();

    let (record, account) = split_fixture(
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        Pubkey::new_unique(),
        &[(Pubkey::new_unique(), 9900)],
    );
    ledger.add_split_config(record, &account);
    ledger.add_token_account(account.vault, 420_000);

    assert_eq!(client.get_split_balance(&record).await.unwrap(), Some(420_000));
    assert_eq!(
        client.get_split_balance(&Pubkey::new_unique()).await.unwrap(),
        None
    );
}

/// The preview mirrors the program's math: unclaimed carry-overs are
/// reserved before splitting, and the fee is the remainder of the pool.
#[tokio::test]
async fn preview_execution_reserves_unclaimed() {
    let (ledger, _wallet, client) = setup();

    let authority = Pubkey::new_unique();
    let mint = Pubkey::new_unique();
    let unique_id = Pubkey::new_unique();
    let alice = Pubkey::new_unique();
    let bob = Pubkey::new_unique();

    let (record, mut account) =
        split_fixture(authority, mint, unique_id, &[(alice, 5940), (bob, 3960)]);
    account.unclaimed = vec![UnclaimedEntry {
        recipient: bob,
        amount: 200_000,
        timestamp: 1_700_000_000,
    }];
    ledger.add_split_config(record, &account);
    ledger.add_token_account(account.vault, 1_200_000);

    let preview = client.preview_execution(&record).await.unwrap().unwrap();
    assert_eq!(preview.available, 1_000_000);
    assert_eq!(preview.pending_unclaimed, 200_000);
    assert_eq!(preview.pending_protocol_unclaimed, 0);
    assert_eq!(preview.distribution.payouts[0].amount, 594_000);
    assert_eq!(preview.distribution.payouts[1].amount, 396_000);
    assert_eq!(preview.distribution.protocol_fee, 10_000);

    assert_eq!(client.preview_execution(&Pubkey::new_unique()).await.unwrap(), None);
}
