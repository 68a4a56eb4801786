//! Unit tests for the session store

use std::sync::Arc;

use crate::errors::DomainError;
use crate::services::session::{
    ManualClock, SessionStore, SessionStoreConfig, SigningKey, TokenCodec,
};

const START: i64 = 1_700_000_000;

fn test_codec() -> TokenCodec {
    TokenCodec::new(SigningKey::new(b"store-test-signing-key"))
}

fn store_with_lifetimes(access: i64, refresh: i64) -> (SessionStore<ManualClock>, ManualClock) {
    let clock = ManualClock::start_at(START);
    let store = SessionStore::with_clock(
        test_codec(),
        SessionStoreConfig::new(access, refresh),
        clock.clone(),
    )
    .expect("store config is valid");
    (store, clock)
}

#[test]
fn test_rejects_non_positive_lifetimes() {
    let zero_access = SessionStore::with_clock(
        test_codec(),
        SessionStoreConfig::new(0, 900),
        ManualClock::start_at(START),
    );
    assert!(matches!(zero_access, Err(DomainError::Validation { .. })));

    let negative_refresh = SessionStore::with_clock(
        test_codec(),
        SessionStoreConfig::new(900, -1),
        ManualClock::start_at(START),
    );
    assert!(matches!(
        negative_refresh,
        Err(DomainError::Validation { .. })
    ));
}

#[tokio::test]
async fn test_create_then_get_user_id() {
    let config = SessionStoreConfig::default()
        .with_access_lifetime_minutes(15)
        .with_refresh_lifetime_days(7);
    let store = SessionStore::new(test_codec(), config).expect("store config is valid");

    let session = store.create(42).await.unwrap();

    assert_eq!(store.get_user_id(&session.access_token).await, Some(42));
    assert_eq!(session.expires, 15 * 60);
    assert_eq!(session.token_type, "bearer");
    assert_ne!(session.access_token, session.refresh_token);
}

#[tokio::test]
async fn test_unknown_token_is_rejected() {
    let (store, _clock) = store_with_lifetimes(900, 604_800);

    assert_eq!(store.get_user_id("garbage").await, None);

    let foreign = TokenCodec::new(SigningKey::new(b"other-signing-key"))
        .encode(5, START, 900)
        .unwrap();
    assert_eq!(store.get_user_id(&foreign).await, None);
    assert!(store.refresh(&foreign).await.unwrap().is_none());
}

#[tokio::test]
async fn test_revoke_rejects_access_token() {
    let (store, _clock) = store_with_lifetimes(900, 604_800);
    let session = store.create(7).await.unwrap();

    store.revoke(&session.access_token).await;

    assert_eq!(store.get_user_id(&session.access_token).await, None);
}

#[tokio::test]
async fn test_access_token_expires() {
    let (store, clock) = store_with_lifetimes(900, 604_800);
    let session = store.create(6).await.unwrap();

    clock.advance(899);
    assert_eq!(store.get_user_id(&session.access_token).await, Some(6));

    clock.advance(1);
    assert_eq!(store.get_user_id(&session.access_token).await, None);
}

#[tokio::test]
async fn test_refresh_after_access_expiry() {
    let (store, clock) = store_with_lifetimes(900, 604_800);
    let session = store.create(13).await.unwrap();

    clock.advance(900);
    assert_eq!(store.get_user_id(&session.access_token).await, None);

    let renewed = store
        .refresh(&session.refresh_token)
        .await
        .unwrap()
        .expect("refresh token outlives the access token");
    assert_eq!(store.get_user_id(&renewed.access_token).await, Some(13));
}

#[tokio::test]
async fn test_refresh_reuses_refresh_token() {
    let (store, _clock) = store_with_lifetimes(900, 604_800);
    let session = store.create(21).await.unwrap();

    let renewed = store
        .refresh(&session.refresh_token)
        .await
        .unwrap()
        .expect("refresh token is live");

    assert_eq!(renewed.refresh_token, session.refresh_token);
    assert_ne!(renewed.access_token, session.access_token);
    assert_eq!(store.get_user_id(&renewed.access_token).await, Some(21));
    // the earlier access token stays live until it expires or is revoked
    assert_eq!(store.get_user_id(&session.access_token).await, Some(21));
}

#[tokio::test]
async fn test_revocation_cascade() {
    let (store, _clock) = store_with_lifetimes(900, 604_800);
    let first = store.create(7).await.unwrap();
    let second = store
        .refresh(&first.refresh_token)
        .await
        .unwrap()
        .expect("refresh token is live");

    store.revoke(&first.access_token).await;

    assert_eq!(store.get_user_id(&first.access_token).await, None);
    assert_eq!(store.get_user_id(&second.access_token).await, None);
    assert!(store.refresh(&first.refresh_token).await.unwrap().is_none());
}

#[tokio::test]
async fn test_revoke_is_idempotent() {
    let (store, _clock) = store_with_lifetimes(900, 604_800);
    let session = store.create(8).await.unwrap();

    store.revoke(&session.access_token).await;
    store.revoke(&session.access_token).await;

    assert_eq!(store.get_user_id(&session.access_token).await, None);
    assert!(store.refresh(&session.refresh_token).await.unwrap().is_none());
}

#[tokio::test]
async fn test_revoke_unknown_token_is_noop() {
    let (store, _clock) = store_with_lifetimes(900, 604_800);

    store.revoke("unknown-token").await;

    let session = store.create(5).await.unwrap();
    assert_eq!(store.get_user_id(&session.access_token).await, Some(5));
}

#[tokio::test]
async fn test_cleanup_prunes_expired_revocations() {
    let (store, clock) = store_with_lifetimes(10, 20);

    let first = store.create(1).await.unwrap();
    store.revoke(&first.access_token).await;
    // access and refresh token both revoked, neither expired yet
    assert_eq!(store.stats().await.revoked_tokens, 2);

    // everything in the first family expires
    clock.advance(21);

    let second = store.create(2).await.unwrap();
    store.revoke(&second.access_token).await;

    // only the second family's tokens are still remembered
    let stats = store.stats().await;
    assert_eq!(stats.revoked_tokens, 2);
    assert_eq!(stats.lineage_entries, 1);
    assert_eq!(stats.token_families, 1);
}

#[tokio::test]
async fn test_unparseable_revocations_survive_cleanup() {
    let (store, clock) = store_with_lifetimes(10, 20);

    store.revoke("not-even-a-token").await;
    let foreign = TokenCodec::new(SigningKey::new(b"other-signing-key"))
        .encode(5, START, 10)
        .unwrap();
    store.revoke(&foreign).await;
    assert_eq!(store.stats().await.revoked_tokens, 2);

    clock.advance(1_000);
    store.create(1).await.unwrap();

    // entries that fail structure or signature checks are never mistaken
    // for expired tokens, so they are not pruned
    assert_eq!(store.stats().await.revoked_tokens, 2);
}

#[tokio::test]
async fn test_revoke_after_lineage_pruned() {
    let (store, clock) = store_with_lifetimes(1, 100);
    let session = store.create(3).await.unwrap();

    clock.advance(2);
    // a later issuance prunes the expired access token's lineage entry
    store.create(4).await.unwrap();

    // the expired access token no longer names its family, so revoking it
    // cannot reach the still-live refresh token
    store.revoke(&session.access_token).await;

    let renewed = store
        .refresh(&session.refresh_token)
        .await
        .unwrap()
        .expect("refresh token is still live");
    assert_eq!(store.get_user_id(&renewed.access_token).await, Some(3));
}

#[tokio::test]
async fn test_one_second_lifetime_scenario() {
    let (store, clock) = store_with_lifetimes(1, 2);
    let session = store.create(11).await.unwrap();

    clock.advance(1);
    assert_eq!(store.get_user_id(&session.access_token).await, None);

    let renewed = store
        .refresh(&session.refresh_token)
        .await
        .unwrap()
        .expect("refresh token still live after one second");
    assert_eq!(store.get_user_id(&renewed.access_token).await, Some(11));

    // two seconds after creation the whole chain is dead
    clock.advance(1);
    assert_eq!(store.get_user_id(&session.access_token).await, None);
    assert_eq!(store.get_user_id(&renewed.access_token).await, None);
    assert!(store.refresh(&session.refresh_token).await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_refresh_and_revoke() {
    let (store, _clock) = store_with_lifetimes(900, 604_800);
    let store = Arc::new(store);
    let session = store.create(9).await.unwrap();

    let mut refreshers = Vec::new();
    for _ in 0..8 {
        let store = Arc::clone(&store);
        let refresh_token = session.refresh_token.clone();
        refreshers.push(tokio::spawn(async move {
            store.refresh(&refresh_token).await.unwrap()
        }));
    }

    let revoker = {
        let store = Arc::clone(&store);
        let access_token = session.access_token.clone();
        tokio::spawn(async move { store.revoke(&access_token).await })
    };

    let mut minted = Vec::new();
    for handle in refreshers {
        if let Some(renewed) = handle.await.unwrap() {
            minted.push(renewed);
        }
    }
    revoker.await.unwrap();

    // a refresh that beat the revoke left its access token in the lineage
    // map, so the cascade caught it; one that lost found the refresh
    // token already revoked and returned nothing
    assert_eq!(store.get_user_id(&session.access_token).await, None);
    for renewed in &minted {
        assert_eq!(store.get_user_id(&renewed.access_token).await, None);
    }
    assert!(store.refresh(&session.refresh_token).await.unwrap().is_none());
}
