//! End-to-end lease protocol scenarios against the in-memory store.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Barrier;
use trava_lease::{Lease, MemoryLeaseStore, OwnerToken};
use trava_integration_tests::{FailingStore, SilentStore};

fn lease(store: Arc<MemoryLeaseStore>, key: &str, token: &str, ttl: Duration) -> Lease {
    Lease::new(store, key, OwnerToken::new(token), ttl)
}

#[tokio::test]
async fn mutual_exclusion_under_racing_acquirers() -> anyhow::Result<()> {
    let store = Arc::new(MemoryLeaseStore::new());
    let barrier = Arc::new(Barrier::new(8));
    let winners = Arc::new(AtomicUsize::new(0));

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let store = store.clone();
        let barrier = barrier.clone();
        let winners = winners.clone();
        tasks.push(tokio::spawn(async move {
            let lease = Lease::new(
                store,
                "job-42",
                OwnerToken::random(),
                Duration::from_secs(30),
            );
            barrier.wait().await;
            if lease.acquire().await.unwrap() {
                winners.fetch_add(1, Ordering::SeqCst);
            }
        }));
    }
    for task in tasks {
        task.await?;
    }

    assert_eq!(winners.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn contended_lease_hands_over_after_release() -> anyhow::Result<()> {
    let store = Arc::new(MemoryLeaseStore::new());
    let a = lease(store.clone(), "job-42", "A1", Duration::from_secs(10));
    let b = lease(store.clone(), "job-42", "B1", Duration::from_secs(10));

    assert!(a.acquire().await?);
    assert!(!b.acquire().await?);

    a.release().await?;
    assert!(b.acquire().await?);
    assert_eq!(store.current_value("job-42"), Some("B1".to_string()));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn expired_lease_is_taken_over() -> anyhow::Result<()> {
    let store = Arc::new(MemoryLeaseStore::new());
    let a = lease(store.clone(), "job-42", "A1", Duration::from_secs(5));
    let b = lease(store.clone(), "job-42", "B1", Duration::from_secs(5));

    assert!(a.acquire().await?);

    // A goes silent past its whole lease duration
    tokio::time::sleep(Duration::from_secs(6)).await;
    assert!(b.acquire().await?);

    // A's late release must not touch B's entry
    let err = a.release().await.unwrap_err();
    assert!(err.is_not_owner());
    assert_eq!(store.current_value("job-42"), Some("B1".to_string()));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn stale_renew_never_extends_new_holder() -> anyhow::Result<()> {
    let store = Arc::new(MemoryLeaseStore::new());
    let a = lease(store.clone(), "job-42", "A1", Duration::from_secs(5));
    let b = lease(store.clone(), "job-42", "B1", Duration::from_secs(5));

    assert!(a.acquire().await?);
    tokio::time::sleep(Duration::from_secs(6)).await;
    assert!(b.acquire().await?);

    let err = a.renew().await.unwrap_err();
    assert!(err.is_not_owner());

    // B's countdown was untouched by the stale renew
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(store.current_value("job-42"), None);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn takeover_impossible_before_ttl_elapses() -> anyhow::Result<()> {
    let store = Arc::new(MemoryLeaseStore::new());
    let a = lease(store.clone(), "job-42", "A1", Duration::from_secs(10));
    let b = lease(store.clone(), "job-42", "B1", Duration::from_secs(10));

    assert!(a.acquire().await?);

    tokio::time::sleep(Duration::from_millis(9_999)).await;
    assert!(!b.acquire().await?);

    tokio::time::sleep(Duration::from_millis(1)).await;
    assert!(b.acquire().await?);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn renew_resets_the_countdown() -> anyhow::Result<()> {
    let store = Arc::new(MemoryLeaseStore::new());
    let a = lease(store.clone(), "job-42", "A1", Duration::from_secs(10));
    let b = lease(store.clone(), "job-42", "B1", Duration::from_secs(10));

    assert!(a.acquire().await?);

    tokio::time::sleep(Duration::from_secs(8)).await;
    a.renew().await?;

    // 16s after acquisition, 8s after renewal: still A's
    tokio::time::sleep(Duration::from_secs(8)).await;
    assert!(!b.acquire().await?);
    assert_eq!(store.current_value("job-42"), Some("A1".to_string()));

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(b.acquire().await?);
    Ok(())
}

#[tokio::test]
async fn round_trip_leaves_key_absent() -> anyhow::Result<()> {
    let store = Arc::new(MemoryLeaseStore::new());
    let a = lease(store.clone(), "job-42", "A1", Duration::from_secs(10));

    assert!(a.acquire().await?);
    a.renew().await?;
    a.release().await?;

    assert_eq!(store.current_value("job-42"), None);
    Ok(())
}

#[tokio::test]
async fn unreachable_store_surfaces_communication_errors() {
    let a = Lease::new(
        Arc::new(FailingStore),
        "job-42",
        OwnerToken::new("A1"),
        Duration::from_secs(10),
    );

    // Never NotOwner: the true state is unknown, not known-lost
    assert!(a.acquire().await.unwrap_err().is_communication());
    assert!(a.renew().await.unwrap_err().is_communication());
    assert!(a.release().await.unwrap_err().is_communication());
}

#[tokio::test(start_paused = true)]
async fn silent_store_trips_the_op_deadline() {
    let a = Lease::new(
        Arc::new(SilentStore),
        "job-42",
        OwnerToken::new("A1"),
        Duration::from_secs(10),
    )
    .with_op_deadline(Duration::from_secs(2));

    let err = a.acquire().await.unwrap_err();
    assert!(err.is_communication());
    assert!(!err.is_not_owner());
}
