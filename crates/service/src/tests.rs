#![expect(clippy::unwrap_used, reason = "test code")]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use seadex_rss_core::{DisplayMetadata, Entry, NewSnapshot, Snapshot, TrackedId};
use seadex_rss_storage::{SnapshotStore, Storage, StorageError};
use seadex_rss_upstream::{CatalogSource, MetadataSource, UpstreamError};
use serde_json::{Value, json};
use tempfile::TempDir;

use crate::{RefreshOutcome, RefreshService, ServiceError, StalenessTracker};

const INTERVAL_MINUTES: i64 = 240;

#[derive(Clone)]
enum Reply {
    Found(Value),
    Missing,
    Unreachable,
}

struct FakeCatalog {
    reply: Mutex<Reply>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeCatalog {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self { reply: Mutex::new(reply), delay: None, calls: AtomicUsize::new(0) })
    }

    fn slow(reply: Reply, delay: Duration) -> Arc<Self> {
        Arc::new(Self { reply: Mutex::new(reply), delay: Some(delay), calls: AtomicUsize::new(0) })
    }

    fn set(&self, reply: Reply) {
        *self.reply.lock().unwrap() = reply;
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn fetch_entry(&self, _id: TrackedId) -> Result<Option<Entry>, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let reply = self.reply.lock().unwrap().clone();
        match reply {
            Reply::Found(value) => Ok(Some(Entry::new(value))),
            Reply::Missing => Ok(None),
            Reply::Unreachable => Err(UpstreamError::Timeout),
        }
    }
}

#[derive(Default)]
struct FakeMetadata {
    calls: AtomicUsize,
}

#[async_trait]
impl MetadataSource for FakeMetadata {
    async fn fetch_display_metadata(&self, id: TrackedId) -> DisplayMetadata {
        self.calls.fetch_add(1, Ordering::SeqCst);
        DisplayMetadata {
            title: format!("Show {id}"),
            cover_image_url: Some(format!("https://img.example/{id}.jpg")),
        }
    }
}

/// Store whose every call fails, to exercise the error paths.
struct FailingStore;

#[async_trait]
impl SnapshotStore for FailingStore {
    async fn latest_snapshot(&self, _id: TrackedId) -> Result<Option<Snapshot>, StorageError> {
        Err(StorageError::Join("store offline".to_owned()))
    }

    async fn recent_snapshots(
        &self,
        _id: TrackedId,
        _limit: usize,
    ) -> Result<Vec<Snapshot>, StorageError> {
        Err(StorageError::Join("store offline".to_owned()))
    }

    async fn append_if_changed(
        &self,
        _snapshot: &NewSnapshot,
    ) -> Result<Option<Snapshot>, StorageError> {
        Err(StorageError::Join("store offline".to_owned()))
    }

    async fn count_snapshots(&self, _id: TrackedId) -> Result<usize, StorageError> {
        Err(StorageError::Join("store offline".to_owned()))
    }
}

struct Harness {
    service: Arc<RefreshService>,
    store: Arc<Storage>,
    catalog: Arc<FakeCatalog>,
    metadata: Arc<FakeMetadata>,
    _dir: TempDir,
}

fn harness(catalog: Arc<FakeCatalog>) -> Harness {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(Storage::new(&dir.path().join("test.db")).unwrap());
    let metadata = Arc::new(FakeMetadata::default());
    let staleness = Arc::new(StalenessTracker::new(TimeDelta::minutes(INTERVAL_MINUTES)));
    let service = RefreshService::new(
        Arc::clone(&store) as Arc<dyn SnapshotStore>,
        Arc::clone(&catalog) as Arc<dyn CatalogSource>,
        Arc::clone(&metadata) as Arc<dyn MetadataSource>,
        staleness,
    )
    .with_fetch_timeout(Duration::from_millis(200));
    Harness { service: Arc::new(service), store, catalog, metadata, _dir: dir }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
}

fn id(raw: u32) -> TrackedId {
    TrackedId::new(raw)
}

fn entry_v1() -> Value {
    json!({"updated": "2024-03-01", "incomplete": false, "notes": "first"})
}

fn entry_v2() -> Value {
    json!({"updated": "2024-03-02", "incomplete": false, "notes": "second"})
}

#[tokio::test]
async fn first_refresh_stores_snapshot_with_metadata() {
    let h = harness(FakeCatalog::new(Reply::Found(entry_v1())));

    let outcome = h.service.refresh_if_needed(id(100), t0()).await;

    assert_eq!(outcome, RefreshOutcome::Updated);
    let latest = h.store.latest_snapshot(id(100)).unwrap().unwrap();
    assert_eq!(latest.display_title, "Show 100");
    assert_eq!(latest.cover_image_url.as_deref(), Some("https://img.example/100.jpg"));
    assert_eq!(latest.timestamp, t0());
    assert_eq!(h.service.staleness().last_checked(id(100)), Some(t0()));
}

#[tokio::test]
async fn refresh_within_interval_makes_no_upstream_call() {
    let h = harness(FakeCatalog::new(Reply::Found(entry_v1())));

    h.service.refresh_if_needed(id(100), t0()).await;
    let second = h.service.refresh_if_needed(id(100), t0() + TimeDelta::minutes(5)).await;

    assert_eq!(second, RefreshOutcome::NoActionNeeded);
    assert_eq!(h.catalog.calls(), 1);
    assert_eq!(h.store.count_snapshots(id(100)).unwrap(), 1);
}

#[tokio::test]
async fn failed_refresh_still_throttles() {
    let h = harness(FakeCatalog::new(Reply::Unreachable));

    let first = h.service.refresh_if_needed(id(100), t0()).await;
    let second = h.service.refresh_if_needed(id(100), t0() + TimeDelta::minutes(1)).await;

    assert_eq!(first, RefreshOutcome::FetchError);
    assert_eq!(second, RefreshOutcome::NoActionNeeded);
    assert_eq!(h.catalog.calls(), 1);
    assert_eq!(h.service.staleness().last_checked(id(100)), Some(t0()));
}

#[tokio::test]
async fn refetches_once_interval_has_passed() {
    let h = harness(FakeCatalog::new(Reply::Found(entry_v1())));
    h.service.refresh_if_needed(id(100), t0()).await;

    let at_boundary = t0() + TimeDelta::minutes(INTERVAL_MINUTES);
    assert_eq!(
        h.service.refresh_if_needed(id(100), at_boundary).await,
        RefreshOutcome::NoActionNeeded
    );

    let later = at_boundary + TimeDelta::seconds(1);
    assert_eq!(h.service.refresh_if_needed(id(100), later).await, RefreshOutcome::Unchanged);
    assert_eq!(h.catalog.calls(), 2);
    assert_eq!(h.service.staleness().last_checked(id(100)), Some(later));
}

#[tokio::test]
async fn changed_entry_appends_and_unchanged_does_not() {
    let h = harness(FakeCatalog::new(Reply::Found(entry_v1())));
    let t1 = t0();
    let t2 = t1 + TimeDelta::hours(5);
    let t3 = t2 + TimeDelta::hours(5);

    assert_eq!(h.service.refresh_now(id(100), t1).await, RefreshOutcome::Updated);
    h.catalog.set(Reply::Found(entry_v2()));
    assert_eq!(h.service.refresh_now(id(100), t2).await, RefreshOutcome::Updated);
    assert_eq!(h.service.refresh_now(id(100), t3).await, RefreshOutcome::Unchanged);
    h.catalog.set(Reply::Found(entry_v1()));
    assert_eq!(h.service.refresh_now(id(100), t3).await, RefreshOutcome::Updated);

    let history = h.service.history(id(100), 10).await.unwrap();
    let stamps: Vec<_> = history.iter().map(|s| s.timestamp).collect();
    assert_eq!(stamps, vec![t3, t2, t1]);
}

#[tokio::test]
async fn key_order_does_not_count_as_change() {
    let h = harness(FakeCatalog::new(Reply::Found(json!({"a": 1, "b": {"x": 1, "y": 2}}))));
    h.service.refresh_now(id(7), t0()).await;

    h.catalog.set(Reply::Found(json!({"b": {"y": 2, "x": 1}, "a": 1})));
    let outcome = h.service.refresh_now(id(7), t0() + TimeDelta::hours(5)).await;

    assert_eq!(outcome, RefreshOutcome::Unchanged);
    assert_eq!(h.store.count_snapshots(id(7)).unwrap(), 1);
}

#[tokio::test]
async fn metadata_fetched_only_when_entry_changed() {
    let h = harness(FakeCatalog::new(Reply::Found(entry_v1())));

    h.service.refresh_now(id(100), t0()).await;
    h.service.refresh_now(id(100), t0() + TimeDelta::hours(5)).await;

    assert_eq!(h.metadata.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unknown_id_reports_no_snapshots_and_marks_checked() {
    let h = harness(FakeCatalog::new(Reply::Missing));

    let err = h.service.feed(id(999), t0()).await.unwrap_err();

    assert!(err.is_not_found());
    assert!(matches!(
        err,
        ServiceError::NoSnapshots { outcome: RefreshOutcome::UpstreamMiss, .. }
    ));
    assert_eq!(h.service.staleness().last_checked(id(999)), Some(t0()));
    assert_eq!(h.store.count_snapshots(id(999)).unwrap(), 0);
}

#[tokio::test]
async fn feed_serves_history_when_upstream_is_down() {
    let h = harness(FakeCatalog::new(Reply::Found(entry_v1())));
    h.service.refresh_now(id(100), t0()).await;
    h.catalog.set(Reply::Unreachable);

    let later = t0() + TimeDelta::days(1);
    let feed = h.service.feed(id(100), later).await.unwrap();

    assert_eq!(feed.outcome, RefreshOutcome::FetchError);
    assert_eq!(feed.snapshots.len(), 1);
    assert_eq!(h.service.staleness().last_checked(id(100)), Some(later));
}

#[tokio::test]
async fn feed_respects_limit() {
    let h = harness(FakeCatalog::new(Reply::Found(json!({"rev": 0}))));
    for rev in 0..5_i64 {
        h.catalog.set(Reply::Found(json!({ "rev": rev })));
        h.service.refresh_now(id(5), t0() + TimeDelta::hours(rev)).await;
    }
    let service = RefreshService::new(
        Arc::clone(&h.store) as Arc<dyn SnapshotStore>,
        Arc::clone(&h.catalog) as Arc<dyn CatalogSource>,
        Arc::clone(&h.metadata) as Arc<dyn MetadataSource>,
        Arc::new(StalenessTracker::new(TimeDelta::minutes(INTERVAL_MINUTES))),
    )
    .with_feed_limit(3);

    let feed = service.feed(id(5), t0() + TimeDelta::hours(5)).await.unwrap();

    assert_eq!(feed.snapshots.len(), 3);
    assert_eq!(feed.snapshots[0].timestamp, t0() + TimeDelta::hours(4));
}

#[tokio::test]
async fn slow_catalog_times_out_as_fetch_error() {
    let h = harness(FakeCatalog::slow(Reply::Found(entry_v1()), Duration::from_secs(5)));

    let outcome = h.service.refresh_now(id(100), t0()).await;

    assert_eq!(outcome, RefreshOutcome::FetchError);
    assert_eq!(h.store.count_snapshots(id(100)).unwrap(), 0);
}

#[tokio::test]
async fn store_failure_is_reported_as_fetch_error() {
    let catalog = FakeCatalog::new(Reply::Found(entry_v1()));
    let service = RefreshService::new(
        Arc::new(FailingStore),
        Arc::clone(&catalog) as Arc<dyn CatalogSource>,
        Arc::new(FakeMetadata::default()),
        Arc::new(StalenessTracker::new(TimeDelta::minutes(INTERVAL_MINUTES))),
    );

    assert_eq!(service.refresh_now(id(100), t0()).await, RefreshOutcome::FetchError);

    let err = service.feed(id(101), t0()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Storage(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_fetch_once() {
    let h = harness(FakeCatalog::slow(Reply::Found(entry_v1()), Duration::from_millis(50)));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = Arc::clone(&h.service);
        handles.push(tokio::spawn(async move { service.refresh_if_needed(id(100), t0()).await }));
    }
    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap());
    }

    assert_eq!(h.catalog.calls(), 1);
    assert!(
        outcomes
            .iter()
            .all(|o| matches!(o, RefreshOutcome::Updated | RefreshOutcome::NoActionNeeded)),
        "{outcomes:?}"
    );
    assert!(outcomes.contains(&RefreshOutcome::Updated));
    assert_eq!(h.store.count_snapshots(id(100)).unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_first_requests_both_get_the_feed() {
    let h = harness(FakeCatalog::slow(Reply::Found(entry_v1()), Duration::from_millis(100)));

    let first = {
        let service = Arc::clone(&h.service);
        tokio::spawn(async move { service.feed(id(100), t0()).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = {
        let service = Arc::clone(&h.service);
        tokio::spawn(async move { service.feed(id(100), t0()).await })
    };

    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();

    assert_eq!(first.outcome, RefreshOutcome::Updated);
    assert_eq!(second.outcome, RefreshOutcome::Updated);
    assert_eq!(first.snapshots.len(), 1);
    assert_eq!(second.snapshots, first.snapshots);
    assert_eq!(h.catalog.calls(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_requests_for_unknown_id_share_the_miss() {
    let h = harness(FakeCatalog::slow(Reply::Missing, Duration::from_millis(100)));

    let first = {
        let service = Arc::clone(&h.service);
        tokio::spawn(async move { service.feed(id(999), t0()).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = h.service.feed(id(999), t0()).await;

    for result in [first.await.unwrap(), second] {
        assert!(matches!(
            result,
            Err(ServiceError::NoSnapshots { outcome: RefreshOutcome::UpstreamMiss, .. })
        ));
    }
    assert_eq!(h.catalog.calls(), 1);
}

#[tokio::test]
async fn finished_refresh_outcome_is_not_reported_to_later_callers() {
    let h = harness(FakeCatalog::new(Reply::Found(entry_v1())));

    assert_eq!(h.service.refresh_if_needed(id(100), t0()).await, RefreshOutcome::Updated);
    let later = t0() + TimeDelta::minutes(1);

    assert_eq!(h.service.refresh_if_needed(id(100), later).await, RefreshOutcome::NoActionNeeded);
}

#[test]
fn outcome_failure_classification() {
    assert!(RefreshOutcome::UpstreamMiss.is_failure());
    assert!(RefreshOutcome::FetchError.is_failure());
    assert!(!RefreshOutcome::Unchanged.is_failure());
    assert!(!RefreshOutcome::NoActionNeeded.is_failure());
    assert_eq!(RefreshOutcome::Updated.to_string(), "updated");
}
