//! Integration tests for the pub/sub fan-out path
//!
//! Publish on an entity topic, wake subscribers, re-fetch a snapshot, emit.
//! The guarantee for bursts is deliberately weak: emission count is
//! unspecified, but a subscriber always eventually observes the state after
//! the whole burst.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use emotehub::events::watch;
use emotehub::graphql::entities::{Emote, EmoteSet, EmoteStatus, Report, Role, User};
use emotehub::{ChangePublisher, EntityKind, EventBus, MemoryPubSub, MemoryStore, Store, Topic};

// ============================================================================
// Fixtures
// ============================================================================

fn emote(id: &str, name: &str) -> Emote {
    Emote {
        id: id.to_string(),
        owner_id: "u1".to_string(),
        name: name.to_string(),
        tags: Vec::new(),
        animated: false,
        status: EmoteStatus::Live,
        created_at: Utc::now(),
    }
}

fn emote_set(id: &str) -> EmoteSet {
    EmoteSet {
        id: id.to_string(),
        owner_id: "u1".to_string(),
        name: "main".to_string(),
        capacity: 50,
        emote_ids: Vec::new(),
        created_at: Utc::now(),
    }
}

fn setup() -> (Arc<MemoryStore>, Arc<EventBus>, ChangePublisher) {
    let store = Arc::new(MemoryStore::new());
    let bus = Arc::new(EventBus::new(Arc::new(MemoryPubSub::default())));
    let publisher = ChangePublisher::new(bus.clone());
    (store, bus, publisher)
}

/// Snapshot closure fetching one emote through the store.
fn emote_snapshot(
    store: Arc<MemoryStore>,
    id: &str,
) -> impl Fn() -> futures::future::BoxFuture<'static, Option<Emote>> + Send + Sync + 'static {
    let id = id.to_string();
    move || {
        let store = store.clone();
        let id = id.clone();
        Box::pin(async move {
            match store.emotes_by_id(&[id]).await {
                Ok(mut values) => values.pop().flatten(),
                Err(_) => None,
            }
        })
    }
}

// ============================================================================
// Initial Snapshot
// ============================================================================

#[tokio::test]
async fn test_init_emits_exactly_one_snapshot_before_any_notification() {
    let (store, bus, _) = setup();
    store.seed_emote(emote("e1", "peepo"));

    let notifications = bus.subscribe(&Topic::emote("e1")).await.unwrap();
    let mut stream = Box::pin(watch(notifications, true, emote_snapshot(store, "e1")));

    let first = timeout(Duration::from_secs(1), stream.next()).await.unwrap();
    assert_eq!(first.unwrap().name, "peepo");

    // No publish happened, so nothing else may arrive.
    let more = timeout(Duration::from_millis(50), stream.next()).await;
    assert!(more.is_err(), "unexpected second emission without a publish");
}

#[tokio::test]
async fn test_without_init_nothing_is_emitted_until_a_publish() {
    let (store, bus, _) = setup();
    store.seed_emote(emote("e1", "peepo"));
    let topic = Topic::emote("e1");

    let notifications = bus.subscribe(&topic).await.unwrap();
    let mut stream = Box::pin(watch(notifications, false, emote_snapshot(store, "e1")));

    let quiet = timeout(Duration::from_millis(50), stream.next()).await;
    assert!(quiet.is_err());

    bus.publish(&topic).await;
    let first = timeout(Duration::from_secs(1), stream.next()).await.unwrap();
    assert_eq!(first.unwrap().name, "peepo");
}

// ============================================================================
// Snapshot Freshness
// ============================================================================

#[tokio::test]
async fn test_notification_triggers_a_fresh_snapshot() {
    let (store, bus, _) = setup();
    store.seed_emote(emote("e1", "old"));
    let topic = Topic::emote("e1");

    let notifications = bus.subscribe(&topic).await.unwrap();
    let mut stream = Box::pin(watch(notifications, false, emote_snapshot(store.clone(), "e1")));

    store.update_emote_name("e1", "new").await.unwrap();
    bus.publish(&topic).await;

    let emitted = timeout(Duration::from_secs(1), stream.next()).await.unwrap();
    assert_eq!(emitted.unwrap().name, "new");
}

#[tokio::test]
async fn test_absent_entity_skips_emission_without_ending_the_stream() {
    let (store, bus, _) = setup();
    let topic = Topic::emote("e1");

    let notifications = bus.subscribe(&topic).await.unwrap();
    let mut stream = Box::pin(watch(notifications, false, emote_snapshot(store.clone(), "e1")));

    // Entity doesn't exist yet: the token is consumed, nothing is emitted.
    bus.publish(&topic).await;
    let quiet = timeout(Duration::from_millis(50), stream.next()).await;
    assert!(quiet.is_err());

    // Once it exists, the next token produces a snapshot.
    store.seed_emote(emote("e1", "late"));
    bus.publish(&topic).await;
    let emitted = timeout(Duration::from_secs(1), stream.next()).await.unwrap();
    assert_eq!(emitted.unwrap().name, "late");
}

// ============================================================================
// Burst Coalescing
// ============================================================================

/// Store wrapper that slows set reads so publish bursts overlap an in-flight
/// re-fetch.
struct SlowSetStore {
    inner: Arc<MemoryStore>,
    read_delay: Duration,
}

#[async_trait]
impl Store for SlowSetStore {
    async fn users_by_id(&self, ids: &[String]) -> Result<Vec<Option<User>>> {
        self.inner.users_by_id(ids).await
    }

    async fn emotes_by_id(&self, ids: &[String]) -> Result<Vec<Option<Emote>>> {
        self.inner.emotes_by_id(ids).await
    }

    async fn emote_sets_by_id(&self, ids: &[String]) -> Result<Vec<Option<EmoteSet>>> {
        tokio::time::sleep(self.read_delay).await;
        self.inner.emote_sets_by_id(ids).await
    }

    async fn roles_by_id(&self, ids: &[String]) -> Result<Vec<Option<Role>>> {
        self.inner.roles_by_id(ids).await
    }

    async fn reports_by_id(&self, ids: &[String]) -> Result<Vec<Option<Report>>> {
        self.inner.reports_by_id(ids).await
    }

    async fn insert_emote(&self, e: Emote) -> Result<()> {
        self.inner.insert_emote(e).await
    }

    async fn update_emote_name(&self, id: &str, name: &str) -> Result<Option<Emote>> {
        self.inner.update_emote_name(id, name).await
    }

    async fn add_emote_to_set(&self, set_id: &str, emote_id: &str) -> Result<Option<EmoteSet>> {
        self.inner.add_emote_to_set(set_id, emote_id).await
    }

    async fn remove_emote_from_set(
        &self,
        set_id: &str,
        emote_id: &str,
    ) -> Result<Option<EmoteSet>> {
        self.inner.remove_emote_from_set(set_id, emote_id).await
    }

    async fn insert_report(&self, report: Report) -> Result<()> {
        self.inner.insert_report(report).await
    }
}

#[tokio::test]
async fn test_burst_subscriber_eventually_observes_post_burst_state() {
    let memory = Arc::new(MemoryStore::new());
    memory.seed_emote_set(emote_set("s9"));
    let slow = Arc::new(SlowSetStore {
        inner: memory.clone(),
        read_delay: Duration::from_millis(30),
    });
    let bus = Arc::new(EventBus::new(Arc::new(MemoryPubSub::default())));
    let topic = Topic::emote_set("s9");

    let notifications = bus.subscribe(&topic).await.unwrap();
    let snapshot = {
        let slow = slow.clone();
        move || {
            let slow = slow.clone();
            async move {
                slow.emote_sets_by_id(&["s9".to_string()])
                    .await
                    .ok()
                    .and_then(|mut v| v.pop().flatten())
            }
        }
    };
    let mut stream = Box::pin(watch(notifications, false, snapshot));

    // Two writes and publishes in quick succession; the second token lands
    // while the first 30 ms re-fetch is still in flight.
    memory.add_emote_to_set("s9", "e1").await.unwrap();
    bus.publish(&topic).await;
    tokio::time::sleep(Duration::from_millis(1)).await;
    memory.add_emote_to_set("s9", "e2").await.unwrap();
    bus.publish(&topic).await;

    // Drain until quiet; the count is unspecified, the final state is not.
    let mut last = None;
    while let Ok(Some(set)) = timeout(Duration::from_millis(300), stream.next()).await {
        last = Some(set);
    }
    let last = last.expect("at least one snapshot must be emitted");
    assert_eq!(last.emote_ids, vec!["e1".to_string(), "e2".to_string()]);
}

// ============================================================================
// Teardown and Publisher
// ============================================================================

#[tokio::test]
async fn test_cancelling_the_token_ends_the_value_stream() {
    let (store, bus, _) = setup();
    store.seed_emote(emote("e1", "peepo"));
    let token = CancellationToken::new();

    let notifications = bus
        .subscribe_with_token(token.clone(), &Topic::emote("e1"))
        .await
        .unwrap();
    let mut stream = Box::pin(watch(notifications, false, emote_snapshot(store, "e1")));

    token.cancel();

    let end = timeout(Duration::from_secs(1), stream.next()).await;
    assert!(end.unwrap().is_none(), "value stream must close with its token");
}

#[tokio::test]
async fn test_change_publisher_wakes_subscribers() {
    let (store, bus, publisher) = setup();
    store.seed_emote(emote("e1", "peepo"));

    let notifications = bus.subscribe(&Topic::emote("e1")).await.unwrap();
    let mut stream = Box::pin(watch(notifications, false, emote_snapshot(store, "e1")));

    // Fire-and-forget from the mutation path.
    publisher.publish(EntityKind::Emote, "e1");

    let emitted = timeout(Duration::from_secs(1), stream.next()).await.unwrap();
    assert_eq!(emitted.unwrap().name, "peepo");
}
