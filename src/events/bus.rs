//! Event bus over an external pub/sub primitive
//!
//! The primitive is one string channel per topic ([`PubSub`]); the bus turns
//! it into fire-and-forget publishes and independently cancellable
//! per-subscriber streams of payload-free change tokens.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_util::sync::CancellationToken;

use super::topic::Topic;

/// A stream of "something changed" tokens for one subscription.
pub type EventStream = BoxStream<'static, ()>;

/// The external pub/sub primitive: one string channel per topic.
///
/// `MemoryPubSub` is the in-process implementation; a Redis-style adapter
/// implements the same two calls.
#[async_trait]
pub trait PubSub: Send + Sync + 'static {
    /// Publish a payload, returning how many subscribers received it.
    async fn publish(&self, channel: &str, payload: &str) -> Result<usize>;

    /// Register interest in a channel.
    async fn subscribe(&self, channel: &str) -> Result<broadcast::Receiver<String>>;
}

/// In-process pub/sub backed by one broadcast channel per channel name.
pub struct MemoryPubSub {
    capacity: usize,
    channels: RwLock<HashMap<String, broadcast::Sender<String>>>,
}

impl MemoryPubSub {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Number of channels with a live registration. Test hook.
    pub fn channel_count(&self) -> usize {
        self.channels.read().len()
    }
}

impl Default for MemoryPubSub {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl PubSub for MemoryPubSub {
    async fn publish(&self, channel: &str, payload: &str) -> Result<usize> {
        let sender = self.channels.read().get(channel).cloned();
        let Some(sender) = sender else {
            // Nobody ever subscribed; publishing is a no-op.
            return Ok(0);
        };

        match sender.send(payload.to_string()) {
            Ok(receivers) => Ok(receivers),
            Err(_) => {
                // Every subscriber has gone away; drop the dangling
                // registration so the channel map doesn't grow unbounded.
                let mut channels = self.channels.write();
                if channels
                    .get(channel)
                    .is_some_and(|tx| tx.receiver_count() == 0)
                {
                    channels.remove(channel);
                }
                Ok(0)
            }
        }
    }

    async fn subscribe(&self, channel: &str) -> Result<broadcast::Receiver<String>> {
        let mut channels = self.channels.write();
        let sender = channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        Ok(sender.subscribe())
    }
}

/// Topic-addressed publish and cancellable subscribe over a [`PubSub`].
pub struct EventBus {
    pubsub: Arc<dyn PubSub>,
    shutdown: CancellationToken,
}

impl EventBus {
    pub fn new(pubsub: Arc<dyn PubSub>) -> Self {
        Self {
            pubsub,
            shutdown: CancellationToken::new(),
        }
    }

    /// Fire-and-forget publish: failures are logged, never surfaced to the
    /// caller.
    pub async fn publish(&self, topic: &Topic) {
        match self.pubsub.publish(&topic.channel(), &topic.id).await {
            Ok(receivers) => {
                tracing::debug!(topic = %topic, receivers, "published change");
            }
            Err(error) => {
                tracing::warn!(topic = %topic, error = %error, "failed to publish change");
            }
        }
    }

    /// Subscribe to a topic; the stream ends when the server shuts down or
    /// the underlying channel closes.
    pub async fn subscribe(&self, topic: &Topic) -> Result<EventStream> {
        self.subscribe_with_token(self.shutdown.child_token(), topic)
            .await
    }

    /// Subscribe with an explicit cancellation token. Cancelling the token is
    /// the only way the stream terminates other than channel closure; no
    /// registration or task outlives it.
    pub async fn subscribe_with_token(
        &self,
        token: CancellationToken,
        topic: &Topic,
    ) -> Result<EventStream> {
        let receiver = self.pubsub.subscribe(&topic.channel()).await?;
        tracing::debug!(topic = %topic, "subscribed");

        // A lagged receiver missed some signals; that still means "something
        // changed", so it maps to a token like any other item.
        let stream = BroadcastStream::new(receiver)
            .map(|_| ())
            .take_until(token.cancelled_owned());
        Ok(stream.boxed())
    }

    /// Cancel every stream handed out by [`subscribe`](Self::subscribe).
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    fn bus_with_memory() -> (Arc<MemoryPubSub>, EventBus) {
        let pubsub = Arc::new(MemoryPubSub::default());
        let bus = EventBus::new(pubsub.clone());
        (pubsub, bus)
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_a_noop() {
        let (_, bus) = bus_with_memory();
        // Must not block or error; nothing to assert beyond completion.
        bus.publish(&Topic::emote("1")).await;
    }

    #[tokio::test]
    async fn test_subscriber_receives_token_per_publish() {
        let (_, bus) = bus_with_memory();
        let topic = Topic::emote("1");
        let mut stream = bus.subscribe(&topic).await.unwrap();

        bus.publish(&topic).await;

        let token = timeout(Duration::from_secs(1), stream.next()).await;
        assert_eq!(token.unwrap(), Some(()));
    }

    #[tokio::test]
    async fn test_topics_are_isolated() {
        let (_, bus) = bus_with_memory();
        let mut stream = bus.subscribe(&Topic::emote("1")).await.unwrap();

        bus.publish(&Topic::emote("2")).await;
        bus.publish(&Topic::emote_set("1")).await;

        let nothing = timeout(Duration::from_millis(50), stream.next()).await;
        assert!(nothing.is_err(), "token leaked across topics");
    }

    #[tokio::test]
    async fn test_cancellation_closes_the_stream() {
        let (_, bus) = bus_with_memory();
        let token = CancellationToken::new();
        let mut stream = bus
            .subscribe_with_token(token.clone(), &Topic::user("u1"))
            .await
            .unwrap();

        token.cancel();

        let end = timeout(Duration::from_secs(1), stream.next()).await;
        assert_eq!(end.unwrap(), None, "stream must close promptly on cancel");
    }

    #[tokio::test]
    async fn test_shutdown_closes_all_streams() {
        let (_, bus) = bus_with_memory();
        let mut a = bus.subscribe(&Topic::emote("1")).await.unwrap();
        let mut b = bus.subscribe(&Topic::emote("2")).await.unwrap();

        bus.shutdown();

        assert_eq!(timeout(Duration::from_secs(1), a.next()).await.unwrap(), None);
        assert_eq!(timeout(Duration::from_secs(1), b.next()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_dropped_subscriber_leaves_no_registration() {
        let (pubsub, bus) = bus_with_memory();
        let topic = Topic::emote("1");

        let stream = bus.subscribe(&topic).await.unwrap();
        assert_eq!(pubsub.channel_count(), 1);
        drop(stream);

        // The next publish observes the dead channel and prunes it.
        bus.publish(&topic).await;
        assert_eq!(pubsub.channel_count(), 0);
    }
}
