//! Post-mutation change publisher
//!
//! Mutations call [`ChangePublisher::publish`] after their write commits; the
//! publish happens on a background task so the mutation response is never
//! held up by the pub/sub layer.

use std::sync::Arc;

use super::bus::EventBus;
use super::topic::{EntityKind, Topic};

#[derive(Clone)]
pub struct ChangePublisher {
    bus: Arc<EventBus>,
}

impl ChangePublisher {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }

    /// Announce that an entity changed. Fire-and-forget.
    pub fn publish(&self, kind: EntityKind, id: impl Into<String>) {
        let bus = self.bus.clone();
        let topic = Topic::new(kind, id);
        tokio::spawn(async move {
            bus.publish(&topic).await;
        });
    }
}
