//! Publish/subscribe fan-out engine
//!
//! Mutations publish payload-free change tokens on entity topics; active
//! subscriptions wake on those tokens and re-fetch fresh snapshots.

pub mod bus;
pub mod publisher;
pub mod topic;
pub mod watch;

pub use bus::{EventBus, EventStream, MemoryPubSub, PubSub};
pub use publisher::ChangePublisher;
pub use topic::{EntityKind, Topic};
pub use watch::watch;
