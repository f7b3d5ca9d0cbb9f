//! EmoteHub backend - GraphQL gateway for the emote-sharing platform
//!
//! The interesting machinery lives in two places:
//!
//! - [`loaders`]: the request-scoped batching loader that collapses many
//!   concurrent point-lookups into one batched fetch per wait window.
//! - [`events`]: the pub/sub fan-out engine that turns mutations into live
//!   snapshots pushed to GraphQL subscribers.
//!
//! Everything else is glue: the [`graphql`] surface, the [`store`] seam the
//! loaders fetch through, and [`config`].

pub mod config;
pub mod events;
pub mod graphql;
pub mod loaders;
pub mod store;

pub use config::Config;
pub use events::{ChangePublisher, EntityKind, EventBus, MemoryPubSub, Topic};
pub use graphql::{AuthUser, EmoteHubSchema, build_schema, verify_token};
pub use loaders::{BatchLoader, LoadError, LoaderConfig, LoaderRegistry};
pub use store::{MemoryStore, Store};
