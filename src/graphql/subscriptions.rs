//! GraphQL subscriptions for live entity updates
//!
//! Each field subscribes to the entity's topic on the event bus and turns the
//! payload-free change tokens into fresh snapshots via [`watch`]. With
//! `init = true` the current snapshot is emitted before any notification is
//! waited on.
//!
//! Re-fetches go straight to the store rather than through the operation's
//! loader registry: a subscription is one long-lived operation, and its
//! request cache would pin the first snapshot forever. A snapshot that fails
//! to fetch is logged and skipped; it never ends the stream. The stream ends
//! exactly when the event bus subscription does (client disconnect dropping
//! the stream, or server shutdown).

use std::sync::Arc;

use async_graphql::{Context, Result, Subscription};
use futures::Stream;

use crate::events::{EventBus, Topic, watch};
use crate::graphql::entities::{Emote, EmoteSet, User};
use crate::store::Store;

pub struct SubscriptionRoot;

/// One-key snapshot through the store's batched fetch interface.
async fn snapshot_one<T, Fut>(fetch: Fut, topic: &Topic) -> Option<T>
where
    Fut: Future<Output = anyhow::Result<Vec<Option<T>>>>,
{
    match fetch.await {
        Ok(mut values) => values.pop().flatten(),
        Err(error) => {
            tracing::warn!(topic = %topic, error = %error, "snapshot fetch failed, skipping emission");
            None
        }
    }
}

#[Subscription]
impl SubscriptionRoot {
    /// Watch an emote: a fresh snapshot per backend change.
    async fn emote<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        id: String,
        #[graphql(default = false)] init: bool,
    ) -> Result<impl Stream<Item = Emote> + 'ctx> {
        let bus = ctx.data_unchecked::<Arc<EventBus>>();
        let store = ctx.data_unchecked::<Arc<dyn Store>>().clone();

        let topic = Topic::emote(id.clone());
        let notifications = bus.subscribe(&topic).await?;
        Ok(watch(notifications, init, move || {
            let store = store.clone();
            let topic = topic.clone();
            let id = id.clone();
            async move { snapshot_one(store.emotes_by_id(&[id]), &topic).await }
        }))
    }

    /// Watch an emote set.
    async fn emote_set<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        id: String,
        #[graphql(default = false)] init: bool,
    ) -> Result<impl Stream<Item = EmoteSet> + 'ctx> {
        let bus = ctx.data_unchecked::<Arc<EventBus>>();
        let store = ctx.data_unchecked::<Arc<dyn Store>>().clone();

        let topic = Topic::emote_set(id.clone());
        let notifications = bus.subscribe(&topic).await?;
        Ok(watch(notifications, init, move || {
            let store = store.clone();
            let topic = topic.clone();
            let id = id.clone();
            async move { snapshot_one(store.emote_sets_by_id(&[id]), &topic).await }
        }))
    }

    /// Watch a user.
    async fn user<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        id: String,
        #[graphql(default = false)] init: bool,
    ) -> Result<impl Stream<Item = User> + 'ctx> {
        let bus = ctx.data_unchecked::<Arc<EventBus>>();
        let store = ctx.data_unchecked::<Arc<dyn Store>>().clone();

        let topic = Topic::user(id.clone());
        let notifications = bus.subscribe(&topic).await?;
        Ok(watch(notifications, init, move || {
            let store = store.clone();
            let topic = topic.clone();
            let id = id.clone();
            async move { snapshot_one(store.users_by_id(&[id]), &topic).await }
        }))
    }
}
