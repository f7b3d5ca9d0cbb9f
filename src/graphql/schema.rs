//! GraphQL schema assembly

use std::sync::Arc;

use async_graphql::{MergedObject, Schema};

use crate::events::{ChangePublisher, EventBus};
use crate::loaders::LoaderConfig;
use crate::store::Store;

use super::context::RequestLoaders;
use super::mutations::{EmoteMutations, EmoteSetMutations, ReportMutations};
use super::queries::{EmoteQueries, EmoteSetQueries, ReportQueries, UserQueries};
use super::subscriptions::SubscriptionRoot;

/// The GraphQL schema type.
pub type EmoteHubSchema = Schema<QueryRoot, MutationRoot, SubscriptionRoot>;

#[derive(MergedObject, Default)]
pub struct QueryRoot(UserQueries, EmoteQueries, EmoteSetQueries, ReportQueries);

#[derive(MergedObject, Default)]
pub struct MutationRoot(EmoteMutations, EmoteSetMutations, ReportMutations);

/// Build the schema. The `RequestLoaders` extension hands every operation a
/// fresh loader registry; the store, bus, and publisher are process-wide.
pub fn build_schema(
    store: Arc<dyn Store>,
    bus: Arc<EventBus>,
    publisher: ChangePublisher,
    loader_config: LoaderConfig,
) -> EmoteHubSchema {
    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        SubscriptionRoot,
    )
    .extension(RequestLoaders::new(store.clone(), loader_config))
    .data(store)
    .data(bus)
    .data(publisher)
    .finish()
}
