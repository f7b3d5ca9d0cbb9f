//! Per-operation loader registry
//!
//! One [`BatchLoader`] per entity type, built fresh for every GraphQL
//! operation and destroyed with it. The registry exists purely to prevent
//! redundant fetches within a single request; it is never shared across
//! operations and never acts as a durable cache.
//!
//! Not-found policy, fixed per entity type: users, emotes, emote sets, and
//! roles resolve absent ids to deleted/unknown placeholders so references to
//! removed entities stay renderable; reports resolve absent ids to a
//! `NotFound` error because they are only ever addressed directly.

use std::sync::Arc;

use async_trait::async_trait;

use crate::graphql::entities::{Emote, EmoteSet, Report, Role, User};
use crate::store::Store;

use super::batch::{BatchFetch, BatchLoader, KeyOutcome, LoadError, LoaderConfig};

pub struct LoaderRegistry {
    pub users: BatchLoader<UserFetcher>,
    pub emotes: BatchLoader<EmoteFetcher>,
    pub emote_sets: BatchLoader<EmoteSetFetcher>,
    pub roles: BatchLoader<RoleFetcher>,
    pub reports: BatchLoader<ReportFetcher>,
}

impl LoaderRegistry {
    pub fn new(store: Arc<dyn Store>, config: LoaderConfig) -> Self {
        Self {
            users: BatchLoader::new(UserFetcher { store: store.clone() }, config),
            emotes: BatchLoader::new(EmoteFetcher { store: store.clone() }, config),
            emote_sets: BatchLoader::new(EmoteSetFetcher { store: store.clone() }, config),
            roles: BatchLoader::new(RoleFetcher { store: store.clone() }, config),
            reports: BatchLoader::new(ReportFetcher { store }, config),
        }
    }
}

fn present<V>(values: Vec<Option<V>>) -> Vec<KeyOutcome<V>> {
    values.into_iter().map(Ok).collect()
}

pub struct UserFetcher {
    store: Arc<dyn Store>,
}

#[async_trait]
impl BatchFetch for UserFetcher {
    type Key = String;
    type Value = User;

    async fn fetch(&self, keys: &[String]) -> Result<Vec<KeyOutcome<User>>, LoadError> {
        let values = self.store.users_by_id(keys).await.map_err(LoadError::fetch)?;
        Ok(present(values))
    }

    fn absent(&self, key: &String) -> Result<User, LoadError> {
        Ok(User::deleted_placeholder(key))
    }
}

pub struct EmoteFetcher {
    store: Arc<dyn Store>,
}

#[async_trait]
impl BatchFetch for EmoteFetcher {
    type Key = String;
    type Value = Emote;

    async fn fetch(&self, keys: &[String]) -> Result<Vec<KeyOutcome<Emote>>, LoadError> {
        let values = self.store.emotes_by_id(keys).await.map_err(LoadError::fetch)?;
        Ok(present(values))
    }

    fn absent(&self, key: &String) -> Result<Emote, LoadError> {
        Ok(Emote::unknown_placeholder(key))
    }
}

pub struct EmoteSetFetcher {
    store: Arc<dyn Store>,
}

#[async_trait]
impl BatchFetch for EmoteSetFetcher {
    type Key = String;
    type Value = EmoteSet;

    async fn fetch(&self, keys: &[String]) -> Result<Vec<KeyOutcome<EmoteSet>>, LoadError> {
        let values = self
            .store
            .emote_sets_by_id(keys)
            .await
            .map_err(LoadError::fetch)?;
        Ok(present(values))
    }

    fn absent(&self, key: &String) -> Result<EmoteSet, LoadError> {
        Ok(EmoteSet::unknown_placeholder(key))
    }
}

pub struct RoleFetcher {
    store: Arc<dyn Store>,
}

#[async_trait]
impl BatchFetch for RoleFetcher {
    type Key = String;
    type Value = Role;

    async fn fetch(&self, keys: &[String]) -> Result<Vec<KeyOutcome<Role>>, LoadError> {
        let values = self.store.roles_by_id(keys).await.map_err(LoadError::fetch)?;
        Ok(present(values))
    }

    fn absent(&self, key: &String) -> Result<Role, LoadError> {
        Ok(Role::unknown_placeholder(key))
    }
}

pub struct ReportFetcher {
    store: Arc<dyn Store>,
}

#[async_trait]
impl BatchFetch for ReportFetcher {
    type Key = String;
    type Value = Report;

    async fn fetch(&self, keys: &[String]) -> Result<Vec<KeyOutcome<Report>>, LoadError> {
        let values = self.store.reports_by_id(keys).await.map_err(LoadError::fetch)?;
        Ok(present(values))
    }

    fn absent(&self, key: &String) -> Result<Report, LoadError> {
        Err(LoadError::NotFound("report", key.clone()))
    }
}
