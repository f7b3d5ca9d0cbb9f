//! In-process [`Store`] implementation
//!
//! Backs the dev server and the test suite. Each entity type lives in its own
//! map; reads clone out, writes take the write lock briefly.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;

use crate::graphql::entities::{Emote, EmoteSet, Report, Role, User};

use super::Store;

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    emotes: RwLock<HashMap<String, Emote>>,
    emote_sets: RwLock<HashMap<String, EmoteSet>>,
    roles: RwLock<HashMap<String, Role>>,
    reports: RwLock<HashMap<String, Report>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Seeding helpers for dev wiring and tests.

    pub fn seed_user(&self, user: User) {
        self.users.write().insert(user.id.clone(), user);
    }

    pub fn seed_emote(&self, emote: Emote) {
        self.emotes.write().insert(emote.id.clone(), emote);
    }

    pub fn seed_emote_set(&self, set: EmoteSet) {
        self.emote_sets.write().insert(set.id.clone(), set);
    }

    pub fn seed_role(&self, role: Role) {
        self.roles.write().insert(role.id.clone(), role);
    }
}

fn lookup<T: Clone>(map: &RwLock<HashMap<String, T>>, ids: &[String]) -> Vec<Option<T>> {
    let map = map.read();
    ids.iter().map(|id| map.get(id).cloned()).collect()
}

#[async_trait]
impl Store for MemoryStore {
    async fn users_by_id(&self, ids: &[String]) -> Result<Vec<Option<User>>> {
        Ok(lookup(&self.users, ids))
    }

    async fn emotes_by_id(&self, ids: &[String]) -> Result<Vec<Option<Emote>>> {
        Ok(lookup(&self.emotes, ids))
    }

    async fn emote_sets_by_id(&self, ids: &[String]) -> Result<Vec<Option<EmoteSet>>> {
        Ok(lookup(&self.emote_sets, ids))
    }

    async fn roles_by_id(&self, ids: &[String]) -> Result<Vec<Option<Role>>> {
        Ok(lookup(&self.roles, ids))
    }

    async fn reports_by_id(&self, ids: &[String]) -> Result<Vec<Option<Report>>> {
        Ok(lookup(&self.reports, ids))
    }

    async fn insert_emote(&self, emote: Emote) -> Result<()> {
        self.emotes.write().insert(emote.id.clone(), emote);
        Ok(())
    }

    async fn update_emote_name(&self, id: &str, name: &str) -> Result<Option<Emote>> {
        let mut emotes = self.emotes.write();
        Ok(emotes.get_mut(id).map(|emote| {
            emote.name = name.to_string();
            emote.clone()
        }))
    }

    async fn add_emote_to_set(&self, set_id: &str, emote_id: &str) -> Result<Option<EmoteSet>> {
        let mut sets = self.emote_sets.write();
        Ok(sets.get_mut(set_id).map(|set| {
            if !set.emote_ids.iter().any(|id| id == emote_id) {
                set.emote_ids.push(emote_id.to_string());
            }
            set.clone()
        }))
    }

    async fn remove_emote_from_set(
        &self,
        set_id: &str,
        emote_id: &str,
    ) -> Result<Option<EmoteSet>> {
        let mut sets = self.emote_sets.write();
        Ok(sets.get_mut(set_id).map(|set| {
            set.emote_ids.retain(|id| id != emote_id);
            set.clone()
        }))
    }

    async fn insert_report(&self, report: Report) -> Result<()> {
        self.reports.write().insert(report.id.clone(), report);
        Ok(())
    }
}
