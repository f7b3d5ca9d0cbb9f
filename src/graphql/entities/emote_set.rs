use async_graphql::{ComplexObject, Context, Result, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::graphql::context::OpCtx;

use super::{Emote, User};

/// A named, capacity-limited collection of emotes.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[graphql(complex)]
pub struct EmoteSet {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub capacity: i32,
    #[graphql(skip)]
    pub emote_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl EmoteSet {
    /// Placeholder for a set id that resolves to nothing.
    pub fn unknown_placeholder(id: &str) -> Self {
        Self {
            id: id.to_string(),
            owner_id: String::new(),
            name: "*UnknownSet".to_string(),
            capacity: 0,
            emote_ids: Vec::new(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

#[ComplexObject]
impl EmoteSet {
    /// The user who owns this set.
    async fn owner(&self, ctx: &Context<'_>) -> Result<User> {
        let op = OpCtx::get(ctx)?;
        Ok(op.loaders.users.load(self.owner_id.clone()).await?)
    }

    /// The set's emotes, in insertion order. Emotes that were deleted since
    /// being added resolve to tombstone placeholders.
    async fn emotes(&self, ctx: &Context<'_>) -> Result<Vec<Emote>> {
        let op = OpCtx::get(ctx)?;
        op.loaders
            .emotes
            .load_all(self.emote_ids.iter().cloned())
            .await
            .into_iter()
            .map(|result| result.map_err(Into::into))
            .collect()
    }

    /// How many emotes the set currently holds.
    async fn emote_count(&self) -> i32 {
        self.emote_ids.len() as i32
    }
}
