use async_graphql::{ComplexObject, Context, Enum, Result, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::graphql::context::OpCtx;

use super::User;

/// Moderation lifecycle of an emote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Enum)]
#[serde(rename_all = "snake_case")]
pub enum EmoteStatus {
    /// Uploaded, awaiting moderation.
    Pending,
    /// Approved and usable.
    Live,
    /// Removed; kept as a tombstone so references stay resolvable.
    Deleted,
}

/// A shareable emote.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[graphql(complex)]
pub struct Emote {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub tags: Vec<String>,
    pub animated: bool,
    pub status: EmoteStatus,
    pub created_at: DateTime<Utc>,
}

impl Emote {
    /// Placeholder for an emote id that resolves to nothing.
    pub fn unknown_placeholder(id: &str) -> Self {
        Self {
            id: id.to_string(),
            owner_id: String::new(),
            name: "*UnknownEmote".to_string(),
            tags: Vec::new(),
            animated: false,
            status: EmoteStatus::Deleted,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

#[ComplexObject]
impl Emote {
    /// The user who uploaded this emote.
    async fn owner(&self, ctx: &Context<'_>) -> Result<User> {
        let op = OpCtx::get(ctx)?;
        Ok(op.loaders.users.load(self.owner_id.clone()).await?)
    }
}
