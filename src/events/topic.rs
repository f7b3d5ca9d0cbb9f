//! Pub/sub topic addressing
//!
//! A topic is the composite key `{entity kind, entity id}`; on the wire it is
//! a single channel string such as `emotes:123`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The entity types the gateway serves and fans out changes for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, async_graphql::Enum,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Emote,
    EmoteSet,
    Role,
    Report,
}

impl EntityKind {
    /// Channel name prefix for this kind.
    pub fn channel_prefix(self) -> &'static str {
        match self {
            EntityKind::User => "users",
            EntityKind::Emote => "emotes",
            EntityKind::EmoteSet => "emote_sets",
            EntityKind::Role => "roles",
            EntityKind::Report => "reports",
        }
    }
}

/// Address of one pub/sub channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic {
    pub kind: EntityKind,
    pub id: String,
}

impl Topic {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }

    pub fn user(id: impl Into<String>) -> Self {
        Self::new(EntityKind::User, id)
    }

    pub fn emote(id: impl Into<String>) -> Self {
        Self::new(EntityKind::Emote, id)
    }

    pub fn emote_set(id: impl Into<String>) -> Self {
        Self::new(EntityKind::EmoteSet, id)
    }

    /// The single wire channel this topic maps to.
    pub fn channel(&self) -> String {
        format!("{}:{}", self.kind.channel_prefix(), self.id)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.channel_prefix(), self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_format() {
        assert_eq!(Topic::emote("123").channel(), "emotes:123");
        assert_eq!(Topic::emote_set("9").channel(), "emote_sets:9");
        assert_eq!(Topic::new(EntityKind::Report, "r1").channel(), "reports:r1");
    }

    #[test]
    fn test_display_matches_channel() {
        let topic = Topic::user("u1");
        assert_eq!(topic.to_string(), topic.channel());
    }
}
