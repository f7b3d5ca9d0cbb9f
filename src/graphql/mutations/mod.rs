pub mod emote_sets;
pub mod emotes;
pub mod reports;

pub use emote_sets::EmoteSetMutations;
pub use emotes::EmoteMutations;
pub use reports::ReportMutations;

pub(crate) mod prelude {
    pub(crate) use std::sync::Arc;

    pub(crate) use async_graphql::{Context, ErrorExtensions, Object, Result};
    pub(crate) use chrono::Utc;
    pub(crate) use uuid::Uuid;

    pub(crate) use crate::events::{ChangePublisher, EntityKind};
    pub(crate) use crate::graphql::context::OpCtx;
    pub(crate) use crate::graphql::entities::*;
    pub(crate) use crate::store::Store;

    /// FORBIDDEN error for a principal acting on an entity it does not own.
    pub(crate) fn forbidden(what: &str) -> async_graphql::Error {
        async_graphql::Error::new(format!("Not allowed to modify this {what}"))
            .extend_with(|_, e| e.set("code", "FORBIDDEN"))
    }

    pub(crate) fn not_found(what: &str, id: &str) -> async_graphql::Error {
        async_graphql::Error::new(format!("{what} {id} not found"))
            .extend_with(|_, e| e.set("code", "NOT_FOUND"))
    }
}
