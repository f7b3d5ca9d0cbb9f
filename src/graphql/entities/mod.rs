//! GraphQL entity types
//!
//! Each entity is a plain struct exposed as a `SimpleObject`, with relation
//! fields resolved through the per-operation loader registry in a
//! `ComplexObject` block. Relation resolution is the path that exercises the
//! batching loader: resolving a list of emotes issues one batched user fetch
//! for all the owners, not one query per emote.

pub mod emote;
pub mod emote_set;
pub mod report;
pub mod role;
pub mod user;

pub use emote::{Emote, EmoteStatus};
pub use emote_set::EmoteSet;
pub use report::{Report, ReportStatus};
pub use role::Role;
pub use user::User;
