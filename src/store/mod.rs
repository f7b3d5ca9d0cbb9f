//! Storage seam
//!
//! The gateway never talks to a database directly: everything goes through
//! the [`Store`] trait. Reads are batched point-fetches, positionally aligned
//! with the requested ids, which is exactly the shape the batching loaders
//! need. Writes are the minimal set the mutation surface uses. Aggregation
//! and query semantics live behind the trait, out of scope here.

use anyhow::Result;
use async_trait::async_trait;

use crate::graphql::entities::{Emote, EmoteSet, Report, Role, User};

pub mod memory;

pub use memory::MemoryStore;

#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Fetch users by id; entry `i` answers `ids[i]`, `None` meaning absent.
    async fn users_by_id(&self, ids: &[String]) -> Result<Vec<Option<User>>>;
    async fn emotes_by_id(&self, ids: &[String]) -> Result<Vec<Option<Emote>>>;
    async fn emote_sets_by_id(&self, ids: &[String]) -> Result<Vec<Option<EmoteSet>>>;
    async fn roles_by_id(&self, ids: &[String]) -> Result<Vec<Option<Role>>>;
    async fn reports_by_id(&self, ids: &[String]) -> Result<Vec<Option<Report>>>;

    async fn insert_emote(&self, emote: Emote) -> Result<()>;
    async fn update_emote_name(&self, id: &str, name: &str) -> Result<Option<Emote>>;
    async fn add_emote_to_set(&self, set_id: &str, emote_id: &str) -> Result<Option<EmoteSet>>;
    async fn remove_emote_from_set(&self, set_id: &str, emote_id: &str)
        -> Result<Option<EmoteSet>>;
    async fn insert_report(&self, report: Report) -> Result<()>;
}
