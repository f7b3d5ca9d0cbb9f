use async_graphql::{ComplexObject, Context, Result, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::graphql::context::OpCtx;

use super::Role;

/// A platform user.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[graphql(complex)]
pub struct User {
    pub id: String,
    pub username: String,
    pub display_name: String,
    #[graphql(skip)]
    pub role_id: Option<String>,
    #[graphql(skip)]
    pub editor_ids: Vec<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Placeholder returned where a referenced user no longer exists.
    pub fn deleted_placeholder(id: &str) -> Self {
        Self {
            id: id.to_string(),
            username: "*deleted".to_string(),
            display_name: "Deleted User".to_string(),
            role_id: None,
            editor_ids: Vec::new(),
            avatar_url: None,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

#[ComplexObject]
impl User {
    /// The user's platform role, if any.
    async fn role(&self, ctx: &Context<'_>) -> Result<Option<Role>> {
        let op = OpCtx::get(ctx)?;
        match &self.role_id {
            Some(role_id) => Ok(Some(op.loaders.roles.load(role_id.clone()).await?)),
            None => Ok(None),
        }
    }

    /// Users allowed to manage this user's emotes and sets.
    async fn editors(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let op = OpCtx::get(ctx)?;
        let mut editors = Vec::with_capacity(self.editor_ids.len());
        for result in op.loaders.users.load_all(self.editor_ids.iter().cloned()).await {
            match result {
                Ok(user) => editors.push(user),
                Err(error) => {
                    tracing::warn!(error = %error, "skipping unresolvable editor");
                }
            }
        }
        Ok(editors)
    }
}
