use async_graphql::{ComplexObject, Context, Enum, Result, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::EntityKind;
use crate::graphql::context::OpCtx;

use super::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Enum)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Open,
    Assigned,
    Closed,
}

/// A user-filed report against another entity.
///
/// Unlike the other entity types, an unresolvable report id is an error, not
/// a placeholder: reports are only ever addressed directly by moderators.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[graphql(complex)]
pub struct Report {
    pub id: String,
    pub reporter_id: String,
    pub target_kind: EntityKind,
    pub target_id: String,
    pub subject: String,
    pub body: String,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
}

#[ComplexObject]
impl Report {
    /// The user who filed this report.
    async fn reporter(&self, ctx: &Context<'_>) -> Result<User> {
        let op = OpCtx::get(ctx)?;
        Ok(op.loaders.users.load(self.reporter_id.clone()).await?)
    }
}
