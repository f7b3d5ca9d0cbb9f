use crate::graphql::auth::RoleGuard;

use super::prelude::*;

#[derive(Default)]
pub struct ReportQueries;

#[Object]
impl ReportQueries {
    /// Get a report by id. Moderator only; unknown ids are an error, never a
    /// placeholder.
    #[graphql(guard = "RoleGuard::new(\"moderator\")")]
    async fn report(&self, ctx: &Context<'_>, id: String) -> Result<Report> {
        let op = OpCtx::get(ctx)?;
        Ok(op.loaders.reports.load(id).await?)
    }
}
