use super::prelude::*;

#[derive(Default)]
pub struct ReportMutations;

#[Object]
impl ReportMutations {
    /// File a report against an entity.
    async fn create_report(
        &self,
        ctx: &Context<'_>,
        target_kind: EntityKind,
        target_id: String,
        subject: String,
        body: String,
    ) -> Result<Report> {
        let op = OpCtx::get(ctx)?;
        let principal = op.require_principal()?;
        let store = ctx.data_unchecked::<Arc<dyn Store>>();
        let publisher = ctx.data_unchecked::<ChangePublisher>();

        let report = Report {
            id: Uuid::new_v4().to_string(),
            reporter_id: principal.user_id.clone(),
            target_kind,
            target_id,
            subject,
            body,
            status: ReportStatus::Open,
            created_at: Utc::now(),
        };
        store
            .insert_report(report.clone())
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;

        tracing::info!(report_id = %report.id, reporter = %principal.user_id, "report filed");

        publisher.publish(EntityKind::Report, report.id.clone());
        Ok(report)
    }
}
