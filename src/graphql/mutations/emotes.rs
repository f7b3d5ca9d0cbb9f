use super::prelude::*;

#[derive(Default)]
pub struct EmoteMutations;

#[Object]
impl EmoteMutations {
    /// Upload a new emote. The created emote is primed into this operation's
    /// loader and announced on its topic.
    async fn create_emote(
        &self,
        ctx: &Context<'_>,
        name: String,
        #[graphql(default)] tags: Vec<String>,
        #[graphql(default)] animated: bool,
    ) -> Result<Emote> {
        let op = OpCtx::get(ctx)?;
        let principal = op.require_principal()?;
        let store = ctx.data_unchecked::<Arc<dyn Store>>();
        let publisher = ctx.data_unchecked::<ChangePublisher>();

        let emote = Emote {
            id: Uuid::new_v4().to_string(),
            owner_id: principal.user_id.clone(),
            name,
            tags,
            animated,
            status: EmoteStatus::Pending,
            created_at: Utc::now(),
        };
        store
            .insert_emote(emote.clone())
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;

        tracing::info!(emote_id = %emote.id, owner = %principal.user_id, "emote created");

        op.loaders.emotes.prime(emote.id.clone(), emote.clone());
        publisher.publish(EntityKind::Emote, emote.id.clone());
        Ok(emote)
    }

    /// Rename an emote. Owner only.
    async fn rename_emote(&self, ctx: &Context<'_>, id: String, name: String) -> Result<Emote> {
        let op = OpCtx::get(ctx)?;
        let principal = op.require_principal()?;
        let store = ctx.data_unchecked::<Arc<dyn Store>>();
        let publisher = ctx.data_unchecked::<ChangePublisher>();

        let current = op.loaders.emotes.load(id.clone()).await?;
        if current.status == EmoteStatus::Deleted {
            return Err(not_found("Emote", &id));
        }
        if current.owner_id != principal.user_id {
            return Err(forbidden("emote"));
        }

        let updated = store
            .update_emote_name(&id, &name)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?
            .ok_or_else(|| not_found("Emote", &id))?;

        op.loaders.emotes.prime(id.clone(), updated.clone());
        publisher.publish(EntityKind::Emote, id);
        Ok(updated)
    }
}
