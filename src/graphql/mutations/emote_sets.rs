use super::prelude::*;

#[derive(Default)]
pub struct EmoteSetMutations;

#[Object]
impl EmoteSetMutations {
    /// Add an emote to a set. Set owner only; capacity is enforced.
    async fn add_emote_to_set(
        &self,
        ctx: &Context<'_>,
        set_id: String,
        emote_id: String,
    ) -> Result<EmoteSet> {
        let op = OpCtx::get(ctx)?;
        let principal = op.require_principal()?;
        let store = ctx.data_unchecked::<Arc<dyn Store>>();
        let publisher = ctx.data_unchecked::<ChangePublisher>();

        let set = op.loaders.emote_sets.load(set_id.clone()).await?;
        if set.owner_id != principal.user_id {
            return Err(forbidden("emote set"));
        }
        if set.emote_ids.len() as i32 >= set.capacity {
            return Err(async_graphql::Error::new("Emote set is full")
                .extend_with(|_, e| e.set("code", "SET_FULL")));
        }

        let emote = op.loaders.emotes.load(emote_id.clone()).await?;
        if emote.status != EmoteStatus::Live {
            return Err(not_found("Emote", &emote_id));
        }

        let updated = store
            .add_emote_to_set(&set_id, &emote_id)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?
            .ok_or_else(|| not_found("Emote set", &set_id))?;

        op.loaders.emote_sets.prime(set_id.clone(), updated.clone());
        publisher.publish(EntityKind::EmoteSet, set_id);
        Ok(updated)
    }

    /// Remove an emote from a set. Set owner only.
    async fn remove_emote_from_set(
        &self,
        ctx: &Context<'_>,
        set_id: String,
        emote_id: String,
    ) -> Result<EmoteSet> {
        let op = OpCtx::get(ctx)?;
        let principal = op.require_principal()?;
        let store = ctx.data_unchecked::<Arc<dyn Store>>();
        let publisher = ctx.data_unchecked::<ChangePublisher>();

        let set = op.loaders.emote_sets.load(set_id.clone()).await?;
        if set.owner_id != principal.user_id {
            return Err(forbidden("emote set"));
        }

        let updated = store
            .remove_emote_from_set(&set_id, &emote_id)
            .await
            .map_err(|e| async_graphql::Error::new(e.to_string()))?
            .ok_or_else(|| not_found("Emote set", &set_id))?;

        op.loaders.emote_sets.prime(set_id.clone(), updated.clone());
        publisher.publish(EntityKind::EmoteSet, set_id);
        Ok(updated)
    }
}
