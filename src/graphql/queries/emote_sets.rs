use super::prelude::*;

#[derive(Default)]
pub struct EmoteSetQueries;

#[Object]
impl EmoteSetQueries {
    /// Get an emote set by id.
    async fn emote_set(&self, ctx: &Context<'_>, id: String) -> Result<EmoteSet> {
        let op = OpCtx::get(ctx)?;
        Ok(op.loaders.emote_sets.load(id).await?)
    }
}
