use super::prelude::*;

#[derive(Default)]
pub struct EmoteQueries;

#[Object]
impl EmoteQueries {
    /// Get an emote by id. Unknown ids resolve to a tombstone placeholder.
    async fn emote(&self, ctx: &Context<'_>, id: String) -> Result<Emote> {
        let op = OpCtx::get(ctx)?;
        Ok(op.loaders.emotes.load(id).await?)
    }

    /// Get many emotes at once; the whole list is served by one batched
    /// fetch.
    async fn emotes(&self, ctx: &Context<'_>, ids: Vec<String>) -> Result<Vec<Emote>> {
        let op = OpCtx::get(ctx)?;
        op.loaders
            .emotes
            .load_all(ids)
            .await
            .into_iter()
            .map(|result| result.map_err(Into::into))
            .collect()
    }
}
