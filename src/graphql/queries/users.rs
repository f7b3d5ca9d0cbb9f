use super::prelude::*;

#[derive(Default)]
pub struct UserQueries;

#[Object]
impl UserQueries {
    /// Get the current authenticated user.
    async fn me(&self, ctx: &Context<'_>) -> Result<User> {
        let op = OpCtx::get(ctx)?;
        let principal = op.require_principal()?;
        Ok(op.loaders.users.load(principal.user_id.clone()).await?)
    }

    /// Get a user by id. Unknown ids resolve to a deleted-user placeholder.
    async fn user(&self, ctx: &Context<'_>, id: String) -> Result<User> {
        let op = OpCtx::get(ctx)?;
        Ok(op.loaders.users.load(id).await?)
    }

    /// Get a role by id.
    async fn role(&self, ctx: &Context<'_>, id: String) -> Result<Role> {
        let op = OpCtx::get(ctx)?;
        Ok(op.loaders.roles.load(id).await?)
    }
}
