pub mod emote_sets;
pub mod emotes;
pub mod reports;
pub mod users;

pub use emote_sets::EmoteSetQueries;
pub use emotes::EmoteQueries;
pub use reports::ReportQueries;
pub use users::UserQueries;

pub(crate) mod prelude {
    pub(crate) use async_graphql::{Context, Object, Result};

    pub(crate) use crate::graphql::context::OpCtx;
    pub(crate) use crate::graphql::entities::*;
}
