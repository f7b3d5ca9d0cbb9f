//! GraphQL API with subscriptions for real-time updates
//!
//! The single API surface of the gateway: queries and mutations over HTTP,
//! subscriptions over WebSocket. Field resolvers never touch storage
//! directly; entity lookups go through the per-operation loader registry
//! (see [`crate::loaders`]) and live updates through the event bus (see
//! [`crate::events`]).

pub mod auth;
pub mod context;
pub mod entities;
pub mod mutations;
pub mod queries;
mod schema;
mod subscriptions;

pub use auth::{AuthUser, verify_token};
pub use context::OpCtx;
pub use schema::{EmoteHubSchema, build_schema};
