//! Request-scoped batching loaders (N+1 elimination)

pub mod batch;
pub mod registry;

pub use batch::{BatchFetch, BatchLoader, KeyOutcome, LoadError, LoaderConfig};
pub use registry::LoaderRegistry;
