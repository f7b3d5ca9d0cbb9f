//! Application configuration management

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::loaders::LoaderConfig;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// JWT secret for token verification
    pub jwt_secret: String,

    /// Loader wait window in milliseconds (how long concurrent loads
    /// accumulate before one batched fetch is issued)
    pub loader_window_ms: u64,

    /// Flush a loader batch early once it holds this many distinct keys
    pub loader_max_batch: usize,

    /// Per-channel pub/sub buffer capacity
    pub pubsub_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // JWT_SECRET is always required - generate a random one if not provided in dev
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            // In production, this should be set explicitly
            use std::collections::hash_map::DefaultHasher;
            use std::hash::{Hash, Hasher};
            let mut hasher = DefaultHasher::new();
            std::time::SystemTime::now().hash(&mut hasher);
            format!("dev-secret-{}", hasher.finish())
        });

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .context("Invalid PORT")?,

            jwt_secret,

            loader_window_ms: env::var("LOADER_WINDOW_MS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Invalid LOADER_WINDOW_MS")?,

            loader_max_batch: env::var("LOADER_MAX_BATCH")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .context("Invalid LOADER_MAX_BATCH")?,

            pubsub_capacity: env::var("PUBSUB_CAPACITY")
                .unwrap_or_else(|_| "256".to_string())
                .parse()
                .context("Invalid PUBSUB_CAPACITY")?,
        })
    }

    /// Batching parameters for the per-operation loaders.
    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            wait_window: Duration::from_millis(self.loader_window_ms),
            max_batch_size: self.loader_max_batch,
        }
    }
}
