//! Per-operation resolver context
//!
//! Resolvers receive exactly one context object: [`OpCtx`], carrying the
//! authenticated principal (if any) and the operation's loader registry. The
//! registry is installed by the [`RequestLoaders`] schema extension, whose
//! `prepare_request` hook runs once per operation on both the HTTP and
//! WebSocket transports, so no registry is ever shared between operations.

use std::sync::Arc;

use async_graphql::extensions::{
    Extension, ExtensionContext, ExtensionFactory, NextPrepareRequest,
};
use async_graphql::{Context, ErrorExtensions, Request, Result, ServerResult};

use crate::loaders::{LoaderConfig, LoaderRegistry};
use crate::store::Store;

use super::auth::AuthUser;

/// Everything a resolver needs from the current operation.
pub struct OpCtx<'a> {
    pub principal: Option<&'a AuthUser>,
    pub loaders: &'a LoaderRegistry,
}

impl<'a> OpCtx<'a> {
    pub fn get(ctx: &Context<'a>) -> Result<Self> {
        let loaders = ctx.data::<Arc<LoaderRegistry>>()?;
        Ok(Self {
            principal: ctx.data_opt::<AuthUser>(),
            loaders: loaders.as_ref(),
        })
    }

    /// The authenticated principal, or an UNAUTHORIZED error.
    pub fn require_principal(&self) -> Result<&'a AuthUser> {
        self.principal.ok_or_else(|| {
            async_graphql::Error::new("Authentication required")
                .extend_with(|_, e| e.set("code", "UNAUTHORIZED"))
        })
    }
}

/// Schema extension that gives every operation a fresh loader registry.
pub struct RequestLoaders {
    store: Arc<dyn Store>,
    config: LoaderConfig,
}

impl RequestLoaders {
    pub fn new(store: Arc<dyn Store>, config: LoaderConfig) -> Self {
        Self { store, config }
    }
}

impl ExtensionFactory for RequestLoaders {
    fn create(&self) -> Arc<dyn Extension> {
        Arc::new(RequestLoadersExtension {
            store: self.store.clone(),
            config: self.config,
        })
    }
}

struct RequestLoadersExtension {
    store: Arc<dyn Store>,
    config: LoaderConfig,
}

#[async_trait::async_trait]
impl Extension for RequestLoadersExtension {
    async fn prepare_request(
        &self,
        ctx: &ExtensionContext<'_>,
        request: Request,
        next: NextPrepareRequest<'_>,
    ) -> ServerResult<Request> {
        let registry = Arc::new(LoaderRegistry::new(self.store.clone(), self.config));
        next.run(ctx, request.data(registry)).await
    }
}
