//! GraphQL authentication
//!
//! Verifies bearer JWTs into an [`AuthUser`] principal. Policy beyond "is
//! authenticated" / "has role" belongs to the resolvers; this module only
//! produces the principal they consume.

use async_graphql::{Context, ErrorExtensions, Result};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

/// The authenticated principal, injected into the operation context by the
/// transport layer and consumed read-only by resolvers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: String,
    pub username: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccessTokenClaims {
    sub: String,
    username: String,
    role: Option<String>,
    #[allow(dead_code)]
    exp: i64,
    #[allow(dead_code)]
    iat: i64,
}

/// Verify a JWT and extract the principal.
pub fn verify_token(token: &str, secret: &str) -> Result<AuthUser> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.validate_aud = false;

    let token_data = decode::<AccessTokenClaims>(
        token,
        &DecodingKey::from_secret(secret.trim().as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "JWT verification failed");
        async_graphql::Error::new(format!("Invalid token: {}", e))
            .extend_with(|_, e| e.set("code", "UNAUTHORIZED"))
    })?;

    Ok(AuthUser {
        user_id: token_data.claims.sub,
        username: token_data.claims.username,
        role: token_data.claims.role,
    })
}

/// Guard that requires a specific role.
///
/// Use with `#[graphql(guard = "RoleGuard::new(\"moderator\")")]`.
pub struct RoleGuard {
    pub role: String,
}

impl RoleGuard {
    pub fn new(role: impl Into<String>) -> Self {
        Self { role: role.into() }
    }
}

impl async_graphql::Guard for RoleGuard {
    fn check(&self, ctx: &Context<'_>) -> impl std::future::Future<Output = Result<()>> + Send {
        let result = match ctx.data_opt::<AuthUser>() {
            Some(user) if user.role.as_deref() == Some(self.role.as_str()) => Ok(()),
            Some(_) => Err(
                async_graphql::Error::new(format!("Role '{}' required", self.role))
                    .extend_with(|_, e| e.set("code", "FORBIDDEN")),
            ),
            None => Err(async_graphql::Error::new("Authentication required")
                .extend_with(|_, e| e.set("code", "UNAUTHORIZED"))),
        };
        async move { result }
    }
}
