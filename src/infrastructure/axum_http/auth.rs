use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::{
    application::usecases::featured_errors::FeaturedError,
    infrastructure::axum_http::error_responses::AppError,
};

pub const SERVICE_ROLE: &str = "service_role";
const USER_AUDIENCE: &str = "authenticated";

/// Installed as a router `Extension` by `http_serve::start`.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

/// Project API keys (`service_role`) carry neither `sub` nor `aud`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SupabaseClaims {
    pub sub: Option<String>,
    pub role: String,
    #[serde(default)]
    pub aud: Option<Audience>,
    pub email: Option<String>,
    pub exp: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    fn contains(&self, audience: &str) -> bool {
        match self {
            Audience::One(value) => value == audience,
            Audience::Many(values) => values.iter().any(|value| value == audience),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    /// `None` for service-role keys.
    pub user_id: Option<Uuid>,
    pub email: Option<String>,
    pub role: String,
}

impl AuthUser {
    pub fn is_service_role(&self) -> bool {
        self.role == SERVICE_ROLE
    }
}

#[derive(Debug)]
pub struct AuthError(anyhow::Error);

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError(err)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        warn!(reason = %self.0, "auth: request rejected");
        AppError::from(FeaturedError::Unauthenticated).into_response()
    }
}

pub fn validate_supabase_jwt(token: &str, secret: &str) -> Result<SupabaseClaims, AuthError> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    // Audience is checked below, once the role is known.
    validation.validate_aud = false;

    let claims = decode::<SupabaseClaims>(token, &decoding_key, &validation)
        .map_err(|e| anyhow::anyhow!("JWT validation failed: {}", e))?
        .claims;

    if claims.role != SERVICE_ROLE {
        let audience_ok = claims
            .aud
            .as_ref()
            .is_some_and(|aud| aud.contains(USER_AUDIENCE));
        if !audience_ok {
            return Err(anyhow::anyhow!("JWT validation failed: InvalidAudience").into());
        }
        if claims.sub.is_none() {
            return Err(anyhow::anyhow!("JWT validation failed: missing subject").into());
        }
    }

    Ok(claims)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_config = parts
            .extensions
            .get::<Arc<AuthConfig>>()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("auth is not configured"))?;

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| anyhow::anyhow!("Missing or malformed bearer token"))?;

        let claims = validate_supabase_jwt(bearer.token(), &auth_config.jwt_secret)?;

        let user_id = claims
            .sub
            .as_deref()
            .map(Uuid::parse_str)
            .transpose()
            .map_err(|_| anyhow::anyhow!("Invalid user ID in token"))?;

        Ok(AuthUser {
            user_id,
            email: claims.email,
            role: claims.role,
        })
    }
}
