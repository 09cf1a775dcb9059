//! Authentication middleware
//!
//! Verifies identity-provider (Supabase) access tokens on owner routes.
//! Only the subject UID is trusted; sessions are managed by the provider.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};
use crate::AppState;

/// Authenticated user information extracted from the access token
#[derive(Clone, Debug)]
pub struct AuthUser {
    /// Opaque owner UID (`sub` claim)
    pub uid: String,
    pub email: Option<String>,
}

/// Access token claims issued by the identity provider
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub aud: String,
    pub exp: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Rejects requests without a valid Bearer token and stores the
/// [`AuthUser`] in the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or_else(|| AppError::Unauthorized {
        message: "Missing or invalid Authorization header".to_string(),
        message_pt: "Cabeçalho de autorização ausente ou inválido".to_string(),
    })?;

    let user = decode_token(bearer.token(), &state.config.auth)?;
    tracing::debug!(uid = %user.uid, "authenticated request");

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Decode and validate an access token
pub fn decode_token(token: &str, auth: &AuthConfig) -> AppResult<AuthUser> {
    if auth.jwt_secret.is_empty() {
        return Err(AppError::Configuration("auth.jwt_secret is not set".to_string()));
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[auth.audience.as_str()]);

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => {
            tracing::debug!("token rejected: {}", e);
            AppError::InvalidToken
        }
    })?;

    if claims.sub.trim().is_empty() {
        return Err(AppError::InvalidToken);
    }

    Ok(AuthUser {
        uid: claims.sub,
        email: claims.email,
    })
}
