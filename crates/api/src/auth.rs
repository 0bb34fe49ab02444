//! Bearer-token authentication.
//!
//! Tokens are issued by the hosted auth service (HS256, audience
//! `authenticated`); `sub` is the profile id.  The extractor verifies the
//! token, loads the profile and hands the handler a [`Caller`].

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use db::models::ProfileRow;
use db::DbError;
use domain::{Caller, Role};

use crate::error::{ApiError, MSG_INACTIVE};
use crate::handlers::AppState;

/// Audience claim the hosted auth service puts on user tokens.
pub const AUDIENCE: &str = "authenticated";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub aud: String,
    pub exp: u64,
    pub iat: u64,
}

/// HS256 signing/verification keys derived from the shared JWT secret.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[AUDIENCE]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Verify signature, expiry and audience; return the profile id.
    pub fn verify(&self, token: &str) -> Result<Uuid, ApiError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            debug!(error = %e, "token rejected");
            ApiError::unauthorized()
        })?;
        Uuid::parse_str(&data.claims.sub).map_err(|_| ApiError::unauthorized())
    }

    /// Mint a token for `profile_id`.  Used by the CLI and tests; production
    /// tokens come from the auth service.
    pub fn issue(&self, profile_id: Uuid, ttl_secs: u64) -> Result<String, ApiError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(ApiError::internal)?
            .as_secs();
        let claims = Claims {
            sub: profile_id.to_string(),
            aud: AUDIENCE.to_string(),
            exp: now + ttl_secs,
            iat: now,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(ApiError::internal)
    }
}

/// Build the guard input from a profile row.
pub fn caller_from_profile(profile: &ProfileRow) -> Result<Caller, ApiError> {
    let role: Role = profile.role.parse().map_err(ApiError::internal)?;
    Ok(Caller {
        profile_id: profile.id,
        role,
        organization_id: profile.organization_id,
        site_id: profile.site_id,
        restricted: profile.restricted,
    })
}

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct AuthCaller(pub Caller);

#[async_trait]
impl FromRequestParts<AppState> for AuthCaller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or_else(ApiError::unauthorized)?;

        let profile_id = state.keys.verify(token)?;

        let profile = match state.store.get_profile(profile_id).await {
            Ok(p) => p,
            Err(DbError::NotFound) => {
                debug!(%profile_id, "token subject has no profile");
                return Err(ApiError::unauthorized());
            }
            Err(e) => return Err(e.into()),
        };

        if !profile.active {
            return Err(ApiError::Forbidden(MSG_INACTIVE.to_string()));
        }

        caller_from_profile(&profile).map(AuthCaller)
    }
}
