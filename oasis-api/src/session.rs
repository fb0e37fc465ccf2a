use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use oasis_core::models::{Guest, GuestId};
use oasis_core::repository::{SessionProvider, SessionRevocations};
use oasis_core::{Session, SessionUser};
use oasis_shared::Masked;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::state::{AppState, AuthConfig};

pub const SESSION_COOKIE: &str = "oasis_session";

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Guest email
    pub sub: String,
    pub name: String,
    pub guest_id: GuestId,
    /// Token id, the handle used to revoke it on sign-out
    pub jti: String,
    pub exp: usize,
}

impl SessionClaims {
    pub fn for_guest(guest: &Guest, auth: &AuthConfig) -> Self {
        Self {
            sub: guest.email.clone(),
            name: guest.full_name.clone(),
            guest_id: guest.id,
            jti: Uuid::new_v4().to_string(),
            exp: expires_at(auth.expiration),
        }
    }

    /// Seconds until the token expires, zero once it has.
    pub fn remaining_seconds(&self) -> u64 {
        (self.exp as i64 - Utc::now().timestamp()).max(0) as u64
    }
}

impl From<SessionClaims> for Session {
    fn from(claims: SessionClaims) -> Self {
        Session {
            user: SessionUser {
                name: claims.name,
                email: Masked(claims.sub),
                guest_id: claims.guest_id,
            },
        }
    }
}

/// Unix timestamp `lifetime_seconds` from now, saturating at the latest representable instant.
fn expires_at(lifetime_seconds: u64) -> usize {
    let now = Utc::now();
    i64::try_from(lifetime_seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
        .timestamp() as usize
}

pub fn issue_token(claims: &SessionClaims, auth: &AuthConfig) -> Result<String, jsonwebtoken::errors::Error> {
    encode(&Header::default(), claims, &EncodingKey::from_secret(auth.secret.as_bytes()))
}

// ============================================================================
// Identity Provider
// ============================================================================

/// Claims of the ID token the identity provider hands back after a login.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct IdentityClaims {
    /// Provider account id
    pub sub: String,
    pub email: String,
    pub name: String,
    pub exp: usize,
}

/// Checks the provider's signature and expiry on an ID token.
///
/// Unsigned, forged and expired tokens are all rejected.
pub fn verify_identity(id_token: &str, auth: &AuthConfig) -> Result<IdentityClaims, jsonwebtoken::errors::Error> {
    decode::<IdentityClaims>(
        id_token,
        &DecodingKey::from_secret(auth.provider_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

// ============================================================================
// Request Session
// ============================================================================

/// The caller's session token, decoded only when an action asks for it.
///
/// The token is read from the session cookie, falling back to a bearer header.
/// Invalid, expired and revoked tokens all mean "not signed in".
pub struct RequestSession {
    token: Option<String>,
    secret: String,
    revocations: Arc<dyn SessionRevocations>,
}

impl RequestSession {
    pub async fn claims(&self) -> Option<SessionClaims> {
        let token = self.token.as_deref()?;

        let token_data = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| debug!("Rejected session token: {}", e))
        .ok()?;

        match self.revocations.is_revoked(&token_data.claims.jti).await {
            Ok(false) => Some(token_data.claims),
            Ok(true) => {
                debug!("Session {} was signed out", token_data.claims.jti);
                None
            }
            Err(e) => {
                warn!("Revocation lookup failed, treating session as signed out: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl SessionProvider for RequestSession {
    async fn session(&self) -> Option<Session> {
        self.claims().await.map(Session::from)
    }
}

impl FromRequestParts<AppState> for RequestSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let cookie_token = CookieJar::from_headers(&parts.headers)
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_owned());

        let token = match cookie_token {
            Some(token) => Some(token),
            None => TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .ok()
                .map(|TypedHeader(Authorization(bearer))| bearer.token().to_owned()),
        };

        Ok(Self {
            token,
            secret: state.auth.secret.clone(),
            revocations: state.revocations.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oasis_core::memory::InMemoryRevocations;

    fn auth() -> AuthConfig {
        AuthConfig {
            secret: "test-secret".to_string(),
            provider_secret: "provider-secret".to_string(),
            expiration: 600,
            secure_cookie: false,
        }
    }

    fn identity(exp: usize) -> IdentityClaims {
        IdentityClaims {
            sub: "google-oauth2|42".to_string(),
            email: "jonas@example.com".to_string(),
            name: "Jonas".to_string(),
            exp,
        }
    }

    fn guest() -> Guest {
        Guest {
            id: 7,
            full_name: "Jonas".to_string(),
            email: "jonas@example.com".to_string(),
            national_id: None,
            nationality: None,
            country_flag: None,
            created_at: Utc::now(),
        }
    }

    fn request_session(token: Option<String>, revocations: Arc<InMemoryRevocations>) -> RequestSession {
        RequestSession {
            token,
            secret: auth().secret,
            revocations,
        }
    }

    #[tokio::test]
    async fn test_valid_token_yields_session() {
        let claims = SessionClaims::for_guest(&guest(), &auth());
        let token = issue_token(&claims, &auth()).unwrap();

        let session = request_session(Some(token), Arc::new(InMemoryRevocations::new()))
            .session()
            .await
            .unwrap();

        assert_eq!(session.guest_id(), 7);
        assert_eq!(session.user.email.expose(), "jonas@example.com");
    }

    #[tokio::test]
    async fn test_missing_or_forged_token_is_anonymous() {
        let revocations = Arc::new(InMemoryRevocations::new());
        assert!(request_session(None, revocations.clone()).session().await.is_none());

        let forged = issue_token(
            &SessionClaims::for_guest(&guest(), &auth()),
            &AuthConfig { secret: "other".to_string(), ..auth() },
        )
        .unwrap();
        assert!(request_session(Some(forged), revocations).session().await.is_none());
    }

    #[tokio::test]
    async fn test_revoked_token_is_anonymous() {
        let claims = SessionClaims::for_guest(&guest(), &auth());
        let token = issue_token(&claims, &auth()).unwrap();
        let revocations = Arc::new(InMemoryRevocations::new());
        revocations.revoke(&claims.jti, claims.remaining_seconds()).await.unwrap();

        assert!(request_session(Some(token), revocations).session().await.is_none());
    }

    #[test]
    fn test_remaining_seconds_never_negative() {
        let mut claims = SessionClaims::for_guest(&guest(), &auth());
        assert!(claims.remaining_seconds() > 590);

        claims.exp = 0;
        assert_eq!(claims.remaining_seconds(), 0);
    }

    #[test]
    fn test_huge_session_lifetime_saturates() {
        let auth = AuthConfig { expiration: u64::MAX, ..auth() };
        let claims = SessionClaims::for_guest(&guest(), &auth);

        assert_eq!(claims.exp, DateTime::<Utc>::MAX_UTC.timestamp() as usize);
        assert!(claims.remaining_seconds() > 0);
    }

    #[test]
    fn test_identity_signed_by_provider_is_accepted() {
        let exp = (Utc::now() + Duration::minutes(5)).timestamp() as usize;
        let token = encode(
            &Header::default(),
            &identity(exp),
            &EncodingKey::from_secret(b"provider-secret"),
        )
        .unwrap();

        let claims = verify_identity(&token, &auth()).unwrap();
        assert_eq!(claims.email, "jonas@example.com");
        assert_eq!(claims.name, "Jonas");
    }

    #[test]
    fn test_identity_forged_or_expired_is_rejected() {
        let exp = (Utc::now() + Duration::minutes(5)).timestamp() as usize;
        let forged = encode(&Header::default(), &identity(exp), &EncodingKey::from_secret(b"guess")).unwrap();
        assert!(verify_identity(&forged, &auth()).is_err());

        let expired = encode(
            &Header::default(),
            &identity(1_000),
            &EncodingKey::from_secret(b"provider-secret"),
        )
        .unwrap();
        assert!(verify_identity(&expired, &auth()).is_err());

        // Our own session token is not a provider identity
        let session = issue_token(&SessionClaims::for_guest(&guest(), &auth()), &auth()).unwrap();
        assert!(verify_identity(&session, &auth()).is_err());

        assert!(verify_identity("not-a-token", &auth()).is_err());
    }
}
