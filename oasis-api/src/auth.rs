use axum::{
    extract::State,
    response::Redirect,
    routing::post,
    Form, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use oasis_core::paths;
use oasis_shared::Masked;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::AppError;
use crate::session::{issue_token, verify_identity, RequestSession, SessionClaims, SESSION_COOKIE};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInForm {
    /// ID token issued by the identity provider
    pub id_token: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signin", post(sign_in))
        .route("/auth/signout", post(sign_out))
}

/// POST /auth/signin
/// Starts a session for the identity the provider vouched for.
async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignInForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    let identity = verify_identity(&form.id_token, &state.auth).map_err(|e| {
        warn!("Rejected sign-in token: {}", e);
        AppError::AuthenticationError("Sign-in could not be verified".to_string())
    })?;

    let email = identity.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::ValidationError("Please provide a valid email address".to_string()));
    }

    let guest = state.actions.begin_session(email, identity.name.trim()).await?;

    let claims = SessionClaims::for_guest(&guest, &state.auth);
    let token = issue_token(&claims, &state.auth)
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))?;

    info!("Guest {} signed in as {}", guest.id, Masked(email));

    let max_age = i64::try_from(claims.remaining_seconds()).unwrap_or(i64::MAX);
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(state.auth.secure_cookie)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age))
        .path("/");

    Ok((jar.add(cookie), Redirect::to(paths::ACCOUNT)))
}

/// POST /auth/signout
async fn sign_out(
    State(state): State<AppState>,
    session: RequestSession,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    if let Some(claims) = session.claims().await {
        state
            .revocations
            .revoke(&claims.jti, claims.remaining_seconds())
            .await
            .map_err(|e| AppError::InternalServerError(format!("Session revocation failed: {}", e)))?;
        info!("Guest {} signed out", claims.guest_id);
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, Redirect::to(paths::HOME)))
}
