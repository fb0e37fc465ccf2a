use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Router,
};
use oasis_core::ActionOutcome;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod account;
pub mod auth;
pub mod cabins;
pub mod error;
pub mod reservations;
pub mod session;
pub mod state;

pub use state::{AppState, AuthConfig};

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    Router::new()
        .merge(auth::routes())
        .merge(cabins::routes())
        .merge(account::routes())
        .merge(reservations::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 204 for a revalidation, 303 See Other for a redirect.
pub(crate) fn navigate(outcome: ActionOutcome) -> Response {
    match outcome {
        ActionOutcome::Revalidated => StatusCode::NO_CONTENT.into_response(),
        ActionOutcome::Redirect(path) => Redirect::to(&path).into_response(),
    }
}
