use axum::{
    extract::State,
    response::Response,
    routing::get,
    Form, Json, Router,
};
use oasis_core::actions::ProfileForm;
use oasis_core::Guest;

use crate::error::AppError;
use crate::session::RequestSession;
use crate::state::AppState;
use crate::navigate;

pub fn routes() -> Router<AppState> {
    Router::new().route("/account/profile", get(get_profile).post(update_profile))
}

/// GET /account/profile
async fn get_profile(
    State(state): State<AppState>,
    session: RequestSession,
) -> Result<Json<Guest>, AppError> {
    let guest = state
        .actions
        .profile(&session)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Guest not found".to_string()))?;

    Ok(Json(guest))
}

/// POST /account/profile
async fn update_profile(
    State(state): State<AppState>,
    session: RequestSession,
    Form(form): Form<ProfileForm>,
) -> Result<Response, AppError> {
    let outcome = state.actions.update_guest(&session, form).await?;
    Ok(navigate(outcome))
}
