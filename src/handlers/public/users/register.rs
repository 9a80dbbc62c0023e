use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::database::models::NewUser;
use crate::error::ApiError;
use crate::middleware::Validated;
use crate::state::AppState;

/// POST /api/v1/register - create an account and answer with a token
pub async fn register(
    State(state): State<AppState>,
    Validated(new_user): Validated<NewUser>,
) -> Result<impl IntoResponse, ApiError> {
    let token = state.accounts.register(&new_user).await?;
    Ok((StatusCode::CREATED, Json(token)))
}
