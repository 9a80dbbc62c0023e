use axum::{extract::State, Json};

use crate::database::models::Credentials;
use crate::error::ApiError;
use crate::middleware::Validated;
use crate::state::AppState;

/// POST /api/v1/login - exchange credentials for a token
pub async fn login(
    State(state): State<AppState>,
    Validated(credentials): Validated<Credentials>,
) -> Result<Json<String>, ApiError> {
    let token = state.accounts.login(&credentials).await?;
    Ok(Json(token))
}
