use axum::{
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UnsubscribeQuery {
    pub id: String,
}

/// GET|DELETE /api/v1/subscriptions?id=<key> - remove one subscription
pub async fn unsubscribe(
    State(state): State<AppState>,
    Query(query): Query<UnsubscribeQuery>,
) -> Result<StatusCode, ApiError> {
    state.subscriptions.unsubscribe(&query.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
