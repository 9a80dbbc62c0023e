use axum::{extract::State, Json};

use crate::database::models::Newsletter;
use crate::error::{messages, ApiError};
use crate::middleware::AuthSubject;
use crate::state::AppState;

use super::store_failure;

/// GET /api/v1/newsletters - the caller's newsletters, `[]` when none
pub async fn list(
    State(state): State<AppState>,
    AuthSubject(editor_id): AuthSubject,
) -> Result<Json<Vec<Newsletter>>, ApiError> {
    let newsletters = state
        .newsletters
        .list_by_editor(editor_id)
        .await
        .map_err(store_failure(messages::DATA_ACCESS_FAILURE))?;
    Ok(Json(newsletters))
}
