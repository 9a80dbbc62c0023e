use axum::{
    extract::{Path, State},
    Json,
};

use crate::database::models::Newsletter;
use crate::error::{messages, ApiError};
use crate::middleware::AuthSubject;
use crate::state::AppState;

use super::{not_found, parse_id, store_failure};

/// GET /api/v1/newsletters/{id}
pub async fn read(
    State(state): State<AppState>,
    AuthSubject(editor_id): AuthSubject,
    Path(raw_id): Path<String>,
) -> Result<Json<Newsletter>, ApiError> {
    let id = parse_id(&raw_id)?;

    state
        .newsletters
        .find_owned(id, editor_id)
        .await
        .map_err(store_failure(messages::DATA_ACCESS_FAILURE))?
        .map(Json)
        .ok_or_else(|| not_found(id, editor_id))
}
