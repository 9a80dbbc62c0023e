use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;

use crate::error::{messages, ApiError};
use crate::middleware::AuthSubject;
use crate::state::AppState;

use super::{not_found, parse_id, store_failure};

/// DELETE /api/v1/newsletters/{id}
pub async fn delete(
    State(state): State<AppState>,
    AuthSubject(editor_id): AuthSubject,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&raw_id)?;

    let deleted = state
        .newsletters
        .delete_owned(id, editor_id)
        .await
        .map_err(store_failure(messages::DATA_DELETION_FAILURE))?;
    if !deleted {
        return Err(not_found(id, editor_id));
    }

    info!("Editor {} deleted newsletter {}", editor_id, id);
    Ok(StatusCode::NO_CONTENT)
}
