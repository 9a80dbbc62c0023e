use axum::{
    extract::{Path, State},
    Json,
};

use crate::database::models::{Newsletter, NewsletterDraft};
use crate::error::{messages, ApiError};
use crate::middleware::{AuthSubject, Validated};
use crate::state::AppState;

use super::{not_found, parse_id, store_failure};

/// PUT /api/v1/newsletters/{id} - replace name and description; owner stays the caller
pub async fn update(
    State(state): State<AppState>,
    AuthSubject(editor_id): AuthSubject,
    Path(raw_id): Path<String>,
    Validated(draft): Validated<NewsletterDraft>,
) -> Result<Json<Newsletter>, ApiError> {
    let id = parse_id(&raw_id)?;

    state
        .newsletters
        .update_owned(id, editor_id, &draft)
        .await
        .map_err(store_failure(messages::DATA_UPDATE_FAILURE))?
        .map(Json)
        .ok_or_else(|| not_found(id, editor_id))
}
