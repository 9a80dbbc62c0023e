use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::info;

use crate::database::models::NewsletterDraft;
use crate::error::{messages, ApiError};
use crate::middleware::{AuthSubject, Validated};
use crate::state::AppState;

use super::store_failure;

/// POST /api/v1/newsletters - create a newsletter owned by the caller
pub async fn create(
    State(state): State<AppState>,
    AuthSubject(editor_id): AuthSubject,
    Validated(draft): Validated<NewsletterDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let newsletter = state
        .newsletters
        .insert(editor_id, &draft)
        .await
        .map_err(store_failure(messages::DATA_CREATION_FAILURE))?;

    info!("Editor {} created newsletter {}", editor_id, newsletter.id);
    Ok((StatusCode::CREATED, Json(newsletter)))
}
