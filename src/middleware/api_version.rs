use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::error;

use crate::error::{messages, ApiError};
use crate::middleware::context::{attach, ContextValue};

/// Tag every api request with the version label the router is mounted under
pub async fn api_version(
    State(version): State<String>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    attach(&mut request, ContextValue::ApiVersion(version)).map_err(|e| {
        error!("api version stage: {}", e);
        ApiError::internal_server_error(messages::DATA_ACCESS_FAILURE)
    })?;

    Ok(next.run(request).await)
}
