use axum::{http::StatusCode, response::IntoResponse, response::Response};
use tracing::warn;

use crate::error::{messages, ApiError};

/// Give the timeout stage's bare 408 the usual `{"error": ...}` body
pub async fn timeout_body(response: Response) -> Response {
    if response.status() != StatusCode::REQUEST_TIMEOUT {
        return response;
    }

    warn!("request exceeded the processing timeout");
    ApiError::request_timeout(messages::REQUEST_TIMEOUT).into_response()
}
