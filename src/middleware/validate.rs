use axum::{
    body::{to_bytes, Body},
    extract::Request,
    middleware::Next,
    response::Response,
};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::error::{messages, ApiError};
use crate::middleware::context::{attach, ContextValue, PayloadKind};
use crate::validator::{FieldError, Validate};

/// Largest JSON body the validation stage will read
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Decode the body as `T`, check its constraints and hand it on through the
/// request context. The handler behind this stage never sees the raw body.
pub async fn validate_json<T>(request: Request, next: Next) -> Result<Response, ApiError>
where
    T: DeserializeOwned + Validate + PayloadKind + Send + 'static,
{
    let (parts, body) = request.into_parts();

    let bytes = to_bytes(body, MAX_BODY_BYTES).await.map_err(|e| {
        debug!("reading request body failed: {}", e);
        ApiError::bad_request(messages::JSON_DECODING_FAILURE)
    })?;

    let payload: T = serde_json::from_slice(&bytes).map_err(|e| {
        debug!("decoding {} failed: {}", std::any::type_name::<T>(), e);
        ApiError::bad_request(messages::JSON_DECODING_FAILURE)
    })?;

    payload.validate().map_err(form_errors)?;

    let mut request = Request::from_parts(parts, Body::empty());
    attach(&mut request, ContextValue::ValidatedPayload(payload.wrap())).map_err(|e| {
        error!("validation stage: {}", e);
        ApiError::internal_server_error(messages::DATA_ACCESS_FAILURE)
    })?;

    Ok(next.run(request).await)
}

/// Turn constraint violations into the 422 body
pub fn form_errors(errors: Vec<FieldError>) -> ApiError {
    if errors.is_empty() {
        error!("validation failed without any field errors");
        return ApiError::internal_server_error(messages::FORM_ERR_RESPONSE_FAILURE);
    }

    ApiError::unprocessable_entity(errors.iter().map(ToString::to_string).collect())
}
