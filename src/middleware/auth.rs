use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, Uri},
    middleware::Next,
    response::Response,
};
use tracing::error;

use crate::auth::TokenService;
use crate::error::{messages, ApiError};
use crate::middleware::context::{attach, ContextValue};

/// Bearer token authentication
///
/// The token comes from the `token` query parameter when present, otherwise
/// from `Authorization: Bearer <token>`. A verified subject is placed in the
/// request context; any failure answers the request without running the rest
/// of the chain.
pub async fn authenticate(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.uri(), request.headers()).unwrap_or_default();

    if let Err(e) = tokens.verify(&token) {
        error!("token verification failed: {}", e);
        return Err(ApiError::unauthorized(messages::UNAUTHORIZED_ACCESS));
    }

    let subject = tokens.extract_subject(&token).map_err(|e| {
        error!("token subject extraction failed: {}", e);
        ApiError::internal_server_error(messages::TOKEN_EXTRACTION_FAILURE)
    })?;

    attach(&mut request, ContextValue::AuthenticatedSubject(subject)).map_err(|e| {
        error!("authentication stage: {}", e);
        ApiError::internal_server_error(messages::TOKEN_EXTRACTION_FAILURE)
    })?;

    Ok(next.run(request).await)
}

fn extract_token(uri: &Uri, headers: &HeaderMap) -> Option<String> {
    let from_query = uri.query().and_then(|query| {
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "token")
            .map(|(_, value)| value.into_owned())
    });

    from_query.filter(|t| !t.is_empty()).or_else(|| {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
    })
}
