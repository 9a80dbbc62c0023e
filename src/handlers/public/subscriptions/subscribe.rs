use axum::{
    extract::State,
    http::{header::HOST, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::database::models::SubscriptionRequest;
use crate::error::ApiError;
use crate::middleware::{ApiVersion, Validated};
use crate::state::AppState;

/// POST /api/v1/subscriptions - subscribe an address and mail a confirmation
pub async fn subscribe(
    State(state): State<AppState>,
    ApiVersion(version): ApiVersion,
    headers: HeaderMap,
    Validated(request): Validated<SubscriptionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let api_root = format!("{}://{}/api/{}", scheme(&headers), host(&headers), version);
    let key = state.subscriptions.subscribe(&request, &api_root).await?;
    Ok((StatusCode::CREATED, Json(key)))
}

fn scheme(headers: &HeaderMap) -> &'static str {
    let forwarded = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if forwarded.eq_ignore_ascii_case("https") {
        "https"
    } else {
        "http"
    }
}

fn host(headers: &HeaderMap) -> &str {
    headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_scheme_follows_forwarded_proto() {
        let mut headers = HeaderMap::new();
        assert_eq!(scheme(&headers), "http");
        headers.insert("x-forwarded-proto", "HTTPS".parse().unwrap());
        assert_eq!(scheme(&headers), "https");
    }
}
