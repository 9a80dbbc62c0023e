use axum::{
    extract::Request,
    http::{header::CONTENT_TYPE, HeaderValue},
    middleware::Next,
    response::Response,
};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf8";

/// Every response is labelled as JSON, including errors and empty bodies
pub async fn json_content_type(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    response
}
