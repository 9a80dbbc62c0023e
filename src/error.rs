// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// Client-facing messages. Internal detail is logged, never sent.
pub mod messages {
    pub const DATA_CREATION_FAILURE: &str = "data creation failure";
    pub const DATA_ACCESS_FAILURE: &str = "data access failure";
    pub const DATA_UPDATE_FAILURE: &str = "data update failure";
    pub const DATA_DELETION_FAILURE: &str = "data deletion failure";

    pub const JSON_ENCODING_FAILURE: &str = "json encoding failure";
    pub const JSON_DECODING_FAILURE: &str = "json decoding failure";

    pub const FORM_ERR_RESPONSE_FAILURE: &str = "form error response failure";
    pub const INVALID_ID_IN_URL_PARAM: &str = "invalid id in url param";
    pub const UNAUTHORIZED_ACCESS: &str = "unauthorized access";
    pub const RESOURCE_NOT_FOUND: &str = "resource not found";
    pub const SENDING_EMAIL_FAILURE: &str = "sending email failure";
    pub const AUTHENTICATION_FAILURE: &str = "authentication failure";
    pub const TOKEN_EXTRACTION_FAILURE: &str = "token extraction failure";
    pub const FIELD_NOT_UNIQUE: &str = "email not unique";

    pub const ENDPOINT_NOT_FOUND: &str = "endpoint not found";
    pub const REQUEST_TIMEOUT: &str = "request timeout";
}

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 408 Request Timeout
    RequestTimeout(String),

    // 422 Unprocessable Entity (well-formed JSON that fails field constraints)
    UnprocessableEntity(Vec<String>),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RequestTimeout(_) => StatusCode::REQUEST_TIMEOUT,
            ApiError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message; validation errors are joined
    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::RequestTimeout(msg)
            | ApiError::InternalServerError(msg) => msg.clone(),
            ApiError::UnprocessableEntity(errors) => errors.join("; "),
        }
    }

    /// Convert to JSON response body
    ///
    /// Single errors render as `{"error": "..."}`, field violations as
    /// `{"errors": ["...", ...]}`.
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::UnprocessableEntity(errors) => json!({ "errors": errors }),
            _ => json!({ "error": self.message() }),
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn request_timeout(message: impl Into<String>) -> Self {
        ApiError::RequestTimeout(message.into())
    }

    pub fn unprocessable_entity(errors: Vec<String>) -> Self {
        ApiError::UnprocessableEntity(errors)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
