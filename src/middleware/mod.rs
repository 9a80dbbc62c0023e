pub mod api_version;
pub mod auth;
pub mod content_type;
pub mod context;
pub mod timeout;
pub mod validate;

pub use api_version::api_version;
pub use auth::authenticate;
pub use content_type::json_content_type;
pub use context::{ApiVersion, AuthSubject, RequestContext, Validated};
pub use timeout::timeout_body;
pub use validate::validate_json;
