pub mod create;
pub mod delete;
pub mod list;
pub mod read;
pub mod update;

pub use create::create;
pub use delete::delete;
pub use list::list;
pub use read::read;
pub use update::update;

use tracing::error;

use crate::database::DatabaseError;
use crate::error::{messages, ApiError};

/// Numeric id from the `{id}` path segment
pub(crate) fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>().map_err(|e| {
        error!("invalid newsletter id {:?}: {}", raw, e);
        ApiError::bad_request(messages::INVALID_ID_IN_URL_PARAM)
    })
}

/// Log a store failure and answer with `message`
pub(crate) fn store_failure(message: &'static str) -> impl FnOnce(DatabaseError) -> ApiError {
    move |e| {
        error!("newsletter store: {}", e);
        ApiError::internal_server_error(message)
    }
}

pub(crate) fn not_found(id: i32, editor_id: i32) -> ApiError {
    error!("newsletter {} not found for editor {}", id, editor_id);
    ApiError::not_found(messages::RESOURCE_NOT_FOUND)
}
