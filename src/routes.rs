use axum::{
    handler::Handler,
    middleware::{from_fn, from_fn_with_state, map_response},
    routing::{get, post},
    Router,
};
use tower_http::timeout::TimeoutLayer;

use crate::database::models::{Credentials, NewUser, NewsletterDraft, SubscriptionRequest};
use crate::error::{messages, ApiError};
use crate::handlers::{
    protected::newsletters,
    public::{subscriptions, users},
};
use crate::middleware::{
    api_version, authenticate, json_content_type, timeout_body, validate_json,
};
use crate::requestlog::RequestLogLayer;
use crate::state::AppState;

/// Full application: `/api/v<major>/...`, `/live` and the JSON 404 fallback
///
/// Stage order, outermost first: request log, content type, timeout body,
/// timeout, api version, authentication, validation, handler.
pub fn app(state: AppState, request_log: RequestLogLayer) -> Router {
    let version = state.config.api_version();
    let timeout = state.config.server.timeout_read + state.config.server.timeout_write;

    let api = Router::new()
        .merge(public_routes())
        .merge(protected_routes(&state))
        .layer(from_fn_with_state(version.clone(), api_version));

    Router::new()
        .nest(&format!("/api/{version}"), api)
        .route("/live", get(live))
        .fallback(endpoint_not_found)
        .layer(TimeoutLayer::new(timeout))
        .layer(map_response(timeout_body))
        .layer(from_fn(json_content_type))
        .layer(request_log)
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/register",
            post(users::register.layer(from_fn(validate_json::<NewUser>))),
        )
        .route(
            "/login",
            post(users::login.layer(from_fn(validate_json::<Credentials>))),
        )
        .route(
            "/subscriptions",
            post(subscriptions::subscribe.layer(from_fn(validate_json::<SubscriptionRequest>)))
                .get(subscriptions::unsubscribe)
                .delete(subscriptions::unsubscribe),
        )
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/newsletters",
            get(newsletters::list)
                .post(newsletters::create.layer(from_fn(validate_json::<NewsletterDraft>))),
        )
        .route(
            "/newsletters/:id",
            get(newsletters::read)
                .put(newsletters::update.layer(from_fn(validate_json::<NewsletterDraft>)))
                .delete(newsletters::delete),
        )
        .route_layer(from_fn_with_state(state.tokens.clone(), authenticate))
}

async fn live() -> &'static str {
    "."
}

async fn endpoint_not_found() -> ApiError {
    ApiError::not_found(messages::ENDPOINT_NOT_FOUND)
}
