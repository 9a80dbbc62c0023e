//! Request-scoped values handed from middleware stages to handlers.
//!
//! A [`RequestContext`] is a persistent list: adding a value returns a new
//! context that shares its parent, so a stage never mutates what an earlier
//! stage saw. Each key may be set once per request. Handlers read values
//! through the typed extractors at the bottom of this module.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
};
use thiserror::Error;
use tracing::error;

use crate::auth::SubjectId;
use crate::database::models::{Credentials, NewUser, NewsletterDraft, SubscriptionRequest};
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKey {
    AuthenticatedSubject,
    ValidatedPayload,
    ApiVersion,
}

impl std::fmt::Display for ContextKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ContextKey::AuthenticatedSubject => "authenticated_subject",
            ContextKey::ValidatedPayload => "validated_payload",
            ContextKey::ApiVersion => "api_version",
        })
    }
}

/// Decoded and constraint-checked request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    NewUser(NewUser),
    Credentials(Credentials),
    Newsletter(NewsletterDraft),
    Subscription(SubscriptionRequest),
}

/// Moves a concrete payload type in and out of [`Payload`]
pub trait PayloadKind: Sized {
    fn wrap(self) -> Payload;
    fn peel(payload: &Payload) -> Option<&Self>;
}

macro_rules! payload_kind {
    ($ty:ty, $variant:ident) => {
        impl PayloadKind for $ty {
            fn wrap(self) -> Payload {
                Payload::$variant(self)
            }

            fn peel(payload: &Payload) -> Option<&Self> {
                match payload {
                    Payload::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

payload_kind!(NewUser, NewUser);
payload_kind!(Credentials, Credentials);
payload_kind!(NewsletterDraft, Newsletter);
payload_kind!(SubscriptionRequest, Subscription);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextValue {
    AuthenticatedSubject(SubjectId),
    ValidatedPayload(Payload),
    ApiVersion(String),
}

impl ContextValue {
    pub fn key(&self) -> ContextKey {
        match self {
            ContextValue::AuthenticatedSubject(_) => ContextKey::AuthenticatedSubject,
            ContextValue::ValidatedPayload(_) => ContextKey::ValidatedPayload,
            ContextValue::ApiVersion(_) => ContextKey::ApiVersion,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("context key already set: {0}")]
    AlreadySet(ContextKey),
}

#[derive(Debug)]
struct Link {
    value: ContextValue,
    parent: Option<Arc<Link>>,
}

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    head: Option<Arc<Link>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(&self, value: ContextValue) -> Result<Self, ContextError> {
        let key = value.key();
        if self.value(key).is_some() {
            return Err(ContextError::AlreadySet(key));
        }

        Ok(Self {
            head: Some(Arc::new(Link {
                value,
                parent: self.head.clone(),
            })),
        })
    }

    pub fn value(&self, key: ContextKey) -> Option<&ContextValue> {
        let mut cursor = self.head.as_deref();
        while let Some(link) = cursor {
            if link.value.key() == key {
                return Some(&link.value);
            }
            cursor = link.parent.as_deref();
        }
        None
    }

    pub fn subject(&self) -> Option<SubjectId> {
        match self.value(ContextKey::AuthenticatedSubject)? {
            ContextValue::AuthenticatedSubject(id) => Some(*id),
            _ => None,
        }
    }

    pub fn api_version(&self) -> Option<&str> {
        match self.value(ContextKey::ApiVersion)? {
            ContextValue::ApiVersion(version) => Some(version),
            _ => None,
        }
    }

    pub fn payload<T: PayloadKind>(&self) -> Option<&T> {
        match self.value(ContextKey::ValidatedPayload)? {
            ContextValue::ValidatedPayload(payload) => T::peel(payload),
            _ => None,
        }
    }
}

/// Layer `value` onto the context carried by `request`
pub fn attach(request: &mut Request, value: ContextValue) -> Result<(), ContextError> {
    let context = request
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_default()
        .with_value(value)?;
    request.extensions_mut().insert(context);
    Ok(())
}

fn context_of(parts: &Parts) -> RequestContext {
    parts
        .extensions
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_default()
}

fn missing(key: ContextKey, parts: &Parts) -> ApiError {
    error!("{} missing from request context for {} {}", key, parts.method, parts.uri.path());
    ApiError::internal_server_error(crate::error::messages::DATA_ACCESS_FAILURE)
}

/// Subject placed by the authentication stage
#[derive(Debug, Clone, Copy)]
pub struct AuthSubject(pub SubjectId);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthSubject {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        context_of(parts)
            .subject()
            .map(AuthSubject)
            .ok_or_else(|| missing(ContextKey::AuthenticatedSubject, parts))
    }
}

/// Payload placed by the validation stage
#[derive(Debug, Clone)]
pub struct Validated<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for Validated<T>
where
    T: PayloadKind + Clone + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        context_of(parts)
            .payload::<T>()
            .cloned()
            .map(Validated)
            .ok_or_else(|| missing(ContextKey::ValidatedPayload, parts))
    }
}

/// Version label placed by the api-version stage, e.g. "v1"
#[derive(Debug, Clone)]
pub struct ApiVersion(pub String);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ApiVersion {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        context_of(parts)
            .api_version()
            .map(|v| ApiVersion(v.to_string()))
            .ok_or_else(|| missing(ContextKey::ApiVersion, parts))
    }
}
