use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewUser, Newsletter, NewsletterDraft, Subscription, User};

/// Registered users, unique by email
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    /// `password_hash` replaces the plaintext in `user`; a taken email is `Conflict`
    async fn insert(&self, user: &NewUser, password_hash: &str) -> Result<User, DatabaseError>;
}

/// Newsletters scoped by their editor
#[async_trait]
pub trait NewsletterStore: Send + Sync {
    async fn list_by_editor(&self, editor_id: i32) -> Result<Vec<Newsletter>, DatabaseError>;

    async fn insert(
        &self,
        editor_id: i32,
        draft: &NewsletterDraft,
    ) -> Result<Newsletter, DatabaseError>;

    async fn find_owned(&self, id: i32, editor_id: i32)
        -> Result<Option<Newsletter>, DatabaseError>;

    async fn update_owned(
        &self,
        id: i32,
        editor_id: i32,
        draft: &NewsletterDraft,
    ) -> Result<Option<Newsletter>, DatabaseError>;

    /// False when no newsletter with that id belongs to `editor_id`
    async fn delete_owned(&self, id: i32, editor_id: i32) -> Result<bool, DatabaseError>;

    async fn exists(&self, id: i32) -> Result<bool, DatabaseError>;
}

/// Subscription documents keyed by a store-generated id
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Store `subscription` and return its generated key
    async fn push(&self, subscription: &Subscription) -> Result<String, DatabaseError>;

    async fn get(&self, key: &str) -> Result<Option<Subscription>, DatabaseError>;

    async fn delete(&self, key: &str) -> Result<(), DatabaseError>;
}
