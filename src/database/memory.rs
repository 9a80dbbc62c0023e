use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewUser, Newsletter, NewsletterDraft, Subscription, User};
use crate::database::repository::{NewsletterStore, SubscriptionStore, UserStore};

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.read().iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: &NewUser, password_hash: &str) -> Result<User, DatabaseError> {
        let mut users = self.users.write();
        if users.iter().any(|u| u.email == user.email) {
            return Err(DatabaseError::Conflict(format!(
                "duplicate email: {}",
                user.email
            )));
        }

        let created = User {
            id: users.len() as i32 + 1,
            firstname: user.firstname.clone(),
            lastname: user.lastname.clone(),
            email: user.email.clone(),
            password: password_hash.to_string(),
            created_at: Utc::now(),
        };
        users.push(created.clone());
        Ok(created)
    }
}

#[derive(Default)]
struct NewsletterTable {
    next_id: i32,
    rows: BTreeMap<i32, Newsletter>,
}

#[derive(Default)]
pub struct MemoryNewsletterStore {
    table: RwLock<NewsletterTable>,
}

impl MemoryNewsletterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NewsletterStore for MemoryNewsletterStore {
    async fn list_by_editor(&self, editor_id: i32) -> Result<Vec<Newsletter>, DatabaseError> {
        Ok(self
            .table
            .read()
            .rows
            .values()
            .filter(|n| n.editor_id == editor_id)
            .cloned()
            .collect())
    }

    async fn insert(
        &self,
        editor_id: i32,
        draft: &NewsletterDraft,
    ) -> Result<Newsletter, DatabaseError> {
        let mut table = self.table.write();
        table.next_id += 1;

        let newsletter = Newsletter {
            id: table.next_id,
            editor_id,
            name: draft.name.clone(),
            description: draft.description.clone(),
            created_at: Utc::now(),
        };
        table.rows.insert(newsletter.id, newsletter.clone());
        Ok(newsletter)
    }

    async fn find_owned(
        &self,
        id: i32,
        editor_id: i32,
    ) -> Result<Option<Newsletter>, DatabaseError> {
        Ok(self
            .table
            .read()
            .rows
            .get(&id)
            .filter(|n| n.editor_id == editor_id)
            .cloned())
    }

    async fn update_owned(
        &self,
        id: i32,
        editor_id: i32,
        draft: &NewsletterDraft,
    ) -> Result<Option<Newsletter>, DatabaseError> {
        let mut table = self.table.write();
        let Some(row) = table.rows.get_mut(&id).filter(|n| n.editor_id == editor_id) else {
            return Ok(None);
        };

        row.name = draft.name.clone();
        row.description = draft.description.clone();
        Ok(Some(row.clone()))
    }

    async fn delete_owned(&self, id: i32, editor_id: i32) -> Result<bool, DatabaseError> {
        let mut table = self.table.write();
        let owned = table
            .rows
            .get(&id)
            .is_some_and(|n| n.editor_id == editor_id);
        if owned {
            table.rows.remove(&id);
        }
        Ok(owned)
    }

    async fn exists(&self, id: i32) -> Result<bool, DatabaseError> {
        Ok(self.table.read().rows.contains_key(&id))
    }
}

/// Documents keyed like Firebase push ids: a leading `-` and a random suffix
#[derive(Default)]
pub struct MemorySubscriptionStore {
    documents: RwLock<HashMap<String, Subscription>>,
}

impl MemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

#[async_trait]
impl SubscriptionStore for MemorySubscriptionStore {
    async fn push(&self, subscription: &Subscription) -> Result<String, DatabaseError> {
        let key = format!("-{}", Uuid::new_v4().simple());
        self.documents
            .write()
            .insert(key.clone(), subscription.clone());
        Ok(key)
    }

    async fn get(&self, key: &str) -> Result<Option<Subscription>, DatabaseError> {
        Ok(self.documents.read().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<(), DatabaseError> {
        self.documents.write().remove(key);
        Ok(())
    }
}
