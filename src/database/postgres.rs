use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewUser, Newsletter, NewsletterDraft, User};
use crate::database::repository::{NewsletterStore, UserStore};

const USER_COLUMNS: &str = "id, firstname, lastname, email, password, created_at";
const NEWSLETTER_COLUMNS: &str = "id, editor_id, name, description, created_at";

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert(&self, user: &NewUser, password_hash: &str) -> Result<User, DatabaseError> {
        let query = format!(
            "INSERT INTO users (firstname, lastname, email, password) \
             VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&user.firstname)
            .bind(&user.lastname)
            .bind(&user.email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_insert)
    }
}

pub struct PgNewsletterStore {
    pool: PgPool,
}

impl PgNewsletterStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NewsletterStore for PgNewsletterStore {
    async fn list_by_editor(&self, editor_id: i32) -> Result<Vec<Newsletter>, DatabaseError> {
        let query =
            format!("SELECT {NEWSLETTER_COLUMNS} FROM newsletters WHERE editor_id = $1 ORDER BY id");
        let rows = sqlx::query_as::<_, Newsletter>(&query)
            .bind(editor_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn insert(
        &self,
        editor_id: i32,
        draft: &NewsletterDraft,
    ) -> Result<Newsletter, DatabaseError> {
        let query = format!(
            "INSERT INTO newsletters (editor_id, name, description) \
             VALUES ($1, $2, $3) RETURNING {NEWSLETTER_COLUMNS}"
        );
        sqlx::query_as::<_, Newsletter>(&query)
            .bind(editor_id)
            .bind(&draft.name)
            .bind(&draft.description)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_insert)
    }

    async fn find_owned(
        &self,
        id: i32,
        editor_id: i32,
    ) -> Result<Option<Newsletter>, DatabaseError> {
        let query = format!(
            "SELECT {NEWSLETTER_COLUMNS} FROM newsletters WHERE id = $1 AND editor_id = $2"
        );
        let row = sqlx::query_as::<_, Newsletter>(&query)
            .bind(id)
            .bind(editor_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_owned(
        &self,
        id: i32,
        editor_id: i32,
        draft: &NewsletterDraft,
    ) -> Result<Option<Newsletter>, DatabaseError> {
        let query = format!(
            "UPDATE newsletters SET name = $3, description = $4 \
             WHERE id = $1 AND editor_id = $2 RETURNING {NEWSLETTER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Newsletter>(&query)
            .bind(id)
            .bind(editor_id)
            .bind(&draft.name)
            .bind(&draft.description)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_owned(&self, id: i32, editor_id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM newsletters WHERE id = $1 AND editor_id = $2")
            .bind(id)
            .bind(editor_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, id: i32) -> Result<bool, DatabaseError> {
        let found: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM newsletters WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(found)
    }
}
