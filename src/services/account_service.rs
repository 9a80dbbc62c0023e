use std::sync::Arc;

use tracing::{error, info};

use crate::auth::{password, SubjectId, TokenError, TokenService};
use crate::database::manager::DatabaseError;
use crate::database::models::{Credentials, NewUser};
use crate::database::repository::UserStore;
use crate::error::{messages, ApiError};

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Email already registered: {0}")]
    EmailTaken(String),
    #[error("No account for email: {0}")]
    UnknownEmail(String),
    #[error("Password does not match for: {0}")]
    WrongPassword(String),
    #[error("Password hashing failed: {0}")]
    Hash(#[from] password::PasswordError),
    #[error("Token issue failed: {0}")]
    Token(#[from] TokenError),
    #[error("Database error during {action}: {source}")]
    Database {
        action: &'static str,
        #[source]
        source: DatabaseError,
    },
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        error!("{}", err);
        match err {
            AccountError::EmailTaken(_) => ApiError::bad_request(messages::FIELD_NOT_UNIQUE),
            AccountError::UnknownEmail(_) => ApiError::bad_request(messages::RESOURCE_NOT_FOUND),
            AccountError::WrongPassword(_) => {
                ApiError::bad_request(messages::AUTHENTICATION_FAILURE)
            }
            AccountError::Hash(_) | AccountError::Database { action: "register", .. } => {
                ApiError::internal_server_error(messages::DATA_CREATION_FAILURE)
            }
            AccountError::Token(_) | AccountError::Database { .. } => {
                ApiError::internal_server_error(messages::DATA_ACCESS_FAILURE)
            }
        }
    }
}

/// Registration and login; both answer with a fresh token
pub struct AccountService {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenService>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    pub async fn register(&self, new_user: &NewUser) -> Result<String, AccountError> {
        let existing = self
            .users
            .find_by_email(&new_user.email)
            .await
            .map_err(|source| AccountError::Database {
                action: "register",
                source,
            })?;
        if existing.is_some() {
            return Err(AccountError::EmailTaken(new_user.email.clone()));
        }

        let hash = password::hash(&new_user.password)?;

        let user = match self.users.insert(new_user, &hash).await {
            Ok(user) => user,
            // lost a race with a concurrent registration
            Err(DatabaseError::Conflict(_)) => {
                return Err(AccountError::EmailTaken(new_user.email.clone()))
            }
            Err(source) => {
                return Err(AccountError::Database {
                    action: "register",
                    source,
                })
            }
        };

        info!("Registered user {} ({})", user.id, user.email);
        self.issue(user.id)
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<String, AccountError> {
        let user = self
            .users
            .find_by_email(&credentials.email)
            .await
            .map_err(|source| AccountError::Database {
                action: "login",
                source,
            })?
            .ok_or_else(|| AccountError::UnknownEmail(credentials.email.clone()))?;

        if !password::verify(&credentials.password, &user.password) {
            return Err(AccountError::WrongPassword(credentials.email.clone()));
        }

        info!("User {} logged in", user.id);
        self.issue(user.id)
    }

    fn issue(&self, subject: SubjectId) -> Result<String, AccountError> {
        Ok(self.tokens.issue(subject)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryUserStore;

    fn service() -> (AccountService, Arc<TokenService>) {
        let tokens = Arc::new(TokenService::new("secret"));
        (
            AccountService::new(Arc::new(MemoryUserStore::new()), tokens.clone()),
            tokens,
        )
    }

    fn new_user() -> NewUser {
        NewUser {
            firstname: "Grace".into(),
            lastname: "Hopper".into(),
            email: "grace@example.com".into(),
            password: "cobol".into(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (accounts, tokens) = service();
        let token = accounts.register(&new_user()).await.unwrap();
        assert_eq!(tokens.extract_subject(&token), Ok(1));

        let token = accounts
            .login(&Credentials {
                email: "grace@example.com".into(),
                password: "cobol".into(),
            })
            .await
            .unwrap();
        assert_eq!(tokens.extract_subject(&token), Ok(1));
    }

    #[tokio::test]
    async fn test_login_failures() {
        let (accounts, _) = service();
        accounts.register(&new_user()).await.unwrap();

        let wrong = accounts
            .login(&Credentials {
                email: "grace@example.com".into(),
                password: "fortran".into(),
            })
            .await;
        assert!(matches!(wrong, Err(AccountError::WrongPassword(_))));

        let unknown = accounts
            .login(&Credentials {
                email: "nobody@example.com".into(),
                password: "x".into(),
            })
            .await;
        assert_eq!(
            ApiError::from(unknown.unwrap_err()),
            ApiError::bad_request("resource not found")
        );
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let (accounts, _) = service();
        accounts.register(&new_user()).await.unwrap();
        let err = accounts.register(&new_user()).await.unwrap_err();
        assert_eq!(ApiError::from(err), ApiError::bad_request("email not unique"));
    }
}
