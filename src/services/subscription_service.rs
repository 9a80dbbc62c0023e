use std::sync::Arc;

use tracing::{error, info};

use crate::config::EmailConfig;
use crate::database::manager::DatabaseError;
use crate::database::models::SubscriptionRequest;
use crate::database::repository::{NewsletterStore, SubscriptionStore};
use crate::email::{extract_email_username, Email, EmailError, Mailer};
use crate::error::{messages, ApiError};

const CONFIRMATION_SUBJECT: &str = "Subscribed to newsletter!";

#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    #[error("Newsletter not found: {0}")]
    NewsletterNotFound(i64),
    #[error("Subscription not found: {0}")]
    NotFound(String),
    #[error("Database error during {action}: {source}")]
    Database {
        action: Action,
        #[source]
        source: DatabaseError,
    },
    #[error("Confirmation email failed: {0}")]
    Email(#[from] EmailError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Read,
    Delete,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Delete => "delete",
        })
    }
}

fn db(action: Action) -> impl FnOnce(DatabaseError) -> SubscriptionError {
    move |source| SubscriptionError::Database { action, source }
}

impl From<SubscriptionError> for ApiError {
    fn from(err: SubscriptionError) -> Self {
        error!("{}", err);
        match err {
            SubscriptionError::NewsletterNotFound(_) | SubscriptionError::NotFound(_) => {
                ApiError::not_found(messages::RESOURCE_NOT_FOUND)
            }
            SubscriptionError::Database { action, .. } => {
                ApiError::internal_server_error(match action {
                    Action::Create => messages::DATA_CREATION_FAILURE,
                    Action::Read => messages::DATA_ACCESS_FAILURE,
                    Action::Delete => messages::DATA_DELETION_FAILURE,
                })
            }
            SubscriptionError::Email(_) => {
                ApiError::internal_server_error(messages::SENDING_EMAIL_FAILURE)
            }
        }
    }
}

/// Public subscribe/unsubscribe flow across both stores and the mailer
pub struct SubscriptionService {
    newsletters: Arc<dyn NewsletterStore>,
    subscriptions: Arc<dyn SubscriptionStore>,
    mailer: Arc<dyn Mailer>,
    sender: EmailConfig,
}

impl SubscriptionService {
    pub fn new(
        newsletters: Arc<dyn NewsletterStore>,
        subscriptions: Arc<dyn SubscriptionStore>,
        mailer: Arc<dyn Mailer>,
        sender: EmailConfig,
    ) -> Self {
        Self {
            newsletters,
            subscriptions,
            mailer,
            sender,
        }
    }

    /// Store the subscription and mail a confirmation carrying the
    /// unsubscribe link `<api_root>/subscriptions?id=<key>`. Returns the key.
    ///
    /// A failed email leaves the stored subscription in place.
    pub async fn subscribe(
        &self,
        request: &SubscriptionRequest,
        api_root: &str,
    ) -> Result<String, SubscriptionError> {
        let missing = || SubscriptionError::NewsletterNotFound(request.newsletter_id);

        let subscription = request.to_subscription().ok_or_else(missing)?;
        let exists = self
            .newsletters
            .exists(subscription.newsletter_id)
            .await
            .map_err(db(Action::Read))?;
        if !exists {
            return Err(missing());
        }

        let key = self
            .subscriptions
            .push(&subscription)
            .await
            .map_err(db(Action::Create))?;

        let unsubscribe_url = format!("{api_root}/subscriptions?id={key}");
        let email = Email {
            from_name: self.sender.send_from_name.clone(),
            from_address: self.sender.send_from_address.clone(),
            to_name: extract_email_username(&subscription.email).to_string(),
            to_address: subscription.email.clone(),
            subject: CONFIRMATION_SUBJECT.to_string(),
            text: format!("{CONFIRMATION_SUBJECT} To unsubscribe visit {unsubscribe_url}"),
            html: format!(
                "Subscribed! link to unsubscribe: <a href='{unsubscribe_url}'>unsubscribe</a>"
            ),
        };
        self.mailer.send(&email).await?;

        info!(
            "{} subscribed to newsletter {} as {}",
            subscription.email, subscription.newsletter_id, key
        );
        Ok(key)
    }

    /// Delete exactly the subscription stored under `key`
    pub async fn unsubscribe(&self, key: &str) -> Result<(), SubscriptionError> {
        if key.is_empty() {
            return Err(SubscriptionError::NotFound(String::new()));
        }

        self.subscriptions
            .get(key)
            .await
            .map_err(db(Action::Read))?
            .ok_or_else(|| SubscriptionError::NotFound(key.to_string()))?;

        self.subscriptions
            .delete(key)
            .await
            .map_err(db(Action::Delete))?;

        info!("Subscription {} removed", key);
        Ok(())
    }
}
