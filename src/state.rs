use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::repository::{NewsletterStore, SubscriptionStore, UserStore};
use crate::email::Mailer;
use crate::services::{AccountService, SubscriptionService};

/// Collaborators shared by every request; read-only after startup
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenService>,
    pub newsletters: Arc<dyn NewsletterStore>,
    pub accounts: Arc<AccountService>,
    pub subscriptions: Arc<SubscriptionService>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        newsletters: Arc<dyn NewsletterStore>,
        subscriptions: Arc<dyn SubscriptionStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(&config.server.secret_key));
        let accounts = Arc::new(AccountService::new(users, tokens.clone()));
        let subscriptions = Arc::new(SubscriptionService::new(
            newsletters.clone(),
            subscriptions,
            mailer,
            config.email.clone(),
        ));

        Self {
            config: Arc::new(config),
            tokens,
            newsletters,
            accounts,
            subscriptions,
        }
    }
}
