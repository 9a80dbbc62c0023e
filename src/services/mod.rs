pub mod account_service;
pub mod subscription_service;

pub use account_service::{AccountError, AccountService};
pub use subscription_service::{SubscriptionError, SubscriptionService};
