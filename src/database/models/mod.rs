pub mod newsletter;
pub mod subscription;
pub mod user;

pub use newsletter::{Newsletter, NewsletterDraft};
pub use subscription::{Subscription, SubscriptionRequest};
pub use user::{Credentials, NewUser, User};
