//! Outbound transactional email.
//!
//! Handlers depend on the [`Mailer`] trait only. [`sendgrid::SendGridMailer`]
//! delivers through the SendGrid v3 API; [`LogMailer`] writes the message to
//! the log, for local runs.

pub mod sendgrid;

use async_trait::async_trait;
use tracing::info;

pub use sendgrid::SendGridMailer;

/// Email service errors
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Failed to send email: {0}")]
    SendError(String),

    #[error("Provider rejected email with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub from_name: String,
    pub from_address: String,
    pub to_name: String,
    pub to_address: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), EmailError>;
}

/// Local part of an address, used as the recipient's display name
pub fn extract_email_username(address: &str) -> &str {
    address.split_once('@').map_or(address, |(local, _)| local)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &Email) -> Result<(), EmailError> {
        info!(
            to = %email.to_address,
            subject = %email.subject,
            "email not delivered (log provider): {}",
            email.text
        );
        Ok(())
    }
}
