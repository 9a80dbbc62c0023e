use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error};

use super::{Email, EmailError, Mailer};

const SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

pub struct SendGridMailer {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl SendGridMailer {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            endpoint: SEND_URL.to_string(),
        }
    }

    /// Point at another endpoint, e.g. a local mock
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn body(email: &Email) -> Value {
        json!({
            "personalizations": [{
                "to": [{ "email": email.to_address, "name": email.to_name }]
            }],
            "from": { "email": email.from_address, "name": email.from_name },
            "subject": email.subject,
            "content": [
                { "type": "text/plain", "value": email.text },
                { "type": "text/html", "value": email.html }
            ]
        })
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, email: &Email) -> Result<(), EmailError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&Self::body(email))
            .send()
            .await
            .map_err(|e| EmailError::SendError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("SendGrid rejected email to {}: {} {}", email.to_address, status, body);
            return Err(EmailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!("SendGrid accepted email to {}", email.to_address);
        Ok(())
    }
}
