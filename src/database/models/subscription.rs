use serde::{de, Deserialize, Deserializer, Serialize};

use crate::validator::{Constraints, FieldError, Rule, Validate};

/// Document stored under a generated key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub email: String,
    pub newsletter_id: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SubscriptionRequest {
    pub email: String,
    #[serde(deserialize_with = "number_or_string")]
    pub newsletter_id: i64,
}

impl SubscriptionRequest {
    /// The record to push once validation has passed
    pub fn to_subscription(&self) -> Option<Subscription> {
        Some(Subscription {
            email: self.email.clone(),
            newsletter_id: i32::try_from(self.newsletter_id).ok()?,
        })
    }
}

impl Validate for SubscriptionRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Constraints::new()
            .text("email", &self.email, &[Rule::Required, Rule::Email])
            .number("newsletter_id", self.newsletter_id, &[Rule::Required])
            .finish()
    }
}

/// Accepts `7` as well as `"7"`
fn number_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(de::Error::custom),
    }
}
