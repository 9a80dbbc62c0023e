use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::validator::{Constraints, FieldError, Rule, Validate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Newsletter {
    pub id: i32,
    pub editor_id: i32,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Create/update body; the owner always comes from the token
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewsletterDraft {
    pub name: String,
    pub description: String,
}

impl Validate for NewsletterDraft {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Constraints::new()
            .text("name", &self.name, &[Rule::Required, Rule::Max(255)])
            .text("description", &self.description, &[])
            .finish()
    }
}
