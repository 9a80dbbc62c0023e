use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::validator::{Constraints, FieldError, Rule, Validate};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub created_at: DateTime<Utc>,
}

/// Registration body
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewUser {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
}

impl Validate for NewUser {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Constraints::new()
            .text("firstname", &self.firstname, &[Rule::AlphaZero, Rule::Max(255)])
            .text("lastname", &self.lastname, &[Rule::AlphaZero, Rule::Max(255)])
            .text("email", &self.email, &[Rule::Required, Rule::Email, Rule::Max(255)])
            .text("password", &self.password, &[Rule::Required, Rule::Max(255)])
            .finish()
    }
}

/// Login body
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Validate for Credentials {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Constraints::new()
            .text("email", &self.email, &[Rule::Required, Rule::Email, Rule::Max(255)])
            .text("password", &self.password, &[Rule::Required, Rule::Max(255)])
            .finish()
    }
}
