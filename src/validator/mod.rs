//! Declarative field constraints for decoded request payloads.
//!
//! Each payload lists its fields by wire (JSON) name together with an ordered
//! set of rules. Per field only the first violated rule is reported, and
//! errors come back in field declaration order.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern compiles")
});

static ALPHA_ZERO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z ]*$").expect("alpha_zero pattern compiles"));

/// A field value as seen by the rules
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(i64),
}

#[derive(Clone, Copy)]
pub enum Rule {
    /// Non-empty text, non-zero number
    Required,
    /// Character count for text, magnitude for numbers
    Max(usize),
    Email,
    /// ASCII letters and spaces only
    AlphaZero,
    /// Named predicate, reported with the generic template
    Custom(&'static str, fn(FieldValue<'_>) -> bool),
}

impl Rule {
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::Max(_) => "max",
            Rule::Email => "email",
            Rule::AlphaZero => "alpha_zero",
            Rule::Custom(name, _) => *name,
        }
    }

    fn accepts(&self, value: FieldValue<'_>) -> bool {
        match (self, value) {
            (Rule::Required, FieldValue::Text(s)) => !s.is_empty(),
            (Rule::Required, FieldValue::Number(n)) => n != 0,
            (Rule::Max(max), FieldValue::Text(s)) => s.chars().count() <= *max,
            (Rule::Max(max), FieldValue::Number(n)) => n.unsigned_abs() <= *max as u64,
            (Rule::Email, FieldValue::Text(s)) => EMAIL.is_match(s),
            (Rule::AlphaZero, FieldValue::Text(s)) => ALPHA_ZERO.is_match(s),
            (Rule::Email | Rule::AlphaZero, FieldValue::Number(_)) => false,
            (Rule::Custom(_, check), value) => check(value),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Max(max) => write!(f, "max={max}"),
            other => f.write_str(other.name()),
        }
    }
}

/// One violated rule on one field
#[derive(Debug, Clone)]
pub struct FieldError {
    pub field: &'static str,
    pub rule: Rule,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rule {
            Rule::Required => write!(f, "{} is a required field", self.field),
            Rule::Max(max) => write!(f, "{} must be a maximum of {} in length", self.field, max),
            Rule::Email => write!(f, "{} must be a valid Email", self.field),
            Rule::AlphaZero => write!(
                f,
                "{} can only contain alphabetic and space characters",
                self.field
            ),
            Rule::Custom(name, _) => write!(f, "something wrong on {}; {}", self.field, name),
        }
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), Vec<FieldError>>;
}

/// Collects violations field by field
#[derive(Debug, Default)]
pub struct Constraints {
    errors: Vec<FieldError>,
}

impl Constraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(self, field: &'static str, value: &str, rules: &[Rule]) -> Self {
        self.check(field, FieldValue::Text(value), rules)
    }

    pub fn number(self, field: &'static str, value: i64, rules: &[Rule]) -> Self {
        self.check(field, FieldValue::Number(value), rules)
    }

    fn check(mut self, field: &'static str, value: FieldValue<'_>, rules: &[Rule]) -> Self {
        if let Some(rule) = rules.iter().find(|rule| !rule.accepts(value)) {
            self.errors.push(FieldError { field, rule: *rule });
        }
        self
    }

    pub fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}
