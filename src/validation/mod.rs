//! Validation engine: interprets declarative rule tokens.
//!
//! Tokens like `required`, `min:2` or `fileType:jpg,png` are parsed into a
//! [`RuleToken`] and dispatched by name to a registered [`RuleHandler`]. New
//! rules are added with [`Validator::register`]; callers never change.

pub mod engine;
pub mod rules;
pub mod token;

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use engine::Validator;
pub use rules::RuleHandler;
pub use token::RuleToken;

/// One failed rule on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub rule: String,
    pub message: String,
}

/// Field name → failures, only for fields that failed.
pub type FieldErrors = BTreeMap<String, Vec<FieldError>>;

/// Evaluation-time inputs shared by all rules.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext {
    /// Reference date for age computations.
    pub today: NaiveDate,
}

impl RuleContext {
    pub fn now() -> Self {
        Self {
            today: Utc::now().date_naive(),
        }
    }

    pub fn on(today: NaiveDate) -> Self {
        Self { today }
    }
}
