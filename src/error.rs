//! Error types for the funnel.

/// Request-level failures surfaced by the step service.
///
/// Validation failures are not errors: they travel as data inside
/// [`crate::service::SubmitOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum FunnelError {
    #[error("Step not found: {slug}")]
    NotFound { slug: String },

    #[error("Bad payload: {0}")]
    BadPayload(String),

    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Rule configuration defects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("Unsupported rule '{rule}' on field {field}")]
    Unsupported { rule: String, field: String },

    #[error("Invalid argument for rule '{rule}': {reason}")]
    InvalidArgument { rule: String, reason: String },

    #[error("Empty rule token")]
    EmptyToken,
}

impl RuleError {
    /// Attach the field name to an unsupported-rule error raised without one.
    pub fn on_field(self, field: &str) -> Self {
        match self {
            Self::Unsupported { rule, field: f } if f.is_empty() => Self::Unsupported {
                rule,
                field: field.to_string(),
            },
            other => other,
        }
    }
}

/// Step store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store backend unavailable: {0}")]
    Unavailable(String),
}

/// Catalog (step registry) construction and loading errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog has no steps")]
    Empty,

    #[error("Duplicate step slug: {0}")]
    DuplicateSlug(String),

    #[error("Step ordinals must run 1..={expected_max} without gaps, found {found} at position {position}")]
    OrdinalGap {
        expected_max: usize,
        position: usize,
        found: u32,
    },

    #[error("Duplicate field {field} in step {slug}")]
    DuplicateField { slug: String, field: String },

    #[error("Validation rules for unknown field {field} in step {slug}")]
    UnknownRuleField { slug: String, field: String },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

pub type Result<T> = std::result::Result<T, FunnelError>;
