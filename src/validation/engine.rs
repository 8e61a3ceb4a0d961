//! Validator: dispatch table from rule name to handler.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::RuleError;
use crate::registry::{StepDefinition, StepRegistry};
use crate::store::FieldData;

use super::rules::{self, RuleHandler};
use super::token::RuleToken;
use super::{FieldError, FieldErrors, RuleContext};

/// Interprets rule tokens through registered handlers.
///
/// Unknown rule names fail closed with [`RuleError::Unsupported`].
pub struct Validator {
    rules: HashMap<String, Arc<dyn RuleHandler>>,
}

impl Validator {
    /// A validator with no rules.
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// A validator with `required`, `min`, `minAge`, `fileType`, `maxSize`
    /// and `complete` registered.
    pub fn with_builtin_rules() -> Self {
        let mut validator = Self::empty();
        validator.register(Arc::new(rules::Required));
        validator.register(Arc::new(rules::Complete));
        validator.register(Arc::new(rules::MinLength));
        validator.register(Arc::new(rules::MinAge));
        validator.register(Arc::new(rules::FileType));
        validator.register(Arc::new(rules::MaxSize));
        validator
    }

    /// Register a rule handler, replacing any handler with the same name.
    pub fn register(&mut self, handler: Arc<dyn RuleHandler>) {
        let name = handler.name().to_string();
        if self.rules.insert(name.clone(), handler).is_some() {
            warn!(rule = %name, "Replaced existing rule handler");
        } else {
            debug!(rule = %name, "Registered rule handler");
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Registered rule names, sorted.
    pub fn rule_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rules.keys().cloned().collect();
        names.sort();
        names
    }

    fn handler(&self, token: &RuleToken) -> Result<&Arc<dyn RuleHandler>, RuleError> {
        self.rules
            .get(&token.name)
            .ok_or_else(|| RuleError::Unsupported {
                rule: token.name.clone(),
                field: String::new(),
            })
    }

    /// Check a value against rule tokens in declaration order.
    ///
    /// Every rule runs; all failures are returned. A rule the validator cannot
    /// interpret aborts with an error instead.
    pub fn validate(
        &self,
        value: &Value,
        tokens: &[String],
        ctx: &RuleContext,
    ) -> Result<Vec<FieldError>, RuleError> {
        let mut errors = Vec::new();
        for raw in tokens {
            let token = RuleToken::parse(raw)?;
            let handler = self.handler(&token)?;
            if let Some(message) = handler.evaluate(value, &token, ctx)? {
                errors.push(FieldError {
                    rule: token.name,
                    message,
                });
            }
        }
        Ok(errors)
    }

    /// Validate every field of a step that declares rules.
    pub fn validate_step(
        &self,
        step: &StepDefinition,
        data: &FieldData,
        ctx: &RuleContext,
    ) -> Result<FieldErrors, RuleError> {
        let mut errors = FieldErrors::new();
        for field in &step.fields {
            let tokens = step.rules_for(&field.name);
            if tokens.is_empty() {
                continue;
            }
            let value = data.get(&field.name).unwrap_or(&Value::Null);
            let field_errors = self
                .validate(value, tokens, ctx)
                .map_err(|e| e.on_field(&field.name))?;
            if !field_errors.is_empty() {
                errors.insert(field.name.clone(), field_errors);
            }
        }
        Ok(errors)
    }

    /// Check every token of a catalog against the registered handlers.
    pub fn audit(&self, registry: &StepRegistry) -> Result<(), RuleError> {
        for step in registry.ordered() {
            for (field, tokens) in &step.validation {
                for raw in tokens {
                    let token = RuleToken::parse(raw)?;
                    self.handler(&token)
                        .map_err(|e| e.on_field(&format!("{}.{}", step.slug, field)))?
                        .check_args(&token)?;
                }
            }
        }
        Ok(())
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::with_builtin_rules()
    }
}
