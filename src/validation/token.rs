//! Rule token grammar: `name` or `name:arg1,arg2,...`.

use crate::error::RuleError;

/// A parsed rule token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleToken {
    pub name: String,
    pub args: Vec<String>,
}

impl RuleToken {
    pub fn parse(raw: &str) -> Result<Self, RuleError> {
        let (name, args) = match raw.split_once(':') {
            Some((name, rest)) => (
                name.trim(),
                rest.split(',')
                    .map(|a| a.trim().to_string())
                    .filter(|a| !a.is_empty())
                    .collect(),
            ),
            None => (raw.trim(), Vec::new()),
        };
        if name.is_empty() {
            return Err(RuleError::EmptyToken);
        }
        Ok(Self {
            name: name.to_string(),
            args,
        })
    }

    /// The single argument of the rule, or an `InvalidArgument` error.
    pub fn single_arg(&self) -> Result<&str, RuleError> {
        match self.args.as_slice() {
            [arg] => Ok(arg),
            _ => Err(RuleError::InvalidArgument {
                rule: self.name.clone(),
                reason: format!("expected exactly one argument, got {}", self.args.len()),
            }),
        }
    }
}

impl std::fmt::Display for RuleToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}:{}", self.name, self.args.join(","))
        }
    }
}
