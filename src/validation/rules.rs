//! Built-in rule handlers.
//!
//! Apart from `required` and `complete`, rules skip absent (null) values so
//! that an empty optional field does not collect unrelated errors.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate};
use regex::Regex;
use serde_json::Value;

use crate::error::RuleError;
use crate::values;

use super::RuleContext;
use super::token::RuleToken;

/// Outcome of one rule: `None` on pass, the error message on failure.
pub type RuleOutcome = Result<Option<String>, RuleError>;

/// A named validation predicate.
pub trait RuleHandler: Send + Sync {
    /// Rule name as written in tokens (`min`, `fileType`, ...).
    fn name(&self) -> &str;

    /// Check the token's arguments without a value. Used to audit catalogs.
    fn check_args(&self, _token: &RuleToken) -> Result<(), RuleError> {
        Ok(())
    }

    fn evaluate(&self, value: &Value, token: &RuleToken, ctx: &RuleContext) -> RuleOutcome;
}

fn parse_count(token: &RuleToken) -> Result<usize, RuleError> {
    let arg = token.single_arg()?;
    arg.parse().map_err(|_| RuleError::InvalidArgument {
        rule: token.name.clone(),
        reason: format!("'{arg}' is not a non-negative integer"),
    })
}

// ── required / complete ─────────────────────────────────────────────

pub struct Required;

impl RuleHandler for Required {
    fn name(&self) -> &str {
        "required"
    }

    fn evaluate(&self, value: &Value, _token: &RuleToken, _ctx: &RuleContext) -> RuleOutcome {
        Ok(values::is_blank(value).then(|| "This field is required".to_string()))
    }
}

/// `required`, and structured values must have every member filled.
pub struct Complete;

impl RuleHandler for Complete {
    fn name(&self) -> &str {
        "complete"
    }

    fn evaluate(&self, value: &Value, _token: &RuleToken, _ctx: &RuleContext) -> RuleOutcome {
        let incomplete = match value {
            Value::Object(map) => map.is_empty() || map.values().any(values::is_blank),
            other => values::is_blank(other),
        };
        Ok(incomplete.then(|| "This field must be completed".to_string()))
    }
}

// ── min ─────────────────────────────────────────────────────────────

/// Minimum length: characters for strings, items for arrays.
pub struct MinLength;

impl RuleHandler for MinLength {
    fn name(&self) -> &str {
        "min"
    }

    fn check_args(&self, token: &RuleToken) -> Result<(), RuleError> {
        parse_count(token).map(|_| ())
    }

    fn evaluate(&self, value: &Value, token: &RuleToken, _ctx: &RuleContext) -> RuleOutcome {
        let min = parse_count(token)?;
        let len = match value {
            Value::Null => return Ok(None),
            Value::String(s) => s.chars().count(),
            Value::Array(items) => items.len(),
            Value::Number(n) => n.to_string().chars().count(),
            _ => 0,
        };
        Ok((len < min).then(|| format!("Must be at least {min} characters")))
    }
}

// ── minAge ──────────────────────────────────────────────────────────

/// Parse `YYYY-MM-DD`, or take the date part of an RFC 3339 timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Age in whole years on `today`.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years
}

pub struct MinAge;

impl RuleHandler for MinAge {
    fn name(&self) -> &str {
        "minAge"
    }

    fn check_args(&self, token: &RuleToken) -> Result<(), RuleError> {
        parse_count(token).map(|_| ())
    }

    fn evaluate(&self, value: &Value, token: &RuleToken, ctx: &RuleContext) -> RuleOutcome {
        let min = parse_count(token)?;
        if values::is_blank(value) {
            return Ok(None);
        }
        let Some(birth) = value.as_str().and_then(parse_date) else {
            return Ok(Some("Must be a valid date (YYYY-MM-DD)".to_string()));
        };
        let age = age_on(birth, ctx.today);
        let too_young = age < 0 || (age as usize) < min;
        Ok(too_young.then(|| format!("You must be at least {min} years old")))
    }
}

// ── fileType ────────────────────────────────────────────────────────

pub struct FileType;

impl RuleHandler for FileType {
    fn name(&self) -> &str {
        "fileType"
    }

    fn check_args(&self, token: &RuleToken) -> Result<(), RuleError> {
        if token.args.is_empty() {
            return Err(RuleError::InvalidArgument {
                rule: token.name.clone(),
                reason: "at least one extension is required".to_string(),
            });
        }
        Ok(())
    }

    fn evaluate(&self, value: &Value, token: &RuleToken, _ctx: &RuleContext) -> RuleOutcome {
        self.check_args(token)?;
        if values::is_blank(value) {
            return Ok(None);
        }
        let extension = values::file_name(value)
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());
        let allowed = extension.is_some_and(|ext| {
            token
                .args
                .iter()
                .any(|a| a.trim_start_matches('.').eq_ignore_ascii_case(&ext))
        });
        Ok((!allowed).then(|| format!("File type must be one of: {}", token.args.join(", "))))
    }
}

// ── maxSize ─────────────────────────────────────────────────────────

static SIZE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d+(?:\.\d+)?)\s*(b|kb|mb|gb)?\s*$").expect("size pattern compiles")
});

/// Parse a size such as `2MB`, `512kb` or `100` (bytes). Units are 1024-based.
pub fn parse_size(raw: &str) -> Option<u64> {
    let caps = SIZE_PATTERN.captures(raw)?;
    let amount: f64 = caps.get(1)?.as_str().parse().ok()?;
    let multiplier = match caps
        .get(2)
        .map(|m| m.as_str().to_ascii_lowercase())
        .as_deref()
    {
        None | Some("b") => 1u64,
        Some("kb") => 1024,
        Some("mb") => 1024 * 1024,
        Some("gb") => 1024 * 1024 * 1024,
        Some(_) => return None,
    };
    Some((amount * multiplier as f64).round() as u64)
}

pub struct MaxSize;

impl MaxSize {
    fn limit(token: &RuleToken) -> Result<u64, RuleError> {
        let arg = token.single_arg()?;
        parse_size(arg).ok_or_else(|| RuleError::InvalidArgument {
            rule: token.name.clone(),
            reason: format!("'{arg}' is not a size like 2MB"),
        })
    }
}

impl RuleHandler for MaxSize {
    fn name(&self) -> &str {
        "maxSize"
    }

    fn check_args(&self, token: &RuleToken) -> Result<(), RuleError> {
        Self::limit(token).map(|_| ())
    }

    fn evaluate(&self, value: &Value, token: &RuleToken, _ctx: &RuleContext) -> RuleOutcome {
        let limit = Self::limit(token)?;
        let size = match values::file_size(value) {
            None => return Ok(None),
            Some(None) => {
                return Ok(Some("File size must be a non-negative number".to_string()));
            }
            Some(Some(size)) => size,
        };
        let too_large = size > limit as f64;
        Ok(too_large.then(|| format!("File must not exceed {}", token.args.join(""))))
    }
}
