//! # Field Validation
//!
//! Every record is validated as a whole before any storage call. Validation
//! never stops at the first problem: a [`Validator`] walks every field, collects
//! every broken rule, and only then reports. A record either satisfies its whole
//! contract or nothing is written.
//!
//! ## Rules
//!
//! Field constraints are expressed with a small set of named [`Rule`]s that are
//! shared across schemas:
//!
//! | Rule | Applies to | Example |
//! |------|------------|---------|
//! | `Length` | text | name between 1 and 100 characters |
//! | `Range` | numbers | session timeout 30..=300, amount > 0 |
//! | `OneOf` | text | status in {active, completed, scheduled} |
//! | `MinItems` | lists | at least one menu option |
//! | `Pattern` | text | USSD code, shortcode, OTP, phone, currency, email |
//!
//! Lengths count characters (Unicode scalar values), not bytes.

pub mod patterns;

use serde::Serialize;
use std::fmt;

pub use patterns::Pattern;

/// A single broken field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every violation found in one record, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<Violation>);

impl ValidationErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![Violation::new(field, message)])
    }

    pub fn violations(&self) -> &[Violation] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Names of the offending fields, deduplicated, in the order they were found.
    pub fn fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for violation in &self.0 {
            if !fields.contains(&violation.field.as_str()) {
                fields.push(&violation.field);
            }
        }
        fields
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|v| v.to_string()).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl FromIterator<Violation> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One end of a numeric range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Limit {
    Unbounded,
    Inclusive(f64),
    Exclusive(f64),
}

/// A named, reusable field constraint.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// Character count within `min..=max`.
    Length { min: usize, max: usize },
    /// Numeric value between two limits.
    Range { low: Limit, high: Limit },
    /// Value must be one of a closed set of strings.
    OneOf(&'static [&'static str]),
    /// List must contain at least this many items.
    MinItems(usize),
    /// Value must match a structural pattern.
    Pattern(&'static Pattern),
}

impl Rule {
    pub const fn max_len(max: usize) -> Self {
        Rule::Length { min: 0, max }
    }

    pub const fn min_len(min: usize) -> Self {
        Rule::Length {
            min,
            max: usize::MAX,
        }
    }

    pub const fn between(low: f64, high: f64) -> Self {
        Rule::Range {
            low: Limit::Inclusive(low),
            high: Limit::Inclusive(high),
        }
    }

    pub const fn greater_than(low: f64) -> Self {
        Rule::Range {
            low: Limit::Exclusive(low),
            high: Limit::Unbounded,
        }
    }

    fn check_text(&self, value: &str) -> Option<String> {
        match self {
            Rule::Length { min, max } => {
                let count = value.chars().count();
                if count < *min {
                    Some(format!("must have at least {} characters", min))
                } else if count > *max {
                    Some(format!("must have at most {} characters", max))
                } else {
                    None
                }
            }
            Rule::OneOf(allowed) => (!allowed.contains(&value))
                .then(|| format!("must be one of: {}", allowed.join(", "))),
            Rule::Pattern(pattern) => {
                (!pattern.is_match(value)).then(|| format!("must be {}", pattern.expected))
            }
            Rule::Range { .. } | Rule::MinItems(_) => {
                Some("rule does not apply to text values".to_string())
            }
        }
    }

    fn check_number(&self, value: f64) -> Option<String> {
        match self {
            Rule::Range { low, high } => {
                if !value.is_finite() {
                    return Some("must be a finite number".to_string());
                }
                let low_msg = match *low {
                    Limit::Inclusive(min) if value < min => {
                        Some(format!("must be greater than or equal to {}", min))
                    }
                    Limit::Exclusive(min) if value <= min => {
                        Some(format!("must be greater than {}", min))
                    }
                    _ => None,
                };
                low_msg.or_else(|| match *high {
                    Limit::Inclusive(max) if value > max => {
                        Some(format!("must be less than or equal to {}", max))
                    }
                    Limit::Exclusive(max) if value >= max => {
                        Some(format!("must be less than {}", max))
                    }
                    _ => None,
                })
            }
            _ => Some("rule does not apply to numeric values".to_string()),
        }
    }

    fn check_items(&self, count: usize) -> Option<String> {
        match self {
            Rule::MinItems(min) => (count < *min).then(|| {
                if *min == 1 {
                    "must contain at least 1 item".to_string()
                } else {
                    format!("must contain at least {} items", min)
                }
            }),
            _ => Some("rule does not apply to lists".to_string()),
        }
    }
}

/// Collects violations across all fields of a record.
///
/// ```
/// use smsdbapp::validation::{Rule, Validator};
///
/// let mut v = Validator::new();
/// v.text("nm", "", &[Rule::Length { min: 1, max: 100 }]);
/// v.number("session_timeout", 10.0, &[Rule::between(30.0, 300.0)]);
/// let errors = v.finish().unwrap_err();
/// assert_eq!(errors.fields(), vec!["nm", "session_timeout"]);
/// ```
#[derive(Debug, Default)]
pub struct Validator {
    violations: Vec<Violation>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&mut self, field: &str, value: &str, rules: &[Rule]) -> &mut Self {
        for rule in rules {
            if let Some(message) = rule.check_text(value) {
                self.violation(field, message);
            }
        }
        self
    }

    /// Optional text is only checked when present.
    pub fn optional_text(&mut self, field: &str, value: Option<&str>, rules: &[Rule]) -> &mut Self {
        if let Some(value) = value {
            self.text(field, value, rules);
        }
        self
    }

    pub fn number(&mut self, field: &str, value: f64, rules: &[Rule]) -> &mut Self {
        for rule in rules {
            if let Some(message) = rule.check_number(value) {
                self.violation(field, message);
            }
        }
        self
    }

    pub fn items<T>(&mut self, field: &str, items: &[T], rules: &[Rule]) -> &mut Self {
        for rule in rules {
            if let Some(message) = rule.check_items(items.len()) {
                self.violation(field, message);
            }
        }
        self
    }

    pub fn violation(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.violations.push(Violation::new(field, message));
        self
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.violations))
        }
    }
}
