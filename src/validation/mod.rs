//! Parameter validation
//!
//! A small rules-interpreter that checks an input mapping against an
//! endpoint schema before any network call is made. Evaluation runs in
//! a fixed order and stops at the first violated rule; the only
//! mutation performed is injecting defaults for required fields the
//! caller left out.

use regex::Regex;
use serde_json::Value;

use crate::schema::registry::{CUMULATIVE_ENERGY_FIELD, CUMULATIVE_FLAG};
use crate::schema::{kind_name, scalar_text, EndpointSchema, ParamMap};

/// Account capability flags relevant to validation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationContext {
    /// Whether the account has donation status (unlocks extended fields)
    pub donation_made: bool,
}

impl ValidationContext {
    pub fn new(donation_made: bool) -> Self {
        Self { donation_made }
    }
}

/// Error type for validation failures
///
/// Always surfaced synchronously, before any transport call; never
/// transient and never retried.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("one of {0} must be set")]
    MutualExclusion(String),
    #[error("key {0} required in data")]
    MissingRequiredField(String),
    #[error("key {0} isn't valid in the API spec")]
    UnknownField(String),
    #[error("data[{key}] type ({actual}) is invalid - should be {expected}")]
    TypeMismatch {
        key: String,
        actual: String,
        expected: String,
    },
    #[error("key '{key}', with value '{value}' does not match '{pattern}'")]
    FormatMismatch {
        key: String,
        value: String,
        pattern: String,
    },
    #[error("error for key '{key}' with format '{pattern}': {message}")]
    InvalidFormatPattern {
        key: String,
        pattern: String,
        message: String,
    },
    #[error("value too long for key {key}: {len} > {maxlen}")]
    LengthExceeded {
        key: String,
        len: usize,
        maxlen: usize,
    },
    #[error("invalid value for key {key}: '{value}', should be one of {choices}")]
    ChoiceViolation {
        key: String,
        value: String,
        choices: String,
    },
    #[error("{key} cannot be {relation} {limit}, is {value}")]
    BoundViolation {
        key: String,
        relation: &'static str,
        limit: f64,
        value: f64,
    },
    #[error("key {0} requires an account which has donated")]
    DonationRequired(String),
}

/// Validate an input mapping against an endpoint schema.
///
/// Checks run in a fixed order and the first violated rule wins:
/// mutual exclusion, requiredness (with default injection), length and
/// choice limits, closed-world and type checks, format regexes,
/// donation gating, then numeric bounds. Required fields with a
/// defined default are injected into `data` as a side effect; a second
/// call on the already-defaulted mapping is a no-op.
pub fn validate(
    data: &mut ParamMap,
    schema: &EndpointSchema,
    context: &ValidationContext,
) -> Result<(), ValidationError> {
    // 1. at least one of the required_oneof keys must be set
    if let Some(keys) = &schema.required_oneof {
        if !keys.iter().any(|key| data.contains_key(key)) {
            return Err(ValidationError::MutualExclusion(keys.join(",")));
        }
    }

    // 2. required fields: inject a default or fail
    for (name, rule) in &schema.fields {
        if rule.required && !data.contains_key(name) {
            match &rule.default {
                Some(default) => {
                    data.insert(name.clone(), default.resolve());
                }
                None => return Err(ValidationError::MissingRequiredField(name.clone())),
            }
        }
    }

    // 3. length and choice limits, for fields that are present
    for (name, rule) in &schema.fields {
        let Some(value) = data.get(name) else {
            continue;
        };
        if let Some(maxlen) = rule.maxlen {
            if let Some(len) = value_len(value) {
                if len > maxlen {
                    return Err(ValidationError::LengthExceeded {
                        key: name.clone(),
                        len,
                        maxlen,
                    });
                }
            }
        }
        if let Some(choices) = &rule.choices {
            if !choices.contains(value) {
                return Err(ValidationError::ChoiceViolation {
                    key: name.clone(),
                    value: value.to_string(),
                    choices: choices
                        .iter()
                        .map(Value::to_string)
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
        }
    }

    // 4. closed world: every input key must be in the schema, with the
    // declared type (null is an absence marker and skips the check)
    for (key, value) in data.iter() {
        let Some(rule) = schema.rule(key) else {
            return Err(ValidationError::UnknownField(key.clone()));
        };
        if let Some(kind) = rule.kind {
            if !value.is_null() && !kind.matches(value) {
                return Err(ValidationError::TypeMismatch {
                    key: key.clone(),
                    actual: kind_name(value).to_string(),
                    expected: kind.name().to_string(),
                });
            }
        }
    }

    // 5. format regexes
    for (key, value) in data.iter() {
        let Some(rule) = schema.rule(key) else {
            continue;
        };
        if let Some(pattern) = &rule.format {
            let regex = Regex::new(pattern).map_err(|e| ValidationError::InvalidFormatPattern {
                key: key.clone(),
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
            if let Some(text) = scalar_text(value) {
                if !regex.is_match(&text) {
                    return Err(ValidationError::FormatMismatch {
                        key: key.clone(),
                        value: text,
                        pattern: pattern.clone(),
                    });
                }
            }
        }
    }

    // 6. donation-gated fields
    if !context.donation_made {
        for key in data.keys() {
            if schema.rule(key).is_some_and(|rule| rule.donation_required) {
                return Err(ValidationError::DonationRequired(key.clone()));
            }
        }
    }

    // 7. numeric bounds; a valid cumulative flag lifts the upper bound
    // on the lifetime energy field, and only on that one
    let override_active = cumulative_override_active(data);
    for (key, value) in data.iter() {
        let Some(rule) = schema.rule(key) else {
            continue;
        };
        if rule.minval.is_none() && rule.maxval.is_none() {
            continue;
        }
        if value.is_null() {
            continue;
        }
        // a bounded field must hold a number; anything else cannot be
        // compared against the limit and must not reach the wire
        let Some(number) = value.as_f64() else {
            return Err(ValidationError::TypeMismatch {
                key: key.clone(),
                actual: kind_name(value).to_string(),
                expected: "number".to_string(),
            });
        };
        if let Some(maxval) = rule.maxval {
            let overridden = override_active && key == CUMULATIVE_ENERGY_FIELD;
            if !overridden && number > maxval {
                return Err(ValidationError::BoundViolation {
                    key: key.clone(),
                    relation: "higher than",
                    limit: maxval,
                    value: number,
                });
            }
        }
        if let Some(minval) = rule.minval {
            if number < minval {
                return Err(ValidationError::BoundViolation {
                    key: key.clone(),
                    relation: "lower than",
                    limit: minval,
                    value: number,
                });
            }
        }
    }

    Ok(())
}

/// Whether the cumulative flag is present with one of its three valid values
fn cumulative_override_active(data: &ParamMap) -> bool {
    data.get(CUMULATIVE_FLAG)
        .and_then(Value::as_i64)
        .is_some_and(|flag| (1..=3).contains(&flag))
}

/// Length of a value for maxlen checks; non-sized values are skipped
fn value_len(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        Value::Object(map) => Some(map.len()),
        _ => None,
    }
}
