//! Endpoint schema types
//!
//! Declarative rule-sets describing what each API endpoint accepts:
//! - FieldRule: requiredness, type tag, format regex, length/bound limits,
//!   enumerated choices, donation gating, computed defaults
//! - EndpointSchema: field rules plus schema-level constraints
//!
//! The full catalogue of schemas lives in [`registry`]; the rule
//! interpreter that evaluates them lives in [`crate::validation`].

pub mod registry;

use std::collections::BTreeMap;

use serde_json::Value;

/// Input mapping handed to the validator and the transport.
///
/// A BTreeMap keeps iteration order stable, so the first violation
/// reported for a given input is always the same one.
pub type ParamMap = BTreeMap<String, Value>;

/// Primitive type tag for a field value.
///
/// `Object` exists only for the call envelope schema, which checks the
/// shape of the transport call itself (data/params/headers).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Integer,
    Float,
    Object,
}

impl ValueKind {
    /// Human-readable name used in type error messages
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Object => "object",
        }
    }

    /// Check whether a JSON value matches this tag
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ValueKind::String => value.is_string(),
            ValueKind::Integer => value.is_i64() || value.is_u64(),
            ValueKind::Float => value.is_f64(),
            ValueKind::Object => value.is_object(),
        }
    }
}

/// Name the actual type of a JSON value for error messages
pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Render a scalar value as text for format checks.
///
/// Null, arrays and objects have no textual form and are skipped by
/// the format check.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Default value for a required field that the caller left out.
///
/// Computed defaults are evaluated at validation time, not at schema
/// construction time, so date/time defaults reflect "now".
#[derive(Debug, Clone)]
pub enum FieldDefault {
    Value(Value),
    Computed(fn() -> Value),
}

impl FieldDefault {
    pub fn resolve(&self) -> Value {
        match self {
            FieldDefault::Value(value) => value.clone(),
            FieldDefault::Computed(producer) => producer(),
        }
    }
}

/// Validation rules for one accepted field
#[derive(Debug, Clone, Default)]
pub struct FieldRule {
    /// Whether the field must be present (or defaultable)
    pub required: bool,
    /// Optional primitive type tag
    pub kind: Option<ValueKind>,
    /// Optional anchored regex the textual value must match
    pub format: Option<String>,
    /// Optional maximum length for textual values
    pub maxlen: Option<usize>,
    /// Optional closed set of allowed values
    pub choices: Option<Vec<Value>>,
    /// Optional numeric lower bound, checked only when present
    pub minval: Option<f64>,
    /// Optional numeric upper bound, checked only when present
    pub maxval: Option<f64>,
    /// Whether the field needs a donation-enabled account
    pub donation_required: bool,
    /// Optional default injected when the field is required but absent
    pub default: Option<FieldDefault>,
}

impl FieldRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn kind(mut self, kind: ValueKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn format(mut self, pattern: &str) -> Self {
        self.format = Some(pattern.to_string());
        self
    }

    pub fn maxlen(mut self, maxlen: usize) -> Self {
        self.maxlen = Some(maxlen);
        self
    }

    pub fn choices(mut self, choices: Vec<Value>) -> Self {
        self.choices = Some(choices);
        self
    }

    pub fn minval(mut self, minval: f64) -> Self {
        self.minval = Some(minval);
        self
    }

    pub fn maxval(mut self, maxval: f64) -> Self {
        self.maxval = Some(maxval);
        self
    }

    pub fn donation_required(mut self) -> Self {
        self.donation_required = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(FieldDefault::Value(value));
        self
    }

    pub fn default_computed(mut self, producer: fn() -> Value) -> Self {
        self.default = Some(FieldDefault::Computed(producer));
        self
    }
}

/// Rule-set for one endpoint: field rules plus schema-level constraints
#[derive(Debug, Clone, Default)]
pub struct EndpointSchema {
    /// Accepted fields, keyed by wire name
    pub fields: BTreeMap<String, FieldRule>,
    /// At least one of these fields must be present in the input
    pub required_oneof: Option<Vec<String>>,
}

impl EndpointSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a field rule
    pub fn field(mut self, name: &str, rule: FieldRule) -> Self {
        self.fields.insert(name.to_string(), rule);
        self
    }

    /// Require at least one of the named fields to be present
    pub fn required_oneof(mut self, keys: &[&str]) -> Self {
        self.required_oneof = Some(keys.iter().map(|k| k.to_string()).collect());
        self
    }

    /// Look up the rule for a field, if the schema accepts it
    pub fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.fields.get(name)
    }
}
