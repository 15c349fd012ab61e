//! Check rule and result types.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// Token in a rule's error template replaced by the matched values.
pub const MATCH_PLACEHOLDER: &str = "%match%";

/// Separator used when joining matched values into the error message.
pub const MATCH_SEPARATOR: &str = ", ";

// ---------------------------------------------------------------------------
// Scene values
// ---------------------------------------------------------------------------

/// A primitive value produced by a scene query or listed in a rule's
/// condition.
///
/// Integers and floats compare numerically, so a condition of `1` matches
/// a scene value of `1.0`. Values of different kinds never compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SceneValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl PartialEq for SceneValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => int_eq_float(*a, *b),
            (Self::Str(a), Self::Str(b)) => a == b,
            _ => false,
        }
    }
}

/// Exact comparison; `i64 as f64` rounds above 2^53.
fn int_eq_float(int: i64, float: f64) -> bool {
    float.fract() == 0.0
        && float >= i64::MIN as f64
        && float < i64::MAX as f64
        && float as i64 == int
}

impl fmt::Display for SceneValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            // Integral floats keep their `.0` so `2.0` never reads as `2`.
            Self::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for SceneValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for SceneValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for SceneValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for SceneValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for SceneValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

// ---------------------------------------------------------------------------
// Operation type
// ---------------------------------------------------------------------------

/// Matching policy between evaluated scene values and a rule's condition.
///
/// Unknown wire values are kept as [`OperationType::Unrecognized`] so a
/// malformed rule never fails deserialization of the whole rule list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value", into = "String")]
pub enum OperationType {
    /// A value matches when it is listed in the condition.
    Equal,
    /// A value matches when it is absent from the condition.
    NotEqual,
    Unrecognized(String),
}

impl OperationType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Equal => "equal",
            Self::NotEqual => "not_equal",
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for OperationType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "equal" => Self::Equal,
            "not_equal" => Self::NotEqual,
            _ => Self::Unrecognized(value),
        }
    }
}

/// Non-string wire values (numbers, null) become `Unrecognized` holding
/// their JSON text.
impl From<Value> for OperationType {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => s.into(),
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

impl From<OperationType> for String {
    fn from(value: OperationType) -> Self {
        match value {
            OperationType::Unrecognized(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Check rule
// ---------------------------------------------------------------------------

/// One site-defined preflight rule, as returned by
/// `GET /api/preflight/{job_type}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRule {
    /// Scene query expression, e.g. `cmds.getAttr('defaultRenderGlobals.currentRenderer')`.
    pub api_call: String,
    pub operation_type: OperationType,
    /// Values of interest. A bare scalar on the wire is read as a
    /// single-element list.
    #[serde(default, deserialize_with = "one_or_many")]
    pub condition: Vec<SceneValue>,
    /// Message raised on failure; `%match%` is replaced by the matches.
    #[serde(rename = "error")]
    pub error_template: String,
}

impl CheckRule {
    /// Collect the values that trigger this rule, preserving their order.
    ///
    /// Rules with an unrecognized operation type never match.
    pub fn matching_values(&self, values: &[SceneValue]) -> Vec<SceneValue> {
        values
            .iter()
            .filter(|value| match self.operation_type {
                OperationType::Equal => self.condition.contains(value),
                OperationType::NotEqual => !self.condition.contains(value),
                OperationType::Unrecognized(_) => false,
            })
            .cloned()
            .collect()
    }

    /// Substitute the joined matches into the error template.
    pub fn format_error(&self, matches: &[SceneValue]) -> String {
        let joined = matches
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(MATCH_SEPARATOR);
        self.error_template.replace(MATCH_PLACEHOLDER, &joined)
    }
}

/// Decode a rule list item by item.
///
/// A rule that does not decode (missing `api_call`, a nested `condition`)
/// is logged and dropped, so one malformed rule never blocks submission.
pub fn decode_rules(items: Vec<Value>) -> Vec<CheckRule> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match CheckRule::deserialize(&item) {
            Ok(rule) => Some(rule),
            Err(e) => {
                tracing::warn!(
                    rule_index = index,
                    error = %e,
                    rule = %item,
                    "Skipping malformed preflight rule",
                );
                None
            }
        })
        .collect()
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<SceneValue>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<SceneValue>),
        One(SceneValue),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(values) => values,
        OneOrMany::One(value) => vec![value],
    })
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Outcome of one preflight run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreflightResult {
    Pass,
    Fail(String),
}

impl PreflightResult {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Convert a failure into [`CoreError::Preflight`].
    pub fn into_result(self) -> Result<(), CoreError> {
        match self {
            Self::Pass => Ok(()),
            Self::Fail(message) => Err(CoreError::Preflight(message)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
