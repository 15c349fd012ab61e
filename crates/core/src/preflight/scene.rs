//! Scene query capability supplied by the host application.
//!
//! The preflight engine never inspects a scene itself. It hands each rule's
//! expression to a [`SceneQuery`] implementation. Host integrations
//! (Maya, Nuke) usually build a [`QueryRegistry`] holding a fixed set of
//! named query functions; only those functions can be reached from a rule.

use std::collections::HashMap;
use std::fmt;

use super::expr::{parse_call, QueryCall};
use super::rules::SceneValue;

// ---------------------------------------------------------------------------
// Output & errors
// ---------------------------------------------------------------------------

/// Result of evaluating one expression: a scalar or an ordered list.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneOutput {
    Scalar(SceneValue),
    List(Vec<SceneValue>),
}

impl SceneOutput {
    /// Normalize into an ordered list, wrapping a bare scalar.
    pub fn into_values(self) -> Vec<SceneValue> {
        match self {
            Self::Scalar(value) => vec![value],
            Self::List(values) => values,
        }
    }
}

macro_rules! scalar_output_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for SceneOutput {
                fn from(value: $ty) -> Self {
                    Self::Scalar(value.into())
                }
            }
        )*
    };
}

scalar_output_from!(SceneValue, &str, String, bool, i64, f64);

impl From<Vec<SceneValue>> for SceneOutput {
    fn from(values: Vec<SceneValue>) -> Self {
        Self::List(values)
    }
}

/// Why a single expression could not be evaluated.
///
/// The preflight engine treats every variant as "no result" and skips the
/// rule; these errors are never surfaced to the submitter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneQueryError {
    #[error("Invalid scene query `{expression}`: {reason}")]
    InvalidExpression { expression: String, reason: String },

    #[error("Scene query `{0}` is not registered")]
    UnknownQuery(String),

    #[error("Scene is not available")]
    Unavailable,

    /// The host application raised while running the query.
    #[error("Host application error: {0}")]
    Host(String),
}

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// Read-only access to the scene currently open in the host application.
pub trait SceneQuery {
    /// Whether a scene context for `job_type` can be reached at all.
    ///
    /// Returning `false` makes the whole preflight run pass without
    /// evaluating any rule, which is what happens when the SDK is used from
    /// an external script instead of inside the host application.
    fn is_available(&self, _job_type: &str) -> bool {
        true
    }

    /// Evaluate `expression` against the current scene.
    fn evaluate(&self, expression: &str) -> Result<SceneOutput, SceneQueryError>;
}

impl<T: SceneQuery + ?Sized> SceneQuery for &T {
    fn is_available(&self, job_type: &str) -> bool {
        (**self).is_available(job_type)
    }

    fn evaluate(&self, expression: &str) -> Result<SceneOutput, SceneQueryError> {
        (**self).evaluate(expression)
    }
}

/// Scene capability for callers running outside any host application.
#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

impl SceneQuery for Detached {
    fn is_available(&self, _job_type: &str) -> bool {
        false
    }

    fn evaluate(&self, _expression: &str) -> Result<SceneOutput, SceneQueryError> {
        Err(SceneQueryError::Unavailable)
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

type QueryFn = Box<dyn Fn(&QueryCall) -> Result<SceneOutput, SceneQueryError> + Send + Sync>;

/// A bounded set of named scene query functions.
///
/// Functions are registered under a namespace (e.g. `cmds` for Maya,
/// `nuke` for Nuke) and reached from rule expressions by their qualified
/// name: `cmds.getAttr('defaultRenderGlobals.currentRenderer')`.
#[derive(Default)]
pub struct QueryRegistry {
    functions: HashMap<String, QueryFn>,
}

impl QueryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `func` as `namespace.name`. An empty namespace registers
    /// the bare `name`. Re-registering a name replaces the old function.
    pub fn register<F>(&mut self, namespace: &str, name: &str, func: F) -> &mut Self
    where
        F: Fn(&QueryCall) -> Result<SceneOutput, SceneQueryError> + Send + Sync + 'static,
    {
        self.functions
            .insert(qualified_name(namespace, name), Box::new(func));
        self
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<F>(mut self, namespace: &str, name: &str, func: F) -> Self
    where
        F: Fn(&QueryCall) -> Result<SceneOutput, SceneQueryError> + Send + Sync + 'static,
    {
        self.register(namespace, name, func);
        self
    }

    pub fn contains(&self, qualified: &str) -> bool {
        self.functions.contains_key(qualified)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl SceneQuery for QueryRegistry {
    fn evaluate(&self, expression: &str) -> Result<SceneOutput, SceneQueryError> {
        let call = parse_call(expression)?;
        let func = self
            .functions
            .get(&call.name)
            .ok_or_else(|| SceneQueryError::UnknownQuery(call.name.clone()))?;
        func(&call)
    }
}

impl fmt::Debug for QueryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("QueryRegistry")
            .field("functions", &names)
            .finish()
    }
}

fn qualified_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}.{name}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
