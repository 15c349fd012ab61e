//! Preflight check engine.
//!
//! Site-defined [`CheckRule`](rules::CheckRule)s are evaluated against the
//! host application's scene through the [`SceneQuery`](scene::SceneQuery)
//! capability before a job is submitted. The first rule whose condition
//! matches blocks the submission with a descriptive message.

pub mod evaluator;
pub mod expr;
pub mod rules;
pub mod scene;

pub use evaluator::run_preflight;
pub use rules::{decode_rules, CheckRule, OperationType, PreflightResult, SceneValue};
pub use scene::{Detached, QueryRegistry, SceneOutput, SceneQuery, SceneQueryError};
