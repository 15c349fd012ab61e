//! Preflight evaluator: pure logic, no network access.

use super::rules::{CheckRule, OperationType, PreflightResult};
use super::scene::{SceneQuery, SceneQueryError};

/// Evaluate `rules` in order against the scene and stop at the first rule
/// whose condition matches.
///
/// A rule whose expression cannot be evaluated is skipped, so a broken
/// check never blocks an otherwise valid submission. Rules with an
/// unrecognized operation type never match.
pub fn run_preflight<S>(job_type: &str, rules: &[CheckRule], scene: &S) -> PreflightResult
where
    S: SceneQuery + ?Sized,
{
    if rules.is_empty() {
        return PreflightResult::Pass;
    }

    if !scene.is_available(job_type) {
        tracing::debug!(
            job_type,
            rule_count = rules.len(),
            "Scene not available, skipping preflight checks",
        );
        return PreflightResult::Pass;
    }

    for (index, rule) in rules.iter().enumerate() {
        if let OperationType::Unrecognized(raw) = &rule.operation_type {
            tracing::warn!(
                job_type,
                rule_index = index,
                api_call = %rule.api_call,
                operation_type = %raw,
                "Ignoring preflight rule with unrecognized operation type",
            );
            continue;
        }

        match evaluate_rule(rule, scene) {
            Ok(Some(message)) => {
                tracing::info!(job_type, rule_index = index, %message, "Preflight check failed");
                return PreflightResult::Fail(message);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::debug!(
                    job_type,
                    rule_index = index,
                    api_call = %rule.api_call,
                    error = %e,
                    "Preflight rule could not be evaluated, skipping",
                );
            }
        }
    }

    PreflightResult::Pass
}

/// Evaluate a single rule, returning the formatted failure message if any
/// value matched.
fn evaluate_rule<S>(rule: &CheckRule, scene: &S) -> Result<Option<String>, SceneQueryError>
where
    S: SceneQuery + ?Sized,
{
    let values = scene.evaluate(&rule.api_call)?.into_values();
    let matches = rule.matching_values(&values);
    if matches.is_empty() {
        Ok(None)
    } else {
        Ok(Some(rule.format_error(&matches)))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;
    use crate::preflight::rules::SceneValue;
    use crate::preflight::scene::{Detached, QueryRegistry, SceneOutput};

    /// Scene fake answering from a fixed table and recording every
    /// expression it was asked to evaluate.
    struct FakeScene {
        answers: HashMap<String, Result<SceneOutput, SceneQueryError>>,
        asked: RefCell<Vec<String>>,
    }

    impl FakeScene {
        fn new(answers: Vec<(&str, Result<SceneOutput, SceneQueryError>)>) -> Self {
            Self {
                answers: answers
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
                asked: RefCell::new(Vec::new()),
            }
        }

        fn asked(&self) -> Vec<String> {
            self.asked.borrow().clone()
        }
    }

    impl SceneQuery for FakeScene {
        fn evaluate(&self, expression: &str) -> Result<SceneOutput, SceneQueryError> {
            self.asked.borrow_mut().push(expression.to_string());
            self.answers
                .get(expression)
                .cloned()
                .unwrap_or_else(|| Err(SceneQueryError::UnknownQuery(expression.to_string())))
        }
    }

    fn rule(api_call: &str, op: OperationType, condition: &[&str], error: &str) -> CheckRule {
        CheckRule {
            api_call: api_call.to_string(),
            operation_type: op,
            condition: condition.iter().map(|c| SceneValue::from(*c)).collect(),
            error_template: error.to_string(),
        }
    }

    fn values(items: &[&str]) -> SceneOutput {
        SceneOutput::List(items.iter().map(|s| SceneValue::from(*s)).collect())
    }

    fn renderer_rule() -> CheckRule {
        rule("renderer()", OperationType::Equal, &["mentalray"], "found %match%")
    }

    // -----------------------------------------------------------------------
    // Basic outcomes
    // -----------------------------------------------------------------------

    #[test]
    fn no_rules_pass_without_touching_scene() {
        let scene = FakeScene::new(vec![]);
        assert_eq!(run_preflight("maya", &[], &scene), PreflightResult::Pass);
        assert!(scene.asked().is_empty());
    }

    #[test]
    fn equal_rule_fails_on_matching_scalar() {
        let scene = FakeScene::new(vec![("renderer()", Ok("mentalray".into()))]);
        let result = run_preflight("maya", &[renderer_rule()], &scene);
        assert_eq!(result, PreflightResult::Fail("found mentalray".to_string()));
    }

    #[test]
    fn equal_rule_passes_on_other_value() {
        let scene = FakeScene::new(vec![("renderer()", Ok("arnold".into()))]);
        let result = run_preflight("maya", &[renderer_rule()], &scene);
        assert_eq!(result, PreflightResult::Pass);
    }

    #[test]
    fn equal_rule_reports_every_match_in_scene_order() {
        let scene = FakeScene::new(vec![(
            "plugins()",
            Ok(values(&["b", "ok", "a"])),
        )]);
        let rules = [rule("plugins()", OperationType::Equal, &["a", "b"], "bad: %match%")];
        let result = run_preflight("maya", &rules, &scene);
        assert_eq!(result, PreflightResult::Fail("bad: b, a".to_string()));
    }

    #[test]
    fn not_equal_rule_fails_on_value_outside_condition() {
        let scene = FakeScene::new(vec![(
            "plugins()",
            Ok(values(&["mtoa", "redshift"])),
        )]);
        let rules = [rule(
            "plugins()",
            OperationType::NotEqual,
            &["mtoa", "Mayatomr"],
            "Unsupported plugin: %match%",
        )];
        let result = run_preflight("maya", &rules, &scene);
        assert_eq!(result, PreflightResult::Fail("Unsupported plugin: redshift".to_string()));
    }

    #[test]
    fn not_equal_rule_passes_when_all_values_allowed() {
        let scene = FakeScene::new(vec![("plugins()", Ok(values(&["mtoa"])))]);
        let rules = [rule("plugins()", OperationType::NotEqual, &["mtoa"], "x")];
        assert_eq!(run_preflight("maya", &rules, &scene), PreflightResult::Pass);
    }

    #[test]
    fn empty_list_result_never_matches() {
        let scene = FakeScene::new(vec![("plugins()", Ok(SceneOutput::List(vec![])))]);
        let rules = [rule("plugins()", OperationType::NotEqual, &["mtoa"], "x")];
        assert_eq!(run_preflight("maya", &rules, &scene), PreflightResult::Pass);
    }

    // -----------------------------------------------------------------------
    // Short-circuit & fail-open
    // -----------------------------------------------------------------------

    #[test]
    fn stops_at_first_failing_rule() {
        let scene = FakeScene::new(vec![
            ("first()", Ok("x".into())),
            ("second()", Ok("y".into())),
        ]);
        let rules = [
            rule("first()", OperationType::Equal, &["x"], "first %match%"),
            rule("second()", OperationType::Equal, &["y"], "second %match%"),
        ];
        let result = run_preflight("nuke", &rules, &scene);
        assert_eq!(result, PreflightResult::Fail("first x".to_string()));
        assert_eq!(scene.asked(), vec!["first()".to_string()]);
    }

    #[test]
    fn evaluation_error_skips_only_that_rule() {
        let failing = rule("broken()", OperationType::Equal, &["x"], "never");
        let blocking = rule("renderer()", OperationType::Equal, &["mentalray"], "found %match%");
        let passing = rule("renderer()", OperationType::Equal, &["vray"], "found %match%");

        let answers = || {
            FakeScene::new(vec![
                ("broken()", Err(SceneQueryError::Host("NameError".into()))),
                ("renderer()", Ok("mentalray".into())),
            ])
        };

        for rules in [
            vec![failing.clone(), blocking.clone()],
            vec![failing.clone(), passing.clone()],
            vec![passing.clone(), failing.clone()],
        ] {
            let with_broken = run_preflight("maya", &rules, &answers());
            let without: Vec<_> = rules
                .iter()
                .filter(|r| r.api_call != "broken()")
                .cloned()
                .collect();
            assert_eq!(with_broken, run_preflight("maya", &without, &answers()));
        }
    }

    #[test]
    fn unrecognized_operation_type_is_inert() {
        let scene = FakeScene::new(vec![("renderer()", Ok("mentalray".into()))]);
        let rules = [rule(
            "renderer()",
            OperationType::Unrecognized("contains".into()),
            &["mentalray"],
            "found %match%",
        )];
        assert_eq!(run_preflight("maya", &rules, &scene), PreflightResult::Pass);
        assert!(scene.asked().is_empty());
    }

    #[test]
    fn unavailable_scene_passes_without_evaluating() {
        let result = run_preflight("maya", &[renderer_rule()], &Detached);
        assert_eq!(result, PreflightResult::Pass);
    }

    // -----------------------------------------------------------------------
    // Registry integration
    // -----------------------------------------------------------------------

    #[test]
    fn runs_against_query_registry() {
        let registry = QueryRegistry::new().with("cmds", "getAttr", |call| {
            match call.str_arg(0) {
                Some("defaultRenderGlobals.currentRenderer") => Ok("mentalRay".into()),
                _ => Err(SceneQueryError::Host("no such attribute".into())),
            }
        });
        let rules = [
            rule(
                "cmds.getAttr('missing.attr')",
                OperationType::Equal,
                &["anything"],
                "unreachable",
            ),
            rule(
                "cmds.getAttr('defaultRenderGlobals.currentRenderer')",
                OperationType::NotEqual,
                &["arnold", "vray"],
                "Renderer %match% is not supported",
            ),
        ];
        let result = run_preflight("maya", &rules, &registry);
        assert_eq!(
            result,
            PreflightResult::Fail("Renderer mentalRay is not supported".to_string())
        );
    }
}
