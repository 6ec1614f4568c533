//! Target resolution for a scheme or test plan
//!
//! Produces the ordered set of candidate test targets for one invocation.
//! Order follows declaration order in the scheme or test plan; it seeds
//! deterministic skip-argument ordering downstream.

use seltest_core::{Error, Graph, GraphTarget, Result, TargetReference, TestAction, TestIdentifier};
use std::collections::BTreeSet;

/// A candidate test target: resolved identity plus the identifier used for
/// cache matching and skip directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTestTarget {
    /// Resolved (project path, target) identity — the hashing key
    pub graph_target: GraphTarget,
    /// The identifier derived from the target name
    pub identifier: TestIdentifier,
}

/// Resolve the candidate test targets for `scheme_name`, optionally narrowed
/// to the test plan named `test_plan`.
///
/// Selection rules:
/// - With a plan name: the plan whose path's file stem matches, regardless
///   of its default flag. Unknown names fail.
/// - Without one: the scheme's explicit target list if present; otherwise
///   the default plan (or the first plan when none is flagged default).
///
/// # Errors
/// - [`Error::SchemeNotFound`] when no project declares the scheme.
/// - [`Error::TestPlanNotFound`] for an unknown plan name.
/// - [`Error::TargetNotFound`] when a reference points at a target its
///   project does not define.
pub fn resolve_test_targets(
    graph: &Graph,
    scheme_name: &str,
    test_plan: Option<&str>,
) -> Result<Vec<ResolvedTestTarget>> {
    let (_, scheme) = graph
        .find_scheme(scheme_name)
        .ok_or_else(|| Error::scheme_not_found(scheme_name))?;

    let Some(action) = &scheme.test_action else {
        tracing::debug!(scheme = scheme_name, "Scheme has no test action");
        return Ok(Vec::new());
    };

    let references: &[TargetReference] = match (action, test_plan) {
        (_, Some(plan_name)) => {
            let plan = action
                .plan_named(plan_name)
                .ok_or_else(|| Error::test_plan_not_found(plan_name, scheme_name))?;
            &plan.targets
        }
        (TestAction::Targets { targets }, None) => targets,
        (TestAction::Plans { test_plans }, None) => action
            .default_plan()
            .or_else(|| test_plans.first())
            .map_or(&[][..], |plan| &plan.targets),
    };

    let mut seen = BTreeSet::new();
    let mut resolved = Vec::new();
    for reference in references {
        let graph_target = graph.graph_target(reference).ok_or_else(|| {
            Error::target_not_found(reference.name.clone(), &reference.project_path)
        })?;
        let identifier = graph_target.test_identifier();
        // Declaration order, each identifier at most once.
        if seen.insert(identifier.clone()) {
            resolved.push(ResolvedTestTarget {
                graph_target,
                identifier,
            });
        }
    }

    tracing::debug!(
        scheme = scheme_name,
        test_plan = test_plan.unwrap_or("<none>"),
        targets = resolved.len(),
        "Resolved candidate test targets"
    );
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use seltest_core::{Project, Scheme, Target, TestPlan};
    use std::path::PathBuf;

    fn target(name: &str) -> Target {
        Target {
            name: name.to_string(),
            sources: vec![],
        }
    }

    fn graph_with_scheme(test_action: Option<TestAction>) -> Graph {
        Graph::new(
            ".",
            [Project {
                path: PathBuf::from("App"),
                targets: vec![target("ATests"), target("BTests"), target("CTests")],
                schemes: vec![Scheme {
                    name: "App".to_string(),
                    test_action,
                }],
            }],
        )
    }

    fn refs(names: &[&str]) -> Vec<TargetReference> {
        names
            .iter()
            .map(|name| TargetReference::new("App", *name))
            .collect()
    }

    #[test]
    fn resolves_explicit_targets_in_declaration_order() {
        let graph = graph_with_scheme(Some(TestAction::Targets {
            targets: refs(&["BTests", "ATests", "CTests"]),
        }));

        let resolved = resolve_test_targets(&graph, "App", None).expect("resolve");
        let names: Vec<_> = resolved.iter().map(|t| t.identifier.as_str()).collect();
        assert_eq!(names, ["BTests", "ATests", "CTests"]);
    }

    #[test]
    fn unknown_scheme_fails_with_requested_name() {
        let graph = graph_with_scheme(None);
        let err = resolve_test_targets(&graph, "Nightly", None).expect_err("should fail");
        assert!(matches!(err, Error::SchemeNotFound { ref scheme } if scheme == "Nightly"));
    }

    #[test]
    fn scheme_without_test_action_resolves_to_nothing() {
        let graph = graph_with_scheme(None);
        let resolved = resolve_test_targets(&graph, "App", None).expect("resolve");
        assert!(resolved.is_empty());
    }

    #[test]
    fn default_plan_is_used_without_a_plan_argument() {
        let graph = graph_with_scheme(Some(TestAction::Plans {
            test_plans: vec![
                TestPlan {
                    path: PathBuf::from("Plans/Smoke.xctestplan"),
                    targets: refs(&["ATests"]),
                    is_default: false,
                },
                TestPlan {
                    path: PathBuf::from("Plans/Full.xctestplan"),
                    targets: refs(&["BTests", "CTests"]),
                    is_default: true,
                },
            ],
        }));

        let resolved = resolve_test_targets(&graph, "App", None).expect("resolve");
        let names: Vec<_> = resolved.iter().map(|t| t.identifier.as_str()).collect();
        assert_eq!(names, ["BTests", "CTests"]);
    }

    #[test]
    fn named_plan_overrides_the_default() {
        let graph = graph_with_scheme(Some(TestAction::Plans {
            test_plans: vec![
                TestPlan {
                    path: PathBuf::from("Plans/Smoke.xctestplan"),
                    targets: refs(&["ATests"]),
                    is_default: false,
                },
                TestPlan {
                    path: PathBuf::from("Plans/Full.xctestplan"),
                    targets: refs(&["BTests", "CTests"]),
                    is_default: true,
                },
            ],
        }));

        let resolved = resolve_test_targets(&graph, "App", Some("Smoke")).expect("resolve");
        let names: Vec<_> = resolved.iter().map(|t| t.identifier.as_str()).collect();
        assert_eq!(names, ["ATests"]);
    }

    #[test]
    fn unknown_plan_name_fails() {
        let graph = graph_with_scheme(Some(TestAction::Plans {
            test_plans: vec![TestPlan {
                path: PathBuf::from("Plans/Smoke.xctestplan"),
                targets: refs(&["ATests"]),
                is_default: true,
            }],
        }));

        let err = resolve_test_targets(&graph, "App", Some("Nightly")).expect_err("should fail");
        assert!(
            matches!(err, Error::TestPlanNotFound { ref test_plan, ref scheme }
                if test_plan == "Nightly" && scheme == "App")
        );
    }

    #[test]
    fn dangling_target_reference_fails() {
        let graph = graph_with_scheme(Some(TestAction::Targets {
            targets: refs(&["ATests", "Ghost"]),
        }));

        let err = resolve_test_targets(&graph, "App", None).expect_err("should fail");
        assert!(matches!(err, Error::TargetNotFound { ref target, .. } if target == "Ghost"));
    }

    #[test]
    fn duplicate_references_resolve_once() {
        let graph = graph_with_scheme(Some(TestAction::Targets {
            targets: refs(&["ATests", "BTests", "ATests"]),
        }));

        let resolved = resolve_test_targets(&graph, "App", None).expect("resolve");
        let names: Vec<_> = resolved.iter().map(|t| t.identifier.as_str()).collect();
        assert_eq!(names, ["ATests", "BTests"]);
    }
}
