//! Passthrough argument inspection and skip-argument composition
//!
//! The original invocation arguments are preserved verbatim; composition
//! only ever appends skip directives after them. Scheme and test-plan
//! extraction happens here, before any graph work.

use seltest_core::{Error, Result, TestIdentifier};

/// Flag designating the scheme in the passthrough arguments
pub const SCHEME_FLAG: &str = "-scheme";

/// Flag designating a test plan in the passthrough arguments
pub const TEST_PLAN_FLAG: &str = "-testPlan";

/// Prefix of a skip directive token
pub const SKIP_TESTING_PREFIX: &str = "-skip-testing:";

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|window| window[0] == flag)
        .map(|window| window[1].as_str())
}

/// Extract the scheme designation from the passthrough arguments.
///
/// # Errors
/// Returns [`Error::SchemeNotPassed`] when no `-scheme <name>` pair is
/// present. This check runs before any graph mapping or hashing.
pub fn scheme_argument(args: &[String]) -> Result<String> {
    flag_value(args, SCHEME_FLAG)
        .map(str::to_string)
        .ok_or(Error::SchemeNotPassed)
}

/// Extract the optional test-plan designation from the passthrough
/// arguments.
#[must_use]
pub fn test_plan_argument(args: &[String]) -> Option<String> {
    flag_value(args, TEST_PLAN_FLAG).map(str::to_string)
}

/// Compose the reduced invocation: the original arguments followed by one
/// skip directive per skippable identifier, in the given order.
///
/// Existing tokens are never mutated or reordered. Identifiers whose skip
/// directive is already present are not appended again, so composition is
/// idempotent for the same inputs. An empty skip set returns the original
/// arguments unchanged.
#[must_use]
pub fn compose_skip_arguments(original: &[String], skippable: &[TestIdentifier]) -> Vec<String> {
    let mut composed: Vec<String> = original.to_vec();
    for identifier in skippable {
        let token = format!("{SKIP_TESTING_PREFIX}{identifier}");
        if !composed.contains(&token) {
            composed.push(token);
        }
    }
    composed
}
