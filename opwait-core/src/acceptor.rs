//! Declarative acceptance rules over poll results.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::{
    invoke::{ErrorResponse, Response},
    path::Path,
};

/// What a matching [`Acceptor`] does to the wait in progress.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AcceptorState {
    /// Terminate the wait successfully.
    Success,
    /// Terminate the wait as failed.
    Failure,
    /// Keep polling, skipping any acceptors declared later for this attempt.
    Retry,
}

/// The comparison strategy applied to one poll result.
///
/// The serde wire shape follows generated waiter definitions:
/// `{"matcher": "pathAll", "argument": "Stacks[].StackStatus", "expected": "CREATE_COMPLETE"}`.
///
/// [`Matcher::Error`] only ever matches a failed invocation; every other kind
/// only ever matches a successful response.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "matcher", rename_all = "camelCase")]
pub enum Matcher {
    /// Every value selected by the path equals `expected`. An empty
    /// projection never matches.
    PathAll {
        /// Projection into the response body.
        #[serde(rename = "argument")]
        path: Path,
        /// Value every selected element must equal.
        expected: Value,
    },
    /// At least one value selected by the path equals `expected`.
    PathAny {
        /// Projection into the response body.
        #[serde(rename = "argument")]
        path: Path,
        /// Value some selected element must equal.
        expected: Value,
    },
    /// Same comparison as [`Matcher::PathAll`]; the conventional spelling for
    /// scalar projections such as `"Stack.StackStatus"`.
    PathAllValues {
        /// Projection into the response body.
        #[serde(rename = "argument")]
        path: Path,
        /// Value the selected element(s) must equal.
        expected: Value,
    },
    /// The transport status code of a successful response equals `expected`.
    Status {
        /// Expected status code.
        expected: u16,
    },
    /// The invocation failed and the error identifier equals `expected`.
    Error {
        /// Expected error identifier.
        expected: String,
    },
}

impl Matcher {
    /// Matcher satisfied when every element selected by `path` equals `expected`.
    pub fn path_all(path: Path, expected: impl Into<Value>) -> Self {
        Matcher::PathAll {
            path,
            expected: expected.into(),
        }
    }

    /// Matcher satisfied when at least one element selected by `path` equals `expected`.
    pub fn path_any(path: Path, expected: impl Into<Value>) -> Self {
        Matcher::PathAny {
            path,
            expected: expected.into(),
        }
    }

    /// Matcher satisfied when the value(s) selected by `path` equal `expected`.
    pub fn path_values(path: Path, expected: impl Into<Value>) -> Self {
        Matcher::PathAllValues {
            path,
            expected: expected.into(),
        }
    }

    /// Matcher satisfied when a successful response carries this status code.
    #[must_use]
    pub fn status(expected: u16) -> Self {
        Matcher::Status { expected }
    }

    /// Matcher satisfied when the invocation fails with this error identifier.
    pub fn error(expected: impl Into<String>) -> Self {
        Matcher::Error {
            expected: expected.into(),
        }
    }

    /// Whether this matcher is satisfied by one poll result.
    #[must_use]
    pub fn matches(&self, result: &Result<Response, ErrorResponse>) -> bool {
        match (self, result) {
            (Matcher::Error { expected }, Err(err)) => err.code == *expected,
            (Matcher::Error { .. }, Ok(_)) | (_, Err(_)) => false,
            (Matcher::Status { expected }, Ok(response)) => response.status == *expected,
            (
                Matcher::PathAll { path, expected } | Matcher::PathAllValues { path, expected },
                Ok(response),
            ) => {
                let selected = path.select(&response.body);
                !selected.is_empty() && selected.into_iter().all(|value| value == expected)
            }
            (Matcher::PathAny { path, expected }, Ok(response)) => {
                path.select(&response.body).into_iter().any(|value| value == expected)
            }
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::PathAll { path, expected } => write!(f, "pathAll({path} == {expected})"),
            Matcher::PathAny { path, expected } => write!(f, "pathAny({path} == {expected})"),
            Matcher::PathAllValues { path, expected } => write!(f, "pathAllValues({path} == {expected})"),
            Matcher::Status { expected } => write!(f, "status({expected})"),
            Matcher::Error { expected } => write!(f, "error({expected})"),
        }
    }
}

/// A declarative rule pairing a [`Matcher`] over a poll result with the
/// [`AcceptorState`] it forces when satisfied.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Acceptor {
    /// What to do with the wait when the matcher is satisfied.
    pub state: AcceptorState,
    /// Comparison evaluated against each poll result.
    #[serde(flatten)]
    pub matcher: Matcher,
}

impl Acceptor {
    /// Acceptor that ends the wait successfully when `matcher` is satisfied.
    #[must_use]
    pub fn success(matcher: Matcher) -> Self {
        Acceptor {
            state: AcceptorState::Success,
            matcher,
        }
    }

    /// Acceptor that ends the wait as failed when `matcher` is satisfied.
    #[must_use]
    pub fn failure(matcher: Matcher) -> Self {
        Acceptor {
            state: AcceptorState::Failure,
            matcher,
        }
    }

    /// Acceptor that forces another attempt when `matcher` is satisfied,
    /// without consulting acceptors declared after it.
    #[must_use]
    pub fn retry(matcher: Matcher) -> Self {
        Acceptor {
            state: AcceptorState::Retry,
            matcher,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status_path() -> Path {
        "Stacks[].StackStatus".parse().unwrap()
    }

    fn stacks(statuses: &[&str]) -> Result<Response, ErrorResponse> {
        let stacks = statuses
            .iter()
            .map(|status| json!({"StackStatus": status}))
            .collect::<Vec<_>>();
        Ok(Response::ok(json!({ "Stacks": stacks })))
    }

    #[test]
    fn path_all_requires_every_element() {
        let matcher = Matcher::path_all(status_path(), "CREATE_COMPLETE");
        assert!(matcher.matches(&stacks(&["CREATE_COMPLETE", "CREATE_COMPLETE"])));
        assert!(!matcher.matches(&stacks(&["CREATE_COMPLETE", "CREATE_IN_PROGRESS"])));
    }

    #[test]
    fn path_all_rejects_an_empty_projection() {
        let matcher = Matcher::path_all(status_path(), "CREATE_COMPLETE");
        assert!(!matcher.matches(&stacks(&[])));
        assert!(!matcher.matches(&Ok(Response::ok(json!({})))));
    }

    #[test]
    fn path_any_matches_a_single_element() {
        let matcher = Matcher::path_any(status_path(), "DELETE_FAILED");
        assert!(matcher.matches(&stacks(&["DELETE_IN_PROGRESS", "DELETE_FAILED"])));
        assert!(!matcher.matches(&stacks(&["DELETE_IN_PROGRESS"])));
    }

    #[test]
    fn path_values_compares_scalar_projections() {
        let matcher = Matcher::path_values("Stack.StackStatus".parse().unwrap(), "UPDATE_COMPLETE");
        assert!(matcher.matches(&Ok(Response::ok(json!({"Stack": {"StackStatus": "UPDATE_COMPLETE"}})))));
        assert!(!matcher.matches(&Ok(Response::ok(json!({"Stack": {}})))));
    }

    #[test]
    fn error_matcher_requires_an_exact_identifier() {
        let matcher = Matcher::error("ValidationError");
        assert!(matcher.matches(&Err(ErrorResponse::new("ValidationError", "stack does not exist"))));
        assert!(!matcher.matches(&Err(ErrorResponse::new("Throttling", "slow down"))));
        assert!(!matcher.matches(&stacks(&["ValidationError"])));
    }

    #[test]
    fn path_matchers_never_inspect_errors() {
        let err = Err(ErrorResponse::new("AccessDenied", ""));
        assert!(!Matcher::path_all(status_path(), "CREATE_COMPLETE").matches(&err));
        assert!(!Matcher::path_any(status_path(), "CREATE_FAILED").matches(&err));
        assert!(!Matcher::status(200).matches(&err));
    }

    #[test]
    fn status_matcher_compares_the_transport_code() {
        let result = Ok(Response {
            status: 202,
            body: json!({}),
        });
        assert!(Matcher::status(202).matches(&result));
        assert!(!Matcher::status(200).matches(&result));
    }

    #[test]
    fn deserializes_generated_definitions() {
        let acceptors: Vec<Acceptor> = serde_json::from_value(json!([
            {"state": "success", "matcher": "pathAll",
             "argument": "Stacks[].StackStatus", "expected": "DELETE_COMPLETE"},
            {"state": "success", "matcher": "error", "expected": "ValidationError"},
            {"state": "failure", "matcher": "pathAny",
             "argument": "Stacks[].StackStatus", "expected": "DELETE_FAILED"},
            {"state": "retry", "matcher": "status", "expected": 404},
        ]))
        .unwrap();
        assert_eq!(acceptors, vec![
            Acceptor::success(Matcher::path_all(status_path(), "DELETE_COMPLETE")),
            Acceptor::success(Matcher::error("ValidationError")),
            Acceptor::failure(Matcher::path_any(status_path(), "DELETE_FAILED")),
            Acceptor::retry(Matcher::status(404)),
        ]);
    }

    #[test]
    fn rejects_definitions_with_malformed_paths() {
        let acceptor = serde_json::from_value::<Acceptor>(json!(
            {"state": "success", "matcher": "pathAll", "argument": "Stacks[0]", "expected": "x"}
        ));
        assert!(acceptor.is_err());
    }

    #[test]
    fn renders_for_failure_reasons() {
        let matcher = Matcher::path_any(status_path(), "CREATE_FAILED");
        assert_eq!(matcher.to_string(), "pathAny(Stacks[].StackStatus == \"CREATE_FAILED\")");
    }
}
