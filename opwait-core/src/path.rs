//! Field-projection expressions over structured response values.

use std::{fmt, str::FromStr};

use serde::Deserialize;
use serde_json::Value;

/// A projection expression selecting a sub-value out of a response body.
///
/// Paths are dot-separated field names, where a name may carry a `[]` suffix
/// meaning "flatten the sequence held by this field and project the rest of
/// the path into each element". `"Stacks[].StackStatus"` selects the
/// `StackStatus` of every entry in the `Stacks` array;
/// `"Stack.StackStatus"` selects a single scalar.
///
/// Elements that lack a named field, and `[]` applied to anything but a
/// sequence, drop out of the projection silently. Matchers treat an empty
/// projection as "no match", so a path that selects nothing can never satisfy
/// an acceptor.
///
/// Expressions are parsed eagerly ([`FromStr`], or [`TryFrom<String>`] when
/// deserialized inside an acceptor definition), so a malformed path is a
/// configuration-time error and never surfaces mid-poll.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String")]
pub struct Path {
    segments: Vec<Segment>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    /// Project into a named field.
    Field(String),
    /// Project into a named field, then flatten the sequence it holds.
    Flatten(String),
}

impl Path {
    /// Projects `root` into the list of selected values, in document order.
    #[must_use]
    pub fn select<'v>(&self, root: &'v Value) -> Vec<&'v Value> {
        let mut selected = vec![root];
        for segment in &self.segments {
            selected = match segment {
                Segment::Field(name) => selected.iter().filter_map(|value| value.get(name)).collect(),
                Segment::Flatten(name) => selected
                    .iter()
                    .filter_map(|value| value.get(name))
                    .filter_map(Value::as_array)
                    .flatten()
                    .collect(),
            };
        }
        selected
    }
}

/// Errors returned by the [`FromStr`] implementation for [`Path`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    /// The expression was empty or blank.
    #[error("empty projection expression")]
    Empty,

    /// A dot-separated segment was empty, as in `"Stacks[]..StackStatus"`.
    #[error("empty segment in projection expression")]
    EmptySegment,

    /// Brackets may only appear as a literal `[]` suffix on a field name.
    #[error("invalid brackets in segment {0:?}")]
    InvalidBrackets(String),
}

impl FromStr for Path {
    type Err = ParseError;

    fn from_str(expr: &str) -> Result<Self, Self::Err> {
        if expr.trim().is_empty() {
            return Err(ParseError::Empty);
        }
        let mut segments = Vec::new();
        for part in expr.split('.') {
            let (name, flatten) = match part.strip_suffix("[]") {
                Some(name) => (name, true),
                None => (part, false),
            };
            if name.is_empty() {
                return Err(ParseError::EmptySegment);
            }
            if name.contains(['[', ']']) {
                return Err(ParseError::InvalidBrackets(part.to_string()));
            }
            segments.push(if flatten {
                Segment::Flatten(name.to_string())
            } else {
                Segment::Field(name.to_string())
            });
        }
        Ok(Path { segments })
    }
}

impl TryFrom<String> for Path {
    type Error = ParseError;

    fn try_from(expr: String) -> Result<Self, Self::Error> {
        expr.parse()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                Segment::Field(name) => f.write_str(name)?,
                Segment::Flatten(name) => write!(f, "{name}[]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_and_displays_flatten_segments() {
        let path: Path = "Stacks[].StackStatus".parse().unwrap();
        assert_eq!(path.to_string(), "Stacks[].StackStatus");
        let path: Path = "Stack.StackStatus".parse().unwrap();
        assert_eq!(path.to_string(), "Stack.StackStatus");
    }

    #[test]
    fn rejects_malformed_expressions() {
        assert_eq!("".parse::<Path>(), Err(ParseError::Empty));
        assert_eq!("  ".parse::<Path>(), Err(ParseError::Empty));
        assert_eq!("Stacks..StackStatus".parse::<Path>(), Err(ParseError::EmptySegment));
        assert_eq!("Stacks.".parse::<Path>(), Err(ParseError::EmptySegment));
        assert_eq!("[]".parse::<Path>(), Err(ParseError::EmptySegment));
        assert!(matches!(
            "Stacks[0].StackStatus".parse::<Path>(),
            Err(ParseError::InvalidBrackets(_))
        ));
        assert!(matches!("Sta]cks".parse::<Path>(), Err(ParseError::InvalidBrackets(_))));
    }

    #[test]
    fn selects_across_sequences() {
        let body = json!({
            "Stacks": [
                {"StackStatus": "CREATE_COMPLETE"},
                {"StackStatus": "CREATE_IN_PROGRESS"},
                {"StackName": "no-status"},
            ]
        });
        let path: Path = "Stacks[].StackStatus".parse().unwrap();
        assert_eq!(path.select(&body), vec![
            &json!("CREATE_COMPLETE"),
            &json!("CREATE_IN_PROGRESS")
        ]);
    }

    #[test]
    fn selects_scalar_fields() {
        let body = json!({"Stack": {"StackStatus": "ROLLBACK_COMPLETE"}});
        let path: Path = "Stack.StackStatus".parse().unwrap();
        assert_eq!(path.select(&body), vec![&json!("ROLLBACK_COMPLETE")]);
    }

    #[test]
    fn unmatched_structure_drops_out() {
        let body = json!({"Stacks": "not-a-sequence"});
        let flattening: Path = "Stacks[].StackStatus".parse().unwrap();
        assert!(flattening.select(&body).is_empty());
        let absent: Path = "Reservations[].Instances".parse().unwrap();
        assert!(absent.select(&body).is_empty());
    }

    #[test]
    fn deserializes_from_strings() {
        let path: Path = serde_json::from_value(json!("Stacks[].StackStatus")).unwrap();
        assert_eq!(path, "Stacks[].StackStatus".parse().unwrap());
        assert!(serde_json::from_value::<Path>(json!("Stacks..")).is_err());
    }
}
