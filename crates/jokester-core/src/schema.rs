//! Runtime shape validation for records read from a store.
//!
//! Store rows are plain JSON values and may drift from the declared shape, so
//! every read path narrows them through [`validate`] before use. Each shape is
//! declared as a JSON Schema document and compiled once. Validation is
//! structural: fields beyond the declared shape are ignored.

use crate::model::{
    Joke, JokeHead, JokeHeadList, JokeOwner, CONTENT_FIELD, ID_FIELD, JOKESTER_ID_FIELD,
    NAME_FIELD,
};
use jsonschema::error::ValidationErrorKind;
use jsonschema::Validator;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt::Display;
use std::sync::LazyLock;
use thiserror::Error;

const ROOT_PATH: &str = "$";

/// Report order of fields within one object.
const FIELD_ORDER: [&str; 4] = [ID_FIELD, NAME_FIELD, CONTENT_FIELD, JOKESTER_ID_FIELD];

/// A value shape that can be checked against untyped data.
pub trait Shape: Sized {
    /// Name reported in validation errors.
    const NAME: &'static str;

    /// Validates `value` and returns the narrowed, typed result.
    fn validate(value: &Value) -> Result<Self, ValidationError>;
}

/// Validates `value` against the shape `S`.
pub fn validate<S: Shape>(value: &Value) -> Result<S, ValidationError> {
    S::validate(value)
}

/// Why a single field failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    Missing,
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
    Empty,
    /// Any other rejection, with the validator's own wording.
    Invalid(String),
}

impl Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueKind::Missing => f.write_str("required field is missing"),
            IssueKind::WrongType { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            IssueKind::Empty => f.write_str("must not be empty"),
            IssueKind::Invalid(reason) => f.write_str(reason),
        }
    }
}

/// A failing field and the reason it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Location of the field, e.g. `name` or `[2].id`; `$` is the value itself.
    pub path: String,
    pub kind: IssueKind,
}

impl Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)
    }
}

/// Structured failure of a shape check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("value does not match {shape}: {}", render_issues(.issues))]
pub struct ValidationError {
    shape: &'static str,
    issues: Vec<Issue>,
}

impl ValidationError {
    fn new(shape: &'static str, issues: Vec<Issue>) -> Self {
        Self { shape, issues }
    }

    fn at_root(shape: &'static str, kind: IssueKind) -> Self {
        Self::new(
            shape,
            vec![Issue {
                path: ROOT_PATH.to_string(),
                kind,
            }],
        )
    }

    pub fn shape(&self) -> &'static str {
        self.shape
    }

    /// The failing fields, never empty.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }
}

fn render_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(Issue::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn non_empty_string() -> Value {
    json!({ "type": "string", "minLength": 1 })
}

fn head_schema() -> Value {
    json!({
        "type": "object",
        "required": [ID_FIELD, NAME_FIELD],
        "properties": {
            ID_FIELD: non_empty_string(),
            NAME_FIELD: non_empty_string(),
        },
    })
}

static JOKE_HEAD: LazyLock<CompiledShape> = LazyLock::new(|| CompiledShape::new(head_schema()));

static JOKE: LazyLock<CompiledShape> = LazyLock::new(|| {
    CompiledShape::new(json!({
        "type": "object",
        "required": [ID_FIELD, NAME_FIELD, CONTENT_FIELD],
        "properties": {
            ID_FIELD: non_empty_string(),
            NAME_FIELD: non_empty_string(),
            CONTENT_FIELD: { "type": "string" },
        },
    }))
});

static JOKE_HEAD_LIST: LazyLock<CompiledShape> = LazyLock::new(|| {
    CompiledShape::new(json!({
        "type": "array",
        "items": head_schema(),
    }))
});

static JOKE_OWNER: LazyLock<CompiledShape> = LazyLock::new(|| {
    CompiledShape::new(json!({
        "type": "object",
        "required": [JOKESTER_ID_FIELD],
        "properties": {
            JOKESTER_ID_FIELD: { "type": "string", "pattern": "\\S" },
        },
    }))
});

/// One failure, located by instance path segments.
struct Located {
    segments: Vec<String>,
    kind: IssueKind,
}

impl Located {
    /// Position of the list element the failure sits under, if any.
    fn index(&self) -> Option<usize> {
        self.segments.first().and_then(|segment| segment.parse().ok())
    }

    fn field_rank(&self) -> usize {
        self.segments
            .last()
            .and_then(|field| FIELD_ORDER.iter().position(|known| known == field))
            .unwrap_or(FIELD_ORDER.len())
    }

    fn into_issue(self) -> Issue {
        let path = self
            .segments
            .iter()
            .fold(String::new(), |mut path, segment| {
                match segment.parse::<usize>() {
                    Ok(index) => path.push_str(&format!("[{index}]")),
                    Err(_) if path.is_empty() => path.push_str(segment),
                    Err(_) => {
                        path.push('.');
                        path.push_str(segment);
                    }
                }
                path
            });

        Issue {
            path: if path.is_empty() {
                ROOT_PATH.to_string()
            } else {
                path
            },
            kind: self.kind,
        }
    }
}

/// Splits a JSON pointer such as `/1/name` into unescaped segments.
fn pointer_segments(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .skip(1)
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect()
}

/// A shape's schema document together with its compiled validator.
struct CompiledShape {
    schema: Value,
    validator: Result<Validator, String>,
}

impl CompiledShape {
    fn new(schema: Value) -> Self {
        let validator = jsonschema::validator_for(&schema).map_err(|err| err.to_string());
        Self { schema, validator }
    }

    /// Runs the schema and returns every failure, ordered by element then field.
    fn check(&self, shape: &'static str, value: &Value) -> Result<Vec<Located>, ValidationError> {
        let validator = self
            .validator
            .as_ref()
            .map_err(|reason| ValidationError::at_root(shape, IssueKind::Invalid(reason.clone())))?;

        let mut failures: Vec<Located> = validator
            .iter_errors(value)
            .map(|error| self.locate(&error))
            .collect();
        failures.sort_by_key(|failure| (failure.index(), failure.field_rank()));
        Ok(failures)
    }

    fn locate(&self, error: &jsonschema::ValidationError<'_>) -> Located {
        let mut segments = pointer_segments(&error.instance_path.to_string());
        let kind = match &error.kind {
            ValidationErrorKind::Required { property } => {
                segments.push(property.as_str().unwrap_or_default().to_string());
                IssueKind::Missing
            }
            ValidationErrorKind::Type { .. } => IssueKind::WrongType {
                expected: self.expected_type(&error.schema_path.to_string()),
                found: type_name(&error.instance),
            },
            ValidationErrorKind::MinLength { .. } | ValidationErrorKind::Pattern { .. } => {
                IssueKind::Empty
            }
            _ => IssueKind::Invalid(error.to_string()),
        };
        Located { segments, kind }
    }

    /// Reads the declared type at `schema_path` back out of the schema document.
    fn expected_type(&self, schema_path: &str) -> &'static str {
        match self.schema.pointer(schema_path).and_then(Value::as_str) {
            Some("string") => "string",
            Some("object") => "object",
            Some("array") => "array",
            _ => "value",
        }
    }

    /// Checks `value` and decodes it once it is known to match.
    fn narrow<'de, T: Deserialize<'de>>(
        &self,
        shape: &'static str,
        value: &'de Value,
    ) -> Result<T, ValidationError> {
        let failures = self.check(shape, value)?;
        if !failures.is_empty() {
            return Err(ValidationError::new(
                shape,
                failures.into_iter().map(Located::into_issue).collect(),
            ));
        }
        T::deserialize(value)
            .map_err(|err| ValidationError::at_root(shape, IssueKind::Invalid(err.to_string())))
    }
}

impl Shape for JokeHead {
    const NAME: &'static str = "JokeHead";

    fn validate(value: &Value) -> Result<Self, ValidationError> {
        JOKE_HEAD.narrow(Self::NAME, value)
    }
}

impl Shape for Joke {
    const NAME: &'static str = "Joke";

    fn validate(value: &Value) -> Result<Self, ValidationError> {
        JOKE.narrow(Self::NAME, value)
    }
}

impl Shape for JokeHeadList {
    const NAME: &'static str = "JokeHeadList";

    fn validate(value: &Value) -> Result<Self, ValidationError> {
        let failures = JOKE_HEAD_LIST.check(Self::NAME, value)?;

        // Only the first failing element is reported, so the error names its index.
        if let Some(first) = failures.first().map(Located::index) {
            let issues = failures
                .into_iter()
                .filter(|failure| failure.index() == first)
                .map(Located::into_issue)
                .collect();
            return Err(ValidationError::new(Self::NAME, issues));
        }

        Vec::<JokeHead>::deserialize(value)
            .map_err(|err| ValidationError::at_root(Self::NAME, IssueKind::Invalid(err.to_string())))
    }
}

impl Shape for JokeOwner {
    const NAME: &'static str = "JokeOwner";

    fn validate(value: &Value) -> Result<Self, ValidationError> {
        JOKE_OWNER.narrow(Self::NAME, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_joke_keeps_fields() {
        let record = json!({
            "id": "a",
            "name": "Foo",
            "content": "I never forget a face.",
            "jokesterId": "u1",
            "createdAt": "2024-01-01T00:00:00Z",
        });

        let joke: Joke = validate(&record).unwrap();
        assert_eq!(joke.id, "a");
        assert_eq!(joke.name, "Foo");
        assert_eq!(joke.content, "I never forget a face.");
    }

    #[test]
    fn missing_content_fails_joke_but_passes_head() {
        let record = json!({ "id": "a", "name": "Foo" });

        let err = validate::<Joke>(&record).unwrap_err();
        assert_eq!(err.shape(), "Joke");
        assert_eq!(
            err.issues(),
            &[Issue {
                path: "content".to_string(),
                kind: IssueKind::Missing,
            }]
        );

        let head: JokeHead = validate(&record).unwrap();
        assert_eq!(head.id, "a");
        assert_eq!(head.name, "Foo");
    }

    #[test]
    fn joke_implies_head_on_same_value() {
        let record = json!({ "id": "a", "name": "Foo", "content": "" });

        let joke: Joke = validate(&record).unwrap();
        let head: JokeHead = validate(&record).unwrap();
        assert_eq!(joke.head(), head);
    }

    #[test]
    fn reports_every_failing_field() {
        let record = json!({ "id": "", "name": 42, "content": null });

        let err = validate::<Joke>(&record).unwrap_err();
        assert_eq!(
            err.issues(),
            &[
                Issue {
                    path: "id".to_string(),
                    kind: IssueKind::Empty,
                },
                Issue {
                    path: "name".to_string(),
                    kind: IssueKind::WrongType {
                        expected: "string",
                        found: "number",
                    },
                },
                Issue {
                    path: "content".to_string(),
                    kind: IssueKind::WrongType {
                        expected: "string",
                        found: "null",
                    },
                },
            ]
        );
    }

    #[test]
    fn non_object_fails_at_root() {
        let err = validate::<JokeHead>(&json!("a")).unwrap_err();
        assert_eq!(err.issues()[0].path, "$");
        assert_eq!(
            err.issues()[0].kind,
            IssueKind::WrongType {
                expected: "object",
                found: "string",
            }
        );
    }

    #[test]
    fn list_names_first_failing_index() {
        let rows = json!([
            { "id": "a", "name": "Foo" },
            { "id": "b" },
            { "name": "Baz" },
        ]);

        let err = validate::<JokeHeadList>(&rows).unwrap_err();
        assert_eq!(err.shape(), "JokeHeadList");
        assert_eq!(
            err.issues(),
            &[Issue {
                path: "[1].name".to_string(),
                kind: IssueKind::Missing,
            }]
        );
        assert!(err.to_string().contains("[1].name"));
    }

    #[test]
    fn list_reports_every_issue_of_the_failing_element_only() {
        let rows = json!([
            { "id": "a", "name": "Foo" },
            "not a joke",
            { "id": "" },
        ]);

        let err = validate::<JokeHeadList>(&rows).unwrap_err();
        assert_eq!(
            err.issues(),
            &[Issue {
                path: "[1]".to_string(),
                kind: IssueKind::WrongType {
                    expected: "object",
                    found: "string",
                },
            }]
        );

        let rows = json!([{ "id": "a", "name": "Foo" }, { "id": "", "name": 7 }]);
        let err = validate::<JokeHeadList>(&rows).unwrap_err();
        let paths: Vec<_> = err.issues().iter().map(|issue| issue.path.as_str()).collect();
        assert_eq!(paths, ["[1].id", "[1].name"]);
    }

    #[test]
    fn extra_fields_are_ignored() {
        let record = json!({ "id": "a", "name": "Foo", "jokesterId": 12, "rating": [1, 2] });

        let head: JokeHead = validate(&record).unwrap();
        assert_eq!(head.name, "Foo");
    }

    #[test]
    fn list_preserves_order() {
        let rows = json!([
            { "id": "b", "name": "Bar" },
            { "id": "a", "name": "Foo" },
        ]);

        let heads: JokeHeadList = validate(&rows).unwrap();
        let ids: Vec<_> = heads.iter().map(|head| head.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn list_rejects_non_array() {
        let err = validate::<JokeHeadList>(&json!({ "id": "a" })).unwrap_err();
        assert_eq!(err.issues()[0].path, "$");
    }

    #[test]
    fn owner_requires_jokester_id() {
        let owner: JokeOwner = validate(&json!({ "jokesterId": "u1" })).unwrap();
        assert_eq!(owner.jokester_id.as_str(), "u1");

        let err = validate::<JokeOwner>(&json!({ "id": "a" })).unwrap_err();
        assert_eq!(err.issues()[0].path, "jokesterId");

        let err = validate::<JokeOwner>(&json!({ "jokesterId": "  " })).unwrap_err();
        assert_eq!(err.issues()[0].kind, IssueKind::Empty);
    }
}
