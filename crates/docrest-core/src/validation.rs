use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::Value as JsonValue;
use std::{collections::BTreeMap, fmt};

/// Key under which serializer-level validator messages are collected.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

///
/// FieldErrorKind
///
/// Recoverable, per-field input problems.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[remain::sorted]
pub enum FieldErrorKind {
    Blank,
    Custom,
    Invalid,
    InvalidIdentity,
    InvalidReference,
    MaxBytes,
    MaxLength,
    MaxValue,
    MinLength,
    MinValue,
    NotAList,
    NotAMapping,
    Null,
    Required,
}

impl FieldErrorKind {
    /// Canned message for kinds that do not need context.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::Blank => "This field may not be blank.",
            Self::Custom | Self::Invalid => "Invalid value.",
            Self::InvalidIdentity => "Invalid identity: expected a 24 character hex string.",
            Self::InvalidReference => "Invalid reference: object does not exist.",
            Self::MaxBytes => "Ensure this value does not exceed the byte limit.",
            Self::MaxLength => "Ensure this field is not too long.",
            Self::MaxValue => "Ensure this value is not too large.",
            Self::MinLength => "Ensure this field is not too short.",
            Self::MinValue => "Ensure this value is not too small.",
            Self::NotAList => "Expected a list of items.",
            Self::NotAMapping => "Expected a mapping of items.",
            Self::Null => "This field may not be null.",
            Self::Required => "This field is required.",
        }
    }
}

///
/// FieldError
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FieldError {
    pub kind: FieldErrorKind,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(kind: FieldErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<FieldErrorKind> for FieldError {
    fn from(kind: FieldErrorKind) -> Self {
        Self::new(kind, kind.default_message())
    }
}

///
/// ValidationErrors
///
/// Field-keyed error mapping. Keys are rendered paths such as
/// `mpg[0].loaded`; validator messages live under `non_field_errors`.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ValidationErrors {
    issues: BTreeMap<String, Vec<FieldError>>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<String>, error: impl Into<FieldError>) {
        self.issues.entry(path.into()).or_default().push(error.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.add(
            NON_FIELD_ERRORS,
            FieldError::new(FieldErrorKind::Custom, message),
        );
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Number of individual errors across every path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&[FieldError]> {
        self.issues.get(path).map(Vec::as_slice)
    }

    /// True when `path` carries at least one error of `kind`.
    #[must_use]
    pub fn has(&self, path: &str, kind: FieldErrorKind) -> bool {
        self.get(path)
            .is_some_and(|errs| errs.iter().any(|e| e.kind == kind))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FieldError])> {
        self.issues.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// `{ path: [message, ..] }`, the shape web clients expect.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.issues.len()))?;
        for (path, errs) in &self.issues {
            let messages: Vec<&str> = errs.iter().map(|e| e.message.as_str()).collect();
            map.serialize_entry(path, &messages)?;
        }

        map.end()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (path, errs) in &self.issues {
            for err in errs {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{path}: {}", err.message)?;
                first = false;
            }
        }

        Ok(())
    }
}

///
/// PathSegment
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(s: &str) -> Self {
        Self::Field(s.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

/// Render `a.b[0].c` from a segment stack.
#[must_use]
pub fn render_path(path: &[PathSegment]) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    for seg in path {
        match seg {
            PathSegment::Field(s) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(s);
            }
            PathSegment::Index(i) => {
                let _ = write!(out, "[{i}]");
            }
        }
    }

    out
}

///
/// Issues
///
/// Path-aware collector threaded through input validation.
///

#[derive(Debug, Default)]
pub struct Issues {
    path: Vec<PathSegment>,
    errors: ValidationErrors,
}

impl Issues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, seg: impl Into<PathSegment>) {
        self.path.push(seg.into());
    }

    pub fn pop(&mut self) {
        self.path.pop();
    }

    /// Record an error at the current path.
    pub fn add(&mut self, error: impl Into<FieldError>) {
        let key = render_path(&self.path);
        let key = if key.is_empty() {
            NON_FIELD_ERRORS.to_string()
        } else {
            key
        };
        self.errors.add(key, error);
    }

    #[must_use]
    pub fn path(&self) -> String {
        render_path(&self.path)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn finish(self) -> ValidationErrors {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_path_joins_fields_and_indices() {
        let path = vec![
            PathSegment::from("mpg"),
            PathSegment::from(0),
            PathSegment::from("loaded"),
        ];

        assert_eq!(render_path(&path), "mpg[0].loaded");
    }

    #[test]
    fn issues_key_errors_by_current_path() {
        let mut issues = Issues::new();
        issues.push("tags");
        issues.push(2);
        issues.add(FieldErrorKind::Blank);
        issues.pop();
        issues.pop();
        issues.add(FieldError::new(FieldErrorKind::Custom, "bad combo"));

        let errs = issues.finish();
        assert!(errs.has("tags[2]", FieldErrorKind::Blank));
        assert!(errs.has(NON_FIELD_ERRORS, FieldErrorKind::Custom));
        assert_eq!(errs.len(), 2);
    }

    #[test]
    fn json_shape_lists_messages_per_path() {
        let mut errs = ValidationErrors::new();
        errs.add("name", FieldErrorKind::Required);

        assert_eq!(
            errs.to_json(),
            serde_json::json!({ "name": ["This field is required."] })
        );
    }
}
