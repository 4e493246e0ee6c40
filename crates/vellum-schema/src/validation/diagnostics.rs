use std::fmt;
use vellum_tree::Name;

/// One step on the path from the validated root to the offending item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment<'a> {
    Field(Name<'a>),
    Index(usize),
    Attribute(Name<'a>),
}

impl fmt::Display for PathSegment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, ".{name}"),
            PathSegment::Index(i) => write!(f, "[{i}]"),
            PathSegment::Attribute(name) => write!(f, "@{name}"),
        }
    }
}

/// The validator's error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    TypeMismatch,
    UnionMismatch,
    MissingField,
    ContentLengthMismatch,
    CycleDetected,
    DepthExceeded,
}

impl ValidationErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            ValidationErrorKind::TypeMismatch => "TYPE_MISMATCH",
            ValidationErrorKind::UnionMismatch => "UNION_MISMATCH",
            ValidationErrorKind::MissingField => "MISSING_FIELD",
            ValidationErrorKind::ContentLengthMismatch => "CONTENT_LENGTH_MISMATCH",
            ValidationErrorKind::CycleDetected => "CYCLE_DETECTED",
            ValidationErrorKind::DepthExceeded => "DEPTH_EXCEEDED",
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A structured validation error: kind, human message, and the path from the
/// root to the item that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError<'a> {
    pub kind: ValidationErrorKind,
    pub message: String,
    pub path: Vec<PathSegment<'a>>,
}

impl std::error::Error for ValidationError<'_> {}

impl fmt::Display for ValidationError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if !self.path.is_empty() {
            write!(f, " at $")?;
            for segment in &self.path {
                write!(f, "{segment}")?;
            }
        }
        Ok(())
    }
}

/// The outcome of a validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult<'a> {
    pub valid: bool,
    pub errors: Vec<ValidationError<'a>>,
}

impl<'a> ValidationResult<'a> {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}
