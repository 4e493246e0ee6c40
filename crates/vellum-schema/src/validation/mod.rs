//! Type-directed validation of value trees.

mod diagnostics;

pub use diagnostics::{PathSegment, ValidationError, ValidationErrorKind, ValidationResult};

use crate::TypeRegistry;
use vellum_tree::{Depth, Item, Occurrence, TypeDesc};

/// Knobs for a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Strict mode implies `allow_unknown_fields = false`.
    pub strict_mode: bool,
    pub allow_unknown_fields: bool,
    pub allow_empty_elements: bool,
    pub max_depth: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            strict_mode: false,
            allow_unknown_fields: true,
            allow_empty_elements: true,
            max_depth: 1024,
        }
    }
}

/// Validation failure summary, for callers that want a `Result`.
#[derive(Debug, thiserror::Error)]
#[error("validation failed with {count} error(s): {first}")]
pub struct InvalidDocument {
    pub count: usize,
    /// The first error, rendered.
    pub first: String,
}

/// Validates items against type descriptors, resolving named references
/// through a [`TypeRegistry`].
pub struct Validator<'a, 'r> {
    registry: &'r TypeRegistry<'a>,
    options: ValidationOptions,
}

impl<'a, 'r> Validator<'a, 'r> {
    pub fn new(registry: &'r TypeRegistry<'a>) -> Self {
        Self {
            registry,
            options: ValidationOptions::default(),
        }
    }

    pub fn with_options(registry: &'r TypeRegistry<'a>, options: ValidationOptions) -> Self {
        Self { registry, options }
    }

    /// Validate `item` against `ty`, accumulating every error found.
    pub fn validate(&self, item: Item<'a>, ty: &'a TypeDesc<'a>) -> ValidationResult<'a> {
        let mut walker = Walker {
            registry: self.registry,
            options: self.options,
            depth: Depth::new(self.options.max_depth),
            visiting: Vec::new(),
            path: Vec::new(),
            errors: Vec::new(),
            cycle_reported: false,
        };
        walker.validate(item, ty);
        ValidationResult {
            valid: walker.errors.is_empty(),
            errors: walker.errors,
        }
    }

    /// `Result`-shaped convenience over [`validate`](Validator::validate).
    pub fn check(&self, item: Item<'a>, ty: &'a TypeDesc<'a>) -> Result<(), InvalidDocument> {
        let result = self.validate(item, ty);
        if result.valid {
            Ok(())
        } else {
            Err(InvalidDocument {
                count: result.errors.len(),
                first: result.errors[0].to_string(),
            })
        }
    }
}

struct Walker<'a, 'r> {
    registry: &'r TypeRegistry<'a>,
    options: ValidationOptions,
    depth: Depth,
    /// Reference names currently being validated higher in this descent.
    visiting: Vec<String>,
    path: Vec<PathSegment<'a>>,
    errors: Vec<ValidationError<'a>>,
    cycle_reported: bool,
}

impl<'a, 'r> Walker<'a, 'r> {
    fn error(&mut self, kind: ValidationErrorKind, message: String) {
        self.errors.push(ValidationError {
            kind,
            message,
            path: self.path.clone(),
        });
    }

    fn allow_unknown_fields(&self) -> bool {
        self.options.allow_unknown_fields && !self.options.strict_mode
    }

    /// Recurse one level down, guarded by the depth limit. Returns `false`
    /// (after reporting) when the limit is hit.
    fn descend(&mut self, segment: PathSegment<'a>, item: Item<'a>, ty: &'a TypeDesc<'a>) {
        if !self.depth.descend() {
            if !matches!(
                self.errors.last(),
                Some(e) if e.kind == ValidationErrorKind::DepthExceeded
            ) {
                self.error(
                    ValidationErrorKind::DepthExceeded,
                    format!("validation depth exceeds {}", self.options.max_depth),
                );
            }
            return;
        }
        self.path.push(segment);
        self.validate(item, ty);
        self.path.pop();
        self.depth.ascend();
    }

    fn validate(&mut self, item: Item<'a>, ty: &'a TypeDesc<'a>) {
        match ty {
            TypeDesc::Primitive(tag) => {
                if item.tag() != *tag {
                    self.error(
                        ValidationErrorKind::TypeMismatch,
                        format!("expected {tag}, found {}", item.tag()),
                    );
                }
            }

            TypeDesc::Array { item: elem_ty } => {
                let Some(list) = item.as_list() else {
                    self.error(
                        ValidationErrorKind::TypeMismatch,
                        format!("expected list, found {}", item.tag()),
                    );
                    return;
                };
                for (i, child) in list.to_vec().into_iter().enumerate() {
                    self.descend(PathSegment::Index(i), child, *elem_ty);
                }
            }

            TypeDesc::Map { fields } => {
                let Some(map) = item.as_map() else {
                    self.error(
                        ValidationErrorKind::TypeMismatch,
                        format!("expected map, found {}", item.tag()),
                    );
                    return;
                };
                for field in fields.iter() {
                    match map.get(field.name.as_str()) {
                        Some(value) => {
                            self.descend(PathSegment::Field(field.name), value, field.ty)
                        }
                        None if is_optional(field.ty) => {}
                        None => self.error(
                            ValidationErrorKind::MissingField,
                            format!("missing field `{}`", field.name),
                        ),
                    }
                }
                if !self.allow_unknown_fields() {
                    for (name, _) in map.entries() {
                        if !fields.iter().any(|f| f.name == name) {
                            self.error(
                                ValidationErrorKind::TypeMismatch,
                                format!("unknown field `{name}`"),
                            );
                        }
                    }
                }
            }

            TypeDesc::Element {
                tag,
                attrs,
                content_length,
            } => {
                let Some(element) = item.as_element() else {
                    self.error(
                        ValidationErrorKind::TypeMismatch,
                        format!("expected element <{tag}>, found {}", item.tag()),
                    );
                    return;
                };
                if element.tag() != *tag {
                    self.error(
                        ValidationErrorKind::TypeMismatch,
                        format!("expected element <{tag}>, found <{}>", element.tag()),
                    );
                    return;
                }
                for field in attrs.iter() {
                    match element.attr(field.name.as_str()) {
                        Some(value) => {
                            self.descend(PathSegment::Attribute(field.name), value, field.ty)
                        }
                        None if is_optional(field.ty) => {}
                        None => self.error(
                            ValidationErrorKind::MissingField,
                            format!("missing attribute `{}` on <{tag}>", field.name),
                        ),
                    }
                }
                if let Some(expected) = content_length {
                    let found = element.content_length();
                    if found != *expected {
                        self.error(
                            ValidationErrorKind::ContentLengthMismatch,
                            format!("<{tag}> has {found} children, expected {expected}"),
                        );
                    }
                } else if !self.options.allow_empty_elements && element.content_length() == 0 {
                    self.error(
                        ValidationErrorKind::ContentLengthMismatch,
                        format!("<{tag}> is empty"),
                    );
                }
            }

            TypeDesc::Union { variants } => {
                // alternatives are tried in order on scratch walkers; the
                // first success wins
                for &variant in variants.iter() {
                    let mut scratch = Walker {
                        registry: self.registry,
                        options: self.options,
                        depth: self.depth,
                        visiting: self.visiting.clone(),
                        path: Vec::new(),
                        errors: Vec::new(),
                        cycle_reported: self.cycle_reported,
                    };
                    scratch.validate(item, variant);
                    if scratch.errors.is_empty() {
                        return;
                    }
                }
                self.error(
                    ValidationErrorKind::UnionMismatch,
                    format!("{} does not match any of {ty}", item.tag()),
                );
            }

            TypeDesc::Occur { item: inner, op } => {
                // a single item trivially satisfies `?`, `+`, and `*`; the
                // occurrence only constrains counts in sequence contexts
                if item.is_null() && matches!(op, Occurrence::Optional | Occurrence::ZeroOrMore) {
                    return;
                }
                self.validate(item, *inner);
            }

            TypeDesc::Reference { name } => {
                if self.visiting.iter().any(|n| n == name.as_str()) {
                    // a re-entered reference is the recursive-data base case
                    return;
                }
                let Some(resolved) = self.resolve(name.as_str()) else {
                    return;
                };
                self.visiting.push(name.as_str().to_string());
                self.validate(item, resolved);
                self.visiting.pop();
            }
        }
    }

    /// Follow a chain of named references to a concrete type. A chain that
    /// loops without reaching one is reported as `CYCLE_DETECTED`, once.
    fn resolve(&mut self, name: &str) -> Option<&'a TypeDesc<'a>> {
        let mut seen = vec![name.to_string()];
        let mut current = name;
        loop {
            let Some(ty) = self.registry.lookup(current) else {
                self.error(
                    ValidationErrorKind::TypeMismatch,
                    format!("unknown type `{current}`"),
                );
                return None;
            };
            match ty {
                TypeDesc::Reference { name: next } => {
                    if seen.iter().any(|n| n == next.as_str()) {
                        if !self.cycle_reported {
                            self.cycle_reported = true;
                            self.error(
                                ValidationErrorKind::CycleDetected,
                                format!("type reference cycle through `{current}`"),
                            );
                        }
                        return None;
                    }
                    seen.push(next.as_str().to_string());
                    current = next.as_str();
                }
                concrete => return Some(concrete),
            }
        }
    }
}

fn is_optional(ty: &TypeDesc<'_>) -> bool {
    matches!(
        ty,
        TypeDesc::Occur {
            op: Occurrence::Optional | Occurrence::ZeroOrMore,
            ..
        }
    )
}

/// Free-function form of [`Validator::validate`].
pub fn validate_against_type<'a>(
    validator: &Validator<'a, '_>,
    item: Item<'a>,
    ty: &'a TypeDesc<'a>,
) -> ValidationResult<'a> {
    validator.validate(item, ty)
}

