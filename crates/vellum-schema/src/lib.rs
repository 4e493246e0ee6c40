//! `vellum-schema` validates vellum value trees against a declarative type
//! language: primitives, arrays, shape-typed maps, elements with attribute
//! shapes and content-length constraints, ordered unions, occurrence
//! operators (`?`, `+`, `*`), and named type references with cycle handling.
//!
//! Validation accumulates structured errors with paths instead of aborting;
//! the caller inspects the [`ValidationResult`] afterwards.
//!
//! ## Example
//! ```rust
//! use vellum_schema::{TypeRegistry, Validator};
//! use vellum_tree::{Arena, Item, TypeDesc, TypeTag};
//!
//! let arena = Arena::new();
//! let registry = TypeRegistry::new();
//! let validator = Validator::new(&registry);
//!
//! let string = TypeDesc::primitive(&arena, TypeTag::String);
//! let int = TypeDesc::primitive(&arena, TypeTag::Int);
//! let boolean = TypeDesc::primitive(&arena, TypeTag::Bool);
//! let union = TypeDesc::union(&arena, &[string, int, boolean]);
//!
//! let result = validator.validate(Item::Int(42), union);
//! assert!(result.valid);
//!
//! let result = validator.validate(Item::float(3.14), union);
//! assert!(!result.valid);
//! assert_eq!(result.error_count(), 1);
//! ```

mod diagnostic;
mod registry;
mod validation;

pub use diagnostic::write_parse_reports;
pub use registry::TypeRegistry;
pub use validation::{
    validate_against_type, InvalidDocument, PathSegment, ValidationError, ValidationErrorKind,
    ValidationOptions, ValidationResult, Validator,
};

#[cfg(test)]
mod tests;
