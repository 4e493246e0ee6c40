use crate::{Arena, Name, TypeTag};
use std::fmt;

/// A named, typed field of a map or element-attribute shape.
#[derive(Clone, Copy)]
pub struct Field<'a> {
    pub name: Name<'a>,
    pub ty: &'a TypeDesc<'a>,
}

/// Occurrence operator on a unary type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    /// `?` — zero or one.
    Optional,
    /// `+` — one or more.
    OneOrMore,
    /// `*` — zero or more.
    ZeroOrMore,
}

impl Occurrence {
    pub fn symbol(self) -> char {
        match self {
            Occurrence::Optional => '?',
            Occurrence::OneOrMore => '+',
            Occurrence::ZeroOrMore => '*',
        }
    }
}

/// A type descriptor — schema values are themselves items (`Item::Type`).
///
/// Descriptors are immutable once built and, like every other tree node, live
/// in the arena.
pub enum TypeDesc<'a> {
    Primitive(TypeTag),
    Array {
        item: &'a TypeDesc<'a>,
    },
    Map {
        fields: &'a [Field<'a>],
    },
    Element {
        tag: Name<'a>,
        attrs: &'a [Field<'a>],
        content_length: Option<usize>,
    },
    Union {
        variants: &'a [&'a TypeDesc<'a>],
    },
    Occur {
        item: &'a TypeDesc<'a>,
        op: Occurrence,
    },
    /// Named reference, resolved through the type registry.
    Reference {
        name: Name<'a>,
    },
}

impl<'a> TypeDesc<'a> {
    pub fn primitive(arena: &'a Arena, tag: TypeTag) -> &'a TypeDesc<'a> {
        arena.alloc(TypeDesc::Primitive(tag))
    }

    pub fn array(arena: &'a Arena, item: &'a TypeDesc<'a>) -> &'a TypeDesc<'a> {
        arena.alloc(TypeDesc::Array { item })
    }

    pub fn map(arena: &'a Arena, fields: &[Field<'a>]) -> &'a TypeDesc<'a> {
        arena.alloc(TypeDesc::Map {
            fields: arena.alloc_slice(fields),
        })
    }

    pub fn element(
        arena: &'a Arena,
        tag: Name<'a>,
        attrs: &[Field<'a>],
        content_length: Option<usize>,
    ) -> &'a TypeDesc<'a> {
        arena.alloc(TypeDesc::Element {
            tag,
            attrs: arena.alloc_slice(attrs),
            content_length,
        })
    }

    pub fn union(arena: &'a Arena, variants: &[&'a TypeDesc<'a>]) -> &'a TypeDesc<'a> {
        arena.alloc(TypeDesc::Union {
            variants: arena.alloc_slice(variants),
        })
    }

    pub fn occur(arena: &'a Arena, item: &'a TypeDesc<'a>, op: Occurrence) -> &'a TypeDesc<'a> {
        arena.alloc(TypeDesc::Occur { item, op })
    }

    pub fn reference(arena: &'a Arena, name: Name<'a>) -> &'a TypeDesc<'a> {
        arena.alloc(TypeDesc::Reference { name })
    }
}

impl fmt::Display for TypeDesc<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Primitive(tag) => write!(f, "{tag}"),
            TypeDesc::Array { item } => write!(f, "[{item}]"),
            TypeDesc::Map { fields } => {
                f.write_str("{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.ty)?;
                }
                f.write_str("}")
            }
            TypeDesc::Element {
                tag,
                attrs,
                content_length,
            } => {
                write!(f, "<{tag}")?;
                for field in attrs.iter() {
                    write!(f, " {}:{}", field.name, field.ty)?;
                }
                if let Some(n) = content_length {
                    write!(f, " #{n}")?;
                }
                f.write_str(">")
            }
            TypeDesc::Union { variants } => {
                for (i, v) in variants.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{v}")?;
                }
                Ok(())
            }
            TypeDesc::Occur { item, op } => write!(f, "{item}{}", op.symbol()),
            TypeDesc::Reference { name } => write!(f, "{name}"),
        }
    }
}

impl fmt::Debug for TypeDesc<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NamePool;

    #[test]
    fn display_forms() {
        let arena = Arena::new();
        let names = NamePool::new(&arena);

        let int = TypeDesc::primitive(&arena, TypeTag::Int);
        let string = TypeDesc::primitive(&arena, TypeTag::String);
        let boolean = TypeDesc::primitive(&arena, TypeTag::Bool);

        let union = TypeDesc::union(&arena, &[string, int, boolean]);
        assert_eq!(union.to_string(), "string|int|bool");

        let arr = TypeDesc::array(&arena, int);
        assert_eq!(arr.to_string(), "[int]");

        let opt = TypeDesc::occur(&arena, string, Occurrence::Optional);
        assert_eq!(opt.to_string(), "string?");

        let map = TypeDesc::map(
            &arena,
            &[Field {
                name: names.intern("a"),
                ty: int,
            }],
        );
        assert_eq!(map.to_string(), "{a: int}");
    }
}
