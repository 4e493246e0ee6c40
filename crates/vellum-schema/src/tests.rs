use crate::{
    TypeRegistry, ValidationErrorKind, ValidationOptions, Validator,
};
use pretty_assertions::assert_eq;
use vellum_tree::{
    Arena, Element, Field, Item, List, Map, NamePool, Occurrence, TypeDesc, TypeTag,
};

fn primitives<'a>(
    arena: &'a Arena,
) -> (&'a TypeDesc<'a>, &'a TypeDesc<'a>, &'a TypeDesc<'a>) {
    (
        TypeDesc::primitive(arena, TypeTag::String),
        TypeDesc::primitive(arena, TypeTag::Int),
        TypeDesc::primitive(arena, TypeTag::Bool),
    )
}

#[test]
fn primitive_match_and_mismatch() {
    let arena = Arena::new();
    let registry = TypeRegistry::new();
    let validator = Validator::new(&registry);
    let (string, int, _) = primitives(&arena);

    assert!(validator.validate(Item::Int(1), int).valid);
    let result = validator.validate(Item::Int(1), string);
    assert!(!result.valid);
    assert_eq!(result.errors[0].kind, ValidationErrorKind::TypeMismatch);
}

#[test]
fn union_tries_alternatives_in_order() {
    let arena = Arena::new();
    let registry = TypeRegistry::new();
    let validator = Validator::new(&registry);
    let (string, int, boolean) = primitives(&arena);
    let union = TypeDesc::union(&arena, &[string, int, boolean]);

    let ok = validator.validate(Item::Int(42), union);
    assert!(ok.valid);
    assert_eq!(ok.error_count(), 0);

    let bad = validator.validate(Item::float(3.14), union);
    assert!(!bad.valid);
    assert_eq!(bad.error_count(), 1);
    assert_eq!(bad.errors[0].kind, ValidationErrorKind::UnionMismatch);
    assert!(bad.errors[0].message.contains("string|int|bool"));
}

#[test]
fn array_errors_carry_index_paths() {
    let arena = Arena::new();
    let registry = TypeRegistry::new();
    let validator = Validator::new(&registry);
    let (_, int, _) = primitives(&arena);
    let ints = TypeDesc::array(&arena, int);

    let list = List::new_in(&arena);
    list.push(Item::Int(1));
    list.push(Item::Bool(true));
    list.push(Item::Int(3));

    let result = validator.validate(Item::List(list), ints);
    assert!(!result.valid);
    assert_eq!(result.error_count(), 1);
    assert_eq!(result.errors[0].to_string(), "TYPE_MISMATCH: expected int, found bool at $[1]");
}

#[test]
fn map_fields_and_optional_occurrence() {
    let arena = Arena::new();
    let names = NamePool::new(&arena);
    let registry = TypeRegistry::new();
    let validator = Validator::new(&registry);
    let (string, int, _) = primitives(&arena);

    let shape = TypeDesc::map(
        &arena,
        &[
            Field {
                name: names.intern("id"),
                ty: int,
            },
            Field {
                name: names.intern("label"),
                ty: TypeDesc::occur(&arena, string, Occurrence::Optional),
            },
        ],
    );

    let map = Map::new_in(&arena);
    map.put(names.intern("id"), Item::Int(7));
    assert!(validator.validate(Item::Map(map), shape).valid);

    let missing = Map::new_in(&arena);
    missing.put(names.intern("label"), Item::String(arena.alloc_str("x")));
    let result = validator.validate(Item::Map(missing), shape);
    assert!(!result.valid);
    assert_eq!(result.errors[0].kind, ValidationErrorKind::MissingField);
}

#[test]
fn strict_mode_rejects_unknown_fields() {
    let arena = Arena::new();
    let names = NamePool::new(&arena);
    let registry = TypeRegistry::new();
    let (_, int, _) = primitives(&arena);
    let shape = TypeDesc::map(
        &arena,
        &[Field {
            name: names.intern("id"),
            ty: int,
        }],
    );

    let map = Map::new_in(&arena);
    map.put(names.intern("id"), Item::Int(1));
    map.put(names.intern("extra"), Item::Bool(false));

    let lenient = Validator::new(&registry);
    assert!(lenient.validate(Item::Map(map), shape).valid);

    let strict = Validator::with_options(
        &registry,
        ValidationOptions {
            strict_mode: true,
            ..ValidationOptions::default()
        },
    );
    let result = strict.validate(Item::Map(map), shape);
    assert!(!result.valid);
    assert!(result.errors[0].message.contains("extra"));
}

#[test]
fn element_tag_attrs_and_content_length() {
    let arena = Arena::new();
    let names = NamePool::new(&arena);
    let registry = TypeRegistry::new();
    let validator = Validator::new(&registry);
    let (string, _, _) = primitives(&arena);

    let link_ty = TypeDesc::element(
        &arena,
        names.intern("link"),
        &[Field {
            name: names.intern("href"),
            ty: string,
        }],
        Some(1),
    );

    let link = Element::new_in(&arena, names.intern("link"));
    link.set_attr(names.intern("href"), Item::String(arena.alloc_str("/a")));
    link.add_child(Item::String(arena.alloc_str("home")));
    assert!(validator.validate(Item::Element(link), link_ty).valid);

    // wrong tag
    let span = Element::new_in(&arena, names.intern("span"));
    let result = validator.validate(Item::Element(span), link_ty);
    assert_eq!(result.errors[0].kind, ValidationErrorKind::TypeMismatch);

    // missing attribute and wrong child count
    let bare = Element::new_in(&arena, names.intern("link"));
    let result = validator.validate(Item::Element(bare), link_ty);
    assert!(!result.valid);
    assert_eq!(result.error_count(), 2);
    assert_eq!(result.errors[0].kind, ValidationErrorKind::MissingField);
    assert_eq!(
        result.errors[1].kind,
        ValidationErrorKind::ContentLengthMismatch
    );
}

#[test]
fn reference_resolution_through_registry() {
    let arena = Arena::new();
    let names = NamePool::new(&arena);
    let mut registry = TypeRegistry::new();
    let (_, int, _) = primitives(&arena);
    registry.register("id", int);

    let reference = TypeDesc::reference(&arena, names.intern("id"));
    let validator = Validator::new(&registry);
    assert!(validator.validate(Item::Int(3), reference).valid);

    let unknown = TypeDesc::reference(&arena, names.intern("nope"));
    let result = validator.validate(Item::Int(3), unknown);
    assert!(!result.valid);
    assert!(result.errors[0].message.contains("nope"));
}

#[test]
fn recursive_reference_validates_recursive_data() {
    // node = { value: int, next: node? }
    let arena = Arena::new();
    let names = NamePool::new(&arena);
    let mut registry = TypeRegistry::new();
    let (_, int, _) = primitives(&arena);

    let node_ref = TypeDesc::reference(&arena, names.intern("node"));
    let node_ty = TypeDesc::map(
        &arena,
        &[
            Field {
                name: names.intern("value"),
                ty: int,
            },
            Field {
                name: names.intern("next"),
                ty: TypeDesc::occur(&arena, node_ref, Occurrence::Optional),
            },
        ],
    );
    registry.register("node", node_ty);

    let tail = Map::new_in(&arena);
    tail.put(names.intern("value"), Item::Int(2));
    let head = Map::new_in(&arena);
    head.put(names.intern("value"), Item::Int(1));
    head.put(names.intern("next"), Item::Map(tail));

    let validator = Validator::new(&registry);
    let result = validator.validate(Item::Map(head), node_ref);
    assert!(result.valid, "errors: {:?}", result.errors);
}

#[test]
fn pure_reference_cycle_reports_once_and_terminates() {
    let arena = Arena::new();
    let names = NamePool::new(&arena);
    let mut registry = TypeRegistry::new();

    registry.register("a", TypeDesc::reference(&arena, names.intern("b")));
    registry.register("b", TypeDesc::reference(&arena, names.intern("a")));

    let validator = Validator::new(&registry);
    let entry = TypeDesc::reference(&arena, names.intern("a"));
    let result = validator.validate(Item::Int(1), entry);

    let cycles = result
        .errors
        .iter()
        .filter(|e| e.kind == ValidationErrorKind::CycleDetected)
        .count();
    assert_eq!(cycles, 1);
}

#[test]
fn depth_limit_boundary() {
    let arena = Arena::new();
    let registry = TypeRegistry::new();
    let (_, int, _) = primitives(&arena);

    // nested array types and matching nested lists
    fn nest<'a>(arena: &'a Arena, ty: &'a TypeDesc<'a>, levels: usize) -> &'a TypeDesc<'a> {
        let mut ty = ty;
        for _ in 0..levels {
            ty = TypeDesc::array(arena, ty);
        }
        ty
    }
    fn nested_list<'a>(arena: &'a Arena, levels: usize) -> Item<'a> {
        let mut item = Item::Int(1);
        for _ in 0..levels {
            let list = List::new_in(arena);
            list.push(item);
            item = Item::List(list);
        }
        item
    }

    let options = ValidationOptions {
        max_depth: 4,
        ..ValidationOptions::default()
    };
    let validator = Validator::with_options(&registry, options);

    // exactly max_depth nesting validates
    let ok = validator.validate(nested_list(&arena, 4), nest(&arena, int, 4));
    assert!(ok.valid, "errors: {:?}", ok.errors);

    // one deeper is refused
    let deep = validator.validate(nested_list(&arena, 5), nest(&arena, int, 5));
    assert!(!deep.valid);
    assert_eq!(deep.errors[0].kind, ValidationErrorKind::DepthExceeded);
    assert_eq!(deep.error_count(), 1);
}

#[test]
fn occurrence_operators_accept_single_items() {
    let arena = Arena::new();
    let registry = TypeRegistry::new();
    let validator = Validator::new(&registry);
    let (_, int, _) = primitives(&arena);

    for op in [
        Occurrence::Optional,
        Occurrence::OneOrMore,
        Occurrence::ZeroOrMore,
    ] {
        let ty = TypeDesc::occur(&arena, int, op);
        assert!(validator.validate(Item::Int(5), ty).valid);
    }

    // null satisfies the zero-permitting operators
    let optional = TypeDesc::occur(&arena, int, Occurrence::Optional);
    assert!(validator.validate(Item::Null, optional).valid);
    let plus = TypeDesc::occur(&arena, int, Occurrence::OneOrMore);
    assert!(!validator.validate(Item::Null, plus).valid);
}
