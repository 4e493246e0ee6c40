use indexmap::IndexMap;
use vellum_tree::TypeDesc;

/// Named types, looked up by [`TypeDesc::Reference`] descriptors.
///
/// Registration order is preserved for introspection; registering a name
/// again overwrites the earlier descriptor.
pub struct TypeRegistry<'a> {
    types: IndexMap<String, &'a TypeDesc<'a>>,
}

impl<'a> TypeRegistry<'a> {
    pub fn new() -> Self {
        Self {
            types: IndexMap::new(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, ty: &'a TypeDesc<'a>) {
        self.types.insert(name.into(), ty);
    }

    pub fn lookup(&self, name: &str) -> Option<&'a TypeDesc<'a>> {
        self.types.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(|s| s.as_str())
    }
}

impl Default for TypeRegistry<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_tree::{Arena, TypeTag};

    #[test]
    fn later_registration_wins() {
        let arena = Arena::new();
        let mut registry = TypeRegistry::new();

        registry.register("id", TypeDesc::primitive(&arena, TypeTag::Int));
        registry.register("id", TypeDesc::primitive(&arena, TypeTag::String));

        assert_eq!(registry.len(), 1);
        assert!(matches!(
            registry.lookup("id"),
            Some(TypeDesc::Primitive(TypeTag::String))
        ));
        assert!(registry.lookup("missing").is_none());
    }
}
