use crate::{Arena, Item, Name};
use bumpalo::collections::Vec as BumpVec;
use std::cell::{Ref, RefCell};
use std::fmt;

/// A shape-typed record: ordered named fields.
///
/// The shape is the ordered sequence of field names; values are stored in the
/// same order and read by scanning the shape. Field count is small and known
/// at parse time, so O(k) lookup beats hashing here — the original stored a
/// packed byte blob addressed through shape offsets, which collapses to the
/// parallel name/value vectors below.
pub struct Map<'a> {
    names: RefCell<BumpVec<'a, Name<'a>>>,
    values: RefCell<BumpVec<'a, Item<'a>>>,
}

impl<'a> Map<'a> {
    pub fn new_in(arena: &'a Arena) -> &'a Map<'a> {
        arena.alloc(Map {
            names: RefCell::new(BumpVec::new_in(arena.bump())),
            values: RefCell::new(BumpVec::new_in(arena.bump())),
        })
    }

    /// Insert or replace a field. Replacing keeps the field's original
    /// position in the shape.
    pub fn put(&self, name: Name<'a>, value: Item<'a>) {
        let mut names = self.names.borrow_mut();
        if let Some(i) = names.iter().position(|n| *n == name) {
            self.values.borrow_mut()[i] = value;
        } else {
            names.push(name);
            self.values.borrow_mut().push(value);
        }
    }

    pub fn get(&self, name: &str) -> Option<Item<'a>> {
        let names = self.names.borrow();
        let i = names.iter().position(|n| *n == *name)?;
        Some(self.values.borrow()[i])
    }

    pub fn get_index(&self, index: usize) -> Option<(Name<'a>, Item<'a>)> {
        let name = *self.names.borrow().get(index)?;
        Some((name, self.values.borrow()[index]))
    }

    pub fn len(&self) -> usize {
        self.names.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.borrow().is_empty()
    }

    /// The shape: ordered field names.
    pub fn names(&self) -> Ref<'_, [Name<'a>]> {
        Ref::map(self.names.borrow(), |v| v.as_slice())
    }

    pub fn entries(&self) -> Vec<(Name<'a>, Item<'a>)> {
        self.names
            .borrow()
            .iter()
            .copied()
            .zip(self.values.borrow().iter().copied())
            .collect()
    }
}

impl PartialEq for Map<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.entries() == other.entries()
    }
}

impl fmt::Debug for Map<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in self.entries() {
            map.entry(&name.as_str(), &value);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NamePool;

    #[test]
    fn put_get_replace() {
        let arena = Arena::new();
        let names = NamePool::new(&arena);
        let map = Map::new_in(&arena);

        map.put(names.intern("a"), Item::Int(1));
        map.put(names.intern("b"), Item::Bool(false));
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some(Item::Int(1)));

        // replacement keeps shape order
        map.put(names.intern("a"), Item::Int(7));
        assert_eq!(map.len(), 2);
        assert_eq!(map.get_index(0), Some((names.intern("a"), Item::Int(7))));
        assert_eq!(map.get("missing"), None);
    }
}
