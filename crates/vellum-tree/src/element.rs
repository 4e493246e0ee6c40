use crate::{Arena, Item, Name};
use bumpalo::collections::Vec as BumpVec;
use std::cell::{Ref, RefCell};
use std::fmt;

/// A named element: an ordered attribute bag plus an ordered child sequence.
///
/// Elements are simultaneously map-like (attributes) and list-like (children,
/// mixed text and nested elements). Both halves are mutable through a shared
/// reference because tree construction keeps appending to — and occasionally
/// reparenting — nodes long after they were inserted.
pub struct Element<'a> {
    tag: Name<'a>,
    attrs: RefCell<BumpVec<'a, (Name<'a>, Item<'a>)>>,
    children: RefCell<BumpVec<'a, Item<'a>>>,
}

impl<'a> Element<'a> {
    pub fn new_in(arena: &'a Arena, tag: Name<'a>) -> &'a Element<'a> {
        arena.alloc(Element {
            tag,
            attrs: RefCell::new(BumpVec::new_in(arena.bump())),
            children: RefCell::new(BumpVec::new_in(arena.bump())),
        })
    }

    pub fn tag(&self) -> Name<'a> {
        self.tag
    }

    /// Identity comparison: same node, not same shape.
    pub fn ptr_eq(&self, other: &Element<'a>) -> bool {
        std::ptr::eq(self, other)
    }

    // attributes

    /// Set an attribute, replacing any existing value for the same name. The
    /// first occurrence wins positionally, matching HTML's duplicate-attribute
    /// rule when callers skip the replace (see [`set_attr_if_missing`]).
    ///
    /// [`set_attr_if_missing`]: Element::set_attr_if_missing
    pub fn set_attr(&self, name: Name<'a>, value: Item<'a>) {
        let mut attrs = self.attrs.borrow_mut();
        if let Some(i) = attrs.iter().position(|(n, _)| *n == name) {
            attrs[i].1 = value;
        } else {
            attrs.push((name, value));
        }
    }

    /// Set an attribute only if absent. Duplicate attributes in a start tag
    /// are dropped, keeping the first.
    pub fn set_attr_if_missing(&self, name: Name<'a>, value: Item<'a>) {
        let mut attrs = self.attrs.borrow_mut();
        if !attrs.iter().any(|(n, _)| *n == name) {
            attrs.push((name, value));
        }
    }

    pub fn attr(&self, name: &str) -> Option<Item<'a>> {
        self.attrs
            .borrow()
            .iter()
            .find(|(n, _)| *n == *name)
            .map(|(_, v)| *v)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.borrow().iter().any(|(n, _)| *n == *name)
    }

    pub fn attr_count(&self) -> usize {
        self.attrs.borrow().len()
    }

    pub fn attrs(&self) -> Vec<(Name<'a>, Item<'a>)> {
        self.attrs.borrow().iter().copied().collect()
    }

    // children

    pub fn add_child(&self, child: Item<'a>) {
        self.children.borrow_mut().push(child);
    }

    pub fn child(&self, index: usize) -> Option<Item<'a>> {
        self.children.borrow().get(index).copied()
    }

    pub fn children(&self) -> Ref<'_, [Item<'a>]> {
        Ref::map(self.children.borrow(), |v| v.as_slice())
    }

    pub fn child_elements(&self) -> Vec<&'a Element<'a>> {
        self.children
            .borrow()
            .iter()
            .filter_map(|c| c.as_element())
            .collect()
    }

    /// Number of children; the element's `content_length`.
    pub fn content_length(&self) -> usize {
        self.children.borrow().len()
    }

    /// Insert `child` immediately before `reference` (matched by node
    /// identity). Appends when the reference is not among the children.
    pub fn insert_child_before(&self, reference: &Element<'a>, child: Item<'a>) {
        let mut children = self.children.borrow_mut();
        let at = children
            .iter()
            .position(|c| matches!(c, Item::Element(e) if e.ptr_eq(reference)));
        match at {
            Some(i) => children.insert(i, child),
            None => children.push(child),
        }
    }

    /// Detach a child element by identity. Returns whether it was present.
    pub fn remove_child_element(&self, target: &Element<'a>) -> bool {
        let mut children = self.children.borrow_mut();
        let at = children
            .iter()
            .position(|c| matches!(c, Item::Element(e) if e.ptr_eq(target)));
        match at {
            Some(i) => {
                children.remove(i);
                true
            }
            None => false,
        }
    }

    /// Move every child of `self` onto `target`, in order.
    pub fn move_children_to(&self, target: &Element<'a>) {
        let mut ours = self.children.borrow_mut();
        let mut theirs = target.children.borrow_mut();
        for child in ours.iter() {
            theirs.push(*child);
        }
        ours.clear();
    }

    /// Concatenated text of all string children, recursively.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in self.children.borrow().iter() {
            match child {
                Item::String(s) => out.push_str(s),
                Item::Element(e) => e.collect_text(out),
                _ => {}
            }
        }
    }
}

impl PartialEq for Element<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
            && self.attrs() == other.attrs()
            && *self.children() == *other.children()
    }
}

impl fmt::Debug for Element<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        for (name, value) in self.attrs.borrow().iter() {
            write!(f, " {name}:{value:?}")?;
        }
        let children = self.children.borrow();
        if children.is_empty() {
            write!(f, ">")
        } else {
            write!(f, ";")?;
            for child in children.iter() {
                write!(f, " {child:?}")?;
            }
            write!(f, ">")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NamePool;

    #[test]
    fn attrs_and_children() {
        let arena = Arena::new();
        let names = NamePool::new(&arena);
        let el = Element::new_in(&arena, names.intern("p"));

        el.set_attr(names.intern("id"), Item::String(arena.alloc_str("x")));
        el.set_attr_if_missing(names.intern("id"), Item::String(arena.alloc_str("y")));
        assert_eq!(el.attr("id"), Some(Item::String("x")));

        el.add_child(Item::String(arena.alloc_str("hi")));
        let inner = Element::new_in(&arena, names.intern("b"));
        el.add_child(Item::Element(inner));
        assert_eq!(el.content_length(), 2);
        assert_eq!(el.text_content(), "hi");
    }

    #[test]
    fn reparenting() {
        let arena = Arena::new();
        let names = NamePool::new(&arena);
        let parent = Element::new_in(&arena, names.intern("body"));
        let table = Element::new_in(&arena, names.intern("table"));
        parent.add_child(Item::Element(table));

        // foster-parented content lands before the table
        parent.insert_child_before(table, Item::String(arena.alloc_str("text")));
        assert_eq!(parent.child(0), Some(Item::String("text")));
        assert_eq!(parent.child(1), Some(Item::Element(table)));

        assert!(parent.remove_child_element(table));
        assert!(!parent.remove_child_element(table));
        assert_eq!(parent.content_length(), 1);
    }
}
