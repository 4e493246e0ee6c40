use crate::{Format, Input};
use vellum_tree::{Arena, Item, ParseError};

/// An owning parsed document: the arena and the root item bundled together,
/// suitable for caching and for handing across API boundaries without
/// threading arena lifetimes.
///
/// This is the owned counterpart of [`Input`], which borrows a
/// caller-managed arena.
pub struct Document {
    // SAFETY invariant: `root` (and every item reachable from it) points
    // into `arena`, which is heap-boxed so its address survives moves of
    // the `Document`. The fabricated 'static lifetime never escapes:
    // `root()` reborrows at the lifetime of `&self`, and the arena is
    // dropped only when the whole `Document` is.
    arena: Box<Arena>,
    root: Item<'static>,
    errors: Vec<ParseError>,
}

impl Document {
    /// Parse `source` as `format` into a self-contained document.
    pub fn parse(source: &str, format: Format) -> Document {
        let arena = Box::new(Arena::with_capacity(source.len()));
        // SAFETY: see the struct invariant; the reference is only used to
        // allocate into the boxed arena this Document owns.
        let arena_ref: &'static Arena = unsafe { &*(arena.as_ref() as *const Arena) };
        let input = Input::from_source_with_format(arena_ref, source, format);
        Document {
            arena,
            root: input.root,
            errors: input.errors,
        }
    }

    /// A recursive directory listing as a self-contained document.
    pub fn parse_directory(
        path: &std::path::Path,
        recursive: bool,
        max_depth: usize,
    ) -> std::io::Result<Document> {
        let arena = Box::new(Arena::new());
        // SAFETY: same invariant as in `parse`.
        let arena_ref: &'static Arena = unsafe { &*(arena.as_ref() as *const Arena) };
        let input = Input::from_directory(arena_ref, path, recursive, max_depth)?;
        Ok(Document {
            arena,
            root: input.root,
            errors: input.errors,
        })
    }

    /// The parsed root, valid for as long as this document is borrowed.
    pub fn root(&self) -> Item<'_> {
        // SAFETY: see the struct invariant; shortening the fabricated
        // 'static lifetime to that of &self is always sound since Item
        // borrows are only ever used for the lifetime of this Document.
        unsafe { std::mem::transmute::<Item<'static>, Item<'_>>(self.root) }
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Estimated retained memory, used by the parsed-tree cache bounds.
    pub fn memory_size(&self) -> usize {
        self.arena.allocated_bytes()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.root)
            .field("errors", &self.errors.len())
            .field("memory_size", &self.memory_size())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_outlives_parse_scope() {
        let doc = Document::parse("{\"a\": [1, 2]}", Format::Json);
        let moved = doc; // address stability across moves
        let root = moved.root();
        let map = root.as_map().expect("map root");
        assert_eq!(map.get("a").and_then(|v| v.as_list()).map(|l| l.len()), Some(2));
    }
}
