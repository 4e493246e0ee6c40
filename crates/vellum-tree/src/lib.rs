//! `vellum-tree` is the value representation shared by every parser in the
//! vellum toolchain.
//!
//! All parsed documents, whatever their source format, land in the same
//! in-memory shape: a rooted tree of [`Item`]s — scalars, strings, symbols,
//! ordered sequences, shape-typed maps, and named elements with attributes
//! and ordered children. Every allocation reachable from a root item lives in
//! a single [`Arena`] and is released all at once when the arena drops.
//!
//! ## Example
//! ```rust
//! use vellum_tree::{Arena, Element, Item, NamePool};
//!
//! let arena = Arena::new();
//! let names = NamePool::new(&arena);
//!
//! let doc = Element::new_in(&arena, names.intern("doc"));
//! doc.set_attr(names.intern("lang"), Item::String(arena.alloc_str("en")));
//! doc.add_child(Item::Int(42));
//!
//! assert_eq!(doc.content_length(), 1);
//! assert_eq!(vellum_tree::serialize_mark(Item::Element(doc)), "<doc lang:\"en\"; 42>");
//! ```

mod arena;
mod element;
mod error;
mod item;
mod limit;
mod map;
mod name;
mod seq;
mod serialize;
mod strbuf;
mod types;

pub use arena::Arena;
pub use element::Element;
pub use error::{ErrorCode, ParseError};
pub use item::{Item, TypeTag};
pub use limit::Depth;
pub use map::Map;
pub use name::{Name, NamePool};
pub use seq::List;
pub use serialize::{serialize_json, serialize_mark};
pub use strbuf::StrBuf;
pub use types::{Field, Occurrence, TypeDesc};
