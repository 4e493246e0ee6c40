//! `vellum-ingest` turns bytes into vellum value trees.
//!
//! The crate owns the outermost layers of the toolchain: URL-addressed
//! resource acquisition with a two-level cache (parsed-tree LRU in memory,
//! content-addressable files on disk), the format dispatcher, and the
//! per-format parsers that are thin consumers of the shared value model.
//! HTML and math sources route to their dedicated crates.
//!
//! ## Example
//! ```rust
//! use vellum_ingest::{Format, Input};
//! use vellum_tree::Arena;
//!
//! let arena = Arena::new();
//! let input = Input::from_source(&arena, "{\"a\": [1, true, null]}", "json").unwrap();
//! assert!(!input.root.is_error());
//! assert_eq!(vellum_tree::serialize_json(input.root), "{\"a\":[1,true,null]}");
//!
//! let missing = Input::from_source(&arena, "...", "unknown-format");
//! assert!(missing.is_none());
//! # let _ = Format::Json;
//! ```

mod dir;
mod document;
mod fetch;
mod formats;
mod input;

pub use document::Document;
pub use fetch::{CacheConfig, DocumentCache, FetchError, FileCache, MemCacheConfig, Session};
pub use input::{Format, Input};
