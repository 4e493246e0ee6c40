//! Resource acquisition: URL resolution and the two-level cache in front of
//! the network.
//!
//! Lookup order is parsed-tree LRU (memory) → content-addressable file
//! cache (disk) → synchronous download. A failed download leaves the
//! resource absent from both caches.

mod disk;
mod memory;

pub use disk::{CacheConfig, FileCache};
pub use memory::{DocumentCache, MemCacheConfig};

use crate::{Document, Format};
use std::io::Read;
use std::path::Path;
use triomphe::Arc;

/// Maximum recursion when a directory URL expands into a listing tree.
const DIR_LISTING_DEPTH: usize = 16;

/// Download size cap; inputs must fit in memory.
const MAX_FETCH_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("unsupported url scheme in `{0}`")]
    UnsupportedScheme(String),
    #[error("http status {status} for `{url}`")]
    HttpStatus { url: String, status: u16 },
    #[error("transport error for `{url}`: {message}")]
    Transport { url: String, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A fetch/parse session owning both cache levels.
///
/// The session is the only shared mutable state across inputs; wrap it in a
/// lock before touching it from more than one thread.
pub struct Session {
    mem: DocumentCache,
    disk: FileCache,
}

impl Session {
    pub fn new() -> Session {
        Session::with_config(CacheConfig::default(), MemCacheConfig::default())
    }

    pub fn with_config(disk: CacheConfig, mem: MemCacheConfig) -> Session {
        Session {
            mem: DocumentCache::new(mem),
            disk: FileCache::new(disk),
        }
    }

    /// Raw bytes for `url`: disk cache, then network. Local files are read
    /// directly and never cached.
    pub fn fetch(&mut self, url: &str) -> Result<Vec<u8>, FetchError> {
        if let Some(path) = url.strip_prefix("file://") {
            return Ok(std::fs::read(path)?);
        }
        if url.starts_with("http://") || url.starts_with("https://") {
            if let Some(bytes) = self.disk.lookup(url) {
                return Ok(bytes);
            }
            let bytes = download(url)?;
            if let Err(error) = self.disk.store(url, &bytes) {
                tracing::warn!(url, %error, "failed to cache downloaded bytes");
            }
            return Ok(bytes);
        }
        if url.contains("://") {
            return Err(FetchError::UnsupportedScheme(url.to_string()));
        }
        // bare path
        Ok(std::fs::read(url)?)
    }

    /// Fetch and dispatch in one step. Returns `None` when the fetch fails
    /// or no parser matches the type hint / extension.
    pub fn input_from_url(
        &mut self,
        url: &str,
        type_hint: Option<&str>,
        cwd: Option<&Path>,
        base: Option<&str>,
    ) -> Option<Arc<Document>> {
        let resolved = resolve_url(url, cwd, base);

        if let Some(doc) = self.mem.get(&resolved) {
            return Some(doc);
        }

        // directory urls expand into a synthetic listing tree
        let local = resolved
            .strip_prefix("file://")
            .map(Path::new)
            .or_else(|| (!resolved.contains("://")).then(|| Path::new(resolved.as_str())));
        if let Some(path) = local {
            if path.is_dir() {
                let doc = match Document::parse_directory(path, true, DIR_LISTING_DEPTH) {
                    Ok(doc) => Arc::new(doc),
                    Err(error) => {
                        tracing::warn!(url = %resolved, %error, "directory listing failed");
                        return None;
                    }
                };
                self.mem.insert(&resolved, doc.clone());
                return Some(doc);
            }
        }

        let format = type_hint
            .and_then(Format::from_hint)
            .or_else(|| Format::from_path(&resolved))?;

        let bytes = match self.fetch(&resolved) {
            Ok(bytes) => bytes,
            Err(error) => {
                tracing::warn!(url = %resolved, %error, "fetch failed");
                return None;
            }
        };
        let source = String::from_utf8_lossy(&bytes);
        let doc = Arc::new(Document::parse(&source, format));
        self.mem.insert(&resolved, doc.clone());
        Some(doc)
    }

    pub fn parsed_cache_len(&self) -> usize {
        self.mem.len()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

fn download(url: &str) -> Result<Vec<u8>, FetchError> {
    tracing::debug!(url, "downloading");
    let response = ureq::get(url).call().map_err(|error| match error {
        ureq::Error::Status(status, _) => FetchError::HttpStatus {
            url: url.to_string(),
            status,
        },
        other => FetchError::Transport {
            url: url.to_string(),
            message: other.to_string(),
        },
    })?;
    let mut bytes = Vec::new();
    response
        .into_reader()
        .take(MAX_FETCH_BYTES)
        .read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Resolve `url` against an optional base URL or working directory. Absolute
/// URLs and absolute paths pass through.
fn resolve_url(url: &str, cwd: Option<&Path>, base: Option<&str>) -> String {
    if url.contains("://") || url.starts_with('/') {
        return url.to_string();
    }
    if let Some(base) = base {
        if let Some(slash) = base.rfind('/') {
            // keep scheme://host/dir/, drop the last segment
            return format!("{}/{}", &base[..slash], url);
        }
    }
    if let Some(cwd) = cwd {
        return cwd.join(url).to_string_lossy().into_owned();
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_resolution() {
        assert_eq!(
            resolve_url("https://a/b.html", None, None),
            "https://a/b.html"
        );
        assert_eq!(
            resolve_url("c.css", None, Some("https://a/dir/page.html")),
            "https://a/dir/c.css"
        );
        assert_eq!(
            resolve_url("notes.md", Some(Path::new("/work")), None),
            "/work/notes.md"
        );
        assert_eq!(resolve_url("/etc/motd", Some(Path::new("/work")), None), "/etc/motd");
    }
}
