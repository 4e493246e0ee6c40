//! Content-addressable on-disk cache of fetched bytes.
//!
//! Each entry is a file named by the SHA-256 of its source URL plus a JSON
//! sidecar carrying `{url, created_at, last_accessed, size}`. Eviction is
//! LRU by `last_accessed`, bounded by total bytes and entry count.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub dir: PathBuf,
    pub max_bytes: u64,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: std::env::temp_dir().join("vellum-cache"),
            max_bytes: 256 * 1024 * 1024,
            max_entries: 4096,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Sidecar {
    url: String,
    created_at: u64,
    last_accessed: u64,
    size: u64,
}

pub struct FileCache {
    config: CacheConfig,
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn hash_url(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(64);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(out, "{byte:02x}");
    }
    out
}

impl FileCache {
    pub fn new(config: CacheConfig) -> FileCache {
        FileCache { config }
    }

    pub fn dir(&self) -> &Path {
        &self.config.dir
    }

    fn entry_path(&self, url: &str) -> PathBuf {
        self.config.dir.join(hash_url(url))
    }

    fn sidecar_path(&self, url: &str) -> PathBuf {
        self.config.dir.join(format!("{}.meta", hash_url(url)))
    }

    /// Bytes for `url`, bumping its recency. `None` on miss or unreadable
    /// entry.
    pub fn lookup(&self, url: &str) -> Option<Vec<u8>> {
        let path = self.entry_path(url);
        let bytes = fs::read(&path).ok()?;
        tracing::debug!(url, size = bytes.len(), "disk cache hit");

        let sidecar_path = self.sidecar_path(url);
        if let Ok(text) = fs::read_to_string(&sidecar_path) {
            if let Ok(mut sidecar) = serde_json::from_str::<Sidecar>(&text) {
                sidecar.last_accessed = now();
                let _ = write_sidecar(&sidecar_path, &sidecar);
            }
        }
        Some(bytes)
    }

    /// Store fetched bytes, then enforce the cache bounds.
    pub fn store(&self, url: &str, bytes: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.config.dir)?;
        fs::write(self.entry_path(url), bytes)?;
        let stamp = now();
        write_sidecar(
            &self.sidecar_path(url),
            &Sidecar {
                url: url.to_string(),
                created_at: stamp,
                last_accessed: stamp,
                size: bytes.len() as u64,
            },
        )?;
        self.evict();
        Ok(())
    }

    /// Drop least-recently-accessed entries until both bounds hold.
    fn evict(&self) {
        let Ok(read_dir) = fs::read_dir(&self.config.dir) else {
            return;
        };
        let mut entries: Vec<(PathBuf, Sidecar)> = Vec::new();
        for entry in read_dir.flatten() {
            let path = entry.path();
            if path.extension().map(|e| e == "meta").unwrap_or(false) {
                if let Ok(text) = fs::read_to_string(&path) {
                    if let Ok(sidecar) = serde_json::from_str::<Sidecar>(&text) {
                        entries.push((path, sidecar));
                    }
                }
            }
        }

        let mut total: u64 = entries.iter().map(|(_, s)| s.size).sum();
        let mut count = entries.len();
        if total <= self.config.max_bytes && count <= self.config.max_entries {
            return;
        }

        entries.sort_by_key(|(_, s)| s.last_accessed);
        for (sidecar_path, sidecar) in entries {
            if total <= self.config.max_bytes && count <= self.config.max_entries {
                break;
            }
            tracing::warn!(url = %sidecar.url, size = sidecar.size, "evicting cached file");
            let data_path = sidecar_path.with_extension("");
            let _ = fs::remove_file(&data_path);
            let _ = fs::remove_file(&sidecar_path);
            total = total.saturating_sub(sidecar.size);
            count -= 1;
        }
    }
}

fn write_sidecar(path: &Path, sidecar: &Sidecar) -> io::Result<()> {
    let text = serde_json::to_string(sidecar)?;
    fs::write(path, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cache(dir: &Path, max_bytes: u64, max_entries: usize) -> FileCache {
        FileCache::new(CacheConfig {
            dir: dir.to_path_buf(),
            max_bytes,
            max_entries,
        })
    }

    #[test]
    fn store_then_lookup() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = test_cache(tmp.path(), 1024, 16);

        assert!(cache.lookup("https://example.com/a").is_none());
        cache.store("https://example.com/a", b"hello").unwrap();
        assert_eq!(cache.lookup("https://example.com/a").as_deref(), Some(&b"hello"[..]));
    }

    #[test]
    fn entry_count_bound_evicts_oldest() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = test_cache(tmp.path(), u64::MAX, 2);

        cache.store("u1", b"one").unwrap();
        cache.store("u2", b"two").unwrap();
        cache.store("u3", b"three").unwrap();

        let present = ["u1", "u2", "u3"]
            .iter()
            .filter(|u| cache.lookup(u).is_some())
            .count();
        assert_eq!(present, 2);
    }

    #[test]
    fn keys_are_distinct_per_url() {
        assert_ne!(hash_url("a"), hash_url("b"));
        assert_eq!(hash_url("a").len(), 64);
    }
}
