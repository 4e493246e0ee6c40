//! In-memory LRU of parsed documents, keyed by URL.

use crate::Document;
use indexmap::IndexMap;
use triomphe::Arc;

#[derive(Debug, Clone, Copy)]
pub struct MemCacheConfig {
    pub max_bytes: usize,
    pub max_entries: usize,
}

impl Default for MemCacheConfig {
    fn default() -> Self {
        Self {
            max_bytes: 64 * 1024 * 1024,
            max_entries: 128,
        }
    }
}

/// Recency is the map order: a hit reinserts the entry at the back, and
/// eviction pops from the front.
pub struct DocumentCache {
    entries: IndexMap<String, Arc<Document>>,
    bytes: usize,
    config: MemCacheConfig,
}

impl DocumentCache {
    pub fn new(config: MemCacheConfig) -> DocumentCache {
        DocumentCache {
            entries: IndexMap::new(),
            bytes: 0,
            config,
        }
    }

    pub fn get(&mut self, url: &str) -> Option<Arc<Document>> {
        let doc = self.entries.shift_remove(url)?;
        tracing::debug!(url, "parsed-tree cache hit");
        self.entries.insert(url.to_string(), doc.clone());
        Some(doc)
    }

    pub fn insert(&mut self, url: &str, doc: Arc<Document>) {
        if let Some(old) = self.entries.shift_remove(url) {
            self.bytes = self.bytes.saturating_sub(old.memory_size());
        }
        self.bytes += doc.memory_size();
        self.entries.insert(url.to_string(), doc);
        self.evict();
    }

    fn evict(&mut self) {
        while self.entries.len() > self.config.max_entries
            || (self.bytes > self.config.max_bytes && self.entries.len() > 1)
        {
            let Some((url, doc)) = self.entries.shift_remove_index(0) else {
                break;
            };
            tracing::warn!(url = %url, size = doc.memory_size(), "evicting parsed document");
            self.bytes = self.bytes.saturating_sub(doc.memory_size());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Format;

    fn doc(text: &str) -> Arc<Document> {
        Arc::new(Document::parse(text, Format::Json))
    }

    #[test]
    fn lru_order_prefers_recent() {
        let mut cache = DocumentCache::new(MemCacheConfig {
            max_bytes: usize::MAX,
            max_entries: 2,
        });
        cache.insert("a", doc("1"));
        cache.insert("b", doc("2"));

        // touch `a`, making `b` the eviction candidate
        assert!(cache.get("a").is_some());
        cache.insert("c", doc("3"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_some());
    }
}
