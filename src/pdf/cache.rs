//! Extracted-text cache for loaded PDFs
//!
//! Documents are keyed by their normalized path. The cache is bounded both
//! by entry count and by total text size; when either bound would be
//! exceeded the least recently used documents are evicted first.
//!
//! The cache can optionally be persisted to a JSON file so that separate
//! server processes (each stdio server is its own process) see the same
//! loaded documents. Each instance re-reads the file whenever it changed
//! on disk; concurrent writers are last-writer-wins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use parking_lot::{RwLock, RwLockWriteGuard};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::types::{AppError, Result};
use crate::utils::toml_config::PdfConfig;

/// Statistics for cache monitoring
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size_bytes: u64,
    pub entry_count: usize,
    pub evictions: u64,
}

impl CacheStats {
    /// Hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Bounds for the text cache
#[derive(Debug, Clone, PartialEq)]
pub struct CacheLimits {
    pub max_entries: usize,
    pub max_bytes: u64,
}

impl Default for CacheLimits {
    fn default() -> Self {
        Self::from(&PdfConfig::default())
    }
}

impl From<&PdfConfig> for CacheLimits {
    fn from(config: &PdfConfig) -> Self {
        Self {
            max_entries: config.max_entries.max(1),
            max_bytes: config.max_bytes,
        }
    }
}

/// A cached document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedText {
    pub text: String,
    pub pages: usize,
}

impl CachedText {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn size_bytes(&self) -> u64 {
        self.text.len() as u64
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    doc: CachedText,
    /// Insertion order, used for stable listing
    inserted: u64,
    /// Logical clock of the last access
    last_accessed: u64,
}

/// On-disk form of the cache
#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedCache {
    documents: Vec<PersistedDocument>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedDocument {
    path: String,
    text: String,
    pages: usize,
}

/// Size and modification time of the cache file as last read or written
#[derive(Debug, Clone, Copy, PartialEq)]
struct FileStamp {
    modified: SystemTime,
    len: u64,
}

impl FileStamp {
    fn of(path: &Path) -> Option<Self> {
        let meta = std::fs::metadata(path).ok()?;
        Some(Self {
            modified: meta.modified().ok()?,
            len: meta.len(),
        })
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    /// `None` when the file did not exist at the last sync
    stamp: Option<FileStamp>,
}

/// Bounded LRU cache of extracted PDF text
///
/// With a cache file, every operation first re-reads the file if another
/// process changed it since this instance last read or wrote it, so all
/// instances on one file see the same documents. Writes replace the file
/// atomically.
pub struct TextCache {
    state: RwLock<CacheState>,
    limits: CacheLimits,
    persist_path: Option<PathBuf>,
    clock: AtomicU64,
    current_size: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl TextCache {
    pub fn new(limits: CacheLimits) -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
            limits,
            persist_path: None,
            clock: AtomicU64::new(0),
            current_size: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Cache backed by a JSON file shared with other instances. An
    /// unreadable file is ignored and overwritten on the next change.
    pub fn persistent(limits: CacheLimits, path: impl Into<PathBuf>) -> Self {
        let mut cache = Self::new(limits);
        cache.persist_path = Some(path.into());
        drop(cache.synced());
        cache
    }

    /// Build from configuration. A relative `cache_file` lives in the
    /// system temp directory.
    pub fn from_config(config: &PdfConfig) -> Self {
        let limits = CacheLimits::from(config);
        match &config.cache_file {
            Some(file) if file.is_absolute() => Self::persistent(limits, file.clone()),
            Some(file) => Self::persistent(limits, std::env::temp_dir().join(file)),
            None => Self::new(limits),
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Write access to the state, refreshed from the cache file first.
    fn synced(&self) -> RwLockWriteGuard<'_, CacheState> {
        let mut state = self.state.write();
        if let Some(path) = &self.persist_path {
            self.sync_from_disk(path, &mut state);
        }
        state
    }

    fn sync_from_disk(&self, path: &Path, state: &mut CacheState) {
        let stamp = FileStamp::of(path);
        if stamp == state.stamp {
            return;
        }
        state.stamp = stamp;

        if stamp.is_none() {
            // Cleared by another instance
            state.entries.clear();
            self.current_size.store(0, Ordering::Relaxed);
            debug!(path = %path.display(), "pdf cache file removed, cleared local copy");
            return;
        }

        let persisted: PersistedCache = match std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| serde_json::from_str(&content).map_err(|e| e.to_string()))
        {
            Ok(persisted) => persisted,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable pdf cache");
                return;
            }
        };

        let mut previous = std::mem::take(&mut state.entries);
        let mut size = 0;
        for doc in persisted.documents {
            let cached = CachedText {
                text: doc.text,
                pages: doc.pages,
            };
            size += cached.size_bytes();
            let entry = match previous.remove(&doc.path) {
                Some(old) => CacheEntry { doc: cached, ..old },
                None => {
                    let now = self.tick();
                    CacheEntry {
                        doc: cached,
                        inserted: now,
                        last_accessed: now,
                    }
                }
            };
            state.entries.insert(doc.path, entry);
        }
        self.current_size.store(size, Ordering::Relaxed);
        debug!(entries = state.entries.len(), "synced pdf cache from disk");
    }

    pub fn get(&self, key: &str) -> Option<CachedText> {
        let mut state = self.synced();
        match state.entries.get_mut(key) {
            Some(entry) => {
                entry.last_accessed = self.tick();
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.doc.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.synced().entries.contains_key(key)
    }

    /// Insert or replace a document, evicting least recently used documents
    /// to stay within the limits. A single document larger than `max_bytes`
    /// is rejected.
    pub fn insert(&self, key: &str, doc: CachedText) -> Result<()> {
        let size = doc.size_bytes();
        if size > self.limits.max_bytes {
            return Err(AppError::Validation(format!(
                "Extracted text is {} bytes, over the cache limit of {} bytes",
                size, self.limits.max_bytes
            )));
        }

        let mut state = self.synced();
        let entries = &mut state.entries;
        if let Some(old) = entries.remove(key) {
            self.current_size
                .fetch_sub(old.doc.size_bytes(), Ordering::Relaxed);
        }

        while !entries.is_empty()
            && (entries.len() >= self.limits.max_entries
                || self.current_size.load(Ordering::Relaxed) + size > self.limits.max_bytes)
        {
            let lru_key = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_accessed)
                .map(|(key, _)| key.clone());

            match lru_key.and_then(|k| entries.remove(&k).map(|e| (k, e))) {
                Some((evicted, entry)) => {
                    self.current_size
                        .fetch_sub(entry.doc.size_bytes(), Ordering::Relaxed);
                    self.evictions.fetch_add(1, Ordering::Relaxed);
                    debug!(path = %evicted, "evicted cached pdf");
                }
                None => break,
            }
        }

        let now = self.tick();
        self.current_size.fetch_add(size, Ordering::Relaxed);
        entries.insert(
            key.to_string(),
            CacheEntry {
                doc,
                inserted: now,
                last_accessed: now,
            },
        );

        self.persist(&mut state);
        Ok(())
    }

    pub fn invalidate(&self, key: &str) -> bool {
        let mut state = self.synced();
        let Some(entry) = state.entries.remove(key) else {
            return false;
        };
        self.current_size
            .fetch_sub(entry.doc.size_bytes(), Ordering::Relaxed);
        self.persist(&mut state);
        true
    }

    pub fn clear(&self) {
        let mut state = self.state.write();
        state.entries.clear();
        state.stamp = None;
        self.current_size.store(0, Ordering::Relaxed);

        if let Some(path) = &self.persist_path {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    warn!(path = %path.display(), error = %e, "failed to remove pdf cache file");
                }
            }
        }
    }

    /// All cached documents in insertion order. Does not count as access.
    pub fn documents(&self) -> Vec<(String, CachedText)> {
        documents_of(&self.synced().entries)
    }

    pub fn len(&self) -> usize {
        self.synced().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.synced().entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let entry_count = self.synced().entries.len();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size_bytes: self.current_size.load(Ordering::Relaxed),
            entry_count,
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    /// Write the state to a sibling temp file and rename it over the cache
    /// file, then remember the new stamp so our own write is not re-read.
    fn persist(&self, state: &mut CacheState) {
        let Some(path) = &self.persist_path else {
            return;
        };

        let persisted = PersistedCache {
            documents: documents_of(&state.entries)
                .into_iter()
                .map(|(path, doc)| PersistedDocument {
                    path,
                    text: doc.text,
                    pages: doc.pages,
                })
                .collect(),
        };

        let tmp = temp_sibling(path);
        let result = serde_json::to_string(&persisted)
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(&tmp, json).map_err(|e| e.to_string()))
            .and_then(|()| std::fs::rename(&tmp, path).map_err(|e| e.to_string()));
        match result {
            Ok(()) => state.stamp = FileStamp::of(path),
            Err(e) => {
                std::fs::remove_file(&tmp).ok();
                warn!(path = %path.display(), error = %e, "failed to persist pdf cache");
            }
        }
    }
}

fn documents_of(entries: &HashMap<String, CacheEntry>) -> Vec<(String, CachedText)> {
    let mut docs: Vec<(u64, String, CachedText)> = entries
        .iter()
        .map(|(key, entry)| (entry.inserted, key.clone(), entry.doc.clone()))
        .collect();
    docs.sort_by_key(|(inserted, _, _)| *inserted);
    docs.into_iter().map(|(_, key, doc)| (key, doc)).collect()
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pdf_cache".to_string());
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> CachedText {
        CachedText {
            text: text.to_string(),
            pages: 1,
        }
    }

    fn limits(max_entries: usize, max_bytes: u64) -> CacheLimits {
        CacheLimits {
            max_entries,
            max_bytes,
        }
    }

    #[test]
    fn test_get_tracks_hits_and_misses() {
        let cache = TextCache::new(limits(4, 1024));
        cache.insert("/a.pdf", doc("alpha beta")).unwrap();

        assert_eq!(cache.get("/a.pdf").unwrap().word_count(), 2);
        assert!(cache.get("/b.pdf").is_none());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate(), 50.0);
        assert_eq!(stats.size_bytes, 10);
    }

    #[test]
    fn test_evicts_least_recently_used_by_count() {
        let cache = TextCache::new(limits(2, 1024));
        cache.insert("/a.pdf", doc("a")).unwrap();
        cache.insert("/b.pdf", doc("b")).unwrap();

        // touch a so b becomes the eviction candidate
        cache.get("/a.pdf");
        cache.insert("/c.pdf", doc("c")).unwrap();

        assert!(cache.contains("/a.pdf"));
        assert!(!cache.contains("/b.pdf"));
        assert!(cache.contains("/c.pdf"));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_evicts_by_size() {
        let cache = TextCache::new(limits(10, 10));
        cache.insert("/a.pdf", doc("123456")).unwrap();
        cache.insert("/b.pdf", doc("123456")).unwrap();

        assert_eq!(cache.len(), 1);
        assert!(cache.contains("/b.pdf"));
        assert_eq!(cache.stats().size_bytes, 6);
    }

    #[test]
    fn test_rejects_oversized_document() {
        let cache = TextCache::new(limits(10, 4));
        assert!(matches!(
            cache.insert("/a.pdf", doc("too long")),
            Err(AppError::Validation(_))
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_replace_keeps_size_accurate() {
        let cache = TextCache::new(limits(10, 1024));
        cache.insert("/a.pdf", doc("short")).unwrap();
        cache.insert("/a.pdf", doc("a bit longer")).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().size_bytes, 12);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = TextCache::new(limits(10, 1024));
        cache.insert("/a.pdf", doc("a")).unwrap();
        cache.insert("/b.pdf", doc("b")).unwrap();

        assert!(cache.invalidate("/a.pdf"));
        assert!(!cache.invalidate("/a.pdf"));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().size_bytes, 0);
    }

    #[test]
    fn test_documents_in_insertion_order() {
        let cache = TextCache::new(limits(10, 1024));
        cache.insert("/z.pdf", doc("z")).unwrap();
        cache.insert("/a.pdf", doc("a")).unwrap();
        cache.get("/z.pdf");

        let keys: Vec<String> = cache.documents().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["/z.pdf", "/a.pdf"]);
    }

    #[test]
    fn test_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("cache.json");

        let cache = TextCache::persistent(limits(10, 1024), &file);
        cache.insert("/a.pdf", doc("persisted words")).unwrap();
        drop(cache);

        let reopened = TextCache::persistent(limits(10, 1024), &file);
        assert_eq!(reopened.get("/a.pdf").unwrap().text, "persisted words");

        reopened.clear();
        assert!(!file.exists());
        assert!(TextCache::persistent(limits(10, 1024), &file).is_empty());
    }

    #[test]
    fn test_instances_on_one_file_see_each_other() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("cache.json");
        let a = TextCache::persistent(limits(10, 1024), &file);
        let b = TextCache::persistent(limits(10, 1024), &file);

        a.insert("/a.pdf", doc("from a")).unwrap();
        assert_eq!(b.get("/a.pdf").unwrap().text, "from a");

        b.insert("/b.pdf", doc("from b")).unwrap();
        let fresh = TextCache::persistent(limits(10, 1024), &file);
        assert!(fresh.contains("/a.pdf"));
        assert!(fresh.contains("/b.pdf"));
        assert_eq!(a.len(), 2);

        assert!(a.invalidate("/b.pdf"));
        assert!(!b.contains("/b.pdf"));

        b.clear();
        assert!(a.is_empty());
        assert_eq!(a.stats().size_bytes, 0);
    }

    #[test]
    fn test_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("cache.json");
        let cache = TextCache::persistent(limits(10, 1024), &file);
        cache.insert("/a.pdf", doc("a")).unwrap();
        cache.insert("/b.pdf", doc("b")).unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["cache.json"]);
    }

    #[test]
    fn test_corrupt_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("cache.json");
        std::fs::write(&file, "not json").unwrap();

        let cache = TextCache::persistent(limits(10, 1024), &file);
        assert!(cache.is_empty());
    }
}
