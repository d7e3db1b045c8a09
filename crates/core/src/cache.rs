//! Content-addressed caching of analysis results.
//!
//! Keys are SHA-256 over `(lyrics, feature flags, schema version)`. Blobs
//! are canonical JSON. The filesystem store writes `<hex_key>.json` files
//! atomically (temp + rename) so concurrent writers of the same key are
//! safe; any read problem is treated as a miss.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::types::{AnalysisFlags, CacheEntry, SCHEMA_VERSION};

/// A key -> blob store. Implementations must tolerate concurrent writes of
/// the same key (content is identical by construction).
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Vec<u8>>;
    fn put(&self, key: &str, blob: &[u8]) -> Result<()>;
}

/// Cache key for an analysis call: hex SHA-256 of lyrics, canonical flag
/// encoding, and schema version, NUL-separated.
pub fn analysis_key(lyrics: &str, flags: &AnalysisFlags) -> String {
    let mut hasher = Sha256::new();
    hasher.update(lyrics.as_bytes());
    hasher.update([0u8]);
    hasher.update(flags.canonical().as_bytes());
    hasher.update([0u8]);
    hasher.update(SCHEMA_VERSION.to_le_bytes());
    format!("{:x}", hasher.finalize())
}

/// Key suffix for cached oracle outputs, kept separate from result blobs so
/// oracle decisions replay deterministically across runs.
pub fn oracle_key(analysis_key: &str) -> String {
    format!("{}-oracle", analysis_key)
}

/// Decode a cached entry; version mismatch or corruption reads as a miss.
pub fn load_entry(store: &dyn CacheStore, key: &str) -> Option<CacheEntry> {
    let blob = store.get(key)?;
    match serde_json::from_slice::<CacheEntry>(&blob) {
        Ok(entry) if entry.version == SCHEMA_VERSION => {
            log::info!("Cache hit: analysis ({}...)", &key[..12.min(key.len())]);
            Some(entry)
        }
        Ok(entry) => {
            log::info!(
                "Cache version mismatch (have {}, want {}), recomputing",
                entry.version,
                SCHEMA_VERSION
            );
            None
        }
        Err(e) => {
            log::warn!("Corrupt cache entry, recomputing: {}", e);
            None
        }
    }
}

/// Serialize and store an entry.
pub fn store_entry(store: &dyn CacheStore, key: &str, entry: &CacheEntry) -> Result<()> {
    let blob = serde_json::to_vec(entry)?;
    store.put(key, &blob)?;
    log::info!("Cached analysis ({}...)", &key[..12.min(key.len())]);
    Ok(())
}

/// Filesystem-backed store: one `<hex_key>.json` file per entry.
pub struct FsCacheStore {
    dir: PathBuf,
}

/// Summary of a store's contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheInfo {
    pub entries: usize,
    pub total_bytes: u64,
}

impl FsCacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default cache directory.
    ///
    /// Uses `RHYMESCOPE_CACHE_DIR` if set, otherwise `~/.cache/rhymescope`.
    pub fn default_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("RHYMESCOPE_CACHE_DIR") {
            return PathBuf::from(dir);
        }
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        PathBuf::from(home).join(".cache").join("rhymescope")
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Remove every cached entry.
    pub fn clear(&self) -> Result<()> {
        if !self.dir.exists() {
            return Ok(());
        }
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                std::fs::remove_file(&path).ok();
            }
        }
        Ok(())
    }

    /// Entry count and total size on disk.
    pub fn info(&self) -> CacheInfo {
        let mut info = CacheInfo { entries: 0, total_bytes: 0 };
        let Ok(dir) = std::fs::read_dir(&self.dir) else {
            return info;
        };
        for entry in dir.flatten() {
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                info.entries += 1;
                info.total_bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
            }
        }
        info
    }
}

/// Atomically write data to a file via temp file + rename.
fn atomic_write(target: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = target.with_extension("tmp");
    std::fs::write(&tmp_path, data)?;
    std::fs::rename(&tmp_path, target)?;
    Ok(())
}

impl CacheStore for FsCacheStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        std::fs::read(self.entry_path(key)).ok()
    }

    fn put(&self, key: &str, blob: &[u8]) -> Result<()> {
        let path = self.entry_path(key);
        atomic_write(&path, blob)
            .with_context(|| format!("Failed to write cache entry: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(tag: &str) -> (PathBuf, FsCacheStore) {
        let dir = std::env::temp_dir().join(format!("rhymescope_{}_{}", tag, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        (dir.clone(), FsCacheStore::new(dir))
    }

    #[test]
    fn test_analysis_key_deterministic() {
        let flags = AnalysisFlags::default();
        let a = analysis_key("cat hat", &flags);
        let b = analysis_key("cat hat", &flags);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_analysis_key_varies_with_inputs() {
        let flags = AnalysisFlags::default();
        let multi = AnalysisFlags { multisyllable: true, ..Default::default() };
        assert_ne!(analysis_key("cat hat", &flags), analysis_key("cat bat", &flags));
        assert_ne!(analysis_key("cat hat", &flags), analysis_key("cat hat", &multi));
    }

    #[test]
    fn test_cache_flag_does_not_change_key() {
        let without = AnalysisFlags::default();
        let with = AnalysisFlags { cache: true, ..Default::default() };
        assert_eq!(analysis_key("cat hat", &without), analysis_key("cat hat", &with));
    }

    #[test]
    fn test_oracle_key_suffix() {
        let key = analysis_key("cat", &AnalysisFlags::default());
        assert_eq!(oracle_key(&key), format!("{}-oracle", key));
    }

    #[test]
    fn test_fs_store_roundtrip() {
        let (dir, store) = temp_store("roundtrip");
        store.put("abc123", b"{\"x\":1}").unwrap();
        assert_eq!(store.get("abc123").unwrap(), b"{\"x\":1}");
        assert!(store.get("missing").is_none());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_entry_roundtrip() {
        let (dir, store) = temp_store("entry");
        let entry = CacheEntry {
            key_hash: "k".into(),
            feature_flags: "ml=0;ms=0;or=0".into(),
            clusters: vec![],
            version: SCHEMA_VERSION,
        };
        store_entry(&store, "k", &entry).unwrap();
        assert_eq!(load_entry(&store, "k").unwrap(), entry);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_version_mismatch_is_miss() {
        let (dir, store) = temp_store("version");
        let entry = CacheEntry {
            key_hash: "k".into(),
            feature_flags: String::new(),
            clusters: vec![],
            version: SCHEMA_VERSION + 1,
        };
        store_entry(&store, "k", &entry).unwrap();
        assert!(load_entry(&store, "k").is_none());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_corrupt_entry_is_miss() {
        let (dir, store) = temp_store("corrupt");
        store.put("bad", b"not json at all").unwrap();
        assert!(load_entry(&store, "bad").is_none());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_atomic_write_replaces_existing() {
        let (dir, store) = temp_store("atomic");
        store.put("k", b"one").unwrap();
        store.put("k", b"two").unwrap();
        assert_eq!(store.get("k").unwrap(), b"two");
        // No stray temp file left behind
        assert!(!dir.join("k.tmp").exists());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_clear_and_info() {
        let (dir, store) = temp_store("clearinfo");
        store.put("a", b"1").unwrap();
        store.put("b", b"22").unwrap();
        let info = store.info();
        assert_eq!(info.entries, 2);
        assert_eq!(info.total_bytes, 3);
        store.clear().unwrap();
        assert_eq!(store.info().entries, 0);
        std::fs::remove_dir_all(&dir).ok();
    }
}
