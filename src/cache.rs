//! Expiring on-disk cache for fetched remote modules
//!
//! One manifest file per cache root maps source URLs to locally
//! materialized files. The whole manifest shares a single sliding
//! expiration timestamp.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Fixed name of the manifest file inside a cache root.
pub const MANIFEST_FILE: &str = "cache.json";

/// Extension appended to derived file names that lack it.
const SCRIPT_EXTENSION: &str = ".js";

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize the manifest
    #[error("Failed to serialize cache manifest: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One previously fetched resource.
///
/// `url` is the lookup key; equality is exact string match, no
/// normalization is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Source URL
    pub url: String,
    /// Locally materialized file
    pub path: PathBuf,
}

/// The single persisted state file of a cache root.
///
/// Serialized format:
/// `{ "expiration": <integer ms epoch>, "cachedModules": [ { "url", "path" }, ... ] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheManifest {
    /// Millisecond epoch timestamp after which every record is stale.
    expiration: u64,

    /// Records in insertion order. Appended, never deduplicated by
    /// derived path; only lookup by URL is deduplicated.
    #[serde(rename = "cachedModules")]
    cached_modules: Vec<CacheRecord>,
}

/// On-disk cache mapping source URLs to local files.
///
/// The manifest is lazily loaded on first lookup or mutation and fully
/// rewritten after each mutation. A corrupt or expired manifest is
/// never an error: it resolves to a miss plus cleanup.
#[derive(Debug)]
pub struct ModuleCache {
    /// Cache root directory
    root: PathBuf,
    /// TTL added to the expiration timestamp on every save
    ttl: Duration,
    /// Resident manifest, if one has been loaded or created
    manifest: Option<CacheManifest>,
}

impl ModuleCache {
    /// Open a cache rooted at `root`, creating the directory if absent.
    pub fn new(root: impl Into<PathBuf>, ttl: Duration) -> Result<Self, CacheError> {
        let root = root.into();
        fs::create_dir_all(&root)?;

        Ok(Self {
            root,
            ttl,
            manifest: None,
        })
    }

    /// Look up a previously cached URL.
    ///
    /// Returns `Ok(None)` when nothing is cached, including when the
    /// manifest turned out to be corrupt or expired (both invalidate
    /// the cache as a side effect). IO failures during that cleanup
    /// propagate as errors.
    pub fn lookup(&mut self, url: &str) -> Result<Option<CacheRecord>, CacheError> {
        if self.manifest.is_none() && !self.load_manifest()? {
            return Ok(None);
        }

        let manifest = match &self.manifest {
            Some(m) => m,
            None => return Ok(None),
        };

        Ok(manifest
            .cached_modules
            .iter()
            .find(|record| record.url == url)
            .cloned())
    }

    /// Record a fetched URL and persist the manifest.
    ///
    /// Returns `false` without side effects when the URL is already
    /// cached. Every successful write slides the expiration window to
    /// `now + ttl`.
    pub fn register(&mut self, url: &str, path: &Path) -> Result<bool, CacheError> {
        if self.lookup(url)?.is_some() {
            return Ok(false);
        }

        let manifest = self.manifest.get_or_insert_with(|| CacheManifest {
            expiration: now_millis() + duration_millis(&self.ttl),
            cached_modules: Vec::new(),
        });

        manifest.cached_modules.push(CacheRecord {
            url: url.to_string(),
            path: path.to_path_buf(),
        });

        self.save_manifest()?;
        Ok(true)
    }

    /// Derive the local file path for a URL.
    ///
    /// Takes the final path segment of the URL, appends the script
    /// extension if missing and resolves it against the cache root.
    /// Pure and deterministic. Two distinct URLs sharing a final
    /// segment derive the same path; the later download overwrites the
    /// earlier one with no collision detection.
    pub fn derive_path(&self, url: &str) -> PathBuf {
        let last_segment = url.rsplit('/').next().unwrap_or(url);

        if last_segment.ends_with(SCRIPT_EXTENSION) {
            self.root.join(last_segment)
        } else {
            self.root.join(format!("{last_segment}{SCRIPT_EXTENSION}"))
        }
    }

    /// Path of the manifest file inside the cache root.
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    /// Cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load the manifest from disk.
    ///
    /// Returns `Ok(true)` when a valid, unexpired manifest became
    /// resident. Corrupt content deletes the manifest file; an expired
    /// manifest additionally deletes every file its records reference.
    fn load_manifest(&mut self) -> Result<bool, CacheError> {
        let path = self.manifest_path();

        if !path.exists() {
            return Ok(false);
        }

        let manifest: CacheManifest = match fs::read_to_string(&path)
            .ok()
            .and_then(|source| serde_json::from_str(&source).ok())
        {
            Some(manifest) => manifest,
            None => {
                // Unreadable or malformed: no record list is available,
                // only the manifest file itself can be removed.
                self.delete_manifest_file()?;
                return Ok(false);
            }
        };

        if manifest.expiration <= now_millis() {
            self.delete_referenced_files(&manifest)?;
            self.delete_manifest_file()?;
            return Ok(false);
        }

        self.manifest = Some(manifest);
        Ok(true)
    }

    /// Persist the resident manifest, replacing the old file wholesale.
    fn save_manifest(&mut self) -> Result<(), CacheError> {
        self.delete_manifest_file()?;

        let manifest = match &mut self.manifest {
            Some(m) => m,
            None => return Ok(()),
        };

        // Sliding TTL: anchored to this write, not manifest creation.
        manifest.expiration = now_millis() + duration_millis(&self.ttl);

        let serialized = serde_json::to_string(manifest)?;
        fs::write(self.manifest_path(), serialized)?;
        Ok(())
    }

    fn delete_manifest_file(&self) -> Result<(), CacheError> {
        let path = self.manifest_path();
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    fn delete_referenced_files(&self, manifest: &CacheManifest) -> Result<(), CacheError> {
        for record in &manifest.cached_modules {
            if record.path.exists() {
                fs::remove_file(&record.path)?;
            }
        }
        Ok(())
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn duration_millis(duration: &Duration) -> u64 {
    duration.as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_derive_path_appends_extension() {
        let temp = TempDir::new().unwrap();
        let cache = ModuleCache::new(temp.path(), Duration::from_secs(60)).unwrap();

        let path = cache.derive_path("https://example.com/utils");
        assert_eq!(path, temp.path().join("utils.js"));
    }

    #[test]
    fn test_derive_path_keeps_extension() {
        let temp = TempDir::new().unwrap();
        let cache = ModuleCache::new(temp.path(), Duration::from_secs(60)).unwrap();

        let path = cache.derive_path("https://example.com/a/b/mod.js");
        assert_eq!(path, temp.path().join("mod.js"));
    }

    #[test]
    fn test_derive_path_collides_on_shared_segment() {
        let temp = TempDir::new().unwrap();
        let cache = ModuleCache::new(temp.path(), Duration::from_secs(60)).unwrap();

        // Known limitation: only the final segment participates.
        let a = cache.derive_path("https://one.example.com/mod.js");
        let b = cache.derive_path("https://two.example.com/deep/mod.js");
        assert_eq!(a, b);
    }

    #[test]
    fn test_lookup_on_empty_root_misses() {
        let temp = TempDir::new().unwrap();
        let mut cache = ModuleCache::new(temp.path(), Duration::from_secs(60)).unwrap();

        assert!(cache.lookup("https://example.com/mod.js").unwrap().is_none());
    }

    #[test]
    fn test_register_is_deduplicated_by_url() {
        let temp = TempDir::new().unwrap();
        let mut cache = ModuleCache::new(temp.path(), Duration::from_secs(60)).unwrap();

        let first = temp.path().join("mod.js");
        let second = temp.path().join("other.js");

        assert!(cache.register("https://example.com/mod.js", &first).unwrap());
        assert!(!cache.register("https://example.com/mod.js", &second).unwrap());

        let hit = cache.lookup("https://example.com/mod.js").unwrap().unwrap();
        assert_eq!(hit.path, first);
    }

    #[test]
    fn test_corrupt_manifest_resolves_to_miss_and_cleanup() {
        let temp = TempDir::new().unwrap();
        let mut cache = ModuleCache::new(temp.path(), Duration::from_secs(60)).unwrap();

        fs::write(cache.manifest_path(), "{ not json").unwrap();

        assert!(cache.lookup("https://example.com/mod.js").unwrap().is_none());
        assert!(!cache.manifest_path().exists());
    }

    #[test]
    fn test_missing_field_resolves_to_miss() {
        let temp = TempDir::new().unwrap();
        let mut cache = ModuleCache::new(temp.path(), Duration::from_secs(60)).unwrap();

        // Well-formed JSON, but no expiration field.
        fs::write(cache.manifest_path(), r#"{"cachedModules": []}"#).unwrap();

        assert!(cache.lookup("https://example.com/mod.js").unwrap().is_none());
        assert!(!cache.manifest_path().exists());
    }
}
