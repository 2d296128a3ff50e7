//! Integration tests for the expiring module cache
//!
//! Exercises manifest persistence, invalidation and the sliding TTL
//! across cache instances sharing one root.

use remod::cache::{ModuleCache, MANIFEST_FILE};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

const TTL: Duration = Duration::from_secs(3600);

fn manifest_json(root: &std::path::Path) -> serde_json::Value {
    let source = fs::read_to_string(root.join(MANIFEST_FILE)).unwrap();
    serde_json::from_str(&source).unwrap()
}

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

#[test]
fn test_fresh_root_always_misses() {
    let temp = TempDir::new().unwrap();
    let mut cache = ModuleCache::new(temp.path(), TTL).unwrap();

    for url in [
        "https://example.com/mod.js",
        "http://other.example.org/deep/path/utils",
        "https://example.com/",
    ] {
        assert!(cache.lookup(url).unwrap().is_none());
    }
}

#[test]
fn test_duplicate_register_keeps_single_record() {
    let temp = TempDir::new().unwrap();
    let mut cache = ModuleCache::new(temp.path(), TTL).unwrap();

    let url = "https://example.com/mod.js";
    let first = temp.path().join("mod.js");
    let second = temp.path().join("elsewhere.js");

    assert!(cache.register(url, &first).unwrap());
    assert!(!cache.register(url, &second).unwrap());

    let manifest = manifest_json(temp.path());
    let records = manifest["cachedModules"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["url"], url);
    assert_eq!(records[0]["path"], first.to_str().unwrap());
}

#[test]
fn test_round_trip_across_instances() {
    let temp = TempDir::new().unwrap();
    let url = "https://example.com/mod.js";
    let path = temp.path().join("mod.js");

    {
        let mut writer = ModuleCache::new(temp.path(), TTL).unwrap();
        assert!(writer.register(url, &path).unwrap());
    }

    let mut reader = ModuleCache::new(temp.path(), TTL).unwrap();
    let hit = reader.lookup(url).unwrap().unwrap();
    assert_eq!(hit.url, url);
    assert_eq!(hit.path, path);

    let manifest = manifest_json(temp.path());
    assert!(manifest["expiration"].as_u64().unwrap() > now_millis());
}

#[test]
fn test_expired_manifest_is_fully_invalidated() {
    let temp = TempDir::new().unwrap();

    // A cached file referenced by an already-expired manifest.
    let cached_file = temp.path().join("mod.js");
    fs::write(&cached_file, "module.exports = 1;").unwrap();

    let manifest = serde_json::json!({
        "expiration": 1_u64,
        "cachedModules": [
            { "url": "https://example.com/mod.js", "path": cached_file }
        ]
    });
    fs::write(temp.path().join(MANIFEST_FILE), manifest.to_string()).unwrap();

    let mut cache = ModuleCache::new(temp.path(), TTL).unwrap();
    assert!(cache.lookup("https://example.com/mod.js").unwrap().is_none());

    assert!(!temp.path().join(MANIFEST_FILE).exists());
    assert!(!cached_file.exists());
}

#[test]
fn test_corrupt_manifest_removes_only_manifest_file() {
    let temp = TempDir::new().unwrap();

    let cached_file = temp.path().join("mod.js");
    fs::write(&cached_file, "module.exports = 1;").unwrap();
    fs::write(temp.path().join(MANIFEST_FILE), "not json at all").unwrap();

    let mut cache = ModuleCache::new(temp.path(), TTL).unwrap();
    assert!(cache.lookup("https://example.com/mod.js").unwrap().is_none());

    // No record list was recoverable, so referenced files survive.
    assert!(!temp.path().join(MANIFEST_FILE).exists());
    assert!(cached_file.exists());
}

#[test]
fn test_expiration_slides_on_every_write() {
    let temp = TempDir::new().unwrap();
    let mut cache = ModuleCache::new(temp.path(), TTL).unwrap();

    cache
        .register("https://example.com/a.js", &temp.path().join("a.js"))
        .unwrap();
    let first = manifest_json(temp.path())["expiration"].as_u64().unwrap();

    std::thread::sleep(Duration::from_millis(20));

    cache
        .register("https://example.com/b.js", &temp.path().join("b.js"))
        .unwrap();
    let second = manifest_json(temp.path())["expiration"].as_u64().unwrap();

    assert!(second > first);
    assert_eq!(
        manifest_json(temp.path())["cachedModules"]
            .as_array()
            .unwrap()
            .len(),
        2
    );
}

#[test]
fn test_derive_path_is_pure_across_cache_states() {
    let temp = TempDir::new().unwrap();
    let mut cache = ModuleCache::new(temp.path(), TTL).unwrap();

    let url = "https://example.com/mod.js";
    let before = cache.derive_path(url);

    cache.register(url, &before).unwrap();

    let after = cache.derive_path(url);
    assert_eq!(before, after);
}
