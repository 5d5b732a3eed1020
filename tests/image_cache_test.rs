//! Tests for the illustration cache, backups and batch illustration.

use async_trait::async_trait;
use little_learners::board::TileCatalog;
use little_learners::{
    Backup, ImageCache, ImageGenerator, TileImage, export_backup, illustrate_missing,
    import_backup,
};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::NamedTempFile;

/// Opens a cache on a fresh temporary file; keep the handle in scope.
fn setup_cache() -> (NamedTempFile, ImageCache) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let cache = ImageCache::open(db_path).expect("Failed to open cache");
    (db_file, cache)
}

/// Generator that names its images after the tile and records requests.
#[derive(Default)]
struct Recording {
    requested: Mutex<Vec<String>>,
    fail_on: Option<String>,
}

#[async_trait]
impl ImageGenerator for Recording {
    async fn generate(&self, title: &str, _description: &str) -> Option<String> {
        self.requested.lock().unwrap().push(title.to_string());
        if self.fail_on.as_deref() == Some(title) {
            return None;
        }
        Some(format!("data:image/png;base64,{}", title.len()))
    }
}

#[test]
fn test_export_then_import_into_fresh_cache() {
    let catalog = TileCatalog::standard();
    let (_db, cache) = setup_cache();
    cache
        .save(&TileImage::for_tile(catalog.get(2).unwrap(), "data:image/png;base64,AAA"))
        .unwrap();
    cache
        .save(&TileImage::for_tile(catalog.get(7).unwrap(), "data:image/png;base64,BBB"))
        .unwrap();

    let json = export_backup(&cache).unwrap();
    let backup = Backup::parse(&json).unwrap();
    assert_eq!(backup.images().len(), 2);

    let (_db2, restored) = setup_cache();
    assert_eq!(import_backup(&restored, &json).unwrap(), 2);
    assert_eq!(restored.all().unwrap(), cache.all().unwrap());
    assert_eq!(restored.load_valid(&catalog).unwrap().len(), 2);
}

#[test]
fn test_import_twice_is_idempotent() {
    let catalog = TileCatalog::standard();
    let (_db, cache) = setup_cache();
    cache
        .save(&TileImage::for_tile(catalog.get(4).unwrap(), "data:image/png;base64,CCC"))
        .unwrap();
    cache
        .save(&TileImage::for_tile(catalog.get(11).unwrap(), "data:image/png;base64,DDD"))
        .unwrap();
    let json = export_backup(&cache).unwrap();

    let (_db2, restored) = setup_cache();
    assert_eq!(import_backup(&restored, &json).unwrap(), 2);
    let after_first = restored.all().unwrap();

    assert_eq!(import_backup(&restored, &json).unwrap(), 2);
    assert_eq!(restored.all().unwrap(), after_first);
    assert_eq!(after_first, cache.all().unwrap());
}

#[test]
fn test_bad_entry_rejects_whole_import() {
    let (_db, cache) = setup_cache();
    let json = r#"{
        "version": 1,
        "date": "2026-01-01T00:00:00Z",
        "images": [
            { "id": 2, "fingerprint": "2:a:b:speaking", "imageRef": "data:x", "timestamp": 1 },
            { "id": 3, "fingerprint": "", "imageRef": "data:y", "timestamp": 2 }
        ]
    }"#;
    assert!(import_backup(&cache, json).is_err());
    assert!(cache.all().unwrap().is_empty());
}

#[test]
fn test_legacy_field_names_import() {
    let (_db, cache) = setup_cache();
    let json = r#"{
        "version": 1,
        "date": "2025-06-01T00:00:00Z",
        "images": [ { "id": 9, "hash": "9:t:d:vocabulary", "url": "data:z", "timestamp": 5 } ]
    }"#;
    assert_eq!(import_backup(&cache, json).unwrap(), 1);
    let image = cache.get(9).unwrap().expect("imported");
    assert_eq!(image.image_ref(), "data:z");
}

#[test]
fn test_stale_fingerprint_is_not_valid() {
    let catalog = TileCatalog::standard();
    let (_db, cache) = setup_cache();
    cache
        .save(&TileImage::new(5, "5:Old Title:old:grammar".to_string(), "data:old".to_string(), 0))
        .unwrap();
    assert!(cache.load_valid(&catalog).unwrap().is_empty());
    assert!(cache.get(5).unwrap().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_illustrate_missing_skips_cached_and_failed_tiles() {
    let catalog = TileCatalog::standard();
    let (_db, cache) = setup_cache();
    let cached = catalog.get(2).unwrap();
    cache
        .save(&TileImage::for_tile(cached, "data:image/png;base64,KEEP"))
        .unwrap();

    let generator = Recording {
        fail_on: Some(catalog.get(3).unwrap().title().clone()),
        ..Default::default()
    };

    let generated = illustrate_missing(&catalog, &cache, &generator, Duration::from_secs(1))
        .await
        .unwrap();

    let task_count = catalog.task_tiles().count();
    let requested = generator.requested.lock().unwrap().clone();
    assert_eq!(requested.len(), task_count - 1);
    assert!(!requested.contains(cached.title()));
    assert_eq!(generated.len(), task_count - 2);
    assert!(!generated.contains_key(&3));

    let valid = cache.load_valid(&catalog).unwrap();
    assert_eq!(valid.len(), task_count - 1);
    assert_eq!(valid.get(&2).map(String::as_str), Some("data:image/png;base64,KEEP"));
}
