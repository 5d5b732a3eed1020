//! Illustration cache repository.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use little_learners_board::TileCatalog;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

use crate::db::{CacheStage, DbError, TileImage, schema};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Image cache keyed by tile id.
#[derive(Debug, Clone)]
pub struct ImageCache {
    db_path: String,
}

impl ImageCache {
    /// Opens the cache at `db_path`, creating the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path.as_ref()))]
    pub fn open(db_path: impl AsRef<str>) -> Result<Self, DbError> {
        let cache = Self {
            db_path: db_path.as_ref().to_string(),
        };
        let mut conn = cache.connection()?;
        let applied = conn.run_pending_migrations(MIGRATIONS)?;
        info!(path = %cache.db_path, migrations = applied.len(), "Image cache opened");
        Ok(cache)
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::new(CacheStage::Connect, format!("Failed to connect to '{}': {}", self.db_path, e)))
    }

    /// Stores an entry, replacing any entry with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, image), fields(tile_id = image.id()))]
    pub fn save(&self, image: &TileImage) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        diesel::replace_into(schema::tile_images::table)
            .values(image)
            .execute(&mut conn)?;
        debug!("Image saved");
        Ok(())
    }

    /// Stores every entry in a single transaction; either all land or none.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs; nothing is written.
    #[instrument(skip(self, images), fields(count = images.len()))]
    pub fn upsert_all(&self, images: &[TileImage]) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let written = conn.transaction::<_, DbError, _>(|conn| {
            let mut written = 0;
            for image in images {
                written += diesel::replace_into(schema::tile_images::table)
                    .values(image)
                    .execute(conn)?;
            }
            Ok(written)
        })?;
        info!(written, "Images upserted");
        Ok(written)
    }

    /// Every entry, valid or not, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn all(&self) -> Result<Vec<TileImage>, DbError> {
        let mut conn = self.connection()?;
        let images = schema::tile_images::table
            .order(schema::tile_images::id.asc())
            .select(TileImage::as_select())
            .load(&mut conn)?;
        debug!(count = images.len(), "Images loaded");
        Ok(images)
    }

    /// Looks up one entry.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get(&self, tile_id: u32) -> Result<Option<TileImage>, DbError> {
        let mut conn = self.connection()?;
        let image = schema::tile_images::table
            .find(tile_id as i32)
            .select(TileImage::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(image)
    }

    /// Image references whose fingerprint matches the current tile content,
    /// keyed by tile id. Stale entries and entries for unknown tiles are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, catalog), fields(tiles = catalog.len()))]
    pub fn load_valid(&self, catalog: &TileCatalog) -> Result<BTreeMap<u32, String>, DbError> {
        let images = self.all()?;
        let total = images.len();
        let valid: BTreeMap<u32, String> = images
            .into_iter()
            .filter(|image| {
                u32::try_from(*image.id())
                    .ok()
                    .and_then(|id| catalog.get(id))
                    .is_some_and(|tile| image.matches(tile))
            })
            .map(|image| (*image.id() as u32, image.image_ref().clone()))
            .collect();
        info!(total, valid = valid.len(), "Cached illustrations validated");
        Ok(valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn cache() -> (NamedTempFile, ImageCache) {
        let file = NamedTempFile::new().expect("temp file");
        let path = file.path().to_str().expect("utf-8 path").to_string();
        let cache = ImageCache::open(path).expect("open cache");
        (file, cache)
    }

    #[test]
    fn test_save_replaces_by_id() {
        let (_file, cache) = cache();
        let catalog = TileCatalog::standard();
        let tile = catalog.get(4).unwrap();
        cache.save(&TileImage::for_tile(tile, "first")).unwrap();
        cache.save(&TileImage::for_tile(tile, "second")).unwrap();
        let all = cache.all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].image_ref(), "second");
    }

    #[test]
    fn test_load_valid_skips_stale() {
        let (_file, cache) = cache();
        let catalog = TileCatalog::standard();
        cache.save(&TileImage::for_tile(catalog.get(2).unwrap(), "fresh")).unwrap();
        cache
            .save(&TileImage::new(3, "3:Old:Old text:speaking".into(), "stale".into(), 1))
            .unwrap();
        cache
            .save(&TileImage::new(42, "42:Gone:Gone:general".into(), "orphan".into(), 1))
            .unwrap();
        let valid = cache.load_valid(&catalog).unwrap();
        assert_eq!(valid.len(), 1);
        assert_eq!(valid.get(&2).map(String::as_str), Some("fresh"));
    }

    #[test]
    fn test_get_missing() {
        let (_file, cache) = cache();
        assert!(cache.get(7).unwrap().is_none());
    }

    #[test]
    fn test_reopen_keeps_data() {
        let (file, cache) = cache();
        let catalog = TileCatalog::standard();
        cache.save(&TileImage::for_tile(catalog.get(5).unwrap(), "img")).unwrap();
        let reopened = ImageCache::open(file.path().to_str().unwrap()).unwrap();
        assert!(reopened.get(5).unwrap().is_some());
    }
}
