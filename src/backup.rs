//! Backup export and import of the illustration cache.
//!
//! A backup is a JSON document `{version, date, images: [...]}`. Import
//! validates the whole document before writing and then writes every entry
//! in one transaction, so a bad file never leaves the cache half-updated.

use crate::db::{DbError, ImageCache, TileImage};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, instrument, warn};

/// Current backup format version.
pub const BACKUP_VERSION: u32 = 1;

/// One cached image in a backup.
///
/// Accepts the older `hash`/`url` field names on import.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupImage {
    /// Tile id.
    id: i64,
    /// Tile content fingerprint at generation time.
    #[serde(alias = "hash")]
    fingerprint: String,
    /// Image reference (usually a data URL).
    #[serde(alias = "url")]
    image_ref: String,
    /// Generation time, epoch milliseconds.
    timestamp: i64,
}

impl From<TileImage> for BackupImage {
    fn from(image: TileImage) -> Self {
        Self {
            id: i64::from(*image.id()),
            fingerprint: image.fingerprint().clone(),
            image_ref: image.image_ref().clone(),
            timestamp: *image.timestamp(),
        }
    }
}

/// A backup document.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct Backup {
    /// Format version.
    version: u32,
    /// Export time, RFC 3339.
    date: String,
    /// Cache entries.
    images: Vec<BackupImage>,
}

impl Backup {
    /// Snapshots every entry in `cache`.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError`] if the cache cannot be read.
    #[instrument(skip(cache))]
    pub fn capture(cache: &ImageCache) -> Result<Self, BackupError> {
        let images: Vec<BackupImage> = cache.all()?.into_iter().map(BackupImage::from).collect();
        info!(count = images.len(), "Backup captured");
        Ok(Self {
            version: BACKUP_VERSION,
            date: chrono::Utc::now().to_rfc3339(),
            images,
        })
    }

    /// Parses and validates a backup document.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError`] for malformed JSON, an unsupported version,
    /// or any entry that cannot be stored.
    #[instrument(skip(text), fields(len = text.len()))]
    pub fn parse(text: &str) -> Result<Self, BackupError> {
        let backup: Self = serde_json::from_str(text)
            .map_err(|e| BackupError::new(format!("Not a backup document: {}", e)))?;
        backup.validate()?;
        Ok(backup)
    }

    /// Serializes the document.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError`] if serialization fails.
    pub fn to_json(&self) -> Result<String, BackupError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| BackupError::new(format!("Failed to serialize backup: {}", e)))
    }

    /// Checks every entry; the first problem rejects the whole document.
    fn validate(&self) -> Result<(), BackupError> {
        if self.version == 0 || self.version > BACKUP_VERSION {
            return Err(BackupError::new(format!(
                "Unsupported backup version {}",
                self.version
            )));
        }
        let mut seen = HashSet::new();
        for (index, image) in self.images.iter().enumerate() {
            if image.id < 1 || image.id > i64::from(i32::MAX) {
                return Err(BackupError::new(format!(
                    "Entry {} has invalid tile id {}",
                    index, image.id
                )));
            }
            if image.fingerprint.is_empty() || image.image_ref.is_empty() {
                return Err(BackupError::new(format!(
                    "Entry {} (tile {}) is missing its fingerprint or image",
                    index, image.id
                )));
            }
            if !seen.insert(image.id) {
                return Err(BackupError::new(format!(
                    "Tile {} appears more than once",
                    image.id
                )));
            }
        }
        Ok(())
    }

    /// The entries as cache rows.
    fn rows(&self) -> Vec<TileImage> {
        self.images
            .iter()
            .map(|image| {
                TileImage::new(
                    image.id as i32,
                    image.fingerprint.clone(),
                    image.image_ref.clone(),
                    image.timestamp,
                )
            })
            .collect()
    }
}

/// Exports the cache as a JSON backup document.
///
/// # Errors
///
/// Returns [`BackupError`] if the cache cannot be read.
#[instrument(skip(cache))]
pub fn export_backup(cache: &ImageCache) -> Result<String, BackupError> {
    Backup::capture(cache)?.to_json()
}

/// Imports a backup, upserting entries by tile id. Returns the number of
/// entries written.
///
/// # Errors
///
/// Returns [`BackupError`] if the document is invalid or the write fails;
/// in both cases the cache is unchanged.
#[instrument(skip(cache, text), fields(len = text.len()))]
pub fn import_backup(cache: &ImageCache, text: &str) -> Result<usize, BackupError> {
    let backup = match Backup::parse(text) {
        Ok(backup) => backup,
        Err(e) => {
            warn!(error = %e, "Backup rejected");
            return Err(e);
        }
    };
    let written = cache.upsert_all(&backup.rows())?;
    info!(written, "Backup imported");
    Ok(written)
}

/// Backup error.
#[derive(Debug, Clone, Display, Error)]
#[display("Backup error: {} at {}:{}", message, file, line)]
pub struct BackupError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl BackupError {
    /// Creates a new backup error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<DbError> for BackupError {
    #[track_caller]
    fn from(err: DbError) -> Self {
        Self::new(err.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_legacy_field_names() {
        let text = r#"{"version":1,"date":"2025-01-01T00:00:00Z","images":[
            {"id":3,"hash":"3:Count to 30:Can you count from 1 to 30?:speaking","url":"data:image/png;base64,AA","timestamp":5}
        ]}"#;
        let backup = Backup::parse(text).unwrap();
        assert_eq!(backup.images()[0].image_ref(), "data:image/png;base64,AA");
    }

    #[test]
    fn test_rejects_missing_images_array() {
        assert!(Backup::parse(r#"{"version":1,"date":"x"}"#).is_err());
        assert!(Backup::parse("not json").is_err());
    }

    #[test]
    fn test_rejects_bad_entry() {
        let text = r#"{"version":1,"date":"x","images":[
            {"id":2,"fingerprint":"f","imageRef":"a","timestamp":1},
            {"id":0,"fingerprint":"f","imageRef":"b","timestamp":1}
        ]}"#;
        let err = Backup::parse(text).unwrap_err();
        assert!(err.message.contains("invalid tile id"));
    }

    #[test]
    fn test_rejects_duplicates_and_future_versions() {
        let dup = r#"{"version":1,"date":"x","images":[
            {"id":2,"fingerprint":"f","imageRef":"a","timestamp":1},
            {"id":2,"fingerprint":"g","imageRef":"b","timestamp":2}
        ]}"#;
        assert!(Backup::parse(dup).is_err());
        assert!(Backup::parse(r#"{"version":9,"date":"x","images":[]}"#).is_err());
    }

    #[test]
    fn test_serializes_current_field_names() {
        let backup = Backup {
            version: BACKUP_VERSION,
            date: "d".into(),
            images: vec![BackupImage {
                id: 2,
                fingerprint: "f".into(),
                image_ref: "r".into(),
                timestamp: 1,
            }],
        };
        let json: serde_json::Value = serde_json::from_str(&backup.to_json().unwrap()).unwrap();
        assert_eq!(json["images"][0]["imageRef"], "r");
        assert_eq!(json["images"][0]["fingerprint"], "f");
    }
}
