//! Image cache errors.

use derive_more::{Display, Error};
use tracing::instrument;

/// Which stage of cache access failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum CacheStage {
    /// Opening the SQLite file.
    Connect,
    /// Creating or upgrading the schema.
    Migrate,
    /// Reading or writing entries.
    Query,
}

/// Cache error with the failing stage and the caller's location.
#[derive(Debug, Clone, Display, Error)]
#[display("Image cache {} error: {} at {}:{}", stage, message, file, line)]
pub struct DbError {
    /// Failing stage.
    pub stage: CacheStage,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DbError {
    /// Creates a cache error for `stage`.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(stage: CacheStage, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            stage,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::new(CacheStage::Query, err.to_string())
    }
}

impl From<diesel::ConnectionError> for DbError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::new(CacheStage::Connect, err.to_string())
    }
}

// Migration harness errors arrive boxed
impl From<Box<dyn std::error::Error + Send + Sync>> for DbError {
    #[track_caller]
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::new(CacheStage::Migrate, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_errors_name_stage() {
        let err = DbError::from(diesel::result::Error::NotFound);
        assert_eq!(err.stage, CacheStage::Query);
        assert!(err.to_string().starts_with("Image cache query error"));
        assert!(err.file.ends_with("error.rs"));
    }

    #[test]
    fn test_unopenable_file_is_a_connect_error() {
        let err = crate::db::ImageCache::open("/definitely/not/here/cache.db").unwrap_err();
        assert_eq!(err.stage, CacheStage::Connect);
        assert!(err.message.contains("/definitely/not/here/cache.db"));
    }
}
