//! Database models.

use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use little_learners_board::TileData;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::schema;

/// A cached illustration for one tile.
///
/// `fingerprint` is the tile's content fingerprint at generation time; once
/// the tile text changes the entry no longer matches and is ignored.
#[derive(
    Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable, Getters, Serialize, Deserialize, new,
)]
#[diesel(table_name = schema::tile_images)]
#[serde(rename_all = "camelCase")]
pub struct TileImage {
    id: i32,
    fingerprint: String,
    image_ref: String,
    timestamp: i64,
}

impl TileImage {
    /// Creates an entry for `tile`, fingerprinted and stamped now.
    #[instrument(skip(tile, image_ref), fields(tile_id = tile.id()))]
    pub fn for_tile(tile: &TileData, image_ref: impl Into<String>) -> Self {
        Self {
            id: *tile.id() as i32,
            fingerprint: tile.fingerprint(),
            image_ref: image_ref.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// True if this entry was generated for the tile's current content.
    pub fn matches(&self, tile: &TileData) -> bool {
        self.id == *tile.id() as i32 && self.fingerprint == tile.fingerprint()
    }
}
