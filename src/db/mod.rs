//! SQLite cache of generated tile illustrations.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::{CacheStage, DbError};
pub use models::TileImage;
pub use repository::ImageCache;
