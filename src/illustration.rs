//! Tile illustrations generated by an image model and kept in the cache.

use crate::db::{DbError, ImageCache, TileImage};
use crate::gemini::GeminiClient;
use async_trait::async_trait;
use little_learners_board::TileCatalog;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Produces an image reference for a tile, or `None` on failure.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generates an illustration.
    async fn generate(&self, title: &str, description: &str) -> Option<String>;
}

/// Image generation over the Gemini image model.
#[derive(Debug, Clone)]
pub struct GeminiImageGenerator {
    client: GeminiClient,
    model: String,
}

impl GeminiImageGenerator {
    /// Creates a generator.
    pub fn new(client: GeminiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    fn prompt(title: &str, description: &str) -> String {
        format!(
            "Draw a watercolor style, cartoonish, and cute illustration for a children's board game tile. \
             The subject is: \"{} - {}\". \
             The image should be simple, clear, colorful, and on a white background.",
            title, description
        )
    }
}

#[async_trait]
impl ImageGenerator for GeminiImageGenerator {
    #[instrument(skip(self, description), fields(model = %self.model))]
    async fn generate(&self, title: &str, description: &str) -> Option<String> {
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": Self::prompt(title, description) }] }]
        });

        let response = match self.client.generate_content(&self.model, &body).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Image generation failed");
                return None;
            }
        };

        let image = GeminiClient::parts(&response).iter().find_map(|part| {
            let inline = &part["inlineData"];
            let mime = inline["mimeType"].as_str()?;
            let data = inline["data"].as_str()?;
            Some(format!("data:{};base64,{}", mime, data))
        });
        if image.is_none() {
            warn!("No image in response");
        }
        image
    }
}

/// Generates illustrations for task tiles that lack a valid cached image,
/// one at a time with `delay` after each request, saving each as it
/// arrives. Returns the newly generated references by tile id.
///
/// A failed generation is skipped; only cache errors abort the batch.
///
/// # Errors
///
/// Returns [`DbError`] if the cache cannot be read or written.
#[instrument(skip(catalog, cache, generator))]
pub async fn illustrate_missing(
    catalog: &TileCatalog,
    cache: &ImageCache,
    generator: &dyn ImageGenerator,
    delay: Duration,
) -> Result<BTreeMap<u32, String>, DbError> {
    let existing = cache.load_valid(catalog)?;
    let todo: Vec<_> = catalog
        .task_tiles()
        .filter(|tile| !existing.contains_key(tile.id()))
        .collect();
    info!(missing = todo.len(), cached = existing.len(), "Illustrating tiles");

    let mut generated = BTreeMap::new();
    for tile in todo {
        debug!(tile_id = tile.id(), title = %tile.title(), "Requesting illustration");
        if let Some(image_ref) = generator.generate(tile.title(), tile.description()).await {
            cache.save(&TileImage::for_tile(tile, image_ref.clone()))?;
            generated.insert(*tile.id(), image_ref);
        }
        tokio::time::sleep(delay).await;
    }

    info!(generated = generated.len(), "Illustration batch finished");
    Ok(generated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_subject() {
        let prompt = GeminiImageGenerator::prompt("Countries", "Name 5 Countries.");
        assert!(prompt.contains("\"Countries - Name 5 Countries.\""));
        assert!(prompt.contains("watercolor"));
    }
}
