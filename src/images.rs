//! Decoded images, keyed by id, with an explicit load state.

use std::collections::HashMap;

use image::RgbaImage;

use crate::color::Rgb;
use crate::error::RenderError;
use crate::mask;

/// Load state of one image.
#[derive(Debug)]
pub enum ImageState {
    /// Registered, pixels not available yet.
    Pending,
    /// Decoded RGBA pixels.
    Loaded(RgbaImage),
    /// Loading or decoding failed.
    Failed(String),
}

/// Owns every image the application has asked for.
///
/// Loading is driven from outside (network, filesystem); the registry only
/// records the outcome. Renderers poll [`take_loaded`](Self::take_loaded)
/// once per frame to learn which ids gained pixels since the last frame.
#[derive(Debug, Default)]
pub struct ImageRegistry {
    entries: HashMap<String, ImageState>,
    newly_loaded: Vec<String>,
}

impl ImageRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` as pending. Known ids are left as they are.
    pub fn register(&mut self, id: &str) {
        self.entries
            .entry(id.to_owned())
            .or_insert(ImageState::Pending);
    }

    /// Decode encoded image bytes (PNG or JPEG) and store them under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::ImageDecode`]; the id is then marked failed.
    pub fn load_from_memory(&mut self, id: &str, data: &[u8]) -> Result<(), RenderError> {
        match image::load_from_memory(data) {
            Ok(decoded) => {
                self.insert(id, decoded.to_rgba8());
                Ok(())
            }
            Err(source) => {
                log::warn!("failed to decode image {id:?}: {source}");
                self.mark_failed(id, source.to_string());
                Err(RenderError::ImageDecode {
                    id: id.to_owned(),
                    source,
                })
            }
        }
    }

    /// Store already decoded pixels under `id`.
    pub fn insert(&mut self, id: &str, image: RgbaImage) {
        self.entries
            .insert(id.to_owned(), ImageState::Loaded(image));
        if !self.newly_loaded.iter().any(|queued| queued == id) {
            self.newly_loaded.push(id.to_owned());
        }
    }

    /// Record that `id` could not be loaded.
    pub fn mark_failed(&mut self, id: &str, reason: impl Into<String>) {
        self.entries
            .insert(id.to_owned(), ImageState::Failed(reason.into()));
    }

    /// Current state of `id`.
    #[must_use]
    pub fn state(&self, id: &str) -> Option<&ImageState> {
        self.entries.get(id)
    }

    /// Pixels for `id`, if loaded.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&RgbaImage> {
        match self.entries.get(id) {
            Some(ImageState::Loaded(image)) => Some(image),
            _ => None,
        }
    }

    /// `true` if `id` is loaded with a non-empty size.
    #[must_use]
    pub fn is_available(&self, id: &str) -> bool {
        self.get(id)
            .is_some_and(|image| image.width() > 0 && image.height() > 0)
    }

    /// Available pixels for `id`, or [`RenderError::MissingResource`].
    pub(crate) fn require(&self, id: &str) -> Result<&RgbaImage, RenderError> {
        self.get(id)
            .filter(|image| image.width() > 0 && image.height() > 0)
            .ok_or_else(|| RenderError::MissingResource(format!("image {id:?}")))
    }

    /// Ids that became loaded since the previous call, oldest first.
    pub fn take_loaded(&mut self) -> Vec<String> {
        std::mem::take(&mut self.newly_loaded)
    }

    /// Store a silhouette of `original` under `new_id`: every pixel takes
    /// `color` and keeps its own alpha.
    ///
    /// # Errors
    ///
    /// [`RenderError::InvalidColor`] for a malformed color,
    /// [`RenderError::MissingResource`] if `original` is not available.
    pub fn tint(&mut self, original: &str, new_id: &str, color: &str) -> Result<(), RenderError> {
        let rgb = Rgb::parse(color)?;
        let tinted = mask::silhouette(self.require(original)?, rgb);
        self.insert(new_id, tinted);
        Ok(())
    }

    /// RGBA value of one pixel, or `None` if the image is unavailable or
    /// the coordinates are out of range.
    #[must_use]
    pub fn pixel(&self, id: &str, x: u32, y: u32) -> Option<[u8; 4]> {
        let image = self.get(id)?;
        (x < image.width() && y < image.height()).then(|| image.get_pixel(x, y).0)
    }
}
