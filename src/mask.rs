//! Silhouette (mask color) images for the software backend.

use std::collections::HashMap;

use image::{Rgba, RgbaImage};

use crate::color::Rgb;

/// A copy of `image` where every pixel is `color` with the source alpha.
#[must_use]
pub fn silhouette(image: &RgbaImage, color: Rgb) -> RgbaImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        *pixel = Rgba([color.r, color.g, color.b, pixel[3]]);
    }
    out
}

/// Silhouettes keyed by `(image id, mask color)`.
///
/// Keying by id and color, rather than by image size, means two masked
/// draws in the same frame can never overwrite each other's scratch
/// pixels, and a silhouette can be reused across frames. Entries for an id
/// are dropped when its pixels change.
#[derive(Debug, Default)]
pub struct MaskCache {
    entries: HashMap<(String, Rgb), RgbaImage>,
}

impl MaskCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The silhouette of `source` (registered as `id`) in `color`.
    pub fn get_or_create(&mut self, id: &str, color: Rgb, source: &RgbaImage) -> &RgbaImage {
        self.entries
            .entry((id.to_owned(), color))
            .or_insert_with(|| {
                log::trace!("mask cache: building {} silhouette of {id:?}", color.to_hex());
                silhouette(source, color)
            })
    }

    /// Drop every silhouette built from `id`.
    pub fn invalidate(&mut self, id: &str) {
        self.entries.retain(|(key, _), _| key != id);
    }

    /// Number of cached silhouettes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
