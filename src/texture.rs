//! Per-image texture cache for the GPU backend.

use std::collections::HashMap;

/// A cached texture and whether real pixels have been uploaded to it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CachedTexture<T> {
    /// The GL texture handle.
    pub texture: T,
    /// Pixel size once loaded; `None` while the 1×1 placeholder is in place.
    pub size: Option<[u32; 2]>,
}

impl<T> CachedTexture<T> {
    /// `true` until pixels have been uploaded for this id.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.size.is_none()
    }
}

/// Maps image ids to textures.
///
/// Each id gets at most one texture, created lazily on first use. Entries
/// are never evicted: the cache grows for the lifetime of the renderer and
/// textures are only released by [`GlRenderer::destroy`]. Hosts with an
/// unbounded set of image ids will leak GPU memory.
///
/// [`GlRenderer::destroy`]: crate::GlRenderer::destroy
#[derive(Debug)]
pub struct TextureCache<T> {
    textures: HashMap<String, CachedTexture<T>>,
}

impl<T: Copy> TextureCache<T> {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
        }
    }

    /// The entry for `id`, if one was created.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<CachedTexture<T>> {
        self.textures.get(id).copied()
    }

    /// The entry for `id`, creating a placeholder with `create` on first use.
    ///
    /// # Errors
    ///
    /// Propagates the error from `create`; nothing is cached in that case.
    pub fn get_or_try_insert<E>(
        &mut self,
        id: &str,
        create: impl FnOnce() -> Result<T, E>,
    ) -> Result<CachedTexture<T>, E> {
        if let Some(entry) = self.textures.get(id) {
            return Ok(*entry);
        }
        let entry = CachedTexture {
            texture: create()?,
            size: None,
        };
        log::trace!("texture cache: created placeholder for {id:?}");
        self.textures.insert(id.to_owned(), entry);
        Ok(entry)
    }

    /// Record that real pixels of `size` were uploaded for `id`.
    pub fn mark_loaded(&mut self, id: &str, size: [u32; 2]) {
        if let Some(entry) = self.textures.get_mut(id) {
            entry.size = Some(size);
        }
    }

    /// Number of cached textures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// `true` if no texture has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Every cached texture handle.
    pub fn textures(&self) -> impl Iterator<Item = T> + '_ {
        self.textures.values().map(|entry| entry.texture)
    }
}

impl<T: Copy> Default for TextureCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
