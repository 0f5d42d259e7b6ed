//! The draw-operation contract shared by every backend.

use image::RgbaImage;

use crate::error::RenderError;
use crate::geometry::{Placement, Rect};
use crate::images::ImageRegistry;
use crate::text::TextStyle;

/// An immediate-mode 2D renderer.
///
/// Draw calls are only meaningful between one [`begin_frame`] and the next;
/// each call submits its own work and there is no end-of-frame step.
///
/// Colors are `#RRGGBB` strings. A malformed color fails that single call
/// with [`RenderError::InvalidColor`] and leaves the renderer untouched. Any
/// other problem with a draw (an image that is not loaded, text with no
/// surface or font to draw on) is logged and the draw is skipped, so a
/// frame loop never dies on a missing asset.
///
/// [`begin_frame`]: Renderer2D::begin_frame
pub trait Renderer2D {
    /// Human-readable backend name.
    fn name(&self) -> &'static str;

    /// Whether text is drawn on a separate overlay surface.
    fn has_overlay_surface(&self) -> bool;

    /// Clear the surface (and overlay) for a new frame.
    fn begin_frame(&mut self);

    /// Per-tick entry point for the frame driver. Starts a new frame.
    fn render(&mut self, _delta_time: f32) {
        self.begin_frame();
    }

    /// Change the surface size in pixels.
    fn resize(&mut self, width: u32, height: u32);

    /// Pixels for `id` became available (or changed).
    fn on_image_loaded(&mut self, id: &str, image: &RgbaImage);

    /// Forward every image loaded since the last call to
    /// [`on_image_loaded`](Self::on_image_loaded).
    fn sync_images(&mut self, images: &mut ImageRegistry) {
        for id in images.take_loaded() {
            if let Some(image) = images.get(&id) {
                self.on_image_loaded(&id, image);
            }
        }
    }

    /// Fill an axis-aligned rectangle anchored at its top-left corner.
    ///
    /// # Errors
    ///
    /// [`RenderError::InvalidColor`].
    fn draw_rect(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: &str,
        alpha: f32,
    ) -> Result<(), RenderError>;

    /// Fill a circle.
    ///
    /// # Errors
    ///
    /// [`RenderError::InvalidColor`].
    fn draw_circle(
        &mut self,
        x: f32,
        y: f32,
        radius: f32,
        color: &str,
        alpha: f32,
    ) -> Result<(), RenderError>;

    /// Fill a polygon given as `[x0, y0, x1, y1, ...]`.
    ///
    /// # Errors
    ///
    /// [`RenderError::InvalidColor`].
    fn draw_polygon(&mut self, points: &[f32], color: &str, alpha: f32) -> Result<(), RenderError>;

    /// Draw the whole of image `id` centered on `(x, y)`.
    ///
    /// With a `mask` color the image's silhouette is drawn in that color.
    ///
    /// # Errors
    ///
    /// [`RenderError::InvalidColor`] for a malformed mask.
    #[allow(clippy::too_many_arguments)]
    fn draw_image(
        &mut self,
        images: &ImageRegistry,
        id: &str,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        alpha: f32,
        mask: Option<&str>,
    ) -> Result<(), RenderError> {
        let Some(image) = images.get(id) else {
            log::debug!("draw_image: {id:?} not loaded, skipped");
            return Ok(());
        };
        #[expect(clippy::cast_precision_loss)]
        let region = Rect::new(0.0, 0.0, image.width() as f32, image.height() as f32);
        self.draw_image_region(
            images,
            id,
            region,
            &Placement::new(x, y, width, height),
            alpha,
            mask,
        )
    }

    /// Draw `region` (source pixels) of image `id` at `placement`.
    ///
    /// # Errors
    ///
    /// [`RenderError::InvalidColor`] for a malformed mask.
    fn draw_image_region(
        &mut self,
        images: &ImageRegistry,
        id: &str,
        region: Rect,
        placement: &Placement,
        alpha: f32,
        mask: Option<&str>,
    ) -> Result<(), RenderError>;

    /// Draw `text` with its baseline at `y`.
    ///
    /// # Errors
    ///
    /// [`RenderError::InvalidColor`].
    fn draw_text(
        &mut self,
        text: &str,
        style: &TextStyle,
        x: f32,
        y: f32,
        color: &str,
        alpha: f32,
    ) -> Result<(), RenderError>;
}
