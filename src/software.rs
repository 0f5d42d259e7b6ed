//! The CPU backend: draws into an in-memory RGBA surface.
//!
//! Fills are tessellated with lyon and rasterized by pixel-centre coverage,
//! images are inverse-mapped with nearest sampling, and text goes through
//! fontdue. Blending is straight-alpha source-over.
//!
//! The GPU backend also uses this renderer as its text overlay.

use std::collections::HashMap;
use std::ops::Range;

use fontdue::layout::{CoordinateSystem, GlyphRasterConfig, Layout, LayoutSettings};
use image::RgbaImage;
use lyon::math::point;
use lyon::path::Path as LyonPath;
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers,
};

use crate::{
    backend::Renderer2D,
    color::{parse_color, Rgb},
    error::RenderError,
    geometry::{Placement, Rect},
    images::ImageRegistry,
    mask::MaskCache,
    text::{FontBook, TextAlign, TextStyle},
};

/// Name reported by [`SoftwareRenderer`].
pub const SOFTWARE_RENDERER_NAME: &str = "Software canvas renderer";

/// Flattening tolerance in pixels for curved outlines.
const TOLERANCE: f32 = 0.1;

type Mesh = VertexBuffers<[f32; 2], u32>;

/// A rasterized glyph: coverage bytes, row-major.
struct CachedGlyph {
    width: usize,
    height: usize,
    coverage: Vec<u8>,
}

/// Immediate-mode 2D renderer drawing into an [`RgbaImage`].
pub struct SoftwareRenderer {
    surface: RgbaImage,
    fonts: FontBook,
    masks: MaskCache,
    glyphs: HashMap<GlyphRasterConfig, CachedGlyph>,
    layout: Layout<()>,
    tessellator: FillTessellator,
}

impl SoftwareRenderer {
    /// A renderer with a transparent `width`×`height` surface and no fonts.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        log::info!("starting renderer {SOFTWARE_RENDERER_NAME} ({width}x{height})");
        Self {
            surface: RgbaImage::new(width, height),
            fonts: FontBook::new(),
            masks: MaskCache::new(),
            glyphs: HashMap::new(),
            layout: Layout::new(CoordinateSystem::PositiveYDown),
            tessellator: FillTessellator::new(),
        }
    }

    /// The rendered pixels.
    #[must_use]
    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }

    /// Registered fonts.
    #[must_use]
    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    /// Register fonts here before drawing text.
    pub fn fonts_mut(&mut self) -> &mut FontBook {
        &mut self.fonts
    }

    /// Cached mask silhouettes.
    #[must_use]
    pub fn masks(&self) -> &MaskCache {
        &self.masks
    }

    /// Draw `text` with an already parsed `color`, baseline at `y`.
    ///
    /// # Errors
    ///
    /// [`RenderError::MissingResource`] if no face of the family is
    /// registered.
    pub fn fill_text(
        &mut self,
        text: &str,
        style: &TextStyle,
        x: f32,
        y: f32,
        color: [f32; 4],
    ) -> Result<(), RenderError> {
        let Some(font) = self.fonts.get(&style.family, style.bold) else {
            return Err(RenderError::MissingResource(format!("font {:?}", style.family)));
        };
        let ascent = font
            .horizontal_line_metrics(style.size)
            .map_or(style.size, |metrics| metrics.ascent);

        self.layout.reset(&LayoutSettings::default());
        self.layout
            .append(&[font], &fontdue::layout::TextStyle::new(text, style.size, 0));

        let extent = advance_width(font, text, style.size);

        // Snapshot positions so the layout borrow ends before rasterizing.
        let glyphs: Vec<(GlyphRasterConfig, f32, f32)> = self
            .layout
            .glyphs()
            .iter()
            .filter(|g| g.char_data.rasterize() && g.width > 0 && g.height > 0)
            .map(|g| (g.key, g.x, g.y))
            .collect();

        let left = match style.align {
            TextAlign::Left => x,
            TextAlign::Center => x - extent / 2.0,
            TextAlign::Right => x - extent,
        };
        let top = y - ascent;

        for (key, gx, gy) in glyphs {
            let glyph = self.glyphs.entry(key).or_insert_with(|| {
                let (metrics, coverage) = font.rasterize_config(key);
                CachedGlyph {
                    width: metrics.width,
                    height: metrics.height,
                    coverage,
                }
            });
            blit_coverage(&mut self.surface, glyph, [left + gx, top + gy], color);
        }
        Ok(())
    }

    fn tessellate_polygon(&mut self, points: &[f32]) -> Option<Mesh> {
        let mut coordinates = points.chunks_exact(2);
        let first = coordinates.next()?;
        let mut builder = LyonPath::builder();
        builder.begin(point(first[0], first[1]));
        for p in coordinates {
            builder.line_to(point(p[0], p[1]));
        }
        builder.close();
        let path = builder.build();

        let mut geometry = Mesh::new();
        let result = self.tessellator.tessellate_path(
            &path,
            &FillOptions::tolerance(TOLERANCE).with_fill_rule(FillRule::NonZero),
            &mut BuffersBuilder::new(&mut geometry, |vertex: FillVertex| {
                vertex.position().to_array()
            }),
        );
        match result {
            Ok(()) => Some(geometry),
            Err(err) => {
                log::debug!("polygon tessellation failed: {err:?}");
                None
            }
        }
    }

    fn tessellate_circle(&mut self, x: f32, y: f32, radius: f32) -> Option<Mesh> {
        let mut geometry = Mesh::new();
        let result = self.tessellator.tessellate_circle(
            point(x, y),
            radius,
            &FillOptions::tolerance(TOLERANCE),
            &mut BuffersBuilder::new(&mut geometry, |vertex: FillVertex| {
                vertex.position().to_array()
            }),
        );
        match result {
            Ok(()) => Some(geometry),
            Err(err) => {
                log::debug!("circle tessellation failed: {err:?}");
                None
            }
        }
    }
}

impl Renderer2D for SoftwareRenderer {
    fn name(&self) -> &'static str {
        SOFTWARE_RENDERER_NAME
    }

    fn has_overlay_surface(&self) -> bool {
        false
    }

    fn begin_frame(&mut self) {
        for pixel in self.surface.pixels_mut() {
            pixel.0 = [0; 4];
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.surface.dimensions() != (width, height) {
            self.surface = RgbaImage::new(width, height);
        }
    }

    fn on_image_loaded(&mut self, id: &str, _image: &RgbaImage) {
        self.masks.invalidate(id);
    }

    fn draw_rect(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: &str,
        alpha: f32,
    ) -> Result<(), RenderError> {
        let color = parse_color(color, alpha)?;
        let (left, top, right, bottom) = (x, y, x + width, y + height);
        fill_triangle(&mut self.surface, [left, top], [right, top], [left, bottom], color);
        fill_triangle(&mut self.surface, [left, bottom], [right, top], [right, bottom], color);
        Ok(())
    }

    fn draw_circle(
        &mut self,
        x: f32,
        y: f32,
        radius: f32,
        color: &str,
        alpha: f32,
    ) -> Result<(), RenderError> {
        let color = parse_color(color, alpha)?;
        if let Some(mesh) = self.tessellate_circle(x, y, radius) {
            fill_mesh(&mut self.surface, &mesh, color);
        }
        Ok(())
    }

    fn draw_polygon(&mut self, points: &[f32], color: &str, alpha: f32) -> Result<(), RenderError> {
        let color = parse_color(color, alpha)?;
        if points.len() < 6 {
            log::debug!("draw_polygon: {} coordinates, skipped", points.len());
            return Ok(());
        }
        if let Some(mesh) = self.tessellate_polygon(points) {
            fill_mesh(&mut self.surface, &mesh, color);
        }
        Ok(())
    }

    fn draw_image_region(
        &mut self,
        images: &ImageRegistry,
        id: &str,
        region: Rect,
        placement: &Placement,
        alpha: f32,
        mask: Option<&str>,
    ) -> Result<(), RenderError> {
        let mask = mask.map(Rgb::parse).transpose()?;
        let image = match images.require(id) {
            Ok(image) => image,
            Err(err) => {
                log::debug!("draw_image_region skipped: {err}");
                return Ok(());
            }
        };
        let source = match mask {
            Some(color) => self.masks.get_or_create(id, color, image),
            None => image,
        };
        draw_transformed(&mut self.surface, source, region, placement, alpha);
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        style: &TextStyle,
        x: f32,
        y: f32,
        color: &str,
        alpha: f32,
    ) -> Result<(), RenderError> {
        let color = parse_color(color, alpha)?;
        match self.fill_text(text, style, x, y, color) {
            Err(RenderError::MissingResource(what)) => {
                log::debug!("draw_text skipped: {what} not loaded");
                Ok(())
            }
            other => other,
        }
    }
}

/// Pen advance of `text` including kerning, trailing whitespace counted.
fn advance_width(font: &fontdue::Font, text: &str, size: f32) -> f32 {
    let mut width = 0.0;
    let mut previous = None;
    for character in text.chars() {
        if let Some(left) = previous {
            width += font.horizontal_kern(left, character, size).unwrap_or(0.0);
        }
        width += font.metrics(character, size).advance_width;
        previous = Some(character);
    }
    width
}

/// Integer pixel indices whose centres may fall in `[min, max]`, clipped to
/// `[0, limit)`.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn pixel_span(min: f32, max: f32, limit: u32) -> Range<u32> {
    let limit = limit as f32;
    let start = min.floor().clamp(0.0, limit) as u32;
    let end = max.ceil().clamp(0.0, limit) as u32;
    start..end
}

/// Twice the signed area of `(a, b, p)`.
fn edge(a: [f32; 2], b: [f32; 2], p: [f32; 2]) -> f32 {
    (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0])
}

/// Whether a pixel centre exactly on edge `a -> b` belongs to this
/// triangle. Adjacent triangles walk a shared edge in opposite directions,
/// so exactly one of them owns it.
fn owns_edge(a: [f32; 2], b: [f32; 2]) -> bool {
    b[1] > a[1] || (b[1] - a[1] == 0.0 && b[0] < a[0])
}

fn covers(weight: f32, a: [f32; 2], b: [f32; 2]) -> bool {
    weight > 0.0 || (weight == 0.0 && owns_edge(a, b))
}

fn fill_mesh(surface: &mut RgbaImage, mesh: &Mesh, color: [f32; 4]) {
    for triangle in mesh.indices.chunks_exact(3) {
        let corner = |k: usize| mesh.vertices[triangle[k] as usize];
        fill_triangle(surface, corner(0), corner(1), corner(2), color);
    }
}

#[expect(clippy::cast_precision_loss)]
fn fill_triangle(surface: &mut RgbaImage, a: [f32; 2], b: [f32; 2], c: [f32; 2], color: [f32; 4]) {
    let area = edge(a, b, c);
    if area == 0.0 || !area.is_finite() {
        return;
    }
    let (b, c) = if area < 0.0 { (c, b) } else { (b, c) };

    let xs = pixel_span(a[0].min(b[0]).min(c[0]), a[0].max(b[0]).max(c[0]), surface.width());
    let ys = pixel_span(a[1].min(b[1]).min(c[1]), a[1].max(b[1]).max(c[1]), surface.height());
    for py in ys {
        for px in xs.clone() {
            let p = [px as f32 + 0.5, py as f32 + 0.5];
            if covers(edge(b, c, p), b, c) && covers(edge(c, a, p), c, a) && covers(edge(a, b, p), a, b)
            {
                blend(surface, px, py, color);
            }
        }
    }
}

/// Nearest-sample `region` of `source` into `surface` at `placement`.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn draw_transformed(
    surface: &mut RgbaImage,
    source: &RgbaImage,
    region: Rect,
    placement: &Placement,
    alpha: f32,
) {
    let (half_width, half_height) = (placement.width / 2.0, placement.height / 2.0);
    let (scale_x, scale_y) = (placement.scale_x, placement.scale_y);
    if half_width <= 0.0 || half_height <= 0.0 || scale_x == 0.0 || scale_y == 0.0 {
        return;
    }
    let (sin, cos) = placement.rotation.sin_cos();

    let corners = [
        [-half_width, -half_height],
        [half_width, -half_height],
        [-half_width, half_height],
        [half_width, half_height],
    ]
    .map(|[lx, ly]| {
        let (x, y) = (lx * scale_x, ly * scale_y);
        [placement.x + x * cos - y * sin, placement.y + x * sin + y * cos]
    });
    let (mut min, mut max) = ([f32::INFINITY; 2], [f32::NEG_INFINITY; 2]);
    for corner in corners {
        for axis in 0..2 {
            min[axis] = min[axis].min(corner[axis]);
            max[axis] = max[axis].max(corner[axis]);
        }
    }

    let last_x = source.width().saturating_sub(1);
    let last_y = source.height().saturating_sub(1);
    for py in pixel_span(min[1], max[1], surface.height()) {
        for px in pixel_span(min[0], max[0], surface.width()) {
            let dx = px as f32 + 0.5 - placement.x;
            let dy = py as f32 + 0.5 - placement.y;
            let lx = (dx * cos + dy * sin) / scale_x;
            let ly = (dy * cos - dx * sin) / scale_y;
            if lx < -half_width || lx >= half_width || ly < -half_height || ly >= half_height {
                continue;
            }
            let u = region.x + (lx + half_width) / placement.width * region.width;
            let v = region.y + (ly + half_height) / placement.height * region.height;
            let texel = source.get_pixel(
                (u.floor().max(0.0) as u32).min(last_x),
                (v.floor().max(0.0) as u32).min(last_y),
            );
            let [r, g, b, a] = texel.0.map(|channel| f32::from(channel) / 255.0);
            blend(surface, px, py, [r, g, b, a * alpha]);
        }
    }
}

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn blit_coverage(surface: &mut RgbaImage, glyph: &CachedGlyph, origin: [f32; 2], color: [f32; 4]) {
    let left = origin[0].round() as i64;
    let top = origin[1].round() as i64;
    for row in 0..glyph.height {
        for column in 0..glyph.width {
            let coverage = glyph.coverage[row * glyph.width + column];
            if coverage == 0 {
                continue;
            }
            let (Ok(x), Ok(y)) = (
                u32::try_from(left + column as i64),
                u32::try_from(top + row as i64),
            ) else {
                continue;
            };
            if x < surface.width() && y < surface.height() {
                let alpha = color[3] * f32::from(coverage) / 255.0;
                blend(surface, x, y, [color[0], color[1], color[2], alpha]);
            }
        }
    }
}

/// Source-over blend of a straight-alpha `color` (components in `[0, 1]`).
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend(surface: &mut RgbaImage, x: u32, y: u32, color: [f32; 4]) {
    let source_alpha = color[3].clamp(0.0, 1.0);
    if source_alpha <= 0.0 {
        return;
    }
    let to_byte = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;

    let pixel = surface.get_pixel_mut(x, y);
    let destination_alpha = f32::from(pixel[3]) / 255.0;
    let out_alpha = source_alpha + destination_alpha * (1.0 - source_alpha);
    for channel in 0..3 {
        let destination = f32::from(pixel[channel]) / 255.0;
        let value = (color[channel] * source_alpha
            + destination * destination_alpha * (1.0 - source_alpha))
            / out_alpha;
        pixel[channel] = to_byte(value);
    }
    pixel[3] = to_byte(out_alpha);
}
