//! CPU-side geometry for the GPU backend.
//!
//! Everything here produces flat `[x0, y0, x1, y1, ...]` coordinate lists in
//! pixel space, ready for `bytemuck::cast_slice` and upload. Transforms
//! (translate, rotate, scale) are left to the vertex shader.

use std::borrow::Cow;
use std::f32::consts::TAU;

/// Texture coordinate outside `[0, 1]`. The fragment shader falls back to
/// the solid `u_color` for any fragment whose coordinates are out of range.
pub const SENTINEL_TEXTURE_COORDINATE: f32 = -1.0;

/// Number of points used to approximate a circle.
pub const CIRCLE_SEGMENTS: usize = 32;

/// An axis-aligned rectangle in pixels.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// Construct a rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Where and how an image is placed on the surface.
///
/// The image is centered on `(x, y)`, scaled by `scale_x`/`scale_y`
/// (`1.0` = unscaled), then rotated clockwise by `rotation` radians about
/// that center.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Placement {
    /// Center X.
    pub x: f32,
    /// Center Y.
    pub y: f32,
    /// Destination width before scaling.
    pub width: f32,
    /// Destination height before scaling.
    pub height: f32,
    /// Clockwise rotation in radians.
    pub rotation: f32,
    /// Horizontal scale factor.
    pub scale_x: f32,
    /// Vertical scale factor.
    pub scale_y: f32,
}

impl Placement {
    /// An unrotated, unscaled placement.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

/// Two triangles covering a `width`×`height` quad centered on the origin.
#[must_use]
pub fn quad_vertices(width: f32, height: f32) -> [f32; 12] {
    let (hw, hh) = (width / 2.0, height / 2.0);
    [
        -hw, -hh, //
        hw, -hh, //
        -hw, hh, //
        -hw, hh, //
        hw, -hh, //
        hw, hh,
    ]
}

/// Texture coordinates that force the solid-color branch for every vertex
/// in `vertices`.
#[must_use]
pub fn solid_texture_coordinates(vertices: &[f32]) -> Vec<f32> {
    vec![SENTINEL_TEXTURE_COORDINATE; vertices.len()]
}

/// Perimeter points of a circle, starting at angle zero and stepping by
/// `2π / CIRCLE_SEGMENTS`.
#[must_use]
pub fn circle_points(x: f32, y: f32, radius: f32) -> Vec<f32> {
    #[expect(clippy::cast_precision_loss)]
    let step = TAU / CIRCLE_SEGMENTS as f32;
    (0..CIRCLE_SEGMENTS)
        .flat_map(|i| {
            #[expect(clippy::cast_precision_loss)]
            let angle = i as f32 * step;
            [x + radius * angle.cos(), y + radius * angle.sin()]
        })
        .collect()
}

/// Center of the bounding box of `points`.
///
/// This is deliberately not the area centroid: the fan is built around the
/// box center, so strongly concave polygons can triangulate incorrectly.
///
/// Returns `[0.0, 0.0]` for an empty slice.
#[must_use]
pub fn polygon_center(points: &[f32]) -> [f32; 2] {
    let mut min = [f32::INFINITY; 2];
    let mut max = [f32::NEG_INFINITY; 2];
    for p in points.chunks_exact(2) {
        for axis in 0..2 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }
    if max[0] < min[0] {
        return [0.0, 0.0];
    }
    [
        min[0] + (max[0] - min[0]) / 2.0,
        min[1] + (max[1] - min[1]) / 2.0,
    ]
}

/// Triangulate a polygon as a fan around [`polygon_center`].
///
/// Emits one triangle `(p[i], p[i + 1], center)` per edge, including the
/// closing edge back to the first point.
#[must_use]
pub fn fan_triangulate(points: &[f32]) -> Vec<f32> {
    let center = polygon_center(points);
    let pts: Vec<[f32; 2]> = points.chunks_exact(2).map(|p| [p[0], p[1]]).collect();
    let mut vertices = Vec::with_capacity(pts.len() * 6);
    for (i, &a) in pts.iter().enumerate() {
        let b = pts[(i + 1) % pts.len()];
        vertices.extend_from_slice(&[a[0], a[1], b[0], b[1], center[0], center[1]]);
    }
    vertices
}

/// Triangle list for a polygon: a single triangle is used as-is, anything
/// larger goes through [`fan_triangulate`]. A trailing odd coordinate is
/// ignored.
#[must_use]
pub fn polygon_vertices(points: &[f32]) -> Cow<'_, [f32]> {
    let even = &points[..points.len() - points.len() % 2];
    if even.len() <= 6 {
        Cow::Borrowed(even)
    } else {
        Cow::Owned(fan_triangulate(even))
    }
}

/// Normalized texture coordinates for `region` of an `image_width`×
/// `image_height` image, in the same vertex order as [`quad_vertices`].
///
/// Each edge is pulled in to `[1, dimension - 2]` pixels so linear
/// filtering never samples past the image border. Axes shorter than three
/// pixels are left unclamped.
#[must_use]
pub fn texture_coordinates(image_width: u32, image_height: u32, region: Rect) -> [f32; 12] {
    #[expect(clippy::cast_precision_loss)]
    let (w, h) = (image_width as f32, image_height as f32);
    let (x0, x1) = clamp_span(region.x, region.x + region.width, w);
    let (y0, y1) = clamp_span(region.y, region.y + region.height, h);
    let (u0, u1, v0, v1) = (x0 / w, x1 / w, y0 / h, y1 / h);
    [
        u0, v0, //
        u1, v0, //
        u0, v1, //
        u0, v1, //
        u1, v0, //
        u1, v1,
    ]
}

fn clamp_span(start: f32, end: f32, dimension: f32) -> (f32, f32) {
    if dimension < 3.0 {
        (start, end)
    } else {
        (start.max(1.0), end.min(dimension - 2.0))
    }
}

/// The `u_rotation` uniform for a clockwise rotation: `[sin(-θ), cos(-θ)]`.
#[must_use]
pub fn rotation_vector(radians: f32) -> [f32; 2] {
    [(-radians).sin(), (-radians).cos()]
}
