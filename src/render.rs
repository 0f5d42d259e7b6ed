//! The GPU backend: one shader program, two streamed attribute buffers, one
//! draw call per primitive.

use std::sync::Arc;

use image::RgbaImage;

use crate::{
    backend::Renderer2D,
    color::{parse_color, Rgb, WHITE},
    config::{RendererConfig, TextureFilter},
    error::RenderError,
    geometry::{self, Placement, Rect},
    gl::{consts, GlContext},
    images::ImageRegistry,
    shaders,
    software::SoftwareRenderer,
    text::TextStyle,
    texture::{CachedTexture, TextureCache},
};

/// Name reported by [`GlRenderer`].
pub const GL_RENDERER_NAME: &str = "WebGL 2D renderer";

/// Unsized RGBA internal format, accepted by every GL flavour including
/// WebGL 1.
#[expect(clippy::cast_possible_wrap)]
const RGBA_INTERNAL_FORMAT: i32 = consts::RGBA as i32;

/// Opaque white, the placeholder texel shown until real pixels arrive.
const PLACEHOLDER_PIXEL: [u8; 4] = [255, 255, 255, 255];

/// Convert a `u32` to `i32` for GL API calls, saturating at `i32::MAX`.
fn gl_size(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Attribute locations of the program.
struct Attributes {
    /// `a_position`: vertex position in local pixels.
    position: u32,
    /// `a_texture_coordinates`: normalized, or the sentinel for solid fills.
    texture_coordinates: u32,
}

impl Attributes {
    unsafe fn locate<G: GlContext>(gl: &G, program: G::Program) -> Result<Self, RenderError> {
        let find = |name: &str| {
            let location = unsafe { gl.get_attrib_location(program, name) };
            location.ok_or_else(|| RenderError::ShaderLink {
                log: format!("attribute {name} not found in linked program"),
            })
        };
        Ok(Self {
            position: find("a_position")?,
            texture_coordinates: find("a_texture_coordinates")?,
        })
    }
}

/// Uniform locations of the program. A uniform the driver optimized away
/// has no location; setting it is then a no-op.
struct Uniforms<L> {
    translation: Option<L>,
    rotation: Option<L>,
    scale: Option<L>,
    resolution: Option<L>,
    color: Option<L>,
    texture: Option<L>,
}

impl<L> Uniforms<L> {
    unsafe fn locate<G: GlContext<UniformLocation = L>>(gl: &G, program: G::Program) -> Self {
        let find = |name: &str| unsafe { gl.get_uniform_location(program, name) };
        Self {
            translation: find("u_translation"),
            rotation: find("u_rotation"),
            scale: find("u_scale"),
            resolution: find("u_resolution"),
            color: find("u_color"),
            texture: find("u_texture"),
        }
    }
}

/// Everything one `draw_arrays` call needs.
struct DrawCall<'a, T> {
    vertices: &'a [f32],
    texture_coordinates: &'a [f32],
    texture: Option<T>,
    color: [f32; 4],
    translation: [f32; 2],
    rotation: [f32; 2],
    scale: [f32; 2],
}

impl<'a, T> DrawCall<'a, T> {
    /// An untransformed solid fill.
    fn solid(vertices: &'a [f32], texture_coordinates: &'a [f32], color: [f32; 4]) -> Self {
        Self {
            vertices,
            texture_coordinates,
            texture: None,
            color,
            translation: [0.0, 0.0],
            rotation: geometry::rotation_vector(0.0),
            scale: [1.0, 1.0],
        }
    }
}

/// Immediate-mode 2D renderer over a GL context.
///
/// Every draw operation uploads its own vertex and texture-coordinate
/// buffers and issues a single `draw_arrays(TRIANGLES)`; nothing is
/// batched. Solid fills and textured quads share one program: texture
/// coordinates outside `[0, 1]` select the uniform color.
///
/// Text has no GPU path. Attach a [`SoftwareRenderer`] with
/// [`with_overlay`](Self::with_overlay) and text is drawn onto it; the host
/// composites that surface above the GL canvas.
///
/// # Example
///
/// ```no_run
/// # use immediate_renderer::{GlRenderer, Renderer2D, RendererConfig};
/// # use std::sync::Arc;
/// # fn example(gl: Arc<glow::Context>) -> Result<(), immediate_renderer::RenderError> {
/// // With the context current:
/// let mut renderer = unsafe { GlRenderer::new(Some(gl), RendererConfig::default()) }?;
///
/// // Each frame:
/// renderer.begin_frame();
/// renderer.draw_rect(10.0, 10.0, 100.0, 50.0, "#FF8800", 1.0)?;
/// # Ok(())
/// # }
/// ```
pub struct GlRenderer<G: GlContext> {
    /// The GL context, shared with the host.
    gl: Arc<G>,
    config: RendererConfig,

    program: G::Program,
    attributes: Attributes,
    uniforms: Uniforms<G::UniformLocation>,

    /// Absent on contexts without vertex array objects (WebGL 1).
    vao: Option<G::VertexArray>,
    position_buffer: G::Buffer,
    texture_coordinate_buffer: G::Buffer,

    textures: TextureCache<G::Texture>,
    resolution: [u32; 2],
    overlay: Option<SoftwareRenderer>,
}

impl<G: GlContext> GlRenderer<G> {
    /// Create a renderer.
    ///
    /// Enables premultiplied-alpha blending, compiles the program for
    /// `config.dialect` and creates the attribute buffers.
    ///
    /// # Safety
    ///
    /// The context must be current and valid, and stay so for every later
    /// call. The caller must call [`destroy`](Self::destroy) before the
    /// context is dropped.
    ///
    /// # Errors
    ///
    /// [`RenderError::UnsupportedContext`] if `gl` is `None`; shader
    /// compile/link errors; [`RenderError::Allocation`] if a GL object could
    /// not be created. Nothing is leaked on failure.
    pub unsafe fn new(gl: Option<Arc<G>>, config: RendererConfig) -> Result<Self, RenderError> {
        let gl = gl.ok_or(RenderError::UnsupportedContext)?;

        unsafe {
            gl.enable(consts::BLEND);
            gl.blend_func(consts::ONE, consts::ONE_MINUS_SRC_ALPHA);
        }

        let (vertex_src, fragment_src) = shaders::sources(config.dialect);
        let program = unsafe { shaders::compile_program(&*gl, vertex_src, fragment_src)? };

        let attributes = match unsafe { Attributes::locate(&*gl, program) } {
            Ok(attributes) => attributes,
            Err(err) => {
                unsafe { gl.delete_program(program) };
                return Err(err);
            }
        };
        let uniforms = unsafe { Uniforms::locate(&*gl, program) };

        let (position_buffer, texture_coordinate_buffer) = unsafe {
            let position_buffer = match gl.create_buffer() {
                Ok(buffer) => buffer,
                Err(reason) => {
                    gl.delete_program(program);
                    return Err(RenderError::Allocation(reason));
                }
            };
            match gl.create_buffer() {
                Ok(buffer) => (position_buffer, buffer),
                Err(reason) => {
                    gl.delete_buffer(position_buffer);
                    gl.delete_program(program);
                    return Err(RenderError::Allocation(reason));
                }
            }
        };

        let vao = match unsafe { gl.create_vertex_array() } {
            Ok(vao) => Some(vao),
            Err(reason) => {
                log::debug!("no vertex array object, binding attributes per draw: {reason}");
                None
            }
        };

        log::info!("starting renderer {GL_RENDERER_NAME} ({:?})", config.dialect);

        Ok(Self {
            gl,
            resolution: config.viewport,
            config,
            program,
            attributes,
            uniforms,
            vao,
            position_buffer,
            texture_coordinate_buffer,
            textures: TextureCache::new(),
            overlay: None,
        })
    }

    /// Draw text onto a software overlay of the current viewport size.
    #[must_use]
    pub fn with_overlay(mut self) -> Self {
        let [width, height] = self.resolution;
        self.overlay = Some(SoftwareRenderer::new(width, height));
        self
    }

    /// The text overlay, if attached.
    #[must_use]
    pub fn overlay(&self) -> Option<&SoftwareRenderer> {
        self.overlay.as_ref()
    }

    /// Mutable access to the text overlay, e.g. to register fonts.
    pub fn overlay_mut(&mut self) -> Option<&mut SoftwareRenderer> {
        self.overlay.as_mut()
    }

    /// The per-image texture cache.
    #[must_use]
    pub fn textures(&self) -> &TextureCache<G::Texture> {
        &self.textures
    }

    /// The texture for `id`, creating a 1×1 white placeholder on first use.
    ///
    /// # Errors
    ///
    /// [`RenderError::Allocation`] if the texture could not be created.
    pub fn load_texture(&mut self, id: &str) -> Result<CachedTexture<G::Texture>, RenderError> {
        let gl = &*self.gl;
        let filter = self.config.texture_filter;
        self.textures
            .get_or_try_insert(id, || unsafe { create_placeholder(gl, filter) })
    }

    /// Release every GL object owned by the renderer.
    ///
    /// # Safety
    ///
    /// Requires the context passed to [`new`](Self::new) to be current.
    /// The renderer must not be used afterwards.
    pub unsafe fn destroy(&self) {
        let gl = &self.gl;
        unsafe {
            gl.delete_program(self.program);
            gl.delete_buffer(self.position_buffer);
            gl.delete_buffer(self.texture_coordinate_buffer);
            if let Some(vao) = self.vao {
                gl.delete_vertex_array(vao);
            }
            for texture in self.textures.textures() {
                gl.delete_texture(texture);
            }
        }
    }

    /// Upload `data` to `buffer` and point attribute `index` at it.
    unsafe fn upload_attribute(&self, buffer: G::Buffer, index: u32, data: &[f32]) {
        let gl = &self.gl;
        unsafe {
            gl.bind_buffer(consts::ARRAY_BUFFER, Some(buffer));
            gl.buffer_data_u8_slice(
                consts::ARRAY_BUFFER,
                bytemuck::cast_slice(data),
                consts::STREAM_DRAW,
            );
            gl.enable_vertex_attrib_array(index);
            gl.vertex_attrib_pointer_f32(index, 2, consts::FLOAT, false, 0, 0);
        }
    }

    fn submit(&self, call: &DrawCall<'_, G::Texture>) {
        debug_assert_eq!(call.vertices.len(), call.texture_coordinates.len());
        let Ok(count) = i32::try_from(call.vertices.len() / 2) else {
            log::debug!("draw skipped: {} vertices", call.vertices.len() / 2);
            return;
        };
        if count == 0 {
            return;
        }

        #[expect(clippy::cast_precision_loss)]
        let resolution = self.resolution.map(|side| side as f32);
        let gl = &self.gl;
        let uniforms = &self.uniforms;

        unsafe {
            gl.use_program(Some(self.program));
            if let Some(vao) = self.vao {
                gl.bind_vertex_array(Some(vao));
            }
            gl.active_texture(consts::TEXTURE0);
            gl.bind_texture(consts::TEXTURE_2D, call.texture);

            self.upload_attribute(self.position_buffer, self.attributes.position, call.vertices);
            self.upload_attribute(
                self.texture_coordinate_buffer,
                self.attributes.texture_coordinates,
                call.texture_coordinates,
            );

            let [red, green, blue, alpha] = call.color;
            gl.uniform_2_f32(uniforms.resolution.as_ref(), resolution[0], resolution[1]);
            gl.uniform_2_f32(uniforms.translation.as_ref(), call.translation[0], call.translation[1]);
            gl.uniform_2_f32(uniforms.rotation.as_ref(), call.rotation[0], call.rotation[1]);
            gl.uniform_2_f32(uniforms.scale.as_ref(), call.scale[0], call.scale[1]);
            gl.uniform_4_f32(uniforms.color.as_ref(), red, green, blue, alpha);
            gl.uniform_1_i32(uniforms.texture.as_ref(), 0);

            gl.draw_arrays(consts::TRIANGLES, 0, count);

            if self.vao.is_some() {
                gl.bind_vertex_array(None);
            }
        }
    }
}

/// A new 1×1 opaque white texture with clamped edges.
unsafe fn create_placeholder<G: GlContext>(
    gl: &G,
    filter: TextureFilter,
) -> Result<G::Texture, RenderError> {
    #[expect(clippy::cast_possible_wrap)]
    let filter = match filter {
        TextureFilter::Linear => consts::LINEAR,
        TextureFilter::Nearest => consts::NEAREST,
    } as i32;
    #[expect(clippy::cast_possible_wrap)]
    let clamp = consts::CLAMP_TO_EDGE as i32;

    unsafe {
        let texture = gl.create_texture().map_err(RenderError::Allocation)?;
        gl.bind_texture(consts::TEXTURE_2D, Some(texture));
        gl.tex_image_2d(
            consts::TEXTURE_2D,
            0,
            RGBA_INTERNAL_FORMAT,
            1,
            1,
            0,
            consts::RGBA,
            consts::UNSIGNED_BYTE,
            Some(&PLACEHOLDER_PIXEL),
        );
        gl.tex_parameter_i32(consts::TEXTURE_2D, consts::TEXTURE_MIN_FILTER, filter);
        gl.tex_parameter_i32(consts::TEXTURE_2D, consts::TEXTURE_MAG_FILTER, filter);
        gl.tex_parameter_i32(consts::TEXTURE_2D, consts::TEXTURE_WRAP_S, clamp);
        gl.tex_parameter_i32(consts::TEXTURE_2D, consts::TEXTURE_WRAP_T, clamp);
        gl.bind_texture(consts::TEXTURE_2D, None);
        Ok(texture)
    }
}

impl<G: GlContext> Renderer2D for GlRenderer<G> {
    fn name(&self) -> &'static str {
        GL_RENDERER_NAME
    }

    fn has_overlay_surface(&self) -> bool {
        self.overlay.is_some()
    }

    fn begin_frame(&mut self) {
        let [width, height] = self.resolution;
        let [red, green, blue, alpha] = self.config.clear_color;
        let gl = &self.gl;
        unsafe {
            gl.viewport(0, 0, gl_size(width), gl_size(height));
            gl.clear_color(red, green, blue, alpha);
            gl.clear(consts::COLOR_BUFFER_BIT | consts::DEPTH_BUFFER_BIT);
            gl.use_program(Some(self.program));
        }
        if let Some(overlay) = &mut self.overlay {
            overlay.begin_frame();
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.resolution = [width, height];
        if let Some(overlay) = &mut self.overlay {
            overlay.resize(width, height);
        }
    }

    fn on_image_loaded(&mut self, id: &str, image: &RgbaImage) {
        let entry = match self.load_texture(id) {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("cannot upload image {id:?}: {err}");
                return;
            }
        };
        let (width, height) = image.dimensions();
        let gl = &self.gl;
        unsafe {
            gl.bind_texture(consts::TEXTURE_2D, Some(entry.texture));
            gl.tex_image_2d(
                consts::TEXTURE_2D,
                0,
                RGBA_INTERNAL_FORMAT,
                gl_size(width),
                gl_size(height),
                0,
                consts::RGBA,
                consts::UNSIGNED_BYTE,
                Some(image.as_raw().as_slice()),
            );
            gl.bind_texture(consts::TEXTURE_2D, None);
        }
        self.textures.mark_loaded(id, [width, height]);
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
        let vertices = geometry::quad_vertices(width, height);
        let texture_coordinates = geometry::solid_texture_coordinates(&vertices);
        self.submit(&DrawCall {
            translation: [x + width / 2.0, y + height / 2.0],
            ..DrawCall::solid(&vertices, &texture_coordinates, color)
        });
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
        self.draw_polygon(&geometry::circle_points(x, y, radius), color, alpha)
    }

    fn draw_polygon(&mut self, points: &[f32], color: &str, alpha: f32) -> Result<(), RenderError> {
        let color = parse_color(color, alpha)?;
        if points.len() < 6 {
            log::debug!("draw_polygon: {} coordinates, skipped", points.len());
            return Ok(());
        }
        let vertices = geometry::polygon_vertices(points);
        let texture_coordinates = geometry::solid_texture_coordinates(&vertices);
        self.submit(&DrawCall::solid(&vertices, &texture_coordinates, color));
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
        let entry = match self.load_texture(id) {
            Ok(entry) => entry,
            Err(err) => {
                log::debug!("draw_image_region skipped: {err}");
                return Ok(());
            }
        };

        let vertices = geometry::quad_vertices(placement.width, placement.height);
        let (texture_coordinates, color) = match mask {
            Some(mask) => (
                geometry::solid_texture_coordinates(&vertices),
                mask.to_vector(alpha),
            ),
            None => (
                geometry::texture_coordinates(image.width(), image.height(), region).to_vec(),
                WHITE.to_vector(alpha),
            ),
        };

        self.submit(&DrawCall {
            vertices: &vertices,
            texture_coordinates: &texture_coordinates,
            texture: Some(entry.texture),
            color,
            translation: [placement.x, placement.y],
            rotation: geometry::rotation_vector(placement.rotation),
            scale: [placement.scale_x, placement.scale_y],
        });
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
        let Some(overlay) = &mut self.overlay else {
            log::debug!("draw_text: no overlay surface, {text:?} skipped");
            return Ok(());
        };
        match overlay.fill_text(text, style, x, y, color) {
            Err(RenderError::MissingResource(what)) => {
                log::debug!("draw_text skipped: {what} not loaded");
                Ok(())
            }
            other => other,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ShaderStage;
    use crate::mock_gl::MockGl;
    use crate::text::TEST_FONT;
    use image::Rgba;

    fn renderer() -> (Arc<MockGl>, GlRenderer<MockGl>) {
        let gl = Arc::new(MockGl::new());
        let renderer = unsafe { GlRenderer::new(Some(Arc::clone(&gl)), RendererConfig::default()) };
        let Ok(renderer) = renderer else {
            panic!("renderer construction failed");
        };
        (gl, renderer)
    }

    fn loaded(id: &str, width: u32, height: u32) -> ImageRegistry {
        let mut images = ImageRegistry::new();
        images.insert(id, RgbaImage::from_pixel(width, height, Rgba([0, 0, 255, 255])));
        images
    }

    #[test]
    fn missing_context_is_unsupported() {
        let result = unsafe { GlRenderer::<MockGl>::new(None, RendererConfig::default()) };
        assert!(matches!(result, Err(RenderError::UnsupportedContext)));
    }

    #[test]
    fn fragment_failure_leaks_nothing() {
        let gl = Arc::new(MockGl::failing_stage(consts::FRAGMENT_SHADER));
        let result = unsafe { GlRenderer::new(Some(Arc::clone(&gl)), RendererConfig::default()) };
        assert!(matches!(
            result,
            Err(RenderError::ShaderCompile {
                stage: ShaderStage::Fragment,
                ..
            })
        ));
        let state = gl.state();
        assert_eq!(state.live_shaders(), 0);
        assert!(state.live_programs.is_empty());
        assert!(state.live_buffers.is_empty());
    }

    #[test]
    fn construction_enables_premultiplied_blending() {
        let (gl, renderer) = renderer();
        let state = gl.state();
        assert!(state.enabled.contains(&consts::BLEND));
        assert_eq!(state.blend_func, Some((consts::ONE, consts::ONE_MINUS_SRC_ALPHA)));
        assert_eq!(renderer.name(), GL_RENDERER_NAME);
        assert!(!renderer.has_overlay_surface());
    }

    #[test]
    fn begin_frame_clears_viewport() {
        let (gl, mut renderer) = renderer();
        renderer.resize(320, 240);
        renderer.begin_frame();
        let state = gl.state();
        assert_eq!(state.viewport, Some([0, 0, 320, 240]));
        assert_eq!(state.clear_color, Some([0.0, 0.0, 0.0, 1.0]));
        assert_eq!(
            state.clears,
            vec![consts::COLOR_BUFFER_BIT | consts::DEPTH_BUFFER_BIT]
        );
    }

    #[test]
    fn placeholder_is_reused_until_loaded() {
        let (gl, mut renderer) = renderer();
        let first = renderer.load_texture("hero").unwrap();
        let second = renderer.load_texture("hero").unwrap();
        assert_eq!(first, second);
        assert!(first.is_placeholder());
        assert_eq!(
            gl.state().texture_uploads[&first.texture],
            (1, 1, vec![255, 255, 255, 255])
        );

        let image = RgbaImage::from_pixel(4, 2, Rgba([1, 2, 3, 4]));
        renderer.on_image_loaded("hero", &image);

        let after = renderer.load_texture("hero").unwrap();
        assert_eq!(after.texture, first.texture);
        assert!(!after.is_placeholder());
        assert_eq!(after.size, Some([4, 2]));
        let (width, height, pixels) = gl.state().texture_uploads[&first.texture].clone();
        assert_eq!((width, height, pixels.len()), (4, 2, 32));
        assert_eq!(renderer.textures().len(), 1);
    }

    #[test]
    fn invalid_colors_touch_no_gl_state() {
        let (gl, mut renderer) = renderer();
        let images = loaded("hero", 4, 4);
        let before = gl.state().calls;

        for color in ["red", "#FFF", "#GGGGGG"] {
            assert!(matches!(
                renderer.draw_rect(0.0, 0.0, 10.0, 10.0, color, 1.0),
                Err(RenderError::InvalidColor(_))
            ));
            assert!(matches!(
                renderer.draw_circle(5.0, 5.0, 3.0, color, 1.0),
                Err(RenderError::InvalidColor(_))
            ));
            assert!(matches!(
                renderer.draw_image(&images, "hero", 0.0, 0.0, 4.0, 4.0, 1.0, Some(color)),
                Err(RenderError::InvalidColor(_))
            ));
        }

        assert_eq!(gl.state().calls, before);
        assert!(renderer.textures().is_empty());
    }

    #[test]
    fn rect_is_a_translated_solid_quad() {
        let (gl, mut renderer) = renderer();
        renderer
            .draw_rect(10.0, 20.0, 30.0, 40.0, "#FF0000", 0.5)
            .unwrap();

        let state = gl.state();
        assert_eq!(state.draws.len(), 1);
        let draw = &state.draws[0];
        assert_eq!(draw.count, 6);
        assert_eq!(draw.positions, geometry::quad_vertices(30.0, 40.0).to_vec());
        assert_eq!(draw.texture_coordinates, vec![-1.0; 12]);
        assert_eq!(draw.uniform("u_translation"), &[25.0, 40.0]);
        assert_eq!(draw.uniform("u_color"), &[1.0, 0.0, 0.0, 0.5]);
        assert_eq!(draw.uniform("u_resolution"), &[800.0, 600.0]);
        assert_eq!(draw.texture, None);
    }

    #[test]
    fn circle_is_a_32_triangle_fan() {
        let (gl, mut renderer) = renderer();
        renderer.draw_circle(50.0, 50.0, 10.0, "#00FF00", 1.0).unwrap();

        let state = gl.state();
        let draw = &state.draws[0];
        assert_eq!(draw.count, 96);
        assert_eq!(draw.positions.len(), draw.texture_coordinates.len());
    }

    #[test]
    fn small_and_degenerate_polygons() {
        let (gl, mut renderer) = renderer();
        renderer
            .draw_polygon(&[0.0, 0.0, 10.0, 0.0, 0.0, 10.0], "#FFFFFF", 1.0)
            .unwrap();
        renderer
            .draw_polygon(&[0.0, 0.0, 10.0, 0.0], "#FFFFFF", 1.0)
            .unwrap();

        let state = gl.state();
        assert_eq!(state.draws.len(), 1);
        assert_eq!(state.draws[0].count, 3);
    }

    #[test]
    fn image_uses_clamped_coordinates_and_transform() {
        let (gl, mut renderer) = renderer();
        let mut images = loaded("hero", 8, 4);
        renderer.sync_images(&mut images);

        let placement = Placement {
            rotation: std::f32::consts::FRAC_PI_2,
            scale_x: 2.0,
            ..Placement::new(100.0, 50.0, 8.0, 4.0)
        };
        renderer
            .draw_image_region(&images, "hero", Rect::new(0.0, 0.0, 8.0, 4.0), &placement, 0.75, None)
            .unwrap();

        let texture = renderer.load_texture("hero").unwrap().texture;
        let state = gl.state();
        let draw = &state.draws[0];
        assert_eq!(draw.texture, Some(texture));
        assert_eq!(draw.texture_coordinates[0], 1.0 / 8.0);
        assert_eq!(draw.texture_coordinates[2], 6.0 / 8.0);
        assert_eq!(draw.texture_coordinates[1], 1.0 / 4.0);
        assert_eq!(draw.texture_coordinates[11], 2.0 / 4.0);
        assert_eq!(draw.uniform("u_translation"), &[100.0, 50.0]);
        assert_eq!(draw.uniform("u_scale"), &[2.0, 1.0]);
        assert_eq!(draw.uniform("u_color"), &[1.0, 1.0, 1.0, 0.75]);
        let rotation = draw.uniform("u_rotation");
        assert!((rotation[0] + 1.0).abs() < 1e-6);
        assert!(rotation[1].abs() < 1e-6);
    }

    #[test]
    fn mask_draws_a_silhouette() {
        let (gl, mut renderer) = renderer();
        let images = loaded("hero", 4, 4);
        renderer
            .draw_image(&images, "hero", 0.0, 0.0, 4.0, 4.0, 1.0, Some("#00FF00"))
            .unwrap();

        let state = gl.state();
        let draw = &state.draws[0];
        assert!(draw.texture_coordinates.iter().all(|&c| c == -1.0));
        assert_eq!(draw.uniform("u_color"), &[0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn unloaded_images_are_skipped() {
        let (gl, mut renderer) = renderer();
        let mut images = ImageRegistry::new();
        images.register("hero");
        renderer
            .draw_image(&images, "hero", 0.0, 0.0, 4.0, 4.0, 1.0, None)
            .unwrap();
        renderer
            .draw_image(&images, "unknown", 0.0, 0.0, 4.0, 4.0, 1.0, None)
            .unwrap();
        assert!(gl.state().draws.is_empty());
    }

    #[test]
    fn image_drawn_before_upload_uses_placeholder() {
        let (gl, mut renderer) = renderer();
        let images = loaded("hero", 4, 4);
        renderer
            .draw_image(&images, "hero", 0.0, 0.0, 4.0, 4.0, 1.0, None)
            .unwrap();

        let entry = renderer.load_texture("hero").unwrap();
        assert!(entry.is_placeholder());
        assert_eq!(gl.state().draws[0].texture, Some(entry.texture));
    }

    #[test]
    fn text_without_overlay_or_font_is_skipped() {
        let (gl, mut renderer) = renderer();
        let style = TextStyle::new("Sans", 12.0);
        renderer.draw_text("hi", &style, 0.0, 0.0, "#FFFFFF", 1.0).unwrap();

        let mut renderer = renderer.with_overlay();
        assert!(renderer.has_overlay_surface());
        renderer.draw_text("hi", &style, 0.0, 0.0, "#FFFFFF", 1.0).unwrap();
        assert!(matches!(
            renderer.draw_text("hi", &style, 0.0, 0.0, "white", 1.0),
            Err(RenderError::InvalidColor(_))
        ));

        assert!(gl.state().draws.is_empty());
        let overlay = renderer.overlay().unwrap();
        assert!(overlay.surface().pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn text_is_drawn_on_the_overlay() {
        let (gl, renderer) = renderer();
        let mut renderer = renderer.with_overlay();
        renderer
            .overlay_mut()
            .unwrap()
            .fonts_mut()
            .load_font("Mono", false, TEST_FONT)
            .unwrap();

        let style = TextStyle::new("Mono", 16.0);
        renderer
            .draw_text("Hi", &style, 10.0, 30.0, "#FF0000", 1.0)
            .unwrap();

        assert!(gl.state().draws.is_empty());
        let surface = renderer.overlay().unwrap().surface();
        let inked: Vec<_> = surface.pixels().filter(|p| p[3] > 0).collect();
        assert!(!inked.is_empty());
        assert!(inked.iter().all(|p| p[0] == 255 && p[1] == 0 && p[2] == 0));

        renderer.begin_frame();
        let surface = renderer.overlay().unwrap().surface();
        assert!(surface.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn resize_follows_overlay() {
        let (_gl, renderer) = renderer();
        let mut renderer = renderer.with_overlay();
        assert_eq!(renderer.overlay().unwrap().surface().dimensions(), (800, 600));
        renderer.resize(64, 32);
        assert_eq!(renderer.overlay().unwrap().surface().dimensions(), (64, 32));
    }

    #[test]
    fn destroy_releases_everything() {
        let (gl, mut renderer) = renderer();
        renderer.load_texture("a").unwrap();
        renderer.load_texture("b").unwrap();
        unsafe { renderer.destroy() };

        let state = gl.state();
        assert!(state.live_programs.is_empty());
        assert!(state.live_buffers.is_empty());
        assert!(state.live_vertex_arrays.is_empty());
        assert!(state.live_textures.is_empty());
    }
}
