//! Renderer configuration.

/// GLSL dialect the shader program is compiled in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ShaderDialect {
    /// GLSL 1.40, desktop OpenGL 3.1 and later.
    #[default]
    Glsl140,
    /// GLSL ES 1.00, WebGL 1 and OpenGL ES 2.
    GlslEs100,
}

/// Sampling filter for image textures.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TextureFilter {
    /// Bilinear filtering.
    #[default]
    Linear,
    /// Nearest-texel sampling, for pixel art.
    Nearest,
}

/// Options fixed at renderer construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// Color the surface is cleared to at the start of every frame.
    pub clear_color: [f32; 4],
    /// Shader dialect for the GPU backend.
    pub dialect: ShaderDialect,
    /// Texture filter for the GPU backend.
    pub texture_filter: TextureFilter,
    /// Initial viewport size in pixels.
    pub viewport: [u32; 2],
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            dialect: ShaderDialect::default(),
            texture_filter: TextureFilter::default(),
            viewport: [800, 600],
        }
    }
}
