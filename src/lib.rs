//! An immediate-mode 2D renderer over a retained-mode graphics API.
//!
//! Applications issue draw calls (rectangles, circles, polygons, images,
//! image regions, text) between one [`Renderer2D::begin_frame`] and the
//! next. Each call is turned into GPU work right away; there is no scene
//! graph and no end-of-frame flush.
//!
//! Two backends implement [`Renderer2D`]:
//!
//! - [`GlRenderer`] drives any [`GlContext`] (OpenGL 3.1+ or WebGL through
//!   [glow] with the default `glow` feature). All primitives share one
//!   shader program; texture coordinates outside `[0, 1]` select a solid
//!   color, which is how untextured fills and mask silhouettes are drawn.
//! - [`SoftwareRenderer`] draws into an [`image::RgbaImage`], tessellating
//!   fills with [lyon] and shaping text with [fontdue]. It doubles as the
//!   text overlay of the GPU backend.
//!
//! Images live in an [`ImageRegistry`] with an explicit load state. A
//! [`FramePacer`] drives the per-tick loop: it clamps the frame delta,
//! forwards newly loaded images to the renderer and starts the frame.
//!
//! # Safety
//!
//! [`GlRenderer::new`] and [`GlRenderer::destroy`] are `unsafe`: the GL
//! context must be current for the lifetime of the renderer.
//!
//! # Logging
//!
//! The crate logs through the [`log`] facade and installs no logger.
//!
//! [glow]: https://docs.rs/glow
//! [lyon]: https://docs.rs/lyon
//! [fontdue]: https://docs.rs/fontdue

mod backend;
mod color;
mod config;
mod error;
mod frame;
pub mod geometry;
pub mod gl;
mod images;
mod mask;
mod render;
pub mod shaders;
mod software;
mod text;
mod texture;

#[cfg(test)]
mod mock_gl;

pub use backend::Renderer2D;
pub use color::{parse_color, Rgb, WHITE};
pub use config::{RendererConfig, ShaderDialect, TextureFilter};
pub use error::{RenderError, ShaderStage};
pub use frame::{FramePacer, MAX_DELTA_MS, MIN_DELTA_MS};
pub use geometry::{Placement, Rect};
pub use gl::GlContext;
pub use images::{ImageRegistry, ImageState};
pub use mask::{silhouette, MaskCache};
pub use render::{GlRenderer, GL_RENDERER_NAME};
pub use software::{SoftwareRenderer, SOFTWARE_RENDERER_NAME};
pub use text::{FontBook, TextAlign, TextStyle};
pub use texture::{CachedTexture, TextureCache};
