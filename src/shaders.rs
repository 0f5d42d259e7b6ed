//! GLSL shader sources and compilation helpers.
//!
//! The renderer uses a single program for every primitive. The vertex stage
//! applies scale, rotation, and translation from uniforms; the fragment
//! stage picks between the bound texture and a solid color depending on
//! whether the interpolated texture coordinates are inside `[0, 1]`.
//!
//! Two dialects carry the same program: GLSL 1.40 for desktop OpenGL 3.1+
//! and GLSL ES 1.00 for WebGL 1.

use crate::config::ShaderDialect;
use crate::error::{RenderError, ShaderStage};
use crate::gl::{consts, GlContext};

/// Vertex shader, GLSL 1.40.
///
/// # Uniforms
///
/// | Name            | Type   | Description                                |
/// |-----------------|--------|--------------------------------------------|
/// | `u_translation` | `vec2` | Pixel position of the local origin         |
/// | `u_rotation`    | `vec2` | `[sin(-θ), cos(-θ)]`                       |
/// | `u_scale`       | `vec2` | Scale factors applied before rotation      |
/// | `u_resolution`  | `vec2` | Viewport size in pixels                    |
pub const VERTEX_SRC_140: &str = r"#version 140

in vec2 a_position;
in vec2 a_texture_coordinates;

uniform vec2 u_translation;
uniform vec2 u_rotation;
uniform vec2 u_scale;
uniform vec2 u_resolution;

out vec2 v_texture_coordinates;

void main() {
    vec2 scaled = a_position * u_scale;
    vec2 rotated = vec2(
        scaled.x * u_rotation.y + scaled.y * u_rotation.x,
        scaled.y * u_rotation.y - scaled.x * u_rotation.x
    );
    vec2 world = rotated + u_translation;

    // Convert from [0, resolution] to [-1, 1] (flip Y for GL)
    vec2 ndc = (world / u_resolution) * 2.0 - 1.0;
    gl_Position = vec4(ndc * vec2(1.0, -1.0), 0.0, 1.0);

    v_texture_coordinates = a_texture_coordinates;
}
";

/// Fragment shader, GLSL 1.40.
///
/// Out-of-range texture coordinates select the solid `u_color`; anything
/// else samples `u_texture` and scales its alpha by `u_color.a`. Output is
/// premultiplied for `ONE, ONE_MINUS_SRC_ALPHA` blending.
pub const FRAGMENT_SRC_140: &str = r"#version 140

in vec2 v_texture_coordinates;

uniform vec4 u_color;
uniform sampler2D u_texture;

out vec4 frag_color;

void main() {
    if (v_texture_coordinates.x < 0.0 || v_texture_coordinates.y < 0.0 ||
            v_texture_coordinates.x > 1.0 || v_texture_coordinates.y > 1.0) {
        frag_color = u_color;
    } else {
        frag_color = texture(u_texture, v_texture_coordinates);
        frag_color.a *= u_color.a;
    }

    frag_color.rgb *= frag_color.a;
}
";

/// Vertex shader, GLSL ES 1.00 (WebGL 1). Same uniforms as
/// [`VERTEX_SRC_140`].
pub const VERTEX_SRC_ES100: &str = r"
attribute vec2 a_position;
attribute vec2 a_texture_coordinates;

uniform vec2 u_translation;
uniform vec2 u_rotation;
uniform vec2 u_scale;
uniform vec2 u_resolution;

varying vec2 v_texture_coordinates;

void main() {
    vec2 scaled = a_position * u_scale;
    vec2 rotated = vec2(
        scaled.x * u_rotation.y + scaled.y * u_rotation.x,
        scaled.y * u_rotation.y - scaled.x * u_rotation.x
    );
    vec2 world = rotated + u_translation;
    vec2 ndc = (world / u_resolution) * 2.0 - 1.0;
    gl_Position = vec4(ndc * vec2(1.0, -1.0), 0.0, 1.0);

    v_texture_coordinates = a_texture_coordinates;
}
";

/// Fragment shader, GLSL ES 1.00 (WebGL 1).
pub const FRAGMENT_SRC_ES100: &str = r"
precision mediump float;

uniform vec4 u_color;
uniform sampler2D u_texture;

varying vec2 v_texture_coordinates;

void main() {
    vec4 color;
    if (v_texture_coordinates.x < 0.0 || v_texture_coordinates.y < 0.0 ||
            v_texture_coordinates.x > 1.0 || v_texture_coordinates.y > 1.0) {
        color = u_color;
    } else {
        color = texture2D(u_texture, v_texture_coordinates);
        color.a *= u_color.a;
    }

    gl_FragColor = vec4(color.rgb * color.a, color.a);
}
";

/// `(vertex, fragment)` sources for a dialect.
#[must_use]
pub fn sources(dialect: ShaderDialect) -> (&'static str, &'static str) {
    match dialect {
        ShaderDialect::Glsl140 => (VERTEX_SRC_140, FRAGMENT_SRC_140),
        ShaderDialect::GlslEs100 => (VERTEX_SRC_ES100, FRAGMENT_SRC_ES100),
    }
}

/// Compile and link a program from vertex and fragment source strings.
///
/// Nothing leaks on the failure paths: a stage that fails to compile is
/// deleted along with any stage compiled before it, and a failed link
/// deletes the program and both stages. On success the shader objects are
/// detached and deleted, so only the program handle needs cleanup.
///
/// # Safety
///
/// Requires a valid, current GL context.
///
/// # Errors
///
/// [`RenderError::ShaderCompile`] naming the failing stage,
/// [`RenderError::ShaderLink`], or [`RenderError::Allocation`] if the
/// context cannot create the objects.
pub unsafe fn compile_program<G: GlContext>(
    gl: &G,
    vertex_src: &str,
    fragment_src: &str,
) -> Result<G::Program, RenderError> {
    let vs = unsafe { compile_shader(gl, ShaderStage::Vertex, vertex_src) }?;
    let fs = match unsafe { compile_shader(gl, ShaderStage::Fragment, fragment_src) } {
        Ok(fs) => fs,
        Err(err) => {
            unsafe { gl.delete_shader(vs) };
            return Err(err);
        }
    };

    unsafe {
        let program = match gl.create_program() {
            Ok(program) => program,
            Err(err) => {
                gl.delete_shader(vs);
                gl.delete_shader(fs);
                return Err(RenderError::Allocation(err));
            }
        };

        gl.attach_shader(program, vs);
        gl.attach_shader(program, fs);
        gl.link_program(program);

        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            gl.delete_shader(vs);
            gl.delete_shader(fs);
            return Err(RenderError::ShaderLink { log });
        }

        gl.detach_shader(program, vs);
        gl.detach_shader(program, fs);
        gl.delete_shader(vs);
        gl.delete_shader(fs);

        Ok(program)
    }
}

/// Compile a single shader stage from source.
///
/// # Safety
///
/// Requires a valid, current GL context.
unsafe fn compile_shader<G: GlContext>(
    gl: &G,
    stage: ShaderStage,
    source: &str,
) -> Result<G::Shader, RenderError> {
    let shader_type = match stage {
        ShaderStage::Vertex => consts::VERTEX_SHADER,
        ShaderStage::Fragment => consts::FRAGMENT_SHADER,
    };

    unsafe {
        let shader = gl.create_shader(shader_type).map_err(RenderError::Allocation)?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(RenderError::ShaderCompile { stage, log });
        }

        Ok(shader)
    }
}
