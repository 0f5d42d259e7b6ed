//! A recording [`GlContext`] for tests.
//!
//! Handles are plain integers. Every call bumps a counter, object lifetimes
//! are tracked so leaks show up, and each `draw_arrays` snapshots the
//! buffers and uniforms it would have consumed.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::gl::{consts, GlContext};

/// What a single `draw_arrays` call would have rendered.
#[derive(Debug, Clone)]
pub struct RecordedDraw {
    pub count: i32,
    pub texture: Option<u32>,
    pub positions: Vec<f32>,
    pub texture_coordinates: Vec<f32>,
    pub uniforms: HashMap<String, Vec<f32>>,
}

impl RecordedDraw {
    pub fn uniform(&self, name: &str) -> &[f32] {
        self.uniforms.get(name).map_or(&[], Vec::as_slice)
    }
}

#[derive(Debug, Default)]
pub struct MockState {
    next_id: u32,
    fail_stage: Option<u32>,
    fail_link: bool,
    pub calls: usize,
    pub live_shaders: HashSet<u32>,
    pub live_programs: HashSet<u32>,
    pub live_buffers: HashSet<u32>,
    pub live_vertex_arrays: HashSet<u32>,
    pub live_textures: HashSet<u32>,
    pub texture_uploads: HashMap<u32, (i32, i32, Vec<u8>)>,
    pub enabled: Vec<u32>,
    pub blend_func: Option<(u32, u32)>,
    pub viewport: Option<[i32; 4]>,
    pub clear_color: Option<[f32; 4]>,
    pub clears: Vec<u32>,
    pub draws: Vec<RecordedDraw>,
    bound_buffer: Option<u32>,
    bound_texture: Option<u32>,
    buffer_data: HashMap<u32, Vec<f32>>,
    attribute_buffers: HashMap<u32, u32>,
    uniforms: HashMap<String, Vec<f32>>,
}

impl MockState {
    pub fn live_shaders(&self) -> usize {
        self.live_shaders.len()
    }

    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

pub struct MockGl {
    state: Mutex<MockState>,
}

impl MockGl {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
        }
    }

    /// Shaders of `shader_type` fail to compile.
    pub fn failing_stage(shader_type: u32) -> Self {
        let gl = Self::new();
        gl.state().fail_stage = Some(shader_type);
        gl
    }

    /// Programs fail to link.
    pub fn failing_link() -> Self {
        let gl = Self::new();
        gl.state().fail_link = true;
        gl
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    fn with<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        let mut state = self.state();
        state.calls += 1;
        f(&mut state)
    }
}

impl GlContext for MockGl {
    type Shader = (u32, u32);
    type Program = u32;
    type Buffer = u32;
    type VertexArray = u32;
    type Texture = u32;
    type UniformLocation = String;

    unsafe fn create_shader(&self, shader_type: u32) -> Result<Self::Shader, String> {
        self.with(|s| {
            let id = s.next();
            s.live_shaders.insert(id);
            Ok((id, shader_type))
        })
    }

    unsafe fn shader_source(&self, _shader: Self::Shader, _source: &str) {
        self.with(|_| ());
    }

    unsafe fn compile_shader(&self, _shader: Self::Shader) {
        self.with(|_| ());
    }

    unsafe fn get_shader_compile_status(&self, shader: Self::Shader) -> bool {
        self.with(|s| s.fail_stage != Some(shader.1))
    }

    unsafe fn get_shader_info_log(&self, shader: Self::Shader) -> String {
        self.with(|_| format!("0:12: syntax error in shader {}", shader.0))
    }

    unsafe fn delete_shader(&self, shader: Self::Shader) {
        self.with(|s| s.live_shaders.remove(&shader.0));
    }

    unsafe fn create_program(&self) -> Result<Self::Program, String> {
        self.with(|s| {
            let id = s.next();
            s.live_programs.insert(id);
            Ok(id)
        })
    }

    unsafe fn attach_shader(&self, _program: Self::Program, _shader: Self::Shader) {
        self.with(|_| ());
    }

    unsafe fn detach_shader(&self, _program: Self::Program, _shader: Self::Shader) {
        self.with(|_| ());
    }

    unsafe fn link_program(&self, _program: Self::Program) {
        self.with(|_| ());
    }

    unsafe fn get_program_link_status(&self, _program: Self::Program) -> bool {
        self.with(|s| !s.fail_link)
    }

    unsafe fn get_program_info_log(&self, _program: Self::Program) -> String {
        self.with(|_| "varying v_texture_coordinates not written".to_owned())
    }

    unsafe fn delete_program(&self, program: Self::Program) {
        self.with(|s| s.live_programs.remove(&program));
    }

    unsafe fn use_program(&self, _program: Option<Self::Program>) {
        self.with(|_| ());
    }

    unsafe fn get_attrib_location(&self, _program: Self::Program, name: &str) -> Option<u32> {
        self.with(|_| match name {
            "a_position" => Some(0),
            "a_texture_coordinates" => Some(1),
            _ => None,
        })
    }

    unsafe fn get_uniform_location(
        &self,
        _program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        self.with(|_| Some(name.to_owned()))
    }

    unsafe fn create_buffer(&self) -> Result<Self::Buffer, String> {
        self.with(|s| {
            let id = s.next();
            s.live_buffers.insert(id);
            Ok(id)
        })
    }

    unsafe fn bind_buffer(&self, _target: u32, buffer: Option<Self::Buffer>) {
        self.with(|s| s.bound_buffer = buffer);
    }

    unsafe fn buffer_data_u8_slice(&self, _target: u32, data: &[u8], _usage: u32) {
        self.with(|s| {
            let floats: Vec<f32> = data
                .chunks_exact(4)
                .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
                .collect();
            let buffer = s.bound_buffer.unwrap();
            s.buffer_data.insert(buffer, floats);
        });
    }

    unsafe fn delete_buffer(&self, buffer: Self::Buffer) {
        self.with(|s| s.live_buffers.remove(&buffer));
    }

    unsafe fn create_vertex_array(&self) -> Result<Self::VertexArray, String> {
        self.with(|s| {
            let id = s.next();
            s.live_vertex_arrays.insert(id);
            Ok(id)
        })
    }

    unsafe fn bind_vertex_array(&self, _vertex_array: Option<Self::VertexArray>) {
        self.with(|_| ());
    }

    unsafe fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        self.with(|s| s.live_vertex_arrays.remove(&vertex_array));
    }

    unsafe fn enable_vertex_attrib_array(&self, _index: u32) {
        self.with(|_| ());
    }

    unsafe fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        data_type: u32,
        _normalized: bool,
        _stride: i32,
        _offset: i32,
    ) {
        assert_eq!((size, data_type), (2, consts::FLOAT));
        self.with(|s| {
            let buffer = s.bound_buffer.unwrap();
            s.attribute_buffers.insert(index, buffer);
        });
    }

    unsafe fn create_texture(&self) -> Result<Self::Texture, String> {
        self.with(|s| {
            let id = s.next();
            s.live_textures.insert(id);
            Ok(id)
        })
    }

    unsafe fn bind_texture(&self, _target: u32, texture: Option<Self::Texture>) {
        self.with(|s| s.bound_texture = texture);
    }

    unsafe fn active_texture(&self, unit: u32) {
        assert_eq!(unit, consts::TEXTURE0);
        self.with(|_| ());
    }

    unsafe fn tex_image_2d(
        &self,
        _target: u32,
        _level: i32,
        _internal_format: i32,
        width: i32,
        height: i32,
        _border: i32,
        _format: u32,
        _ty: u32,
        pixels: Option<&[u8]>,
    ) {
        self.with(|s| {
            let texture = s.bound_texture.unwrap();
            let pixels = pixels.map(<[u8]>::to_vec).unwrap_or_default();
            s.texture_uploads.insert(texture, (width, height, pixels));
        });
    }

    unsafe fn tex_parameter_i32(&self, _target: u32, _parameter: u32, _value: i32) {
        self.with(|_| ());
    }

    unsafe fn delete_texture(&self, texture: Self::Texture) {
        self.with(|s| s.live_textures.remove(&texture));
    }

    unsafe fn uniform_1_i32(&self, location: Option<&Self::UniformLocation>, x: i32) {
        #[allow(clippy::cast_precision_loss)]
        self.with(|s| {
            if let Some(name) = location {
                s.uniforms.insert(name.clone(), vec![x as f32]);
            }
        });
    }

    unsafe fn uniform_2_f32(&self, location: Option<&Self::UniformLocation>, x: f32, y: f32) {
        self.with(|s| {
            if let Some(name) = location {
                s.uniforms.insert(name.clone(), vec![x, y]);
            }
        });
    }

    unsafe fn uniform_4_f32(
        &self,
        location: Option<&Self::UniformLocation>,
        x: f32,
        y: f32,
        z: f32,
        w: f32,
    ) {
        self.with(|s| {
            if let Some(name) = location {
                s.uniforms.insert(name.clone(), vec![x, y, z, w]);
            }
        });
    }

    unsafe fn enable(&self, capability: u32) {
        self.with(|s| s.enabled.push(capability));
    }

    unsafe fn blend_func(&self, src: u32, dst: u32) {
        self.with(|s| s.blend_func = Some((src, dst)));
    }

    unsafe fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.with(|s| s.viewport = Some([x, y, width, height]));
    }

    unsafe fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.with(|s| s.clear_color = Some([red, green, blue, alpha]));
    }

    unsafe fn clear(&self, mask: u32) {
        self.with(|s| s.clears.push(mask));
    }

    unsafe fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        assert_eq!((mode, first), (consts::TRIANGLES, 0));
        self.with(|s| {
            let attribute = |index: u32| {
                s.attribute_buffers
                    .get(&index)
                    .and_then(|buffer| s.buffer_data.get(buffer))
                    .cloned()
                    .unwrap_or_default()
            };
            let draw = RecordedDraw {
                count,
                texture: s.bound_texture,
                positions: attribute(0),
                texture_coordinates: attribute(1),
                uniforms: s.uniforms.clone(),
            };
            s.draws.push(draw);
        });
    }
}
