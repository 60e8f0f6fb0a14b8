//! OpenGL / WebGL2 backend built on `glow`.

use glow::HasContext;

use super::{
    GpuBackend, ProgramId, ResourceInitError, ShaderStage, TextureFilter, TextureId,
    UniformLocation, UniformWriter, DEFAULT_MAX_TEXTURE_SIZE,
};

/// [`GpuBackend`] over a `glow` context.
///
/// The context is created by the host (winit + glutin, a WebGL2 canvas, ...)
/// and handed over; the backend owns it from then on. Handles issued by this
/// backend index into the tables below, so releasing the backend releases
/// everything it created.
pub struct GlowBackend {
    gl: glow::Context,
    vertex_array: Option<glow::VertexArray>,
    programs: Vec<Option<glow::Program>>,
    textures: Vec<Option<glow::Texture>>,
    uniforms: Vec<glow::UniformLocation>,
    max_texture_size: u32,
}

impl GlowBackend {
    /// Wrap a current GL context.
    ///
    /// Creates the empty vertex array the full-screen quad is drawn with
    /// (vertex positions are generated from `gl_VertexID`).
    pub fn new(gl: glow::Context) -> Result<Self, ResourceInitError> {
        let vertex_array = unsafe { gl.create_vertex_array() }.map_err(|message| {
            ResourceInitError::Allocation {
                what: "vertex array",
                message,
            }
        })?;
        let max_texture_size = u32::try_from(unsafe { gl.get_parameter_i32(glow::MAX_TEXTURE_SIZE) })
            .unwrap_or(DEFAULT_MAX_TEXTURE_SIZE);
        log::debug!("GL_MAX_TEXTURE_SIZE = {}", max_texture_size);

        Ok(Self {
            gl,
            vertex_array: Some(vertex_array),
            programs: Vec::new(),
            textures: Vec::new(),
            uniforms: Vec::new(),
            max_texture_size,
        })
    }

    fn compile_stage(
        &self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<glow::Shader, ResourceInitError> {
        let kind = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        unsafe {
            let shader = self
                .gl
                .create_shader(kind)
                .map_err(|log| ResourceInitError::ShaderCompile { stage, log })?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            if !self.gl.get_shader_compile_status(shader) {
                let log = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(ResourceInitError::ShaderCompile { stage, log });
            }
            Ok(shader)
        }
    }

    fn program(&self, program: ProgramId) -> Option<glow::Program> {
        self.programs.get(program.0 as usize).copied().flatten()
    }

    fn texture(&self, texture: TextureId) -> Option<glow::Texture> {
        self.textures.get(texture.0 as usize).copied().flatten()
    }

    fn uniform(&self, location: UniformLocation) -> Option<&glow::UniformLocation> {
        self.uniforms.get(location.0 as usize)
    }
}

impl UniformWriter for GlowBackend {
    fn set_int(&mut self, location: UniformLocation, value: i32) {
        unsafe { self.gl.uniform_1_i32(self.uniform(location), value) }
    }

    fn set_float(&mut self, location: UniformLocation, value: f32) {
        unsafe { self.gl.uniform_1_f32(self.uniform(location), value) }
    }

    fn set_vec2(&mut self, location: UniformLocation, value: [f32; 2]) {
        unsafe { self.gl.uniform_2_f32(self.uniform(location), value[0], value[1]) }
    }

    fn set_vec3(&mut self, location: UniformLocation, value: [f32; 3]) {
        unsafe {
            self.gl
                .uniform_3_f32(self.uniform(location), value[0], value[1], value[2])
        }
    }
}

impl GpuBackend for GlowBackend {
    fn create_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramId, ResourceInitError> {
        let vertex = self.compile_stage(ShaderStage::Vertex, vertex_source)?;
        let fragment = match self.compile_stage(ShaderStage::Fragment, fragment_source) {
            Ok(shader) => shader,
            Err(e) => {
                unsafe { self.gl.delete_shader(vertex) };
                return Err(e);
            }
        };

        unsafe {
            let program = match self.gl.create_program() {
                Ok(program) => program,
                Err(message) => {
                    self.gl.delete_shader(vertex);
                    self.gl.delete_shader(fragment);
                    return Err(ResourceInitError::Allocation {
                        what: "shader program",
                        message,
                    });
                }
            };
            self.gl.attach_shader(program, vertex);
            self.gl.attach_shader(program, fragment);
            self.gl.link_program(program);
            let linked = self.gl.get_program_link_status(program);

            self.gl.detach_shader(program, vertex);
            self.gl.detach_shader(program, fragment);
            self.gl.delete_shader(vertex);
            self.gl.delete_shader(fragment);

            if !linked {
                let log = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                return Err(ResourceInitError::ProgramLink { log });
            }

            self.programs.push(Some(program));
        }

        Ok(ProgramId(self.programs.len() as u32 - 1))
    }

    fn max_texture_size(&self) -> u32 {
        self.max_texture_size
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let program = self.program(program)?;
        let location = unsafe { self.gl.get_uniform_location(program, name) }?;
        self.uniforms.push(location);
        Some(UniformLocation(self.uniforms.len() as u32 - 1))
    }

    fn use_program(&mut self, program: ProgramId) {
        let program = self.program(program);
        unsafe { self.gl.use_program(program) }
    }

    fn create_texture(&mut self, filter: TextureFilter) -> Result<TextureId, ResourceInitError> {
        let filter = match filter {
            TextureFilter::Nearest => glow::NEAREST,
            TextureFilter::Linear => glow::LINEAR,
        } as i32;

        unsafe {
            let texture = self
                .gl
                .create_texture()
                .map_err(|message| ResourceInitError::Allocation {
                    what: "texture",
                    message,
                })?;
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, filter);
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, filter);
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                glow::CLAMP_TO_EDGE as i32,
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                glow::CLAMP_TO_EDGE as i32,
            );
            self.gl.bind_texture(glow::TEXTURE_2D, None);
            self.textures.push(Some(texture));
        }

        Ok(TextureId(self.textures.len() as u32 - 1))
    }

    fn upload_texture(&mut self, texture: TextureId, width: u32, height: u32, rgba: &[u8]) {
        let Some(texture) = self.texture(texture) else {
            return;
        };
        unsafe {
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                Some(rgba),
            );
        }
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        let texture = self.texture(texture);
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, texture);
        }
    }

    fn draw_quad(&mut self, viewport_width: u32, viewport_height: u32) {
        unsafe {
            self.gl
                .viewport(0, 0, viewport_width as i32, viewport_height as i32);
            self.gl.bind_vertex_array(self.vertex_array);
            self.gl.draw_arrays(glow::TRIANGLE_STRIP, 0, 4);
            self.gl.bind_vertex_array(None);
        }
    }

    fn delete_texture(&mut self, texture: TextureId) {
        if let Some(slot) = self.textures.get_mut(texture.0 as usize) {
            if let Some(texture) = slot.take() {
                unsafe { self.gl.delete_texture(texture) }
            }
        }
    }

    fn delete_program(&mut self, program: ProgramId) {
        if let Some(slot) = self.programs.get_mut(program.0 as usize) {
            if let Some(program) = slot.take() {
                unsafe { self.gl.delete_program(program) }
                // Locations belong to the deleted program.
                self.uniforms.clear();
            }
        }
    }
}

impl Drop for GlowBackend {
    fn drop(&mut self) {
        unsafe {
            for texture in self.textures.drain(..).flatten() {
                self.gl.delete_texture(texture);
            }
            for program in self.programs.drain(..).flatten() {
                self.gl.delete_program(program);
            }
            if let Some(vertex_array) = self.vertex_array.take() {
                self.gl.delete_vertex_array(vertex_array);
            }
        }
    }
}
