//! GPU backend abstraction.
//!
//! The render core talks to the GPU through the narrow [`GpuBackend`] trait:
//! one program, a handful of textures, scalar/vector uniforms and a single
//! full-screen quad draw. Two implementations are provided:
//!
//! - [`GlowBackend`] - OpenGL 3.3 / GLES 3.0 / WebGL2 through `glow`
//! - [`HeadlessBackend`] - records every command without a GPU, used by the
//!   CLI dry runs and the test suite
//!
//! Handles ([`ProgramId`], [`TextureId`], [`UniformLocation`]) are opaque
//! indices into tables owned by the backend, so they are `Copy` on every
//! platform and never outlive the backend that issued them.

mod error;
mod glow_backend;
mod headless;

pub use error::{ResourceInitError, ShaderStage};
pub use glow_backend::GlowBackend;
pub use headless::{CommandLog, GpuCommand, HeadlessBackend, UniformValue};

/// Texture edge limit assumed when no device can be queried.
pub const DEFAULT_MAX_TEXTURE_SIZE: u32 = 4096;

/// Handle to a linked shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub(crate) u32);

/// Handle to a 2D RGBA texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub(crate) u32);

/// Resolved handle to a uniform of the active program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub(crate) u32);

/// Texture sampling filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

/// Writes uniform values into the currently bound program.
///
/// This is the only GPU surface uniform setters ever see. Setters write
/// values; they never read GPU state or allocate resources.
pub trait UniformWriter {
    fn set_int(&mut self, location: UniformLocation, value: i32);
    fn set_float(&mut self, location: UniformLocation, value: f32);
    fn set_vec2(&mut self, location: UniformLocation, value: [f32; 2]);
    fn set_vec3(&mut self, location: UniformLocation, value: [f32; 3]);

    /// Write an int if the uniform is present in the program.
    fn put_int(&mut self, location: Option<UniformLocation>, value: i32) {
        if let Some(location) = location {
            self.set_int(location, value);
        }
    }

    /// Write a float if the uniform is present in the program.
    fn put_float(&mut self, location: Option<UniformLocation>, value: f32) {
        if let Some(location) = location {
            self.set_float(location, value);
        }
    }

    /// Write a vec2 if the uniform is present in the program.
    fn put_vec2(&mut self, location: Option<UniformLocation>, value: [f32; 2]) {
        if let Some(location) = location {
            self.set_vec2(location, value);
        }
    }

    /// Write a vec3 if the uniform is present in the program.
    fn put_vec3(&mut self, location: Option<UniformLocation>, value: [f32; 3]) {
        if let Some(location) = location {
            self.set_vec3(location, value);
        }
    }
}

/// The GPU operations the ASCII pipeline needs.
pub trait GpuBackend: UniformWriter {
    /// Compile both stages and link them into a program.
    fn create_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramId, ResourceInitError>;

    /// Largest texture edge the device accepts, in pixels.
    fn max_texture_size(&self) -> u32;

    /// Resolve a uniform by name. `None` when the program does not use it.
    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    fn use_program(&mut self, program: ProgramId);

    fn create_texture(&mut self, filter: TextureFilter) -> Result<TextureId, ResourceInitError>;

    /// Replace the texture contents with tightly packed RGBA8 pixels.
    fn upload_texture(&mut self, texture: TextureId, width: u32, height: u32, rgba: &[u8]);

    fn bind_texture(&mut self, unit: u32, texture: TextureId);

    /// Draw the full-screen quad into a viewport of the given size.
    fn draw_quad(&mut self, viewport_width: u32, viewport_height: u32);

    fn delete_texture(&mut self, texture: TextureId);

    fn delete_program(&mut self, program: ProgramId);
}
