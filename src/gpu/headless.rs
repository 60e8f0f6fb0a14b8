//! Headless backend that records GPU commands instead of executing them.
//!
//! Useful for dry runs and for asserting the exact command stream a frame
//! produces (upload, uniforms, draw) without a GPU.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::{
    GpuBackend, ProgramId, ResourceInitError, ShaderStage, TextureFilter, TextureId,
    UniformLocation, UniformWriter, DEFAULT_MAX_TEXTURE_SIZE,
};

/// A uniform value as written by a setter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
}

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCommand {
    CreateProgram(ProgramId),
    ResolveUniform { name: String, found: bool },
    UseProgram(ProgramId),
    CreateTexture(TextureId),
    UploadTexture {
        texture: TextureId,
        width: u32,
        height: u32,
        bytes: usize,
    },
    BindTexture { unit: u32, texture: TextureId },
    SetUniform { name: String, value: UniformValue },
    Draw { width: u32, height: u32 },
    DeleteTexture(TextureId),
    DeleteProgram(ProgramId),
}

/// Shared view of a headless backend's command history.
///
/// Stays readable after the backend itself has been dropped, so tests can
/// verify that teardown released every resource.
#[derive(Debug, Clone, Default)]
pub struct CommandLog(Rc<RefCell<Vec<GpuCommand>>>);

impl CommandLog {
    fn push(&self, command: GpuCommand) {
        self.0.borrow_mut().push(command);
    }

    /// Snapshot of all recorded commands.
    pub fn commands(&self) -> Vec<GpuCommand> {
        self.0.borrow().clone()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Number of draw calls recorded.
    pub fn draw_count(&self) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|c| matches!(c, GpuCommand::Draw { .. }))
            .count()
    }

    /// Every uniform resolution request, in order.
    pub fn resolved_uniforms(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter_map(|c| match c {
                GpuCommand::ResolveUniform { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Uniform writes recorded for `name`, in order.
    pub fn writes_to(&self, name: &str) -> Vec<UniformValue> {
        self.0
            .borrow()
            .iter()
            .filter_map(|c| match c {
                GpuCommand::SetUniform { name: n, value } if n == name => Some(*value),
                _ => None,
            })
            .collect()
    }

    /// Textures created and not yet deleted.
    pub fn live_textures(&self) -> HashSet<TextureId> {
        let mut live = HashSet::new();
        for command in self.0.borrow().iter() {
            match command {
                GpuCommand::CreateTexture(id) => {
                    live.insert(*id);
                }
                GpuCommand::DeleteTexture(id) => {
                    live.remove(id);
                }
                _ => {}
            }
        }
        live
    }

    /// Programs created and not yet deleted.
    pub fn live_programs(&self) -> HashSet<ProgramId> {
        let mut live = HashSet::new();
        for command in self.0.borrow().iter() {
            match command {
                GpuCommand::CreateProgram(id) => {
                    live.insert(*id);
                }
                GpuCommand::DeleteProgram(id) => {
                    live.remove(id);
                }
                _ => {}
            }
        }
        live
    }
}

/// [`GpuBackend`] that records commands and tracks current uniform values.
///
/// A uniform resolves when its base name (the part before `[`) appears as a
/// whole identifier in the linked fragment or vertex source, mimicking how a
/// GL driver drops unused uniforms.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    log: CommandLog,
    sources: Vec<String>,
    uniform_names: Vec<String>,
    values: HashMap<String, UniformValue>,
    next_texture: u32,
    fail_compile: Option<ShaderStage>,
    texture_budget: Option<u32>,
    max_texture_size: Option<u32>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose program creation fails at the given stage.
    pub fn failing_compile(stage: ShaderStage) -> Self {
        Self {
            fail_compile: Some(stage),
            ..Self::default()
        }
    }

    /// A backend that can allocate at most `budget` textures.
    pub fn with_texture_budget(budget: u32) -> Self {
        Self {
            texture_budget: Some(budget),
            ..Self::default()
        }
    }

    /// A backend reporting `size` as its largest texture edge.
    pub fn with_max_texture_size(size: u32) -> Self {
        Self {
            max_texture_size: Some(size),
            ..Self::default()
        }
    }

    /// Handle to the command history.
    pub fn log(&self) -> CommandLog {
        self.log.clone()
    }

    /// Last value written to `name`, if any.
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.values.get(name).copied()
    }

    fn record_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let Some(name) = self.uniform_names.get(location.0 as usize).cloned() else {
            return;
        };
        self.values.insert(name.clone(), value);
        self.log.push(GpuCommand::SetUniform { name, value });
    }
}

/// Whether `ident` occurs in `source` delimited by non-identifier characters.
fn declares_identifier(source: &str, ident: &str) -> bool {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_';
    !ident.is_empty()
        && source.match_indices(ident).any(|(start, _)| {
            let before = source[..start].chars().next_back();
            let after = source[start + ident.len()..].chars().next();
            !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
        })
}

impl UniformWriter for HeadlessBackend {
    fn set_int(&mut self, location: UniformLocation, value: i32) {
        self.record_uniform(location, UniformValue::Int(value));
    }

    fn set_float(&mut self, location: UniformLocation, value: f32) {
        self.record_uniform(location, UniformValue::Float(value));
    }

    fn set_vec2(&mut self, location: UniformLocation, value: [f32; 2]) {
        self.record_uniform(location, UniformValue::Vec2(value));
    }

    fn set_vec3(&mut self, location: UniformLocation, value: [f32; 3]) {
        self.record_uniform(location, UniformValue::Vec3(value));
    }
}

impl GpuBackend for HeadlessBackend {
    fn create_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramId, ResourceInitError> {
        if let Some(stage) = self.fail_compile {
            return Err(ResourceInitError::ShaderCompile {
                stage,
                log: "headless backend configured to fail".to_string(),
            });
        }
        self.sources.push(format!("{}\n{}", vertex_source, fragment_source));
        let id = ProgramId(self.sources.len() as u32 - 1);
        self.log.push(GpuCommand::CreateProgram(id));
        Ok(id)
    }

    fn max_texture_size(&self) -> u32 {
        self.max_texture_size.unwrap_or(DEFAULT_MAX_TEXTURE_SIZE)
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        let base = name.split('[').next().unwrap_or(name);
        let found = self
            .sources
            .get(program.0 as usize)
            .is_some_and(|source| declares_identifier(source, base));
        self.log.push(GpuCommand::ResolveUniform {
            name: name.to_string(),
            found,
        });
        if !found {
            return None;
        }
        self.uniform_names.push(name.to_string());
        Some(UniformLocation(self.uniform_names.len() as u32 - 1))
    }

    fn use_program(&mut self, program: ProgramId) {
        self.log.push(GpuCommand::UseProgram(program));
    }

    fn create_texture(&mut self, _filter: TextureFilter) -> Result<TextureId, ResourceInitError> {
        if let Some(budget) = self.texture_budget {
            if self.next_texture >= budget {
                return Err(ResourceInitError::Allocation {
                    what: "texture",
                    message: format!("headless texture budget of {} exhausted", budget),
                });
            }
        }
        let id = TextureId(self.next_texture);
        self.next_texture += 1;
        self.log.push(GpuCommand::CreateTexture(id));
        Ok(id)
    }

    fn upload_texture(&mut self, texture: TextureId, width: u32, height: u32, rgba: &[u8]) {
        self.log.push(GpuCommand::UploadTexture {
            texture,
            width,
            height,
            bytes: rgba.len(),
        });
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        self.log.push(GpuCommand::BindTexture { unit, texture });
    }

    fn draw_quad(&mut self, viewport_width: u32, viewport_height: u32) {
        self.log.push(GpuCommand::Draw {
            width: viewport_width,
            height: viewport_height,
        });
    }

    fn delete_texture(&mut self, texture: TextureId) {
        self.log.push(GpuCommand::DeleteTexture(texture));
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.log.push(GpuCommand::DeleteProgram(program));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_resolves_only_when_declared() {
        let mut gpu = HeadlessBackend::new();
        let program = gpu
            .create_program("void main() {}", "uniform float u_blend;")
            .unwrap();
        assert!(gpu.uniform_location(program, "u_blend").is_some());
        assert!(gpu.uniform_location(program, "u_missing").is_none());
    }

    #[test]
    fn test_array_element_resolves_by_base_name() {
        let mut gpu = HeadlessBackend::new();
        let program = gpu
            .create_program("", "uniform vec2 u_trail[4];")
            .unwrap();
        assert!(gpu.uniform_location(program, "u_trail[3]").is_some());
    }

    #[test]
    fn test_prefix_of_longer_identifier_does_not_resolve() {
        let mut gpu = HeadlessBackend::new();
        let program = gpu
            .create_program("", "uniform int u_trailLength;\nuniform float u_mouseRadius;")
            .unwrap();
        assert!(gpu.uniform_location(program, "u_trail[0]").is_none());
        assert!(gpu.uniform_location(program, "u_trail").is_none());
        assert!(gpu.uniform_location(program, "u_mouse").is_none());
        assert!(gpu.uniform_location(program, "u_trailLength").is_some());
    }

    #[test]
    fn test_max_texture_size() {
        assert_eq!(HeadlessBackend::new().max_texture_size(), DEFAULT_MAX_TEXTURE_SIZE);
        assert_eq!(HeadlessBackend::with_max_texture_size(256).max_texture_size(), 256);
    }

    #[test]
    fn test_written_values_are_tracked() {
        let mut gpu = HeadlessBackend::new();
        let program = gpu.create_program("", "uniform int u_colored;").unwrap();
        let location = gpu.uniform_location(program, "u_colored");
        gpu.put_int(location, 1);
        assert_eq!(gpu.uniform("u_colored"), Some(UniformValue::Int(1)));
        assert_eq!(gpu.log().writes_to("u_colored").len(), 1);
    }

    #[test]
    fn test_put_on_absent_location_is_a_no_op() {
        let mut gpu = HeadlessBackend::new();
        gpu.put_float(None, 1.0);
        assert!(gpu.log().commands().is_empty());
    }

    #[test]
    fn test_texture_budget() {
        let mut gpu = HeadlessBackend::with_texture_budget(1);
        assert!(gpu.create_texture(TextureFilter::Linear).is_ok());
        assert!(gpu.create_texture(TextureFilter::Linear).is_err());
    }

    #[test]
    fn test_live_resources_tracking() {
        let mut gpu = HeadlessBackend::new();
        let log = gpu.log();
        let texture = gpu.create_texture(TextureFilter::Nearest).unwrap();
        let program = gpu.create_program("", "").unwrap();
        assert_eq!(log.live_textures().len(), 1);
        gpu.delete_texture(texture);
        gpu.delete_program(program);
        assert!(log.live_textures().is_empty());
        assert!(log.live_programs().is_empty());
    }
}
