//! GPU resource error types.

/// Shader pipeline stage, used in compile error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Errors that make a renderer instance unusable.
///
/// These are fatal: no partial rendering and no fallback renderer.
#[derive(Debug, thiserror::Error)]
pub enum ResourceInitError {
    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("shader program failed to link: {log}")]
    ProgramLink { log: String },

    #[error("failed to allocate {what}: {message}")]
    Allocation { what: &'static str, message: String },

    #[error("font unavailable: {message}")]
    FontUnavailable { message: String },
}
