use std::{fmt, io};

/// Errors raised while resolving an asset path to a byte stream.
#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    /// No asset exists at the path.
    #[error("asset not found: {0}")]
    NotFound(String),

    /// The path escapes the asset root or is otherwise unusable.
    #[error("invalid asset path: {0}")]
    InvalidPath(String),

    /// The asset exists but could not be read.
    #[error("failed to read asset {path}: {source}")]
    Io {
        /// Asset path as requested.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

/// Surface configuration and context creation failures.
///
/// All variants are fatal for the window instance they occurred on.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// None of the offered configurations matched RGB 8-8-8 with a 24-bit depth buffer.
    #[error("no matching surface configuration among {offered} offered")]
    NoMatchingConfig {
        /// Number of configurations the display offered for the request.
        offered: usize,
    },

    /// The display could not be opened or queried.
    #[error("display error: {0}")]
    Display(String),

    /// The window surface could not be created.
    #[error("surface creation failed: {0}")]
    SurfaceCreation(String),

    /// The rendering context could not be created.
    #[error("context creation failed: {0}")]
    ContextCreation(String),

    /// The context could not be made current on the calling thread.
    #[error("failed to make context current: {0}")]
    MakeCurrent(String),
}

/// Per-frame surface failures.
#[derive(thiserror::Error, Debug)]
pub enum SurfaceError {
    /// The surface context has already been torn down.
    #[error("surface context has been torn down")]
    TornDown,

    /// Presenting the back buffer failed.
    #[error("buffer swap failed: {0}")]
    SwapFailed(String),
}

/// Identifies which step of program construction failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    /// Vertex stage compilation.
    Vertex,
    /// Fragment stage compilation.
    Fragment,
    /// Program linking.
    Link,
}

impl ShaderStage {
    /// Returns the GL enum name for compile stages, or `"link"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vertex => "GL_VERTEX_SHADER",
            Self::Fragment => "GL_FRAGMENT_SHADER",
            Self::Link => "link",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shader program construction failures.
#[derive(thiserror::Error, Debug)]
pub enum ShaderError {
    /// The shader source could not be opened.
    #[error("shader source unavailable: {path}")]
    SourceUnavailable {
        /// Asset path of the source.
        path: String,
        /// Why the asset could not be opened.
        #[source]
        source: AssetError,
    },

    /// The shader source is not valid UTF-8.
    #[error("shader source for {stage} is not valid UTF-8: {path}")]
    InvalidSource {
        /// Stage the source was meant for.
        stage: ShaderStage,
        /// Asset path of the source.
        path: String,
    },

    /// The driver refused to create a shader object.
    #[error("failed to create {stage} shader object: {reason}")]
    StageCreation {
        /// Stage being created.
        stage: ShaderStage,
        /// Driver-provided reason.
        reason: String,
    },

    /// The driver refused to create a program object.
    #[error("failed to create shader program: {0}")]
    ProgramCreation(String),

    /// A stage failed to compile.
    #[error("compile shader({stage}) failure: {log}")]
    Compile {
        /// Stage that failed to compile.
        stage: ShaderStage,
        /// Driver compile log.
        log: String,
    },

    /// The program failed to link.
    #[error("program link failure: {log}")]
    Link {
        /// Driver link log.
        log: String,
    },
}

impl ShaderError {
    /// Placeholder used when the driver reports a failure with an empty log.
    pub const EMPTY_LOG: &'static str = "<driver returned an empty info log>";

    /// The construction step this error belongs to.
    pub fn stage(&self) -> Option<ShaderStage> {
        match self {
            Self::InvalidSource { stage, .. }
            | Self::StageCreation { stage, .. }
            | Self::Compile { stage, .. } => Some(*stage),
            Self::Link { .. } => Some(ShaderStage::Link),
            Self::SourceUnavailable { .. } | Self::ProgramCreation(_) => None,
        }
    }

    /// The driver log for compile and link failures.
    pub fn log(&self) -> Option<&str> {
        match self {
            Self::Compile { log, .. } | Self::Link { log } => Some(log),
            _ => None,
        }
    }

    pub(crate) fn compile_failed(stage: ShaderStage, log: String) -> Self {
        Self::Compile { stage, log: non_empty_log(log) }
    }

    pub(crate) fn link_failed(log: String) -> Self {
        Self::Link { log: non_empty_log(log) }
    }
}

fn non_empty_log(log: String) -> String {
    let trimmed = log.trim_end_matches(['\0', '\n', ' ']);
    if trimmed.trim().is_empty() {
        ShaderError::EMPTY_LOG.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Texture loading failures. No GPU handle survives any of these.
#[derive(thiserror::Error, Debug)]
pub enum TextureError {
    /// The image asset could not be opened or read.
    #[error("image source unavailable: {path}")]
    SourceUnavailable {
        /// Asset path of the image.
        path: String,
        /// Why the asset could not be opened.
        #[source]
        source: AssetError,
    },

    /// The image format could not be recognized or its header read.
    #[error("failed to initialize image decoder for {path}: {reason}")]
    DecodeInitFailed {
        /// Asset path of the image.
        path: String,
        /// Decoder-provided reason.
        reason: String,
    },

    /// The image body failed to decode.
    #[error("failed to decode image {path}: {reason}")]
    DecodeFailed {
        /// Asset path of the image.
        path: String,
        /// Decoder-provided reason.
        reason: String,
    },

    /// The driver refused to create a texture object.
    #[error("failed to create texture: {0}")]
    Creation(String),
}

/// Renderer construction failures.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    /// The surface context could not be established.
    #[error(transparent)]
    Surface(#[from] ConfigError),

    /// The shader program failed to load.
    #[error(transparent)]
    Shader(#[from] ShaderError),

    /// The texture at `index` failed to load.
    #[error("texture {index} failed to load: {source}")]
    Texture {
        /// Position of the texture in the scene's binding list.
        index: usize,
        /// Underlying texture failure.
        #[source]
        source: TextureError,
    },

    /// Vertex or index buffers could not be created.
    #[error("geometry buffer creation failed: {0}")]
    Geometry(String),

    /// More textures were requested than there are texture units.
    #[error("{requested} textures requested, at most {max} texture units are available")]
    TooManyTextures {
        /// Textures in the scene descriptor.
        requested: usize,
        /// Available texture units.
        max: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_driver_logs_are_replaced() {
        let err = ShaderError::compile_failed(ShaderStage::Vertex, "\0".to_string());
        assert_eq!(err.log(), Some(ShaderError::EMPTY_LOG));

        let err = ShaderError::link_failed("  \n".to_string());
        assert_eq!(err.log(), Some(ShaderError::EMPTY_LOG));
    }

    #[test]
    fn driver_logs_are_kept_verbatim() {
        let err = ShaderError::compile_failed(
            ShaderStage::Fragment,
            "ERROR: 0:3: 'x' : undeclared identifier\n\0".to_string(),
        );
        assert_eq!(err.log(), Some("ERROR: 0:3: 'x' : undeclared identifier"));
        assert_eq!(err.stage(), Some(ShaderStage::Fragment));
        assert!(err.to_string().contains("GL_FRAGMENT_SHADER"));
    }

    #[test]
    fn link_errors_report_link_stage() {
        let err = ShaderError::link_failed("varying mismatch".to_string());
        assert_eq!(err.stage(), Some(ShaderStage::Link));
    }
}
