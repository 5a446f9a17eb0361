//! OpenGL ES 3 renderer for a single textured quad.
//!
//! [`SurfaceContext`] selects an exact RGB888 / depth-24 configuration and
//! owns the surface and context. [`Renderer`] builds the scene's
//! [`ShaderProgram`], geometry and [`Texture`]s on top of it and draws one
//! frame per call. [`AppHost`] drives renderers across window loss and feeds
//! them classified input. All GL access goes through the [`Gpu`] and
//! [`Display`] traits; `glow::Context` implements [`Gpu`].

pub mod asset;
pub mod capabilities;
/// Error types for surface, shader, texture and asset failures.
pub mod error;
/// Surface context, GL resources and the renderer.
pub mod gl;
pub mod host;
pub mod input;
/// What the renderer draws: shader paths and texture bindings.
pub mod scene;

use std::borrow::Cow;

pub use asset::{AssetSource, DirectorySource, FallbackSource, MemorySource};
pub use capabilities::{DriverInfo, parse_capability_list};
pub use error::{
    AssetError, ConfigError, InitError, ShaderError, ShaderStage, SurfaceError, TextureError,
};
pub use gl::{
    ConfigAttribs, ConfigRequest, DecodedImage, Display, Drawable, GlState, Gpu, RenderContext,
    Renderer, ShaderProgram, SurfaceContext, Texture, flip_rows,
};
pub use host::{AppCommand, AppHost, Controller};
pub use input::{
    InputBatch, InputEvent, InputQueue, KeyAction, KeyEvent, MotionEvent, PointerAction,
    PointerAxes, classify_key, classify_motion,
};
pub use scene::{SceneDescriptor, TextureBinding};

/// GL shader language target for version injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlslVersion {
    /// OpenGL ES 3.0: `#version 300 es`
    Es300,
    /// OpenGL 3.3 Core: `#version 330 core`
    Gl330,
}

impl GlslVersion {
    /// Header prepended to vertex sources.
    pub fn vertex_preamble(&self) -> &'static str {
        match self {
            Self::Es300 => "#version 300 es\nprecision highp float;\n",
            Self::Gl330 => "#version 330 core\n",
        }
    }

    /// Header prepended to fragment sources.
    pub fn fragment_preamble(&self) -> &'static str {
        match self {
            Self::Es300 => "#version 300 es\nprecision mediump float;\n",
            Self::Gl330 => "#version 330 core\n",
        }
    }

    /// Prefixes `source` with the stage's preamble unless it declares its own `#version`.
    pub fn apply<'a>(&self, stage: ShaderStage, source: &'a str) -> Cow<'a, str> {
        let preamble = match stage {
            ShaderStage::Vertex => self.vertex_preamble(),
            ShaderStage::Fragment => self.fragment_preamble(),
            ShaderStage::Link => return Cow::Borrowed(source),
        };

        if source.trim_start().starts_with("#version") {
            Cow::Borrowed(source)
        } else {
            Cow::Owned(format!("{preamble}{source}"))
        }
    }
}
