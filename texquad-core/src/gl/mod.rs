mod buffer;
pub(crate) mod context;
pub(crate) mod display;
pub(crate) mod geometry;
pub(crate) mod gpu;
#[cfg(test)]
pub(crate) mod mock;
mod program;
pub(crate) mod renderer;
pub(crate) mod surface;
pub(crate) mod texture;

pub use context::GlState;
pub use display::{ConfigAttribs, ConfigRequest, Display, select_config};
pub use geometry::{GeometryBuffer, QUAD_INDICES, QUAD_VERTICES, Vertex, attrib};
pub use gpu::Gpu;
pub use program::ShaderProgram;
pub use renderer::{
    CLEAR_COLOR, Drawable, ERROR_CLEAR_COLOR, MAX_TEXTURE_UNITS, RenderContext, Renderer,
    TexturedQuad,
};
pub use surface::SurfaceContext;
pub use texture::{DecodedImage, Texture, flip_rows};
