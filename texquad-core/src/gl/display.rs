use std::fmt::Debug;

use crate::{
    error::{ConfigError, SurfaceError},
    gl::Gpu,
};

/// Attribute request for surface configuration selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigRequest {
    /// Red channel bits.
    pub red: u8,
    /// Green channel bits.
    pub green: u8,
    /// Blue channel bits.
    pub blue: u8,
    /// Depth buffer bits.
    pub depth: u8,
    /// Major version of the OpenGL ES context to create.
    pub gles_major: u8,
}

impl ConfigRequest {
    /// Windowed, ES3-capable, RGB 8-8-8 with a 24-bit depth buffer.
    pub const RGB888_DEPTH24: Self = Self {
        red: 8,
        green: 8,
        blue: 8,
        depth: 24,
        gles_major: 3,
    };

    /// Returns true if the queried attributes match this request exactly.
    pub fn matches(&self, attribs: &ConfigAttribs) -> bool {
        attribs.red == self.red
            && attribs.green == self.green
            && attribs.blue == self.blue
            && attribs.depth == self.depth
    }
}

/// Color and depth sizes queried from an offered configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigAttribs {
    /// Red channel bits.
    pub red: u8,
    /// Green channel bits.
    pub green: u8,
    /// Blue channel bits.
    pub blue: u8,
    /// Depth buffer bits.
    pub depth: u8,
}

/// EGL-shaped access to a display connection.
///
/// Implemented by the host platform; [`crate::SurfaceContext`] drives it.
/// Handles returned by one display are only valid with that same display.
pub trait Display {
    /// An offered surface configuration.
    type Config: Clone + Debug;
    /// The native window surfaces are created for.
    type Window: ?Sized;
    /// A window surface.
    type Surface;
    /// A rendering context.
    type Context;
    /// GL function table usable while this display's context is current.
    type Gpu: Gpu;

    /// Enumerates the configurations the display offers for `request`.
    fn choose_configs(
        &mut self,
        request: &ConfigRequest,
        window: &Self::Window,
    ) -> Result<Vec<Self::Config>, ConfigError>;

    /// Queries color and depth sizes; `None` if the configuration can't be queried.
    fn config_attribs(&self, config: &Self::Config) -> Option<ConfigAttribs>;

    /// Creates a window surface for `window` using `config`.
    fn create_window_surface(
        &mut self,
        config: &Self::Config,
        window: &Self::Window,
    ) -> Result<Self::Surface, ConfigError>;

    /// Creates a context of the requested client version.
    fn create_context(
        &mut self,
        config: &Self::Config,
        request: &ConfigRequest,
    ) -> Result<Self::Context, ConfigError>;

    /// Binds `context` and `surface` to the calling thread.
    fn make_current(
        &mut self,
        surface: &Self::Surface,
        context: &mut Self::Context,
    ) -> Result<(), ConfigError>;

    /// Unbinds `context` from the calling thread.
    fn release_current(&mut self, context: &mut Self::Context);

    /// Current surface size in pixels.
    fn surface_size(&self, surface: &Self::Surface) -> (i32, i32);

    /// Resizes `surface` to match its window after the window changed size.
    ///
    /// Both dimensions are non-zero. Platforms whose surfaces follow the
    /// window on their own may ignore the call.
    fn resize_surface(
        &mut self,
        surface: &Self::Surface,
        context: &Self::Context,
        width: u32,
        height: u32,
    );

    /// Presents the back buffer of `surface`.
    fn swap_buffers(
        &mut self,
        surface: &Self::Surface,
        context: &Self::Context,
    ) -> Result<(), SurfaceError>;

    /// Destroys a context. It must not be current.
    fn destroy_context(&mut self, context: Self::Context);

    /// Destroys a surface. Its context must already be destroyed.
    fn destroy_surface(&mut self, surface: Self::Surface);

    /// Terminates the display connection.
    fn terminate(&mut self);

    /// Loads the GL function table for the current context.
    fn load_gpu(&self) -> Self::Gpu;
}

/// Picks the first configuration whose attributes exactly match `request`.
///
/// Configurations that can't be queried are skipped; there is no fallback
/// to a lesser match.
pub fn select_config<D: Display>(
    display: &D,
    configs: &[D::Config],
    request: &ConfigRequest,
) -> Option<D::Config> {
    configs
        .iter()
        .find(|config| {
            display.config_attribs(config).is_some_and(|attribs| {
                tracing::debug!(
                    red = attribs.red,
                    green = attribs.green,
                    blue = attribs.blue,
                    depth = attribs.depth,
                    "found config"
                );
                request.matches(&attribs)
            })
        })
        .cloned()
}
