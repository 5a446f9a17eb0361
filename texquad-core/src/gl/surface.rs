use std::fmt;

use crate::{
    error::{ConfigError, SurfaceError},
    gl::{ConfigRequest, Display, Gpu, display::select_config},
};

/// Width and height before the first surface query; forces the first viewport update.
const UNKNOWN_SIZE: (i32, i32) = (-1, -1);

/// Owns the display, window surface and context for one native window.
///
/// The three handles are either all present or all released. Teardown unbinds
/// the context from the thread and then releases context, surface and display,
/// in that order; it is idempotent and also runs on drop.
pub struct SurfaceContext<D: Display> {
    display: Option<D>,
    surface: Option<D::Surface>,
    context: Option<D::Context>,
    config: Option<D::Config>,
    size: (i32, i32),
}

impl<D: Display> SurfaceContext<D> {
    /// Selects an RGB888 / depth-24 configuration, creates the window surface
    /// and an ES3 context, and makes the context current on the calling thread.
    ///
    /// # Errors
    /// [`ConfigError::NoMatchingConfig`] if no offered configuration matches
    /// exactly; other variants if surface or context creation, or making the
    /// context current, fails. Anything created before the failure is released.
    pub fn init(display: D, window: &D::Window) -> Result<Self, ConfigError> {
        Self::init_with(display, window, &ConfigRequest::RGB888_DEPTH24)
    }

    /// Like [`SurfaceContext::init`] with an explicit attribute request.
    ///
    /// # Errors
    /// See [`SurfaceContext::init`].
    pub fn init_with(
        display: D,
        window: &D::Window,
        request: &ConfigRequest,
    ) -> Result<Self, ConfigError> {
        let mut ctx = Self {
            display: Some(display),
            surface: None,
            context: None,
            config: None,
            size: UNKNOWN_SIZE,
        };

        // on failure, `ctx` drops here and releases whatever was created
        ctx.establish(window, request)?;
        Ok(ctx)
    }

    fn establish(&mut self, window: &D::Window, request: &ConfigRequest) -> Result<(), ConfigError> {
        let display = self
            .display
            .as_mut()
            .ok_or_else(|| ConfigError::Display("display already terminated".to_string()))?;

        let configs = display.choose_configs(request, window)?;
        tracing::debug!(count = configs.len(), "found configs");

        let config = select_config(display, &configs, request)
            .ok_or(ConfigError::NoMatchingConfig { offered: configs.len() })?;
        tracing::debug!(?config, "chose config");

        let surface = display.create_window_surface(&config, window)?;
        self.surface = Some(surface);

        let context = display.create_context(&config, request)?;
        let context = self.context.insert(context);
        self.config = Some(config);

        if let Some(surface) = self.surface.as_ref() {
            display.make_current(surface, context)?;
        }

        Ok(())
    }

    /// Re-queries the surface size and updates the GL viewport if it changed.
    ///
    /// Returns `true` if the viewport was set. An unchanged size issues no GL
    /// call. Always `false` once torn down.
    pub fn update_viewport<G: Gpu>(&mut self, gl: &G) -> bool {
        let (Some(display), Some(surface)) = (self.display.as_ref(), self.surface.as_ref()) else {
            return false;
        };

        let size = display.surface_size(surface);
        if size == self.size {
            return false;
        }

        tracing::debug!(width = size.0, height = size.1, "surface resized");
        self.size = size;
        gl.viewport(0, 0, size.0, size.1);
        true
    }

    /// Resizes the window surface after its window changed size.
    ///
    /// The viewport follows on the next [`SurfaceContext::update_viewport`].
    /// Returns `false` without touching the display once torn down or when
    /// either dimension is zero, as for a minimized window.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let (Some(display), Some(surface), Some(context)) =
            (self.display.as_mut(), self.surface.as_ref(), self.context.as_ref())
        else {
            return false;
        };
        if width == 0 || height == 0 {
            return false;
        }

        display.resize_surface(surface, context, width, height);
        true
    }

    /// Presents the back buffer.
    ///
    /// # Errors
    /// [`SurfaceError::TornDown`] after teardown, or the display's swap error.
    pub fn swap_buffers(&mut self) -> Result<(), SurfaceError> {
        match (self.display.as_mut(), self.surface.as_ref(), self.context.as_ref()) {
            (Some(display), Some(surface), Some(context)) => display.swap_buffers(surface, context),
            _ => Err(SurfaceError::TornDown),
        }
    }

    /// Loads the GL function table for this context; `None` once torn down.
    pub fn load_gpu(&self) -> Option<D::Gpu> {
        self.is_valid()
            .then(|| self.display.as_ref().map(Display::load_gpu))
            .flatten()
    }

    /// True while display, surface and context are all alive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.display.is_some() && self.surface.is_some() && self.context.is_some()
    }

    /// Last surface size seen by [`SurfaceContext::update_viewport`], or `(-1, -1)`.
    #[must_use]
    pub fn size(&self) -> (i32, i32) {
        self.size
    }

    /// The selected configuration.
    pub fn config(&self) -> Option<&D::Config> {
        self.config.as_ref()
    }

    /// Unbinds the context and releases context, surface and display.
    pub fn teardown(&mut self) {
        let Some(mut display) = self.display.take() else {
            return;
        };

        if let Some(context) = self.context.as_mut() {
            display.release_current(context);
        }
        if let Some(context) = self.context.take() {
            display.destroy_context(context);
        }
        if let Some(surface) = self.surface.take() {
            display.destroy_surface(surface);
        }
        display.terminate();

        self.config = None;
        self.size = UNKNOWN_SIZE;
        tracing::debug!("surface context torn down");
    }
}

impl<D: Display> Drop for SurfaceContext<D> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<D: Display> fmt::Debug for SurfaceContext<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceContext")
            .field("valid", &self.is_valid())
            .field("config", &self.config)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}
