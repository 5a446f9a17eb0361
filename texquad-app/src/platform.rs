//! [`texquad_core::Display`] over glutin: EGL on Android and Linux, WGL or CGL
//! on desktop hosts that lack it.

use std::{fmt, mem, num::NonZeroU32};

use glutin::{
    config::{Api, ColorBufferType, Config, ConfigSurfaceTypes, ConfigTemplateBuilder},
    context::{
        ContextApi, ContextAttributesBuilder, NotCurrentContext, PossiblyCurrentContext, Version,
    },
    display::{Display as GlDisplayHandle, DisplayApiPreference},
    prelude::*,
    surface::{Surface, SurfaceAttributesBuilder, WindowSurface},
};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawWindowHandle};
use texquad_core::{ConfigAttribs, ConfigError, ConfigRequest, Display, SurfaceError};
use winit::window::Window;

/// A glutin display connection for one window.
pub struct GlutinDisplay {
    display: GlDisplayHandle,
}

/// Context slot; glutin's current/not-current states are distinct types.
pub enum GlutinContext {
    NotCurrent(NotCurrentContext),
    Current(PossiblyCurrentContext),
    /// Lost to a failed state transition.
    Taken,
}

impl GlutinDisplay {
    /// Opens the platform's preferred GL display for `window`.
    pub fn open(window: &Window) -> Result<Self, ConfigError> {
        let raw_display = window
            .display_handle()
            .map_err(|e| ConfigError::Display(e.to_string()))?
            .as_raw();
        let raw_window = native_window(window)?;

        let display = unsafe { GlDisplayHandle::new(raw_display, api_preference(raw_window)) }
            .map_err(|e| ConfigError::Display(e.to_string()))?;
        let api = display.version_string();
        tracing::debug!(api = %api, "opened display");

        Ok(Self { display })
    }
}

#[cfg(any(target_os = "android", all(unix, not(target_os = "macos"))))]
fn api_preference(_window: RawWindowHandle) -> DisplayApiPreference {
    DisplayApiPreference::Egl
}

#[cfg(windows)]
fn api_preference(window: RawWindowHandle) -> DisplayApiPreference {
    DisplayApiPreference::WglThenEgl(Some(window))
}

#[cfg(target_os = "macos")]
fn api_preference(_window: RawWindowHandle) -> DisplayApiPreference {
    DisplayApiPreference::Cgl
}

fn native_window(window: &Window) -> Result<RawWindowHandle, ConfigError> {
    window
        .window_handle()
        .map(|handle| handle.as_raw())
        .map_err(|e| ConfigError::Display(e.to_string()))
}

impl Display for GlutinDisplay {
    type Config = Config;
    type Window = Window;
    type Surface = Surface<WindowSurface>;
    type Context = GlutinContext;
    type Gpu = glow::Context;

    fn choose_configs(
        &mut self,
        request: &ConfigRequest,
        window: &Window,
    ) -> Result<Vec<Config>, ConfigError> {
        let template = ConfigTemplateBuilder::new()
            .with_api(Api::GLES3)
            .with_surface_type(ConfigSurfaceTypes::WINDOW)
            .with_buffer_type(ColorBufferType::Rgb {
                r_size: request.red,
                g_size: request.green,
                b_size: request.blue,
            })
            .with_depth_size(request.depth)
            .compatible_with_native_window(native_window(window)?)
            .build();

        let configs = unsafe { self.display.find_configs(template) }
            .map_err(|e| ConfigError::Display(e.to_string()))?;
        Ok(configs.collect())
    }

    fn config_attribs(&self, config: &Config) -> Option<ConfigAttribs> {
        match config.color_buffer_type()? {
            ColorBufferType::Rgb { r_size, g_size, b_size } => Some(ConfigAttribs {
                red: r_size,
                green: g_size,
                blue: b_size,
                depth: config.depth_size(),
            }),
            _ => None,
        }
    }

    fn create_window_surface(
        &mut self,
        config: &Config,
        window: &Window,
    ) -> Result<Self::Surface, ConfigError> {
        let size = window.inner_size();
        let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return Err(ConfigError::SurfaceCreation(format!(
                "window has no area ({}x{})",
                size.width, size.height
            )));
        };

        let attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            native_window(window)?,
            width,
            height,
        );

        unsafe { self.display.create_window_surface(config, &attrs) }
            .map_err(|e| ConfigError::SurfaceCreation(e.to_string()))
    }

    fn create_context(
        &mut self,
        config: &Config,
        request: &ConfigRequest,
    ) -> Result<GlutinContext, ConfigError> {
        let attrs = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::Gles(Some(Version::new(request.gles_major, 0))))
            .build(None);

        unsafe { self.display.create_context(config, &attrs) }
            .map(GlutinContext::NotCurrent)
            .map_err(|e| ConfigError::ContextCreation(e.to_string()))
    }

    fn make_current(
        &mut self,
        surface: &Self::Surface,
        context: &mut GlutinContext,
    ) -> Result<(), ConfigError> {
        match mem::replace(context, GlutinContext::Taken) {
            GlutinContext::NotCurrent(not_current) => {
                let current = not_current
                    .make_current(surface)
                    .map_err(|e| ConfigError::MakeCurrent(e.to_string()))?;
                *context = GlutinContext::Current(current);
                Ok(())
            },
            GlutinContext::Current(current) => {
                let result = current
                    .make_current(surface)
                    .map_err(|e| ConfigError::MakeCurrent(e.to_string()));
                *context = GlutinContext::Current(current);
                result
            },
            GlutinContext::Taken => {
                Err(ConfigError::MakeCurrent("context was lost".to_string()))
            },
        }
    }

    fn release_current(&mut self, context: &mut GlutinContext) {
        match mem::replace(context, GlutinContext::Taken) {
            GlutinContext::Current(current) => match current.make_not_current() {
                Ok(not_current) => *context = GlutinContext::NotCurrent(not_current),
                Err(e) => tracing::warn!(error = %e, "failed to release context"),
            },
            other => *context = other,
        }
    }

    fn surface_size(&self, surface: &Self::Surface) -> (i32, i32) {
        let to_i32 = |px: Option<u32>| px.and_then(|px| i32::try_from(px).ok()).unwrap_or(-1);
        (to_i32(surface.width()), to_i32(surface.height()))
    }

    fn resize_surface(
        &mut self,
        surface: &Self::Surface,
        context: &GlutinContext,
        width: u32,
        height: u32,
    ) {
        let (GlutinContext::Current(current), Some(width), Some(height)) =
            (context, NonZeroU32::new(width), NonZeroU32::new(height))
        else {
            return;
        };
        surface.resize(current, width, height);
    }

    fn swap_buffers(
        &mut self,
        surface: &Self::Surface,
        context: &GlutinContext,
    ) -> Result<(), SurfaceError> {
        match context {
            GlutinContext::Current(current) => surface
                .swap_buffers(current)
                .map_err(|e| SurfaceError::SwapFailed(e.to_string())),
            _ => Err(SurfaceError::SwapFailed("context is not current".to_string())),
        }
    }

    fn destroy_context(&mut self, context: GlutinContext) {
        // glutin releases the context on drop
        drop(context);
    }

    fn destroy_surface(&mut self, surface: Self::Surface) {
        drop(surface);
    }

    fn terminate(&mut self) {
        // the connection closes when the last handle to it drops
        tracing::debug!("display connection released");
    }

    fn load_gpu(&self) -> glow::Context {
        unsafe {
            glow::Context::from_loader_function_cstr(|name| self.display.get_proc_address(name))
        }
    }
}

impl fmt::Debug for GlutinDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlutinDisplay")
            .field("api", &self.display.version_string())
            .finish()
    }
}
