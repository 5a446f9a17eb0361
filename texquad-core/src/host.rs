//! Window lifecycle plumbing between the platform event loop and a [`Renderer`].

use std::mem;

use crate::{
    GlslVersion,
    asset::AssetSource,
    error::{InitError, SurfaceError},
    gl::{Display, Renderer},
    input::{InputEvent, InputQueue},
    scene::SceneDescriptor,
};

/// Window lifecycle commands delivered by the platform.
pub enum AppCommand<'w, D: Display> {
    /// A native window became available.
    InitWindow {
        /// Display connection for the window.
        display: D,
        /// The new window.
        window: &'w D::Window,
    },
    /// The native window is about to be destroyed.
    TermWindow,
    /// Any other platform command; ignored.
    Other,
}

/// The renderer slot: either nothing or a running renderer.
#[derive(Debug)]
pub enum Controller<D: Display> {
    /// No window, no renderer.
    Empty,
    /// A renderer bound to the current window.
    Running(Renderer<D>),
}

impl<D: Display> Default for Controller<D> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<D: Display> Controller<D> {
    /// The running renderer, if any.
    pub fn renderer(&self) -> Option<&Renderer<D>> {
        match self {
            Self::Running(renderer) => Some(renderer),
            Self::Empty => None,
        }
    }

    /// The running renderer, if any.
    pub fn renderer_mut(&mut self) -> Option<&mut Renderer<D>> {
        match self {
            Self::Running(renderer) => Some(renderer),
            Self::Empty => None,
        }
    }

    /// True while a renderer is present.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running(_))
    }
}

/// Owns the renderer slot, the asset source, the scene and the input queue,
/// and drives them from platform commands and loop iterations.
pub struct AppHost<D: Display, A: AssetSource> {
    controller: Controller<D>,
    assets: A,
    scene: SceneDescriptor,
    version: GlslVersion,
    input: InputQueue,
}

impl<D: Display, A: AssetSource> AppHost<D, A> {
    /// A host with no window yet.
    pub fn new(assets: A, scene: SceneDescriptor, version: GlslVersion) -> Self {
        Self {
            controller: Controller::Empty,
            assets,
            scene,
            version,
            input: InputQueue::new(),
        }
    }

    /// Dispatches a lifecycle command.
    ///
    /// # Errors
    /// As [`AppHost::init_window`].
    pub fn handle_command(&mut self, command: AppCommand<'_, D>) -> Result<(), InitError> {
        match command {
            AppCommand::InitWindow { display, window } => self.init_window(display, window),
            AppCommand::TermWindow => {
                self.term_window();
                Ok(())
            },
            AppCommand::Other => Ok(()),
        }
    }

    /// Creates a fresh renderer for `window`, tearing down any previous one first.
    ///
    /// Scene failures leave an inert renderer in place and are only logged.
    ///
    /// # Errors
    /// [`InitError::Surface`] if the surface context can't be established; the
    /// slot is left empty.
    pub fn init_window(&mut self, display: D, window: &D::Window) -> Result<(), InitError> {
        self.term_window();

        let renderer = Renderer::init(display, window, &self.assets, &self.scene, self.version)?;
        if let Some(e) = renderer.init_error() {
            tracing::warn!(error = %e, "renderer running without a scene");
        }

        self.controller = Controller::Running(renderer);
        Ok(())
    }

    /// Tears down and drops the renderer, if any. Idempotent.
    ///
    /// Events queued for the lost window are discarded.
    pub fn term_window(&mut self) {
        if let Controller::Running(mut renderer) = mem::take(&mut self.controller) {
            renderer.teardown();
        }

        let stale = self.input.drain();
        if !stale.is_empty() {
            tracing::debug!(
                motion = stale.motion.len(),
                keys = stale.keys.len(),
                "discarded input queued for terminated window"
            );
        }
    }

    /// One loop iteration: handle queued input, then render a frame.
    ///
    /// Does nothing without a renderer.
    ///
    /// # Errors
    /// The frame's [`SurfaceError`].
    pub fn step(&mut self) -> Result<Vec<InputEvent>, SurfaceError> {
        let Some(renderer) = self.controller.renderer_mut() else {
            return Ok(Vec::new());
        };

        let events = renderer.handle_input(&mut self.input);
        renderer.render()?;
        Ok(events)
    }

    /// Forwards a window size change to the renderer's surface.
    ///
    /// Does nothing without a renderer.
    pub fn resize_window(&mut self, width: u32, height: u32) {
        let Some(renderer) = self.controller.renderer_mut() else {
            return;
        };
        if renderer.resize(width, height) {
            tracing::debug!(width, height, "surface resize requested");
        }
    }

    /// Queue the platform pushes raw events into.
    pub fn input_mut(&mut self) -> &mut InputQueue {
        &mut self.input
    }

    /// The renderer slot.
    pub fn controller(&self) -> &Controller<D> {
        &self.controller
    }

    /// The scene new renderers build.
    pub fn scene(&self) -> &SceneDescriptor {
        &self.scene
    }
}
