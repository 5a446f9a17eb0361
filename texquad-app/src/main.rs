mod cli;
mod input;
mod logging;
mod platform;

use clap::Parser;
use color_eyre::eyre::{Context, Report, Result};
use texquad_core::{
    AppCommand, AppHost, DirectorySource, FallbackSource, GlslVersion, InputEvent, KeyAction,
    MemorySource,
};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    cli::Cli,
    input::PointerTracker,
    logging::{LoggingConfig, init_logging},
    platform::GlutinDisplay,
};

type Assets = FallbackSource<DirectorySource, MemorySource>;

fn main() -> Result<()> {
    // panic hook
    color_eyre::install()?;

    // parse command line arguments
    let cli = Cli::parse();

    let logging_config = LoggingConfig::from_env().with_level(cli.log_level);
    init_logging(&logging_config).wrap_err("Failed to initialize logging")?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "texquad starting up");

    // validate CLI arguments
    cli.validate()?;

    let assets = FallbackSource::new(
        DirectorySource::new(&cli.assets),
        MemorySource::builtin_shaders(),
    );
    let host = AppHost::new(assets, cli.scene(), GlslVersion::Es300);

    let event_loop = EventLoop::new().wrap_err("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        window_attrs: WindowAttributes::default()
            .with_title(cli.title.clone())
            .with_inner_size(LogicalSize::new(cli.width, cli.height)),
        window: None,
        host,
        pointers: PointerTracker::default(),
        error: None,
    };
    event_loop
        .run_app(&mut app)
        .wrap_err("Event loop failed")?;

    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct App {
    window_attrs: WindowAttributes,
    // dropped only after the host has torn its renderer down
    window: Option<Window>,
    host: AppHost<GlutinDisplay, Assets>,
    pointers: PointerTracker,
    error: Option<Report>,
}

impl App {
    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = event_loop
            .create_window(self.window_attrs.clone())
            .wrap_err("Failed to create window")?;
        let window = self.window.insert(window);

        let display = GlutinDisplay::open(window).wrap_err("Failed to open GL display")?;
        self.host
            .handle_command(AppCommand::InitWindow { display, window })
            .wrap_err("Failed to initialize renderer")?;

        if let Some(renderer) = self.host.controller().renderer() {
            tracing::info!(size = ?renderer.surface().size(), "window ready");
        }
        Ok(())
    }

    fn term_window(&mut self) {
        self.host.term_window();
        self.window = None;
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: Report) {
        tracing::error!(error = %error, "shutting down");
        self.term_window();
        self.error = Some(error);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        match self.host.step() {
            Ok(events) => {
                let escape = events.iter().any(|event| {
                    matches!(event, InputEvent::Key { key_code, action: KeyAction::Up }
                        if *key_code == input::key_code(PhysicalKey::Code(KeyCode::Escape)))
                });
                if escape {
                    tracing::info!("escape released, exiting");
                    self.term_window();
                    event_loop.exit();
                }
            },
            Err(e) => self.fail(event_loop, Report::new(e).wrap_err("Frame failed")),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.init_window(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.term_window();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.term_window();
                event_loop.exit();
            },
            WindowEvent::Resized(size) => {
                tracing::debug!(width = size.width, height = size.height, "window resized");
                self.host.resize_window(size.width, size.height);
            },
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            WindowEvent::Touch(touch) => {
                let (x, y) = (touch.location.x as f32, touch.location.y as f32);
                if let Some(event) = self.pointers.touch(touch.id, touch.phase, x, y) {
                    self.host.input_mut().push_motion(event);
                }
            },
            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = (position.x as f32, position.y as f32);
                if let Some(event) = self.pointers.cursor_moved(x, y) {
                    self.host.input_mut().push_motion(event);
                }
            },
            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                if let Some(event) = self.pointers.mouse_button(state) {
                    self.host.input_mut().push_motion(event);
                }
            },
            WindowEvent::KeyboardInput { event, .. } => {
                self.host
                    .input_mut()
                    .push_key(input::key_event(event.physical_key, event.state));
            },
            _ => {},
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.term_window();
        tracing::info!("texquad shut down");
    }
}
