use std::fmt;

use crate::{
    GlslVersion,
    asset::AssetSource,
    capabilities::DriverInfo,
    error::{ConfigError, InitError, SurfaceError},
    gl::{Display, GeometryBuffer, GlState, Gpu, ShaderProgram, SurfaceContext, Texture},
    input::{InputEvent, InputQueue},
    scene::SceneDescriptor,
};

/// Clear color while the scene is healthy: cornflower blue.
pub const CLEAR_COLOR: [f32; 4] = [100.0 / 255.0, 149.0 / 255.0, 237.0 / 255.0, 1.0];

/// Clear color signalling a failed scene build.
pub const ERROR_CLEAR_COLOR: [f32; 4] = [1.0, 10.0 / 255.0, 10.0 / 255.0, 1.0];

/// Texture units available to a scene.
pub const MAX_TEXTURE_UNITS: usize = 16;

/// What a [`Drawable`] gets to work with during one frame.
pub struct RenderContext<'a, G: Gpu> {
    /// GL function table of the current context.
    pub gl: &'a G,
    /// Cached render state.
    pub state: &'a mut GlState,
}

/// A scene drawn in three phases per frame.
pub trait Drawable<G: Gpu> {
    /// Binds the program, textures and vertex state the draw call needs.
    fn prepare(&self, context: &mut RenderContext<'_, G>);

    /// Issues the draw calls; everything is bound by [`Drawable::prepare`].
    fn draw(&self, context: &mut RenderContext<'_, G>);

    /// Unbinds what `prepare` bound and resets cached state, so the next
    /// frame starts from defaults.
    fn cleanup(&self, context: &mut RenderContext<'_, G>);
}

/// The quad with its program and textures; texture `i` samples from unit `i`.
#[must_use = "call `delete(gl)` before dropping to avoid GPU resource leaks"]
pub struct TexturedQuad<G: Gpu> {
    geometry: GeometryBuffer<G>,
    program: ShaderProgram<G>,
    textures: Vec<Texture<G>>,
}

impl<G: Gpu> TexturedQuad<G> {
    /// Builds geometry, loads the program and then each texture in order,
    /// assigning texture `i`'s unit to its sampler uniform.
    ///
    /// # Errors
    /// The first failure, after deleting everything built so far.
    pub fn build(
        gl: &G,
        assets: &dyn AssetSource,
        scene: &SceneDescriptor,
        version: GlslVersion,
    ) -> Result<Self, InitError> {
        if scene.textures.len() > MAX_TEXTURE_UNITS {
            return Err(InitError::TooManyTextures {
                requested: scene.textures.len(),
                max: MAX_TEXTURE_UNITS,
            });
        }

        let mut geometry = GeometryBuffer::quad(gl).map_err(InitError::Geometry)?;

        let program = match ShaderProgram::from_assets(
            gl,
            assets,
            &scene.vertex_shader,
            &scene.fragment_shader,
            version,
        ) {
            Ok(program) => program.with_uniform_cache(),
            Err(e) => {
                geometry.delete(gl);
                return Err(e.into());
            },
        };

        let mut quad = Self {
            geometry,
            program,
            textures: Vec::with_capacity(scene.textures.len()),
        };

        for (index, binding) in scene.textures.iter().enumerate() {
            match Texture::load(gl, assets, &binding.path) {
                Ok(texture) => {
                    tracing::debug!(
                        index,
                        path = %binding.path,
                        sampler = %binding.sampler,
                        ?texture,
                        "texture loaded"
                    );
                    quad.textures.push(texture);
                },
                Err(source) => {
                    quad.delete(gl);
                    return Err(InitError::Texture { index, source });
                },
            }

            quad.program
                .set_uniform_i32(gl, &binding.sampler, index as i32);
        }

        Ok(quad)
    }

    /// Number of bound textures.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Deletes textures, then the program, then the geometry.
    pub fn delete(&mut self, gl: &G) {
        for texture in &mut self.textures {
            texture.delete(gl);
        }
        self.textures.clear();
        self.program.delete(gl);
        self.geometry.delete(gl);
    }
}

impl<G: Gpu> Drawable<G> for TexturedQuad<G> {
    fn prepare(&self, context: &mut RenderContext<'_, G>) {
        let gl = context.gl;

        self.program.activate(gl);
        for (unit, texture) in self.textures.iter().enumerate() {
            texture.bind(gl, context.state, unit as u32);
        }
        self.geometry.bind(gl);
    }

    fn draw(&self, context: &mut RenderContext<'_, G>) {
        context.gl.draw_elements(
            glow::TRIANGLES,
            GeometryBuffer::<G>::INDEX_COUNT,
            glow::UNSIGNED_INT,
            0,
        );
    }

    fn cleanup(&self, context: &mut RenderContext<'_, G>) {
        let gl = context.gl;

        self.geometry.unbind(gl);
        self.program.deactivate(gl);
        context.state.reset(gl);
    }
}

impl<G: Gpu> fmt::Debug for TexturedQuad<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TexturedQuad")
            .field("geometry", &self.geometry)
            .field("program", &self.program)
            .field("textures", &self.textures)
            .finish()
    }
}

/// Draws a [`TexturedQuad`] into one window.
///
/// Owns the surface context and every GPU resource of the scene. A renderer
/// whose scene failed to build stays usable: it clears to
/// [`ERROR_CLEAR_COLOR`] and presents, and [`Renderer::init_error`] reports
/// the failure. Teardown releases textures, program and geometry before the
/// surface context, and also runs on drop.
pub struct Renderer<D: Display> {
    surface: SurfaceContext<D>,
    gl: Option<D::Gpu>,
    state: GlState,
    scene: Option<TexturedQuad<D::Gpu>>,
    init_error: Option<InitError>,
    driver: DriverInfo,
}

impl<D: Display> Renderer<D> {
    /// Establishes the surface context for `window` and builds `scene`.
    ///
    /// # Errors
    /// [`InitError::Surface`] if no surface context can be established. Scene
    /// failures do not fail construction; see [`Renderer::init_error`].
    pub fn init(
        display: D,
        window: &D::Window,
        assets: &dyn AssetSource,
        scene: &SceneDescriptor,
        version: GlslVersion,
    ) -> Result<Self, InitError> {
        let surface = SurfaceContext::init(display, window)?;
        let gl = surface
            .load_gpu()
            .ok_or_else(|| ConfigError::MakeCurrent("context is not current".to_string()))?;

        let driver = DriverInfo::query(&gl);
        driver.log();

        let mut state = GlState::new();
        let (scene, init_error) = match TexturedQuad::build(&gl, assets, scene, version) {
            Ok(quad) => {
                let [r, g, b, a] = CLEAR_COLOR;
                state
                    .clear_color(&gl, r, g, b, a)
                    .blend(&gl, glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
                (Some(quad), None)
            },
            Err(e) => {
                tracing::error!(error = %e, "scene setup failed; rendering error color");
                let [r, g, b, a] = ERROR_CLEAR_COLOR;
                state.clear_color(&gl, r, g, b, a);
                (None, Some(e))
            },
        };

        tracing::info!(
            renderer = %driver.renderer,
            textures = scene.as_ref().map_or(0, TexturedQuad::texture_count),
            "renderer created"
        );

        Ok(Self {
            surface,
            gl: Some(gl),
            state,
            scene,
            init_error,
            driver,
        })
    }

    /// Draws and presents one frame.
    ///
    /// Updates the viewport if the surface size changed, clears, draws the
    /// scene (if it built) and swaps buffers.
    ///
    /// # Errors
    /// [`SurfaceError::TornDown`] after teardown, or the swap failure.
    pub fn render(&mut self) -> Result<(), SurfaceError> {
        let Some(gl) = self.gl.as_ref() else {
            return Err(SurfaceError::TornDown);
        };

        self.surface.update_viewport(gl);
        gl.clear(glow::COLOR_BUFFER_BIT);

        if let Some(scene) = &self.scene {
            let mut context = RenderContext { gl, state: &mut self.state };
            scene.prepare(&mut context);
            scene.draw(&mut context);
            scene.cleanup(&mut context);
        }

        self.surface.swap_buffers()
    }

    /// Drains `queue` and classifies every event.
    ///
    /// Classified events are also emitted as debug events.
    pub fn handle_input(&mut self, queue: &mut InputQueue) -> Vec<InputEvent> {
        queue.drain().classify()
    }

    /// Why the scene failed to build, if it did.
    pub fn init_error(&self) -> Option<&InitError> {
        self.init_error.as_ref()
    }

    /// True if the scene failed to build; frames only clear and present.
    pub fn is_inert(&self) -> bool {
        self.scene.is_none()
    }

    /// Driver strings captured at init.
    pub fn driver_info(&self) -> &DriverInfo {
        &self.driver
    }

    /// Current clear color.
    pub fn clear_color(&self) -> [f32; 4] {
        self.state.current_clear_color()
    }

    /// Resizes the surface to a new window size; the next frame sets the viewport.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        self.surface.resize(width, height)
    }

    /// The owned surface context.
    pub fn surface(&self) -> &SurfaceContext<D> {
        &self.surface
    }

    /// Releases the scene's GPU resources, then the surface context.
    ///
    /// Idempotent; later `render` calls fail with [`SurfaceError::TornDown`].
    pub fn teardown(&mut self) {
        let Some(gl) = self.gl.take() else {
            return;
        };

        if let Some(mut scene) = self.scene.take() {
            scene.delete(&gl);
        }
        drop(gl);
        self.surface.teardown();

        tracing::info!("renderer torn down");
    }
}

impl<D: Display> Drop for Renderer<D> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<D: Display> fmt::Debug for Renderer<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("surface", &self.surface)
            .field("scene", &self.scene)
            .field("init_error", &self.init_error)
            .finish_non_exhaustive()
    }
}
