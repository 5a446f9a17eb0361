use std::{cell::RefCell, collections::HashMap, fmt};

use crate::{
    GlslVersion,
    asset::AssetSource,
    error::{ShaderError, ShaderStage},
    gl::Gpu,
};

/// A linked vertex/fragment program.
///
/// A program either links completely or is never returned: every failure
/// path deletes the stage objects and program it created. Stage objects are
/// deleted as soon as the program links.
#[must_use = "call `delete(gl)` before dropping to avoid GPU resource leaks"]
pub struct ShaderProgram<G: Gpu> {
    program: Option<G::Program>,
    uniform_cache: Option<RefCell<HashMap<String, Option<G::UniformLocation>>>>,
}

impl<G: Gpu> ShaderProgram<G> {
    /// Compiles both stages and links them.
    ///
    /// # Errors
    /// [`ShaderError::Compile`] with the failing stage and driver log,
    /// [`ShaderError::Link`] with the program log, or a creation error if the
    /// driver refuses to allocate an object.
    pub fn load(gl: &G, vertex_source: &str, fragment_source: &str) -> Result<Self, ShaderError> {
        let vertex_shader = compile_shader(gl, ShaderStage::Vertex, vertex_source)?;

        let fragment_shader = match compile_shader(gl, ShaderStage::Fragment, fragment_source) {
            Ok(shader) => shader,
            Err(e) => {
                gl.delete_shader(vertex_shader);
                return Err(e);
            },
        };

        let program = match gl.create_program() {
            Ok(program) => program,
            Err(reason) => {
                gl.delete_shader(vertex_shader);
                gl.delete_shader(fragment_shader);
                return Err(ShaderError::ProgramCreation(reason));
            },
        };

        // attach shaders and link program
        gl.attach_shader(program, vertex_shader);
        gl.attach_shader(program, fragment_shader);
        gl.link_program(program);
        let linked = check_link_status(gl, program);

        // delete shaders (no longer needed after linking)
        gl.delete_shader(vertex_shader);
        gl.delete_shader(fragment_shader);

        if let Err(e) = linked {
            gl.delete_program(program);
            return Err(e);
        }

        tracing::debug!(?program, "shader program linked");
        Ok(Self { program: Some(program), uniform_cache: None })
    }

    /// Reads both stage sources through `assets` and loads them.
    ///
    /// Sources without a `#version` directive get the preamble for `version`.
    ///
    /// # Errors
    /// [`ShaderError::SourceUnavailable`] or [`ShaderError::InvalidSource`] if a
    /// source can't be read, otherwise as [`ShaderProgram::load`].
    pub fn from_assets(
        gl: &G,
        assets: &dyn AssetSource,
        vertex_path: &str,
        fragment_path: &str,
        version: GlslVersion,
    ) -> Result<Self, ShaderError> {
        let vertex_source = read_source(assets, ShaderStage::Vertex, vertex_path)?;
        let fragment_source = read_source(assets, ShaderStage::Fragment, fragment_path)?;

        let vertex_source = version.apply(ShaderStage::Vertex, &vertex_source);
        let fragment_source = version.apply(ShaderStage::Fragment, &fragment_source);
        tracing::debug!(path = vertex_path, source = %vertex_source, "vertex source");
        tracing::debug!(path = fragment_path, source = %fragment_source, "fragment source");

        Self::load(gl, &vertex_source, &fragment_source)
    }

    /// Memoizes uniform locations by name.
    pub fn with_uniform_cache(mut self) -> Self {
        self.uniform_cache = Some(RefCell::new(HashMap::new()));
        self
    }

    /// True until the program is deleted.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.program.is_some()
    }

    /// Makes this the current program.
    pub fn activate(&self, gl: &G) {
        if let Some(program) = self.program {
            gl.use_program(Some(program));
        }
    }

    /// Unbinds any current program.
    pub fn deactivate(&self, gl: &G) {
        gl.use_program(None);
    }

    /// Resolves a uniform by name; `None` for unknown names.
    #[must_use]
    pub fn uniform_location(&self, gl: &G, name: &str) -> Option<G::UniformLocation> {
        let program = self.program?;

        match &self.uniform_cache {
            Some(cache) => {
                if let Some(location) = cache.borrow().get(name) {
                    return location.clone();
                }

                let location = gl.uniform_location(program, name);
                cache
                    .borrow_mut()
                    .insert(name.to_string(), location.clone());
                location
            },
            None => gl.uniform_location(program, name),
        }
    }

    /// Sets an integer uniform, activating the program for the duration of the call.
    ///
    /// Unknown uniform names are ignored.
    pub fn set_uniform_i32(&self, gl: &G, name: &str, value: i32) {
        if !self.is_ready() {
            return;
        }

        self.activate(gl);
        match self.uniform_location(gl, name) {
            Some(location) => gl.uniform_1_i32(&location, value),
            None => tracing::debug!(name, "uniform not found; ignoring"),
        }
        self.deactivate(gl);
    }

    /// Deletes the program; later calls are no-ops.
    pub fn delete(&mut self, gl: &G) {
        if let Some(program) = self.program.take() {
            gl.delete_program(program);
        }
        if let Some(cache) = &self.uniform_cache {
            cache.borrow_mut().clear();
        }
    }
}

impl<G: Gpu> fmt::Debug for ShaderProgram<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("program", &self.program)
            .field("uniform_cache", &self.uniform_cache.is_some())
            .finish()
    }
}

fn read_source(
    assets: &dyn AssetSource,
    stage: ShaderStage,
    path: &str,
) -> Result<String, ShaderError> {
    let bytes = assets
        .read(path)
        .map_err(|source| ShaderError::SourceUnavailable { path: path.to_string(), source })?;

    String::from_utf8(bytes)
        .map_err(|_| ShaderError::InvalidSource { stage, path: path.to_string() })
}

fn compile_shader<G: Gpu>(
    gl: &G,
    stage: ShaderStage,
    source: &str,
) -> Result<G::Shader, ShaderError> {
    let shader = gl
        .create_shader(shader_type(stage))
        .map_err(|reason| ShaderError::StageCreation { stage, reason })?;

    gl.shader_source(shader, source);
    gl.compile_shader(shader);

    if !gl.shader_compile_status(shader) {
        let log = gl.shader_info_log(shader);
        gl.delete_shader(shader);
        let err = ShaderError::compile_failed(stage, log);
        tracing::warn!("{err}");
        return Err(err);
    }

    Ok(shader)
}

fn check_link_status<G: Gpu>(gl: &G, program: G::Program) -> Result<(), ShaderError> {
    if !gl.program_link_status(program) {
        let err = ShaderError::link_failed(gl.program_info_log(program));
        tracing::warn!("{err}");
        return Err(err);
    }

    Ok(())
}

fn shader_type(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment | ShaderStage::Link => glow::FRAGMENT_SHADER,
    }
}
