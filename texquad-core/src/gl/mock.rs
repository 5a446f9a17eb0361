//! In-memory doubles for the GPU and display seams.
//!
//! `RecordingGpu` journals every call, hands out monotonically increasing
//! handles and tracks which handles are still alive, so tests can assert on
//! call ordering and leak-freedom. `MockDisplay` serves a scripted list of
//! surface configurations and journals the EGL-shaped calls made against it.

use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    rc::Rc,
};

use crate::{
    error::{ConfigError, SurfaceError},
    gl::{ConfigAttribs, ConfigRequest, Display, Gpu, gpu::check_rgba8_len},
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum GlCall {
    CreateShader { shader: u32, shader_type: u32 },
    ShaderSource { shader: u32, source: String },
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader { program: u32, shader: u32 },
    LinkProgram(u32),
    UseProgram(Option<u32>),
    DeleteProgram(u32),
    GetUniformLocation(String),
    Uniform1i { location: u32, value: i32 },
    CreateBuffer(u32),
    BindBuffer { target: u32, buffer: Option<u32> },
    BufferData { target: u32, data: Vec<u8>, usage: u32 },
    DeleteBuffer(u32),
    CreateVertexArray(u32),
    BindVertexArray(Option<u32>),
    EnableVertexAttribArray(u32),
    VertexAttribPointer { index: u32, size: i32, stride: i32, offset: i32 },
    DeleteVertexArray(u32),
    CreateTexture(u32),
    ActiveTexture(u32),
    BindTexture { target: u32, texture: Option<u32> },
    TexParameter { parameter: u32, value: i32 },
    TexImage2d { level: i32, width: i32, height: i32, pixels: Vec<u8> },
    GenerateMipmap(u32),
    DeleteTexture(u32),
    DrawElements { mode: u32, count: i32, element_type: u32, offset: i32 },
    Viewport { width: i32, height: i32 },
    ClearColor([f32; 4]),
    Clear(u32),
    Enable(u32),
    BlendFunc(u32, u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum HandleKind {
    Shader,
    Program,
    Buffer,
    VertexArray,
    Texture,
}

#[derive(Debug, Default)]
struct GpuJournal {
    next_handle: u32,
    calls: Vec<GlCall>,
    shader_types: BTreeMap<u32, u32>,
    live: BTreeMap<HandleKind, BTreeSet<u32>>,
    failing_stage: Option<(u32, String)>,
    failing_link: Option<String>,
    // kind -> (objects created before creation starts failing, reason)
    failing_creation: BTreeMap<HandleKind, (usize, String)>,
    created: BTreeMap<HandleKind, usize>,
    uniforms: Vec<String>,
}

impl GpuJournal {
    fn allocate(&mut self, kind: HandleKind) -> Result<u32, String> {
        let created = self.created.entry(kind).or_default();
        if let Some((after, reason)) = self.failing_creation.get(&kind) {
            if *created >= *after {
                return Err(reason.clone());
            }
        }
        *created += 1;

        self.next_handle += 1;
        let handle = self.next_handle;
        self.live.entry(kind).or_default().insert(handle);
        Ok(handle)
    }

    fn release(&mut self, kind: HandleKind, handle: u32) {
        if let Some(set) = self.live.get_mut(&kind) {
            set.remove(&handle);
        }
    }
}

/// GPU double that journals calls and tracks live handles.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingGpu {
    journal: Rc<RefCell<GpuJournal>>,
}

impl RecordingGpu {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Makes compilation of every `shader_type` stage fail with `log`.
    pub(crate) fn fail_compile(&self, shader_type: u32, log: &str) {
        self.journal.borrow_mut().failing_stage = Some((shader_type, log.to_string()));
    }

    pub(crate) fn fail_link(&self, log: &str) {
        self.journal.borrow_mut().failing_link = Some(log.to_string());
    }

    /// Lets `after` objects of `kind` be created, then refuses with `reason`.
    pub(crate) fn fail_creation(&self, kind: HandleKind, after: usize, reason: &str) {
        self.journal
            .borrow_mut()
            .failing_creation
            .insert(kind, (after, reason.to_string()));
    }

    /// Uniform names that resolve to a location; everything else is unknown.
    pub(crate) fn declare_uniforms(&self, names: &[&str]) {
        self.journal.borrow_mut().uniforms = names.iter().map(|n| n.to_string()).collect();
    }

    pub(crate) fn calls(&self) -> Vec<GlCall> {
        self.journal.borrow().calls.clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.journal.borrow_mut().calls.clear();
    }

    pub(crate) fn count(&self, predicate: impl Fn(&GlCall) -> bool) -> usize {
        self.journal
            .borrow()
            .calls
            .iter()
            .filter(|call| predicate(call))
            .count()
    }

    pub(crate) fn live(&self, kind: HandleKind) -> usize {
        self.journal
            .borrow()
            .live
            .get(&kind)
            .map_or(0, BTreeSet::len)
    }

    pub(crate) fn live_total(&self) -> usize {
        self.journal.borrow().live.values().map(BTreeSet::len).sum()
    }

    fn record(&self, call: GlCall) {
        self.journal.borrow_mut().calls.push(call);
    }
}

impl Gpu for RecordingGpu {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type VertexArray = u32;
    type Texture = u32;
    type UniformLocation = u32;

    fn get_string(&self, name: u32) -> String {
        match name {
            glow::VENDOR => "texquad".to_string(),
            glow::RENDERER => "recording gpu".to_string(),
            glow::VERSION => "OpenGL ES 3.2 recording".to_string(),
            glow::EXTENSIONS => "GL_OES_texture_npot GL_EXT_color_buffer_float".to_string(),
            _ => String::new(),
        }
    }

    fn create_shader(&self, shader_type: u32) -> Result<Self::Shader, String> {
        let shader = {
            let mut journal = self.journal.borrow_mut();
            let shader = journal.allocate(HandleKind::Shader)?;
            journal.shader_types.insert(shader, shader_type);
            shader
        };
        self.record(GlCall::CreateShader { shader, shader_type });
        Ok(shader)
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        self.record(GlCall::ShaderSource { shader, source: source.to_string() });
    }

    fn compile_shader(&self, shader: Self::Shader) {
        self.record(GlCall::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        let journal = self.journal.borrow();
        let shader_type = journal.shader_types.get(&shader).copied();
        !matches!(&journal.failing_stage, Some((t, _)) if Some(*t) == shader_type)
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        let journal = self.journal.borrow();
        let shader_type = journal.shader_types.get(&shader).copied();
        match &journal.failing_stage {
            Some((t, log)) if Some(*t) == shader_type => log.clone(),
            _ => String::new(),
        }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        self.journal
            .borrow_mut()
            .release(HandleKind::Shader, shader);
        self.record(GlCall::DeleteShader(shader));
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        let program = self
            .journal
            .borrow_mut()
            .allocate(HandleKind::Program)?;
        self.record(GlCall::CreateProgram(program));
        Ok(program)
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        self.record(GlCall::AttachShader { program, shader });
    }

    fn link_program(&self, program: Self::Program) {
        self.record(GlCall::LinkProgram(program));
    }

    fn program_link_status(&self, _program: Self::Program) -> bool {
        self.journal.borrow().failing_link.is_none()
    }

    fn program_info_log(&self, _program: Self::Program) -> String {
        self.journal
            .borrow()
            .failing_link
            .clone()
            .unwrap_or_default()
    }

    fn use_program(&self, program: Option<Self::Program>) {
        self.record(GlCall::UseProgram(program));
    }

    fn delete_program(&self, program: Self::Program) {
        self.journal
            .borrow_mut()
            .release(HandleKind::Program, program);
        self.record(GlCall::DeleteProgram(program));
    }

    fn uniform_location(
        &self,
        _program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        self.record(GlCall::GetUniformLocation(name.to_string()));
        self.journal
            .borrow()
            .uniforms
            .iter()
            .position(|u| u == name)
            .map(|idx| idx as u32)
    }

    fn uniform_1_i32(&self, location: &Self::UniformLocation, value: i32) {
        self.record(GlCall::Uniform1i { location: *location, value });
    }

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        let buffer = self
            .journal
            .borrow_mut()
            .allocate(HandleKind::Buffer)?;
        self.record(GlCall::CreateBuffer(buffer));
        Ok(buffer)
    }

    fn bind_buffer(&self, target: u32, buffer: Option<Self::Buffer>) {
        self.record(GlCall::BindBuffer { target, buffer });
    }

    fn buffer_data(&self, target: u32, data: &[u8], usage: u32) {
        self.record(GlCall::BufferData { target, data: data.to_vec(), usage });
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        self.journal
            .borrow_mut()
            .release(HandleKind::Buffer, buffer);
        self.record(GlCall::DeleteBuffer(buffer));
    }

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String> {
        let vao = self
            .journal
            .borrow_mut()
            .allocate(HandleKind::VertexArray)?;
        self.record(GlCall::CreateVertexArray(vao));
        Ok(vao)
    }

    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>) {
        self.record(GlCall::BindVertexArray(vertex_array));
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(GlCall::EnableVertexAttribArray(index));
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32, stride: i32, offset: i32) {
        self.record(GlCall::VertexAttribPointer { index, size, stride, offset });
    }

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        self.journal
            .borrow_mut()
            .release(HandleKind::VertexArray, vertex_array);
        self.record(GlCall::DeleteVertexArray(vertex_array));
    }

    fn create_texture(&self) -> Result<Self::Texture, String> {
        let texture = self
            .journal
            .borrow_mut()
            .allocate(HandleKind::Texture)?;
        self.record(GlCall::CreateTexture(texture));
        Ok(texture)
    }

    fn active_texture(&self, unit: u32) {
        self.record(GlCall::ActiveTexture(unit));
    }

    fn bind_texture(&self, target: u32, texture: Option<Self::Texture>) {
        self.record(GlCall::BindTexture { target, texture });
    }

    fn tex_parameter_i32(&self, _target: u32, parameter: u32, value: i32) {
        self.record(GlCall::TexParameter { parameter, value });
    }

    fn tex_image_2d_rgba8(
        &self,
        level: i32,
        width: i32,
        height: i32,
        pixels: &[u8],
    ) -> Result<(), String> {
        check_rgba8_len(width, height, pixels)?;
        self.record(GlCall::TexImage2d { level, width, height, pixels: pixels.to_vec() });
        Ok(())
    }

    fn generate_mipmap(&self, target: u32) {
        self.record(GlCall::GenerateMipmap(target));
    }

    fn delete_texture(&self, texture: Self::Texture) {
        self.journal
            .borrow_mut()
            .release(HandleKind::Texture, texture);
        self.record(GlCall::DeleteTexture(texture));
    }

    fn draw_elements(&self, mode: u32, count: i32, element_type: u32, offset: i32) {
        self.record(GlCall::DrawElements { mode, count, element_type, offset });
    }

    fn viewport(&self, _x: i32, _y: i32, width: i32, height: i32) {
        self.record(GlCall::Viewport { width, height });
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.record(GlCall::ClearColor([r, g, b, a]));
    }

    fn clear(&self, mask: u32) {
        self.record(GlCall::Clear(mask));
    }

    fn enable(&self, capability: u32) {
        self.record(GlCall::Enable(capability));
    }

    fn blend_func(&self, src: u32, dst: u32) {
        self.record(GlCall::BlendFunc(src, dst));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DisplayCall {
    ChooseConfigs,
    CreateSurface { config: usize },
    CreateContext { config: usize, gles_major: u8 },
    MakeCurrent { surface: u32, context: u32 },
    ReleaseCurrent { context: u32 },
    ResizeSurface { surface: u32, width: u32, height: u32 },
    SwapBuffers,
    DestroyContext(u32),
    DestroySurface(u32),
    Terminate,
}

#[derive(Debug, Default)]
struct DisplayJournal {
    configs: Vec<Option<ConfigAttribs>>,
    calls: Vec<DisplayCall>,
    surface_size: (i32, i32),
    next_handle: u32,
    fail_make_current: bool,
    fail_swap: bool,
}

/// Placeholder native window for [`MockDisplay`].
#[derive(Debug, Default)]
pub(crate) struct MockWindow;

/// Display double serving a scripted configuration list.
#[derive(Debug, Clone)]
pub(crate) struct MockDisplay {
    journal: Rc<RefCell<DisplayJournal>>,
    gpu: RecordingGpu,
}

impl MockDisplay {
    pub(crate) const RGB888_D24: ConfigAttribs =
        ConfigAttribs { red: 8, green: 8, blue: 8, depth: 24 };

    pub(crate) fn new(configs: &[ConfigAttribs]) -> Self {
        let journal = DisplayJournal {
            configs: configs.iter().copied().map(Some).collect(),
            surface_size: (1080, 2400),
            ..DisplayJournal::default()
        };

        Self {
            journal: Rc::new(RefCell::new(journal)),
            gpu: RecordingGpu::new(),
        }
    }

    /// A display offering exactly one RGB888 / depth-24 configuration.
    pub(crate) fn single_matching() -> Self {
        Self::new(&[Self::RGB888_D24])
    }

    /// Appends a configuration whose attributes can't be queried.
    pub(crate) fn push_unqueryable_config(&self) {
        self.journal.borrow_mut().configs.push(None);
    }

    pub(crate) fn gpu(&self) -> RecordingGpu {
        self.gpu.clone()
    }

    pub(crate) fn calls(&self) -> Vec<DisplayCall> {
        self.journal.borrow().calls.clone()
    }

    pub(crate) fn set_surface_size(&self, width: i32, height: i32) {
        self.journal.borrow_mut().surface_size = (width, height);
    }

    pub(crate) fn fail_make_current(&self) {
        self.journal.borrow_mut().fail_make_current = true;
    }

    pub(crate) fn fail_swap(&self) {
        self.journal.borrow_mut().fail_swap = true;
    }

    fn record(&self, call: DisplayCall) {
        self.journal.borrow_mut().calls.push(call);
    }

    fn next_handle(&self) -> u32 {
        let mut journal = self.journal.borrow_mut();
        journal.next_handle += 1;
        journal.next_handle
    }
}

impl Display for MockDisplay {
    type Config = usize;
    type Window = MockWindow;
    type Surface = u32;
    type Context = u32;
    type Gpu = RecordingGpu;

    fn choose_configs(
        &mut self,
        _request: &ConfigRequest,
        _window: &Self::Window,
    ) -> Result<Vec<Self::Config>, ConfigError> {
        self.record(DisplayCall::ChooseConfigs);
        Ok((0..self.journal.borrow().configs.len()).collect())
    }

    fn config_attribs(&self, config: &Self::Config) -> Option<ConfigAttribs> {
        self.journal
            .borrow()
            .configs
            .get(*config)
            .copied()
            .flatten()
    }

    fn create_window_surface(
        &mut self,
        config: &Self::Config,
        _window: &Self::Window,
    ) -> Result<Self::Surface, ConfigError> {
        self.record(DisplayCall::CreateSurface { config: *config });
        Ok(self.next_handle())
    }

    fn create_context(
        &mut self,
        config: &Self::Config,
        request: &ConfigRequest,
    ) -> Result<Self::Context, ConfigError> {
        self.record(DisplayCall::CreateContext {
            config: *config,
            gles_major: request.gles_major,
        });
        Ok(self.next_handle())
    }

    fn make_current(
        &mut self,
        surface: &Self::Surface,
        context: &mut Self::Context,
    ) -> Result<(), ConfigError> {
        self.record(DisplayCall::MakeCurrent { surface: *surface, context: *context });
        if self.journal.borrow().fail_make_current {
            return Err(ConfigError::MakeCurrent("EGL_BAD_MATCH".to_string()));
        }
        Ok(())
    }

    fn release_current(&mut self, context: &mut Self::Context) {
        self.record(DisplayCall::ReleaseCurrent { context: *context });
    }

    fn surface_size(&self, _surface: &Self::Surface) -> (i32, i32) {
        self.journal.borrow().surface_size
    }

    fn resize_surface(
        &mut self,
        surface: &Self::Surface,
        _context: &Self::Context,
        width: u32,
        height: u32,
    ) {
        self.record(DisplayCall::ResizeSurface { surface: *surface, width, height });
        let size = (
            i32::try_from(width).unwrap_or(i32::MAX),
            i32::try_from(height).unwrap_or(i32::MAX),
        );
        self.journal.borrow_mut().surface_size = size;
    }

    fn swap_buffers(
        &mut self,
        _surface: &Self::Surface,
        _context: &Self::Context,
    ) -> Result<(), SurfaceError> {
        self.record(DisplayCall::SwapBuffers);
        if self.journal.borrow().fail_swap {
            return Err(SurfaceError::SwapFailed("EGL_CONTEXT_LOST".to_string()));
        }
        Ok(())
    }

    fn destroy_context(&mut self, context: Self::Context) {
        self.record(DisplayCall::DestroyContext(context));
    }

    fn destroy_surface(&mut self, surface: Self::Surface) {
        self.record(DisplayCall::DestroySurface(surface));
    }

    fn terminate(&mut self) {
        self.record(DisplayCall::Terminate);
    }

    fn load_gpu(&self) -> Self::Gpu {
        self.gpu.clone()
    }
}
