/// Binds one texture image to a sampler uniform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureBinding {
    /// Asset path of the image.
    pub path: String,
    /// Name of the `sampler2D` uniform the texture's unit is assigned to.
    pub sampler: String,
}

impl TextureBinding {
    /// Binds the image at `path` to `sampler`.
    pub fn new(path: impl Into<String>, sampler: impl Into<String>) -> Self {
        Self { path: path.into(), sampler: sampler.into() }
    }

    /// Binds the image at `path` to the conventional sampler for unit `unit`.
    pub fn for_unit(path: impl Into<String>, unit: usize) -> Self {
        Self::new(path, Self::default_sampler(unit))
    }

    /// `uTexture<unit>`, the sampler name the bundled fragment shader uses.
    pub fn default_sampler(unit: usize) -> String {
        format!("uTexture{unit}")
    }
}

/// What the renderer draws: a shader pair and the textures sampled by it.
///
/// Texture `i` is bound to texture unit `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneDescriptor {
    /// Asset path of the vertex shader.
    pub vertex_shader: String,
    /// Asset path of the fragment shader.
    pub fragment_shader: String,
    /// Textures in unit order.
    pub textures: Vec<TextureBinding>,
}

impl SceneDescriptor {
    /// Asset path of the bundled vertex shader.
    pub const DEFAULT_VERTEX_SHADER: &'static str = "shaders/quad.vert";
    /// Asset path of the bundled fragment shader.
    pub const DEFAULT_FRAGMENT_SHADER: &'static str = "shaders/quad.frag";
    /// Asset path of the bundled texture.
    pub const DEFAULT_TEXTURE: &'static str = "textures/checker.png";

    /// Replaces the texture list.
    #[must_use]
    pub fn with_textures(mut self, textures: Vec<TextureBinding>) -> Self {
        self.textures = textures;
        self
    }
}

impl Default for SceneDescriptor {
    fn default() -> Self {
        Self {
            vertex_shader: Self::DEFAULT_VERTEX_SHADER.to_string(),
            fragment_shader: Self::DEFAULT_FRAGMENT_SHADER.to_string(),
            textures: vec![TextureBinding::for_unit(Self::DEFAULT_TEXTURE, 0)],
        }
    }
}
