use std::path::PathBuf;

use clap::Parser;
use color_eyre::{Report, eyre::eyre};
use texquad_core::{SceneDescriptor, TextureBinding, gl::MAX_TEXTURE_UNITS};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(
    name = "texquad",
    about = "Draws a textured quad through OpenGL ES 3",
    long_about = "Opens a window, builds a shader program and textures from an asset \
                  directory and draws one full-screen textured quad every frame"
)]
pub struct Cli {
    /// Directory assets are resolved against
    #[arg(long, value_name = "DIR", default_value = "assets")]
    pub assets: PathBuf,

    /// Vertex shader path, relative to the asset directory
    #[arg(long, value_name = "PATH", default_value = SceneDescriptor::DEFAULT_VERTEX_SHADER)]
    pub vertex: String,

    /// Fragment shader path, relative to the asset directory
    #[arg(long, value_name = "PATH", default_value = SceneDescriptor::DEFAULT_FRAGMENT_SHADER)]
    pub fragment: String,

    /// Texture to bind, in unit order. The sampler uniform defaults to uTexture<unit>.
    /// May be repeated; without any, the bundled checker texture is used.
    #[arg(short, long = "texture", value_name = "PATH[=SAMPLER]", value_parser = parse_texture)]
    pub textures: Vec<TextureArg>,

    /// Console log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<Level>,

    /// Window title
    #[arg(long, default_value = "texquad")]
    pub title: String,

    /// Initial window width in logical pixels
    #[arg(long, default_value = "540", value_name = "PIXELS")]
    pub width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value = "1200", value_name = "PIXELS")]
    pub height: u32,
}

/// A `--texture` argument before unit assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureArg {
    pub path: String,
    pub sampler: Option<String>,
}

fn parse_texture(s: &str) -> Result<TextureArg, String> {
    let (path, sampler) = match s.split_once('=') {
        Some((path, sampler)) => (path, Some(sampler)),
        None => (s, None),
    };

    if path.is_empty() {
        return Err(format!("Invalid texture '{s}': path is empty"));
    }
    if sampler.is_some_and(str::is_empty) {
        return Err(format!("Invalid texture '{s}': sampler name after '=' is empty"));
    }

    Ok(TextureArg {
        path: path.to_string(),
        sampler: sampler.map(str::to_string),
    })
}

impl Cli {
    /// Validates the CLI arguments
    pub fn validate(&self) -> Result<(), Report> {
        if self.width == 0 || self.height == 0 {
            return Err(eyre!(
                "Window size must be non-zero, got {}x{}",
                self.width,
                self.height
            ));
        }

        if self.textures.len() > MAX_TEXTURE_UNITS {
            return Err(eyre!(
                "{} textures given, at most {MAX_TEXTURE_UNITS} texture units are available",
                self.textures.len()
            ));
        }

        Ok(())
    }

    /// The scene described by the shader and texture arguments.
    pub fn scene(&self) -> SceneDescriptor {
        let scene = SceneDescriptor {
            vertex_shader: self.vertex.clone(),
            fragment_shader: self.fragment.clone(),
            ..SceneDescriptor::default()
        };

        if self.textures.is_empty() {
            return scene;
        }

        let textures = self
            .textures
            .iter()
            .enumerate()
            .map(|(unit, arg)| match &arg.sampler {
                Some(sampler) => TextureBinding::new(arg.path.clone(), sampler.clone()),
                None => TextureBinding::for_unit(arg.path.clone(), unit),
            })
            .collect();

        scene.with_textures(textures)
    }
}
