//! Driver identification strings.

use crate::gl::Gpu;

/// Splits a space-separated capability string (such as `GL_EXTENSIONS`) into tokens.
///
/// Runs of whitespace are treated as one separator; empty tokens are dropped.
pub fn parse_capability_list(list: &str) -> Vec<&str> {
    list.split_whitespace().collect()
}

/// Vendor, renderer, version and extension strings reported by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverInfo {
    /// `GL_VENDOR`
    pub vendor: String,
    /// `GL_RENDERER`
    pub renderer: String,
    /// `GL_VERSION`
    pub version: String,
    /// `GL_EXTENSIONS`, one entry per extension.
    pub extensions: Vec<String>,
}

impl DriverInfo {
    /// Queries the driver strings of the current context.
    pub fn query<G: Gpu>(gl: &G) -> Self {
        let extensions = gl.get_string(glow::EXTENSIONS);

        Self {
            vendor: gl.get_string(glow::VENDOR),
            renderer: gl.get_string(glow::RENDERER),
            version: gl.get_string(glow::VERSION),
            extensions: parse_capability_list(&extensions)
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    /// Emits the strings as debug events, one per extension.
    pub fn log(&self) {
        tracing::debug!("GL_VENDOR: {}", self.vendor);
        tracing::debug!("GL_RENDERER: {}", self.renderer);
        tracing::debug!("GL_VERSION: {}", self.version);
        tracing::debug!(count = self.extensions.len(), "GL_EXTENSIONS:");
        for extension in &self.extensions {
            tracing::debug!("{extension}");
        }
    }

    /// True if the driver advertises `extension`.
    pub fn has_extension(&self, extension: &str) -> bool {
        self.extensions.iter().any(|e| e == extension)
    }
}
