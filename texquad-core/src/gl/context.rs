use crate::gl::Gpu;

/// Manages simple GL state to reduce redundant state changes
#[derive(Debug)]
pub struct GlState {
    // Clear color
    clear_color: [f32; 4],

    // Blend function state
    blend_func: (u32, u32), // (src_factor, dst_factor)
    blend_enabled: bool,

    // Active texture unit
    active_texture_unit: u32,
}

impl Default for GlState {
    fn default() -> Self {
        Self::new()
    }
}

impl GlState {
    /// Create a new GLState object with GL defaults
    pub fn new() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 0.0],
            blend_func: (glow::ONE, glow::ZERO), // Default blend function
            blend_enabled: false,
            active_texture_unit: glow::TEXTURE0,
        }
    }

    /// Set clear color
    pub fn clear_color<G: Gpu>(&mut self, gl: &G, r: f32, g: f32, b: f32, a: f32) -> &mut Self {
        let new_color = [r, g, b, a];
        if self.clear_color != new_color {
            gl.clear_color(r, g, b, a);
            self.clear_color = new_color;
        }
        self
    }

    /// Enable blending with the given factors
    pub fn blend<G: Gpu>(&mut self, gl: &G, src: u32, dst: u32) -> &mut Self {
        if !self.blend_enabled {
            gl.enable(glow::BLEND);
            self.blend_enabled = true;
        }
        if self.blend_func != (src, dst) {
            gl.blend_func(src, dst);
            self.blend_func = (src, dst);
        }
        self
    }

    /// Set active texture unit
    pub fn active_texture<G: Gpu>(&mut self, gl: &G, texture_unit: u32) -> &mut Self {
        if self.active_texture_unit != texture_unit {
            gl.active_texture(texture_unit);
            self.active_texture_unit = texture_unit;
        }
        self
    }

    /// Currently tracked clear color
    pub fn current_clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    /// Reset the active texture unit to GL defaults
    pub fn reset<G: Gpu>(&mut self, gl: &G) {
        if self.active_texture_unit != glow::TEXTURE0 {
            gl.active_texture(glow::TEXTURE0);
            self.active_texture_unit = glow::TEXTURE0;
        }

        // Note: blend state and clear_color persist for the lifetime of the
        // context; they are set once at renderer init
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::mock::{GlCall, RecordingGpu};

    #[test]
    fn redundant_changes_are_skipped() {
        let gl = RecordingGpu::new();
        let mut state = GlState::new();

        state.clear_color(&gl, 1.0, 0.0, 0.0, 1.0);
        state.clear_color(&gl, 1.0, 0.0, 0.0, 1.0);
        state.active_texture(&gl, glow::TEXTURE0);
        state.active_texture(&gl, glow::TEXTURE1);
        state.active_texture(&gl, glow::TEXTURE1);
        state.blend(&gl, glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
        state.blend(&gl, glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);

        assert_eq!(gl.calls(), vec![
            GlCall::ClearColor([1.0, 0.0, 0.0, 1.0]),
            GlCall::ActiveTexture(glow::TEXTURE1),
            GlCall::Enable(glow::BLEND),
            GlCall::BlendFunc(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA),
        ]);
    }

    #[test]
    fn reset_restores_texture_unit_zero() {
        let gl = RecordingGpu::new();
        let mut state = GlState::new();

        state.active_texture(&gl, glow::TEXTURE3);
        state.reset(&gl);
        state.reset(&gl);

        assert_eq!(gl.calls(), vec![
            GlCall::ActiveTexture(glow::TEXTURE3),
            GlCall::ActiveTexture(glow::TEXTURE0),
        ]);
    }
}
