use std::fmt;

use crate::gl::{
    Gpu,
    buffer::{create_buffer, enable_vertex_attrib},
};

/// Interleaved quad vertex: position, color, texture coordinate.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Clip-space position.
    pub position: [f32; 3],
    /// Per-vertex RGB color.
    pub color: [f32; 3],
    /// Texture coordinate, origin at the bottom-left.
    pub uv: [f32; 2],
}

impl Vertex {
    /// Byte distance between consecutive vertices.
    pub const STRIDE: i32 = size_of::<Self>() as i32;

    const POSITION_OFFSET: i32 = 0;
    const COLOR_OFFSET: i32 = 3 * size_of::<f32>() as i32;
    const UV_OFFSET: i32 = 6 * size_of::<f32>() as i32;

    const fn new(position: [f32; 3], color: [f32; 3], uv: [f32; 2]) -> Self {
        Self { position, color, uv }
    }
}

/// The quad's four corners: top-right, bottom-right, bottom-left, top-left.
#[rustfmt::skip]
pub const QUAD_VERTICES: [Vertex; 4] = [
    Vertex::new([ 0.5,  0.5, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0]),
    Vertex::new([ 0.5, -0.5, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0]),
    Vertex::new([-0.5, -0.5, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
    Vertex::new([-0.5,  0.5, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0]),
];

/// Two triangles sharing the top-right to bottom-left diagonal.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

/// Vertex attribute locations the quad shaders bind to.
pub mod attrib {
    /// `layout(location = 0) in vec3`
    pub const POS: u32 = 0;
    /// `layout(location = 1) in vec3`
    pub const COLOR: u32 = 1;
    /// `layout(location = 2) in vec2`
    pub const UV: u32 = 2;
}

/// Vertex array, vertex buffer and element buffer for the quad.
#[must_use = "call `delete(gl)` before dropping to avoid GPU resource leaks"]
pub struct GeometryBuffer<G: Gpu> {
    vao: Option<G::VertexArray>,
    vertices: Option<G::Buffer>,
    indices: Option<G::Buffer>,
}

impl<G: Gpu> GeometryBuffer<G> {
    /// Number of indices drawn per frame.
    pub const INDEX_COUNT: i32 = QUAD_INDICES.len() as i32;

    /// Uploads the quad and records its attribute layout in a vertex array.
    ///
    /// # Errors
    /// Returns the driver's reason if any object can't be created; objects
    /// created before the failure are deleted.
    pub fn quad(gl: &G) -> Result<Self, String> {
        let mut geometry = Self { vao: None, vertices: None, indices: None };

        if let Err(e) = geometry.setup(gl) {
            geometry.delete(gl);
            return Err(e);
        }

        Ok(geometry)
    }

    fn setup(&mut self, gl: &G) -> Result<(), String> {
        let vao = *self.vao.insert(gl.create_vertex_array()?);
        gl.bind_vertex_array(Some(vao));

        self.vertices =
            Some(create_buffer(gl, glow::ARRAY_BUFFER, &QUAD_VERTICES, glow::STATIC_DRAW)?);

        // vertex attributes
        enable_vertex_attrib(gl, attrib::POS, 3, Vertex::POSITION_OFFSET, Vertex::STRIDE);
        enable_vertex_attrib(gl, attrib::COLOR, 3, Vertex::COLOR_OFFSET, Vertex::STRIDE);
        enable_vertex_attrib(gl, attrib::UV, 2, Vertex::UV_OFFSET, Vertex::STRIDE);

        self.indices = Some(create_buffer(
            gl,
            glow::ELEMENT_ARRAY_BUFFER,
            &QUAD_INDICES,
            glow::STATIC_DRAW,
        )?);

        // unbind VAO to prevent accidental modification
        gl.bind_vertex_array(None);
        gl.bind_buffer(glow::ARRAY_BUFFER, None);
        Ok(())
    }

    /// Binds the vertex array and element buffer for drawing.
    pub fn bind(&self, gl: &G) {
        gl.bind_vertex_array(self.vao);
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, self.indices);
    }

    /// Unbinds the element buffer and vertex array.
    pub fn unbind(&self, gl: &G) {
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);
        gl.bind_vertex_array(None);
    }

    /// Deletes all objects; later calls are no-ops.
    pub fn delete(&mut self, gl: &G) {
        if let Some(vao) = self.vao.take() {
            gl.delete_vertex_array(vao);
        }
        if let Some(buffer) = self.vertices.take() {
            gl.delete_buffer(buffer);
        }
        if let Some(buffer) = self.indices.take() {
            gl.delete_buffer(buffer);
        }
    }
}

impl<G: Gpu> fmt::Debug for GeometryBuffer<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeometryBuffer")
            .field("vao", &self.vao)
            .field("vertices", &self.vertices)
            .field("indices", &self.indices)
            .finish()
    }
}
