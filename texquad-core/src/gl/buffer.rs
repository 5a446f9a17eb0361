use std::slice;

use crate::gl::Gpu;

/// Uploads an array of elements to a GL buffer as raw bytes.
///
/// # Safety
/// Requires that T:
/// - Has a stable memory layout (use #[repr(C)] or #[repr(transparent)])
/// - Contains only copy types
/// - Has no padding issues that would cause UB
pub(super) fn buffer_upload_array<G: Gpu, T: Copy>(gl: &G, target: u32, data: &[T], usage: u32) {
    let bytes =
        unsafe { slice::from_raw_parts(data.as_ptr().cast::<u8>(), size_of_val(data)) };
    gl.buffer_data(target, bytes, usage);
}

/// Creates a buffer, binds it to `target` and fills it with `data`.
///
/// The buffer is left bound.
pub(super) fn create_buffer<G: Gpu, T: Copy>(
    gl: &G,
    target: u32,
    data: &[T],
    usage: u32,
) -> Result<G::Buffer, String> {
    let buffer = gl.create_buffer()?;
    gl.bind_buffer(target, Some(buffer));
    buffer_upload_array(gl, target, data, usage);
    Ok(buffer)
}

/// Enables `index` and describes it as `size` floats at byte `offset`.
pub(super) fn enable_vertex_attrib<G: Gpu>(gl: &G, index: u32, size: i32, offset: i32, stride: i32) {
    gl.enable_vertex_attrib_array(index);
    gl.vertex_attrib_pointer_f32(index, size, stride, offset);
}
