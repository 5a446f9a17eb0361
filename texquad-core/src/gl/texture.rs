use std::{borrow::Cow, fmt, io::Cursor};

use image::ImageReader;

use crate::{
    asset::AssetSource,
    error::TextureError,
    gl::{GlState, Gpu},
};

/// Bytes per RGBA8 pixel.
const BYTES_PER_PIXEL: usize = 4;

/// An RGBA8 image, top row first.
///
/// [`DecodedImage::decode`] produces tightly packed rows; rows built by hand
/// may be padded past `width * 4` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Bytes per row, at least `width * 4`.
    pub stride: usize,
    /// RGBA8 pixel rows.
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Decodes a PNG (or any format the decoder recognizes) to RGBA8.
    ///
    /// `path` is only used for error reporting.
    ///
    /// # Errors
    /// [`TextureError::DecodeInitFailed`] if the format or header can't be read,
    /// [`TextureError::DecodeFailed`] if the pixel data can't be decoded.
    pub fn decode(path: &str, bytes: &[u8]) -> Result<Self, TextureError> {
        let init_failed = |reason: String| TextureError::DecodeInitFailed {
            path: path.to_string(),
            reason,
        };
        let decode_failed = |reason: String| TextureError::DecodeFailed {
            path: path.to_string(),
            reason,
        };

        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| init_failed(e.to_string()))?;
        if reader.format().is_none() {
            return Err(init_failed("unrecognized image format".to_string()));
        }

        // header first, so a truncated body is reported as a decode failure
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| init_failed(e.to_string()))?;

        let image = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| init_failed(e.to_string()))?
            .decode()
            .map_err(|e| decode_failed(e.to_string()))?;

        let stride = width as usize * BYTES_PER_PIXEL;
        let pixels = image.into_rgba8().into_raw();
        if pixels.len() != stride * height as usize {
            return Err(decode_failed(format!(
                "expected {} bytes of pixel data, got {}",
                stride * height as usize,
                pixels.len()
            )));
        }

        tracing::debug!(path, width, height, stride, "decoded image");
        Ok(Self { width, height, stride, pixels })
    }

    /// Reorders rows so the last row comes first, matching GL's bottom-left origin.
    pub fn flip_vertically(&mut self) {
        flip_rows(&mut self.pixels, self.height as usize, self.stride);
    }

    /// Pixel rows with any padding past `width * 4` dropped.
    ///
    /// # Errors
    /// [`TextureError::Creation`] if `stride` is shorter than a row or
    /// `pixels` holds fewer than `height` rows.
    pub fn packed_rows(&self) -> Result<Cow<'_, [u8]>, TextureError> {
        let row = self.width as usize * BYTES_PER_PIXEL;
        let height = self.height as usize;

        if self.stride < row {
            return Err(TextureError::Creation(format!(
                "stride {} is shorter than a {}-pixel row",
                self.stride, self.width
            )));
        }

        let required = self
            .stride
            .checked_mul(height)
            .ok_or_else(|| TextureError::Creation(format!("{height} rows overflow")))?;
        if self.pixels.len() < required {
            return Err(TextureError::Creation(format!(
                "{} bytes of pixel data for {height} rows of {} bytes",
                self.pixels.len(),
                self.stride
            )));
        }

        if self.stride == row {
            return Ok(Cow::Borrowed(&self.pixels[..required]));
        }

        let packed = self.pixels[..required]
            .chunks_exact(self.stride)
            .flat_map(|padded| &padded[..row])
            .copied()
            .collect();
        Ok(Cow::Owned(packed))
    }
}

/// Swaps row `y` with row `height - 1 - y` in place.
///
/// Applying it twice restores the original buffer. Does nothing if `pixels`
/// is shorter than `height * stride`.
pub fn flip_rows(pixels: &mut [u8], height: usize, stride: usize) {
    if stride == 0 || pixels.len() < height * stride {
        return;
    }

    let rows = &mut pixels[..height * stride];
    let (mut top, mut bottom) = (0, height);
    while top + 1 < bottom {
        bottom -= 1;
        let (head, tail) = rows.split_at_mut(bottom * stride);
        head[top * stride..(top + 1) * stride].swap_with_slice(&mut tail[..stride]);
        top += 1;
    }
}

/// A 2D RGBA8 texture with a full mipmap chain.
#[must_use = "call `delete(gl)` before dropping to avoid GPU resource leaks"]
pub struct Texture<G: Gpu> {
    texture: Option<G::Texture>,
    width: i32,
    height: i32,
}

impl<G: Gpu> Texture<G> {
    /// Reads, decodes and uploads the image at `path`.
    ///
    /// # Errors
    /// [`TextureError::SourceUnavailable`] if the asset can't be read, a decode
    /// error if the image is malformed, or [`TextureError::Creation`].
    /// No texture handle exists after any failure.
    pub fn load(gl: &G, assets: &dyn AssetSource, path: &str) -> Result<Self, TextureError> {
        let bytes = assets
            .read(path)
            .map_err(|source| TextureError::SourceUnavailable { path: path.to_string(), source })?;

        let mut image = DecodedImage::decode(path, &bytes)?;
        image.flip_vertically();

        Self::upload(gl, &image)
    }

    /// Uploads already decoded pixels without reordering rows.
    ///
    /// Padded rows are repacked before upload.
    ///
    /// # Errors
    /// [`TextureError::Creation`] if the pixel buffer doesn't cover the image,
    /// the dimensions exceed what GL can address, or the driver refuses the
    /// texture. Nothing is allocated on failure.
    pub fn upload(gl: &G, image: &DecodedImage) -> Result<Self, TextureError> {
        let width = i32::try_from(image.width)
            .map_err(|_| TextureError::Creation(format!("width {} out of range", image.width)))?;
        let height = i32::try_from(image.height)
            .map_err(|_| TextureError::Creation(format!("height {} out of range", image.height)))?;
        let pixels = image.packed_rows()?;

        let texture = gl.create_texture().map_err(TextureError::Creation)?;

        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_MIN_FILTER,
            glow::LINEAR_MIPMAP_LINEAR as i32,
        );
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);

        if let Err(reason) = gl.tex_image_2d_rgba8(0, width, height, &pixels) {
            gl.bind_texture(glow::TEXTURE_2D, None);
            gl.delete_texture(texture);
            return Err(TextureError::Creation(reason));
        }
        gl.generate_mipmap(glow::TEXTURE_2D);
        gl.bind_texture(glow::TEXTURE_2D, None);

        Ok(Self { texture: Some(texture), width, height })
    }

    /// Binds the texture to texture unit `unit`.
    pub fn bind(&self, gl: &G, state: &mut GlState, unit: u32) {
        state.active_texture(gl, glow::TEXTURE0 + unit);
        gl.bind_texture(glow::TEXTURE_2D, self.texture);
    }

    /// Width and height in pixels.
    #[must_use]
    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// True until the texture is deleted.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.texture.is_some()
    }

    /// Deletes the texture; later calls are no-ops.
    pub fn delete(&mut self, gl: &G) {
        if let Some(texture) = self.texture.take() {
            gl.delete_texture(texture);
        }
    }
}

impl<G: Gpu> fmt::Debug for Texture<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("texture", &self.texture)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}
