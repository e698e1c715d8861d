//! Raw RGBA pixel-buffer operations.

/// An RGBA8 pixel buffer read back from a render target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

/// Error constructing a pixel buffer.
#[derive(Debug, thiserror::Error)]
pub enum PixelError {
    #[error("Buffer length {actual} does not match {width}x{height} RGBA ({expected})")]
    LengthMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

impl PixelBuffer {
    /// A buffer filled with a single RGBA color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap existing RGBA bytes, validating the length.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, PixelError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(PixelError::LengthMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major, top row first.
    pub fn rgba_bytes(&self) -> &[u8] {
        &self.data
    }

    /// One row of RGBA bytes.
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * 4;
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// A copy with the vertical scan order reversed.
    pub fn flipped_vertically(&self) -> PixelBuffer {
        let stride = self.width as usize * 4;
        let mut data = Vec::with_capacity(self.data.len());
        for y in (0..self.height).rev() {
            let start = y as usize * stride;
            data.extend_from_slice(&self.data[start..start + stride]);
        }
        PixelBuffer {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// RGB bytes with the alpha channel dropped, for encoders without
    /// alpha support.
    pub fn to_rgb(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.width as usize * self.height as usize * 3);
        for px in self.data.chunks_exact(4) {
            rgb.extend_from_slice(&px[..3]);
        }
        rgb
    }
}
