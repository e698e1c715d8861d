//! Face encoding with a deterministic fallback chain.
//!
//! The requested format is tried first; WebP delegates to an injectable
//! codec. Any failure (or zero-length output) falls back to the lossless
//! PNG encoding of the same buffer, and the reported extension always
//! matches the format actually produced.

use std::io::Cursor;

use cubecap_common::{CubecapError, CubecapResult, ImageFormat};
use cubecap_processing_core::PixelBuffer;
use image::{ExtendedColorType, ImageEncoder};

/// One encoded face, with the extension of the format actually produced.
#[derive(Debug, Clone)]
pub struct EncodedFace {
    pub bytes: Vec<u8>,
    pub extension: &'static str,
}

/// Seam to the lossy-with-alpha codec so tests can simulate failure.
pub trait LossyAlphaCodec {
    fn encode(&self, pixels: &PixelBuffer, quality: u8) -> CubecapResult<Vec<u8>>;
}

/// Default WebP codec backed by the `image` crate.
///
/// The backing encoder is lossless, so the quality hint is accepted but
/// not applied; a native lossy codec can be swapped in through the trait.
#[derive(Debug, Default)]
pub struct ImageWebpCodec;

impl LossyAlphaCodec for ImageWebpCodec {
    fn encode(&self, pixels: &PixelBuffer, _quality: u8) -> CubecapResult<Vec<u8>> {
        let mut out = Vec::new();
        image::codecs::webp::WebPEncoder::new_lossless(Cursor::new(&mut out))
            .encode(
                pixels.rgba_bytes(),
                pixels.width(),
                pixels.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| CubecapError::encoding(format!("webp: {e}")))?;
        Ok(out)
    }
}

/// Encodes one face's pixel buffer into an image byte stream.
pub struct FaceEncoder {
    webp: Box<dyn LossyAlphaCodec>,
}

impl Default for FaceEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FaceEncoder {
    pub fn new() -> Self {
        Self {
            webp: Box::new(ImageWebpCodec),
        }
    }

    /// Use a specific lossy-alpha codec (native binding, or a failing stub
    /// in tests).
    pub fn with_codec(codec: Box<dyn LossyAlphaCodec>) -> Self {
        Self { webp: codec }
    }

    /// Encode `pixels` in `format`, walking the fallback chain until an
    /// attempt produces non-empty output. Each failed attempt is logged.
    pub fn encode(&self, pixels: &PixelBuffer, format: ImageFormat) -> CubecapResult<EncodedFace> {
        type Attempt<'a> = (
            &'static str,
            Box<dyn Fn(&PixelBuffer) -> CubecapResult<Vec<u8>> + 'a>,
        );

        let mut attempts: Vec<Attempt<'_>> = Vec::with_capacity(2);
        match format {
            ImageFormat::Png => attempts.push(("png", Box::new(encode_png))),
            ImageFormat::Jpg { quality } => {
                attempts.push(("jpg", Box::new(move |p| encode_jpg(p, quality))));
            }
            ImageFormat::Webp { quality } => {
                attempts.push(("webp", Box::new(move |p| self.webp.encode(p, quality))));
            }
        }
        if format != ImageFormat::Png {
            attempts.push(("png", Box::new(encode_png)));
        }

        for (extension, encode) in attempts {
            match encode(pixels) {
                Ok(bytes) if !bytes.is_empty() => {
                    return Ok(EncodedFace { bytes, extension });
                }
                Ok(_) => {
                    tracing::error!(
                        format = extension,
                        "Encoder returned empty data; falling back"
                    );
                }
                Err(e) => {
                    tracing::error!(format = extension, error = %e, "Encoding failed; falling back");
                }
            }
        }

        Err(CubecapError::encoding(
            "all encoders in the fallback chain failed",
        ))
    }
}

fn encode_png(pixels: &PixelBuffer) -> CubecapResult<Vec<u8>> {
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(Cursor::new(&mut out))
        .write_image(
            pixels.rgba_bytes(),
            pixels.width(),
            pixels.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| CubecapError::encoding(format!("png: {e}")))?;
    Ok(out)
}

fn encode_jpg(pixels: &PixelBuffer, quality: u8) -> CubecapResult<Vec<u8>> {
    // JPEG has no alpha channel; drop it before encoding.
    let rgb = pixels.to_rgb();
    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut out), quality)
        .write_image(
            &rgb,
            pixels.width(),
            pixels.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| CubecapError::encoding(format!("jpg: {e}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingCodec;

    impl LossyAlphaCodec for FailingCodec {
        fn encode(&self, _pixels: &PixelBuffer, _quality: u8) -> CubecapResult<Vec<u8>> {
            Err(CubecapError::encoding("simulated native codec failure"))
        }
    }

    struct EmptyCodec;

    impl LossyAlphaCodec for EmptyCodec {
        fn encode(&self, _pixels: &PixelBuffer, _quality: u8) -> CubecapResult<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    fn test_pixels() -> PixelBuffer {
        PixelBuffer::filled(8, 8, [200, 40, 90, 255])
    }

    #[test]
    fn png_round_trips_pixel_for_pixel() {
        let pixels = test_pixels();
        let encoded = FaceEncoder::new()
            .encode(&pixels, ImageFormat::Png)
            .unwrap();
        assert_eq!(encoded.extension, "png");

        let decoded = image::load_from_memory(&encoded.bytes).unwrap().to_rgba8();
        assert_eq!(decoded.as_raw().as_slice(), pixels.rgba_bytes());
    }

    #[test]
    fn jpg_reports_matching_extension() {
        let encoded = FaceEncoder::new()
            .encode(&test_pixels(), ImageFormat::Jpg { quality: 95 })
            .unwrap();
        assert_eq!(encoded.extension, "jpg");
        assert!(!encoded.bytes.is_empty());
    }

    #[test]
    fn webp_succeeds_with_default_codec() {
        let encoded = FaceEncoder::new()
            .encode(&test_pixels(), ImageFormat::Webp { quality: 80 })
            .unwrap();
        assert_eq!(encoded.extension, "webp");
    }

    #[test]
    fn failing_webp_codec_falls_back_to_png() {
        let pixels = test_pixels();
        let encoder = FaceEncoder::with_codec(Box::new(FailingCodec));
        let fallback = encoder
            .encode(&pixels, ImageFormat::Webp { quality: 80 })
            .unwrap();
        assert_eq!(fallback.extension, "png");

        // The fallback output is the PNG encoding of the same buffer.
        let direct = FaceEncoder::new()
            .encode(&pixels, ImageFormat::Png)
            .unwrap();
        assert_eq!(fallback.bytes, direct.bytes);
    }

    #[test]
    fn empty_webp_output_counts_as_failure() {
        let encoder = FaceEncoder::with_codec(Box::new(EmptyCodec));
        let fallback = encoder
            .encode(&test_pixels(), ImageFormat::Webp { quality: 80 })
            .unwrap();
        assert_eq!(fallback.extension, "png");
        assert!(!fallback.bytes.is_empty());
    }
}
