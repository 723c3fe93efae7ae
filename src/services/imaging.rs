//! Image variant generation
//!
//! Turns an uploaded raster image into the delivery variants the site
//! serves: a bounded-dimension JPEG main image and, when enabled and
//! supported, a full-size WebP plus a smaller WebP thumbnail. Also reports
//! compression statistics for the admin UI.
//!
//! Generation is all-or-nothing: any failure rejects the whole operation
//! and no partial variant set is returned. The generator performs no I/O;
//! persisting the produced variants is the upload handler's job.

use data_encoding::BASE64;
use image::imageops::FilterType;
use image::{DynamicImage, ImageEncoder, RgbImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::UploadConfig;

/// Hard cap on accepted input size: 20MB, inclusive
pub const MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;

/// Width cap for the WebP thumbnail variant
pub const THUMBNAIL_WIDTH: u32 = 600;

/// Fixed quality knob for the thumbnail variant
pub const THUMBNAIL_QUALITY: f32 = 0.75;

/// Errors that can occur during variant generation
#[derive(Debug, Error)]
pub enum ImagingError {
    /// The declared content type is not an image type
    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    /// The input exceeds [`MAX_UPLOAD_BYTES`]
    #[error("File too large: {size} bytes (limit {limit})")]
    FileTooLarge { size: u64, limit: u64 },

    /// The input bytes could not be decoded as an image
    #[error("Failed to decode image: {0}")]
    ImageLoadFailed(String),

    /// The input payload could not be read (bad base64)
    #[error("Failed to read file data: {0}")]
    FileReadFailed(String),

    /// A required encoder is not available in this build
    #[error("Image encoder unavailable")]
    EncoderUnavailable,
}

/// Configuration for one generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantConfig {
    /// Width bound for the main variant
    pub max_width: u32,
    /// Height bound for the main variant
    pub max_height: u32,
    /// JPEG quality in (0, 1]
    pub quality: f32,
    /// Whether to produce WebP variants
    pub generate_webp: bool,
}

impl Default for VariantConfig {
    fn default() -> Self {
        Self {
            max_width: 1920,
            max_height: 1080,
            quality: 0.85,
            generate_webp: true,
        }
    }
}

impl From<&UploadConfig> for VariantConfig {
    fn from(config: &UploadConfig) -> Self {
        Self {
            max_width: config.max_width,
            max_height: config.max_height,
            quality: config.quality,
            generate_webp: config.generate_webp,
        }
    }
}

/// One produced variant: base64 payload (no data-URL prefix) plus metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageVariant {
    /// Base64-encoded image bytes
    pub data: String,
    /// Content type of the encoded bytes
    pub content_type: String,
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
}

impl ImageVariant {
    /// Encoded payload size in bytes (before base64 expansion)
    pub fn byte_len(&self) -> u64 {
        // 4 base64 chars carry 3 bytes; padding over-counts by at most 2
        (self.data.len() as u64 / 4) * 3
    }
}

/// Compression statistics for one generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionStats {
    /// Input size in bytes
    pub original_bytes: u64,
    /// JPEG main variant size in bytes
    pub compressed_bytes: u64,
    /// Full-size WebP variant size in bytes, when produced
    pub webp_bytes: Option<u64>,
    /// Percentage saved by the JPEG encode, clamped to [0, 100]
    pub savings: f32,
}

/// The complete output of one generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantSet {
    pub main: ImageVariant,
    pub webp: Option<ImageVariant>,
    pub thumbnail: Option<ImageVariant>,
    pub stats: CompressionStats,
}

/// Image variant generator
///
/// Holds the run configuration and the result of the WebP encoder probe so
/// the availability check happens once, not per upload.
#[derive(Debug, Clone)]
pub struct ImageVariantGenerator {
    config: VariantConfig,
    webp_available: bool,
}

impl ImageVariantGenerator {
    /// Create a generator, probing the build's WebP encoder
    pub fn new(config: VariantConfig) -> Self {
        Self {
            config,
            webp_available: webp_supported(),
        }
    }

    /// Override the WebP availability probe (used by tests)
    pub fn with_webp_support(mut self, available: bool) -> Self {
        self.webp_available = available;
        self
    }

    /// Whether WebP variants can be produced by this generator
    pub fn webp_available(&self) -> bool {
        self.webp_available
    }

    /// Decode a base64 upload payload into raw bytes
    pub fn decode_payload(data: &str) -> Result<Vec<u8>, ImagingError> {
        BASE64
            .decode(data.as_bytes())
            .map_err(|e| ImagingError::FileReadFailed(e.to_string()))
    }

    /// Generate the variant set for one input image.
    ///
    /// Validation happens strictly before any decode work: the content type
    /// must carry an `image/` prefix and the input must be at most
    /// [`MAX_UPLOAD_BYTES`] (a file of exactly the limit is accepted).
    pub fn generate(&self, bytes: &[u8], content_type: &str) -> Result<VariantSet, ImagingError> {
        if !content_type.starts_with("image/") {
            return Err(ImagingError::InvalidFileType(content_type.to_string()));
        }
        if bytes.len() as u64 > MAX_UPLOAD_BYTES {
            return Err(ImagingError::FileTooLarge {
                size: bytes.len() as u64,
                limit: MAX_UPLOAD_BYTES,
            });
        }

        let source = image::load_from_memory(bytes)
            .map_err(|e| ImagingError::ImageLoadFailed(e.to_string()))?;

        // Main variant: aspect-fit within the configured bounds (never
        // upscaled), flattened onto white, JPEG-encoded at the configured
        // quality.
        let (main_w, main_h) = fit_within(
            source.width(),
            source.height(),
            self.config.max_width,
            self.config.max_height,
        );
        let main_rgb = flatten_to_rgb(&resize_to(&source, main_w, main_h));
        let jpeg_bytes = encode_jpeg(&main_rgb, self.config.quality)?;

        let main = ImageVariant {
            data: BASE64.encode(&jpeg_bytes),
            content_type: "image/jpeg".to_string(),
            width: main_w,
            height: main_h,
        };

        let (webp, thumbnail, webp_len) = if self.config.generate_webp && self.webp_available {
            // Full-size WebP of the same flattened canvas
            let webp_bytes = encode_webp(&main_rgb, self.config.quality)?;
            let webp = ImageVariant {
                data: BASE64.encode(&webp_bytes),
                content_type: "image/webp".to_string(),
                width: main_w,
                height: main_h,
            };

            // Thumbnail: aspect-fit from the original bitmap, independent of
            // the main variant's bounds
            let (thumb_w, thumb_h) = fit_width(source.width(), source.height(), THUMBNAIL_WIDTH);
            let thumb_rgb = flatten_to_rgb(&resize_to(&source, thumb_w, thumb_h));
            let thumb_bytes = encode_webp(&thumb_rgb, THUMBNAIL_QUALITY)?;
            let thumbnail = ImageVariant {
                data: BASE64.encode(&thumb_bytes),
                content_type: "image/webp".to_string(),
                width: thumb_w,
                height: thumb_h,
            };

            (Some(webp), Some(thumbnail), Some(webp_bytes.len() as u64))
        } else {
            (None, None, None)
        };

        let stats = CompressionStats {
            original_bytes: bytes.len() as u64,
            compressed_bytes: jpeg_bytes.len() as u64,
            webp_bytes: webp_len,
            savings: savings_percent(bytes.len() as u64, jpeg_bytes.len() as u64),
        };

        Ok(VariantSet {
            main,
            webp,
            thumbnail,
            stats,
        })
    }
}

/// Compute dimensions that fit within `max_w` x `max_h`, preserving aspect
/// ratio and never scaling up. The binding axis lands exactly on its bound.
pub fn fit_within(w: u32, h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if w <= max_w && h <= max_h {
        return (w, h);
    }
    let scale = f64::min(max_w as f64 / w as f64, max_h as f64 / h as f64);
    let tw = ((w as f64 * scale).round() as u32).clamp(1, max_w);
    let th = ((h as f64 * scale).round() as u32).clamp(1, max_h);
    (tw, th)
}

/// Cap width at `max_w`, preserving aspect ratio and never scaling up
fn fit_width(w: u32, h: u32, max_w: u32) -> (u32, u32) {
    if w <= max_w {
        return (w, h);
    }
    let scale = max_w as f64 / w as f64;
    let th = ((h as f64 * scale).round() as u32).max(1);
    (max_w, th)
}

/// Resize to exact target dimensions; identity when nothing changes
fn resize_to(source: &DynamicImage, w: u32, h: u32) -> DynamicImage {
    if source.width() == w && source.height() == h {
        source.clone()
    } else {
        source.resize_exact(w, h, FilterType::Triangle)
    }
}

/// Composite onto an opaque white background, discarding alpha
fn flatten_to_rgb(source: &DynamicImage) -> RgbImage {
    let rgba = source.to_rgba8();
    let mut rgb = RgbImage::new(rgba.width(), rgba.height());
    for (out, pixel) in rgb.pixels_mut().zip(rgba.pixels()) {
        let a = u16::from(pixel[3]);
        for c in 0..3 {
            let v = u16::from(pixel[c]) * a + 255 * (255 - a);
            out[c] = (v / 255) as u8;
        }
    }
    rgb
}

/// Encode an RGB image as JPEG at quality in (0, 1]
fn encode_jpeg(rgb: &RgbImage, quality: f32) -> Result<Vec<u8>, ImagingError> {
    let q = (quality * 100.0).round().clamp(1.0, 100.0) as u8;
    let mut out = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, q);
    encoder
        .write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| ImagingError::ImageLoadFailed(e.to_string()))?;
    Ok(out)
}

/// Encode an RGB image as WebP.
///
/// The bundled encoder is lossless; `quality` is accepted for interface
/// stability but does not affect the output.
fn encode_webp(rgb: &RgbImage, quality: f32) -> Result<Vec<u8>, ImagingError> {
    let _ = quality;
    let mut out = Vec::new();
    let encoder = image::codecs::webp::WebPEncoder::new_lossless(&mut out);
    encoder
        .write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| ImagingError::ImageLoadFailed(e.to_string()))?;
    Ok(out)
}

/// Probe whether this build can encode WebP
fn webp_supported() -> bool {
    let probe = RgbImage::from_pixel(1, 1, image::Rgb([255, 255, 255]));
    encode_webp(&probe, 1.0).is_ok()
}

/// Percentage saved by compression, clamped to [0, 100]
fn savings_percent(original: u64, compressed: u64) -> f32 {
    if original == 0 {
        return 0.0;
    }
    let saved = original.saturating_sub(compressed) as f64;
    ((saved / original as f64) * 100.0).clamp(0.0, 100.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    /// Encode a flat-color RGBA image as PNG bytes
    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([90, 120, 60, 255])));
        let mut out = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    fn generator() -> ImageVariantGenerator {
        ImageVariantGenerator::new(VariantConfig::default())
    }

    #[test]
    fn oversized_input_is_bounded_with_aspect_kept() {
        let bytes = png_bytes(4000, 3000);
        let set = generator().generate(&bytes, "image/png").unwrap();

        // Height binds: 4000x3000 into 1920x1080 gives 1440x1080
        assert_eq!(set.main.width, 1440);
        assert_eq!(set.main.height, 1080);
        assert_eq!(set.main.content_type, "image/jpeg");
        assert!(set.stats.savings > 0.0);
    }

    #[test]
    fn small_input_is_not_upscaled() {
        let bytes = png_bytes(400, 300);
        let set = generator().generate(&bytes, "image/png").unwrap();

        assert_eq!(set.main.width, 400);
        assert_eq!(set.main.height, 300);
        assert_eq!(set.main.content_type, "image/jpeg");
    }

    #[test]
    fn webp_and_thumbnail_produced_when_enabled() {
        let bytes = png_bytes(1200, 900);
        let set = generator().generate(&bytes, "image/png").unwrap();

        let webp = set.webp.expect("webp variant");
        assert_eq!(webp.content_type, "image/webp");
        assert_eq!((webp.width, webp.height), (set.main.width, set.main.height));

        let thumb = set.thumbnail.expect("thumbnail variant");
        assert_eq!(thumb.width, THUMBNAIL_WIDTH);
        assert_eq!(thumb.height, 450);
        assert!(set.stats.webp_bytes.is_some());
    }

    #[test]
    fn webp_disabled_yields_jpeg_only() {
        let config = VariantConfig {
            generate_webp: false,
            ..VariantConfig::default()
        };
        let bytes = png_bytes(800, 600);
        let set = ImageVariantGenerator::new(config)
            .generate(&bytes, "image/png")
            .unwrap();

        assert!(set.webp.is_none());
        assert!(set.thumbnail.is_none());
        assert!(set.stats.webp_bytes.is_none());
    }

    #[test]
    fn webp_unsupported_runtime_yields_jpeg_only() {
        let bytes = png_bytes(800, 600);
        let set = generator()
            .with_webp_support(false)
            .generate(&bytes, "image/png")
            .unwrap();

        assert!(set.webp.is_none());
        assert!(set.thumbnail.is_none());
    }

    #[test]
    fn non_image_content_type_rejected_before_decoding() {
        // Valid PNG bytes with a non-image declared type still fail the
        // type gate, proving validation precedes decode work
        let bytes = png_bytes(10, 10);
        let err = generator().generate(&bytes, "text/plain").unwrap_err();
        assert!(matches!(err, ImagingError::InvalidFileType(_)));
    }

    #[test]
    fn size_limit_is_inclusive() {
        // Exactly 20MB passes the size gate (then fails decode, which is the
        // point: the error is about content, not size)
        let at_limit = vec![0u8; MAX_UPLOAD_BYTES as usize];
        let err = generator().generate(&at_limit, "image/png").unwrap_err();
        assert!(matches!(err, ImagingError::ImageLoadFailed(_)));

        // One byte over is rejected as too large
        let over_limit = vec![0u8; MAX_UPLOAD_BYTES as usize + 1];
        let err = generator().generate(&over_limit, "image/png").unwrap_err();
        assert!(matches!(err, ImagingError::FileTooLarge { .. }));
    }

    #[test]
    fn garbage_bytes_fail_decode() {
        let err = generator()
            .generate(b"not an image at all", "image/jpeg")
            .unwrap_err();
        assert!(matches!(err, ImagingError::ImageLoadFailed(_)));
    }

    #[test]
    fn payload_base64_has_no_data_url_prefix() {
        let bytes = png_bytes(20, 20);
        let set = generator().generate(&bytes, "image/png").unwrap();

        assert!(!set.main.data.starts_with("data:"));
        let decoded = ImageVariantGenerator::decode_payload(&set.main.data).unwrap();
        assert_eq!(decoded.len() as u64, set.stats.compressed_bytes);
    }

    #[test]
    fn decode_payload_rejects_bad_base64() {
        let err = ImageVariantGenerator::decode_payload("not base64 !!!").unwrap_err();
        assert!(matches!(err, ImagingError::FileReadFailed(_)));
    }

    #[test]
    fn transparent_pixels_flatten_to_white() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0])));
        let rgb = flatten_to_rgb(&img);
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 255, 255]);
    }

    #[test]
    fn savings_are_clamped() {
        assert_eq!(savings_percent(100, 0), 100.0);
        assert_eq!(savings_percent(100, 100), 0.0);
        // Compressed larger than original clamps to zero, never negative
        assert_eq!(savings_percent(100, 250), 0.0);
        assert_eq!(savings_percent(0, 10), 0.0);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// fit_within output always fits the bounds, never upscales, and the
        /// binding axis lands exactly on its bound.
        #[test]
        fn fit_within_respects_bounds(
            w in 1u32..5000,
            h in 1u32..5000,
            max_w in 16u32..2600,
            max_h in 16u32..2600,
        ) {
            let (tw, th) = fit_within(w, h, max_w, max_h);

            prop_assert!(tw <= max_w && th <= max_h);
            prop_assert!(tw <= w && th <= h);

            if w > max_w || h > max_h {
                prop_assert!(tw == max_w || th == max_h);

                // Aspect ratio preserved within rounding error
                let original = w as f64 / h as f64;
                let produced = tw as f64 / th as f64;
                let tolerance = (1.0 / th as f64 + 1.0 / tw as f64) * original.max(1.0) * 2.0;
                prop_assert!((original - produced).abs() <= tolerance.max(0.05));
            } else {
                prop_assert_eq!((tw, th), (w, h));
            }
        }

        /// savings_percent stays inside [0, 100] for any byte sizes.
        #[test]
        fn savings_always_in_range(original in 0u64..u64::MAX / 2, compressed in 0u64..u64::MAX / 2) {
            let s = savings_percent(original, compressed);
            prop_assert!((0.0..=100.0).contains(&s));
        }
    }
}
