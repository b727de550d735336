//! # Image Codec Module
//!
//! Capability esterna che esegue decode, resize e re-encode lossy.
//! La pipeline non implementa la matematica di compressione: definisce solo
//! la *policy* con cui il codec viene invocato.
//!
//! ## Componenti:
//! - `ImageCodec`: trait iniettabile (decode dimensioni, resize + encode, misura)
//! - `ImageCrateCodec`: implementazione di default basata sul crate `image`
//! - `CodecError`: superficie di errore (`Decode`, `UnsupportedFormat`, `Encode`)
//!
//! ## Misura delle dimensioni:
//! `measure()` può restituire una stima approssimata (es. la lunghezza di una
//! rappresentazione testuale intermedia). La ricerca la usa solo per decidere
//! se continuare: il valore riportato nel risultato è sempre la lunghezza
//! binaria reale.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, ImageError};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use tracing::debug;

/// Lossy output formats the pipeline can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Failure surface of a codec
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    #[error("decode failed: {0}")]
    Decode(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("encode failed: {0}")]
    Encode(String),
}

/// Decode/resize/encode capability driven by the size search.
///
/// Implementations must be deterministic for identical inputs and are shared
/// across batch workers, hence `Send + Sync`.
pub trait ImageCodec: Send + Sync {
    /// Read the pixel dimensions of an encoded image
    fn decode_dimensions(&self, bytes: &[u8]) -> Result<(u32, u32), CodecError>;

    /// Resize `bytes` to exactly `width` x `height` and encode at `quality` (0, 1]
    fn resize_and_encode(
        &self,
        bytes: &[u8],
        width: u32,
        height: u32,
        quality: f32,
        format: OutputFormat,
    ) -> Result<Vec<u8>, CodecError>;

    /// Size used to steer the search; defaults to the exact binary length
    fn measure(&self, encoded: &[u8]) -> u64 {
        encoded.len() as u64
    }
}

/// Codec backed by the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateCodec {
    filter: Option<FilterType>,
}

impl ImageCrateCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different resampling filter (Lanczos3 by default)
    pub fn with_filter(filter: FilterType) -> Self {
        Self { filter: Some(filter) }
    }

    fn filter(&self) -> FilterType {
        self.filter.unwrap_or(FilterType::Lanczos3)
    }
}

/// Maps a 0..=1 quality factor onto the encoder's 1..=100 scale
pub fn quality_to_percent(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

fn decode_error(err: ImageError) -> CodecError {
    match err {
        ImageError::Unsupported(e) => CodecError::UnsupportedFormat(e.to_string()),
        other => CodecError::Decode(other.to_string()),
    }
}

impl ImageCodec for ImageCrateCodec {
    fn decode_dimensions(&self, bytes: &[u8]) -> Result<(u32, u32), CodecError> {
        let reader = image::io::Reader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| CodecError::Decode(e.to_string()))?;

        if reader.format().is_none() {
            return Err(CodecError::UnsupportedFormat(
                "unrecognized image signature".to_string(),
            ));
        }

        reader.into_dimensions().map_err(decode_error)
    }

    fn resize_and_encode(
        &self,
        bytes: &[u8],
        width: u32,
        height: u32,
        quality: f32,
        format: OutputFormat,
    ) -> Result<Vec<u8>, CodecError> {
        let img = image::load_from_memory(bytes).map_err(decode_error)?;

        let img = if img.width() == width && img.height() == height {
            img
        } else {
            img.resize_exact(width, height, self.filter())
        };

        let mut buf = Vec::new();
        match format {
            OutputFormat::Jpeg => {
                let rgb = img.to_rgb8();
                let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality_to_percent(quality));
                encoder
                    .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
                    .map_err(|e| CodecError::Encode(e.to_string()))?;
            }
        }

        debug!(
            "Encoded {}x{} {:?} at q={:.2}: {} bytes",
            width,
            height,
            format,
            quality,
            buf.len()
        );

        Ok(buf)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Deterministic fake codec and fixtures for tests.

    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const MAGIC: &[u8; 4] = b"FAKE";

    /// Build a fake "encoded image" of `len` bytes that decodes to `width` x `height`
    pub fn fake_source(width: u32, height: u32, len: usize) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(len.max(12));
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&width.to_le_bytes());
        bytes.extend_from_slice(&height.to_le_bytes());
        bytes.resize(len.max(12), 0xAB);
        bytes
    }

    /// Codec whose output size is `pixels * bytes_per_pixel * quality`
    pub struct FakeCodec {
        pub bytes_per_pixel: f64,
        /// Report a base64-style inflated size from `measure()`
        pub approximate_measure: bool,
        /// Fail encoding strictly below this quality
        pub fail_encode_below: Option<f32>,
        pub encodes: AtomicUsize,
    }

    impl FakeCodec {
        pub fn new(bytes_per_pixel: f64) -> Self {
            Self {
                bytes_per_pixel,
                approximate_measure: false,
                fail_encode_below: None,
                encodes: AtomicUsize::new(0),
            }
        }

        pub fn encode_count(&self) -> usize {
            self.encodes.load(Ordering::SeqCst)
        }

        /// Expected output size for given dimensions and quality
        pub fn size_for(&self, width: u32, height: u32, quality: f32) -> usize {
            let size = width as f64 * height as f64 * self.bytes_per_pixel * quality as f64;
            (size.round() as usize).max(1)
        }
    }

    impl ImageCodec for FakeCodec {
        fn decode_dimensions(&self, bytes: &[u8]) -> Result<(u32, u32), CodecError> {
            if bytes.len() < 12 || &bytes[..4] != MAGIC {
                return Err(CodecError::Decode("corrupt fake image".to_string()));
            }
            let width = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
            let height = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
            Ok((width, height))
        }

        fn resize_and_encode(
            &self,
            bytes: &[u8],
            width: u32,
            height: u32,
            quality: f32,
            _format: OutputFormat,
        ) -> Result<Vec<u8>, CodecError> {
            self.decode_dimensions(bytes)?;
            self.encodes.fetch_add(1, Ordering::SeqCst);

            if let Some(floor) = self.fail_encode_below {
                if quality < floor {
                    return Err(CodecError::Encode(format!("cannot encode at q={}", quality)));
                }
            }

            Ok(vec![0u8; self.size_for(width, height, quality)])
        }

        fn measure(&self, encoded: &[u8]) -> u64 {
            if self.approximate_measure {
                (encoded.len() as u64).div_ceil(3) * 4
            } else {
                encoded.len() as u64
            }
        }
    }

    /// A real PNG with noisy content so JPEG output size tracks quality
    pub fn png_fixture(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            let v = x.wrapping_mul(7919) ^ y.wrapping_mul(104_729) ^ (x * y);
            image::Rgb([(v & 0xFF) as u8, ((v >> 8) & 0xFF) as u8, ((x + y) & 0xFF) as u8])
        });

        let mut cursor = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut cursor, image::ImageOutputFormat::Png)
            .unwrap();
        cursor.into_inner()
    }
}
