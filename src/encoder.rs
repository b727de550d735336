//! # Single-Pass Encoder
//!
//! Invoca il codec una sola volta: resize + encode ad una data qualità.
//! È l'unica operazione con costo proporzionale al numero di pixel, quindi va
//! chiamata il minor numero di volte possibile.
//!
//! Un errore di decode è fatale per l'intera richiesta (nessun retry).

use crate::codec::{ImageCodec, OutputFormat};
use crate::dimensions::Dimensions;
use crate::error::OptimizeError;
use tracing::debug;

/// Output of one encoder invocation
#[derive(Debug, Clone)]
pub struct EncodedCandidate {
    pub bytes: Vec<u8>,
    /// Size as measured by the codec (may be approximate)
    pub byte_size: u64,
    pub width: u32,
    pub height: u32,
    pub quality_used: f32,
}

impl EncodedCandidate {
    /// Exact binary length of the encoded bytes
    pub fn binary_size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Thin wrapper binding a codec to an output format
pub struct SinglePassEncoder<'a> {
    codec: &'a dyn ImageCodec,
    format: OutputFormat,
}

impl<'a> SinglePassEncoder<'a> {
    pub fn new(codec: &'a dyn ImageCodec, format: OutputFormat) -> Self {
        Self { codec, format }
    }

    pub fn encode(
        &self,
        source: &[u8],
        dims: Dimensions,
        quality: f32,
    ) -> Result<EncodedCandidate, OptimizeError> {
        let bytes = self
            .codec
            .resize_and_encode(source, dims.width, dims.height, quality, self.format)?;

        if bytes.is_empty() {
            return Err(OptimizeError::Encode(format!(
                "codec produced no output at quality {:.2}",
                quality
            )));
        }

        let byte_size = self.codec.measure(&bytes);
        debug!(
            "Encoded candidate {}x{} at q={:.2}: {} bytes (measured {})",
            dims.width,
            dims.height,
            quality,
            bytes.len(),
            byte_size
        );

        Ok(EncodedCandidate {
            bytes,
            byte_size,
            width: dims.width,
            height: dims.height,
            quality_used: quality,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::testing::{fake_source, FakeCodec};
    use crate::codec::CodecError;

    struct EmptyCodec;

    impl ImageCodec for EmptyCodec {
        fn decode_dimensions(&self, _bytes: &[u8]) -> Result<(u32, u32), CodecError> {
            Ok((10, 10))
        }

        fn resize_and_encode(
            &self,
            _bytes: &[u8],
            _width: u32,
            _height: u32,
            _quality: f32,
            _format: OutputFormat,
        ) -> Result<Vec<u8>, CodecError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_encode_reports_candidate() {
        let codec = FakeCodec::new(1.0);
        let encoder = SinglePassEncoder::new(&codec, OutputFormat::Jpeg);
        let source = fake_source(800, 600, 4096);

        let candidate = encoder.encode(&source, Dimensions::new(400, 300), 0.5).unwrap();
        assert_eq!(candidate.width, 400);
        assert_eq!(candidate.height, 300);
        assert_eq!(candidate.quality_used, 0.5);
        assert_eq!(candidate.byte_size, 60_000);
        assert_eq!(candidate.binary_size(), 60_000);
        assert_eq!(codec.encode_count(), 1);
    }

    #[test]
    fn test_corrupt_source_is_decode_error() {
        let codec = FakeCodec::new(1.0);
        let encoder = SinglePassEncoder::new(&codec, OutputFormat::Jpeg);

        let err = encoder
            .encode(b"garbage", Dimensions::new(10, 10), 0.5)
            .unwrap_err();
        assert!(matches!(err, OptimizeError::Decode(_)));
    }

    #[test]
    fn test_empty_output_is_encode_error() {
        let encoder = SinglePassEncoder::new(&EmptyCodec, OutputFormat::Jpeg);
        let err = encoder.encode(b"x", Dimensions::new(10, 10), 0.5).unwrap_err();
        assert!(matches!(err, OptimizeError::Encode(_)));
    }

    #[test]
    fn test_approximate_measure_kept_separate() {
        let mut codec = FakeCodec::new(1.0);
        codec.approximate_measure = true;
        let encoder = SinglePassEncoder::new(&codec, OutputFormat::Jpeg);
        let source = fake_source(30, 10, 64);

        let candidate = encoder.encode(&source, Dimensions::new(30, 10), 1.0).unwrap();
        assert_eq!(candidate.binary_size(), 300);
        assert_eq!(candidate.byte_size, 400);
    }
}
