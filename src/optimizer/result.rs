//! # Optimization Result
//!
//! Valore di output: byte codificati (di proprietà del chiamante) e metriche
//! di compressione. Le dimensioni sono sempre quelle binarie reali, anche
//! quando l'output è più grande dell'originale.

use crate::codec::OutputFormat;
use serde::Serialize;

/// Final output of one optimization
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    /// Encoded bytes; persisting them is the caller's responsibility
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub original_size_bytes: u64,
    pub optimized_size_bytes: u64,
    /// `round((1 - optimized / original) * 100)`, negative when the output grew
    pub compression_ratio_percent: i64,
    pub quality_used: f32,
    pub encodes: usize,
    pub target_size_bytes: Option<u64>,
    pub format: OutputFormat,
}

impl OptimizationResult {
    /// False only for best-effort results that stayed above their target
    pub fn met_target(&self) -> bool {
        self.target_size_bytes
            .map_or(true, |target| self.optimized_size_bytes <= target)
    }

    pub fn bytes_saved(&self) -> u64 {
        self.original_size_bytes
            .saturating_sub(self.optimized_size_bytes)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Compression ratio in whole percent; 0 for an empty original
pub fn compression_ratio_percent(original_size: u64, optimized_size: u64) -> i64 {
    if original_size == 0 {
        return 0;
    }
    ((1.0 - optimized_size as f64 / original_size as f64) * 100.0).round() as i64
}
