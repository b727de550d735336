//! # Optimization Request
//!
//! Valori di input per una singola ottimizzazione: sorgente + preset oppure
//! override esplicito dei limiti.

use crate::codec::OutputFormat;
use crate::error::OptimizeError;
use crate::preset::{Preset, UseCase};
use crate::source::SourceRef;

/// How output bounds and starting quality are chosen
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sizing {
    Preset(UseCase),
    Override {
        max_width: u32,
        max_height: u32,
        quality: f32,
    },
}

/// A single optimization request, consumed synchronously
#[derive(Debug, Clone)]
pub struct OptimizationRequest {
    pub source: SourceRef,
    pub sizing: Sizing,
}

impl OptimizationRequest {
    pub fn preset(source: impl Into<SourceRef>, use_case: UseCase) -> Self {
        Self {
            source: source.into(),
            sizing: Sizing::Preset(use_case),
        }
    }

    pub fn with_override(
        source: impl Into<SourceRef>,
        max_width: u32,
        max_height: u32,
        quality: f32,
    ) -> Self {
        Self {
            source: source.into(),
            sizing: Sizing::Override {
                max_width,
                max_height,
                quality,
            },
        }
    }

    /// Resolve the effective preset; overrides use the configured `format`
    pub fn resolve(&self, format: OutputFormat) -> Result<Preset, OptimizeError> {
        match self.sizing {
            Sizing::Preset(use_case) => Ok(use_case.preset()),
            Sizing::Override {
                max_width,
                max_height,
                quality,
            } => {
                if !(quality > 0.0 && quality <= 1.0) {
                    return Err(OptimizeError::Validation(format!(
                        "quality must be in (0, 1], got {}",
                        quality
                    )));
                }
                Ok(Preset {
                    max_width,
                    max_height,
                    start_quality: quality,
                    format,
                })
            }
        }
    }
}

/// Target-size parameters for aggressive mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggressiveOptions {
    pub target_size_bytes: u64,
    /// Quality floor; falls back to `Config::min_quality`
    pub min_quality: Option<f32>,
}

impl AggressiveOptions {
    pub fn new(target_size_bytes: u64) -> Self {
        Self {
            target_size_bytes,
            min_quality: None,
        }
    }

    pub fn with_min_quality(mut self, min_quality: f32) -> Self {
        self.min_quality = Some(min_quality);
        self
    }
}
