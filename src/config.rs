//! # Configuration Module
//!
//! Questo modulo gestisce la configurazione della pipeline di ottimizzazione.
//!
//! ## Responsabilità:
//! - Definisce la struttura `Config` con i parametri della ricerca
//! - Fornisce valori di default sensati
//! - Valida i parametri di configurazione
//! - Supporta serializzazione/deserializzazione JSON
//!
//! ## Parametri principali:
//! - `quality_step`: Decremento di qualità per iterazione (default 0.1)
//! - `min_quality`: Floor di qualità per la modalità aggressiva (default 0.25)
//! - `max_encodes`: Limite rigido di encode per richiesta (default 10)
//! - `workers`: Worker paralleli per il batch (default: core disponibili, max 4)
//! - `format`: Formato lossy di output
//!
//! Step e floor sono parametri centrali, non override per preset.
//!
//! ## Esempio:
//! ```ignore
//! let config = Config::default();
//! config.validate()?;
//! ```

use crate::codec::OutputFormat;
use crate::search::{
    DEFAULT_MAX_ENCODES, DEFAULT_MIN_QUALITY, DEFAULT_QUALITY_STEP, MIN_QUALITY_UNIT,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound on batch workers, limits decoded bitmaps held at once
pub const MAX_DEFAULT_WORKERS: usize = 4;

/// Configuration for the optimization pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Quality decrement per search iteration
    pub quality_step: f32,
    /// Default quality floor for aggressive mode
    pub min_quality: f32,
    /// Hard cap on encoder invocations per request
    pub max_encodes: usize,
    /// Number of parallel batch workers
    pub workers: usize,
    /// Lossy output format
    pub format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quality_step: DEFAULT_QUALITY_STEP,
            min_quality: DEFAULT_MIN_QUALITY,
            max_encodes: DEFAULT_MAX_ENCODES,
            workers: default_workers(),
            format: OutputFormat::Jpeg,
        }
    }
}

/// Available cores, capped at `MAX_DEFAULT_WORKERS`
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(MAX_DEFAULT_WORKERS)
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !(self.quality_step >= MIN_QUALITY_UNIT && self.quality_step <= 1.0) {
            return Err(anyhow::anyhow!(
                "Quality step must be between {} and 1.0",
                MIN_QUALITY_UNIT
            ));
        }

        if !(self.min_quality >= MIN_QUALITY_UNIT && self.min_quality <= 1.0) {
            return Err(anyhow::anyhow!(
                "Minimum quality must be between {} and 1.0",
                MIN_QUALITY_UNIT
            ));
        }

        if self.max_encodes == 0 {
            return Err(anyhow::anyhow!("Max encodes must be greater than 0"));
        }

        if self.workers == 0 {
            return Err(anyhow::anyhow!("Number of workers must be greater than 0"));
        }

        Ok(())
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
