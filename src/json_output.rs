//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per uso programmatico.
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio del run (input, preset, budget)
//! - `file_complete`: Fine elaborazione di un file (risultato, fallback o errore)
//! - `complete`: Fine run con statistiche finali
//! - `error`: Errore generale

use crate::optimizer::OptimizationResult;
use crate::preset::UseCase;
use crate::progress::OptimizationStats;
use serde::Serialize;
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    /// Inizio del run
    Start {
        input: PathBuf,
        output_dir: PathBuf,
        total_files: usize,
        preset: UseCase,
        target_size_bytes: Option<u64>,
    },

    /// Fine elaborazione di un file specifico
    FileComplete {
        path: PathBuf,
        output: Option<PathBuf>,
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<OptimizationResult>,
        met_target: Option<bool>,
        fallback: bool,
        skipped: bool,
        error: Option<String>,
    },

    /// Run completato
    Complete {
        files_processed: usize,
        files_optimized: usize,
        targets_missed: usize,
        files_fallback: usize,
        files_skipped: usize,
        errors: usize,
        total_bytes_saved: u64,
        average_reduction: f64,
        duration_seconds: f64,
    },

    /// Errore generale
    Error { message: String },
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    /// Risultato ottimizzato scritto in `output`
    pub fn optimized(path: PathBuf, output: PathBuf, result: &OptimizationResult) -> Self {
        Self::FileComplete {
            path,
            output: Some(output),
            met_target: Some(result.met_target()),
            result: Some(result.clone()),
            fallback: false,
            skipped: false,
            error: None,
        }
    }

    /// Originale copiato invariato perché il codec non lo legge
    pub fn fallback(path: PathBuf, output: PathBuf, error: String) -> Self {
        Self::FileComplete {
            path,
            output: Some(output),
            result: None,
            met_target: None,
            fallback: true,
            skipped: false,
            error: Some(error),
        }
    }

    /// Sotto soglia, copiato invariato
    pub fn skipped(path: PathBuf, output: PathBuf) -> Self {
        Self::FileComplete {
            path,
            output: Some(output),
            result: None,
            met_target: None,
            fallback: false,
            skipped: true,
            error: None,
        }
    }

    pub fn failed(path: PathBuf, error: String) -> Self {
        Self::FileComplete {
            path,
            output: None,
            result: None,
            met_target: None,
            fallback: false,
            skipped: false,
            error: Some(error),
        }
    }

    /// Crea un messaggio di completamento generale
    pub fn complete(stats: &OptimizationStats, duration_seconds: f64) -> Self {
        Self::Complete {
            files_processed: stats.files_processed,
            files_optimized: stats.files_optimized,
            targets_missed: stats.targets_missed,
            files_fallback: stats.files_fallback,
            files_skipped: stats.files_skipped,
            errors: stats.errors,
            total_bytes_saved: stats.total_bytes_saved,
            average_reduction: stats.overall_reduction_percent(),
            duration_seconds,
        }
    }

    /// Crea un messaggio di errore
    pub fn error(message: String) -> Self {
        Self::Error { message }
    }
}
