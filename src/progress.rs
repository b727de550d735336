//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche lato chiamante.
//!
//! ## Responsabilità:
//! - Progress bar visual con `indicatif` per feedback real-time
//! - Tracking statistiche di ottimizzazione (ottimizzati, fallback, skip, errori)
//! - Calcolo percentuali di riduzione e byte risparmiati
//!
//! ## Statistiche tracciate:
//! - **files_processed**: Totale file elaborati
//! - **files_optimized**: File ri-codificati con successo
//! - **targets_missed**: Risultati best-effort sopra il budget
//! - **files_fallback**: File illeggibili dal codec, copiati invariati
//! - **files_skipped**: File sotto la soglia, non ottimizzati
//! - **errors**: Numero di errori durante processing
//!
//! ## Esempio:
//! ```ignore
//! let progress = ProgressManager::new(total_files);
//! let mut stats = OptimizationStats::new();
//!
//! stats.add_optimized(&result);
//! progress.update("avatar.jpg");
//!
//! progress.finish(&stats.format_summary());
//! ```

use crate::file_manager::FileManager;
use crate::optimizer::OptimizationResult;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages progress reporting for a run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Progress manager that draws nothing (JSON mode)
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Statistics tracker for optimization results
#[derive(Debug, Default)]
pub struct OptimizationStats {
    pub files_processed: usize,
    pub files_optimized: usize,
    pub targets_missed: usize,
    pub files_fallback: usize,
    pub files_skipped: usize,
    pub total_bytes_saved: u64,
    pub total_original_size: u64,
    pub errors: usize,
}

impl OptimizationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_optimized(&mut self, result: &OptimizationResult) {
        self.files_processed += 1;
        self.files_optimized += 1;
        if !result.met_target() {
            self.targets_missed += 1;
        }
        self.total_original_size += result.original_size_bytes;
        self.total_bytes_saved += result.bytes_saved();
    }

    pub fn add_fallback(&mut self, original_size: u64) {
        self.files_processed += 1;
        self.files_fallback += 1;
        self.total_original_size += original_size;
    }

    pub fn add_skipped(&mut self, original_size: u64) {
        self.files_processed += 1;
        self.files_skipped += 1;
        self.total_original_size += original_size;
    }

    pub fn add_error(&mut self) {
        self.files_processed += 1;
        self.errors += 1;
    }

    pub fn overall_reduction_percent(&self) -> f64 {
        if self.total_original_size > 0 {
            (self.total_bytes_saved as f64 / self.total_original_size as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} files | Optimized: {} (over budget: {}) | Fallback: {} | Skipped: {} | Errors: {} | Total saved: {} ({:.2}%)",
            self.files_processed,
            self.files_optimized,
            self.targets_missed,
            self.files_fallback,
            self.files_skipped,
            self.errors,
            FileManager::format_size(self.total_bytes_saved),
            self.overall_reduction_percent()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::OutputFormat;

    fn result(original: u64, optimized: u64, target: Option<u64>) -> OptimizationResult {
        OptimizationResult {
            bytes: Vec::new(),
            width: 1,
            height: 1,
            original_size_bytes: original,
            optimized_size_bytes: optimized,
            compression_ratio_percent: crate::optimizer::compression_ratio_percent(original, optimized),
            quality_used: 0.5,
            encodes: 1,
            target_size_bytes: target,
            format: OutputFormat::Jpeg,
        }
    }

    #[test]
    fn test_stats_accumulate() {
        let mut stats = OptimizationStats::new();
        stats.add_optimized(&result(1000, 250, Some(300)));
        stats.add_optimized(&result(1000, 750, Some(500)));
        stats.add_fallback(500);
        stats.add_skipped(500);
        stats.add_error();

        assert_eq!(stats.files_processed, 5);
        assert_eq!(stats.files_optimized, 2);
        assert_eq!(stats.targets_missed, 1);
        assert_eq!(stats.files_fallback, 1);
        assert_eq!(stats.files_skipped, 1);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.total_original_size, 3000);
        assert_eq!(stats.total_bytes_saved, 1000);
        assert!((stats.overall_reduction_percent() - 33.333).abs() < 0.01);
    }

    #[test]
    fn test_growth_does_not_count_as_savings() {
        let mut stats = OptimizationStats::new();
        stats.add_optimized(&result(100, 150, None));
        assert_eq!(stats.total_bytes_saved, 0);
        assert!(stats.format_summary().contains("Optimized: 1"));
    }
}
