//! # File Management Module
//!
//! Utilità sui file per i chiamanti della pipeline (es. il binario CLI).
//! La libreria non scrive mai su disco: la persistenza è responsabilità del chiamante.
//!
//! ## Responsabilità:
//! - Discovery ricorsiva di immagini in directory
//! - Determinazione formato file dall'estensione
//! - Calcolo del path di output preservando la struttura delle directory
//! - Copia dei file originali invariati (mai su se stessi)
//! - Formattazione human-readable delle dimensioni
//!
//! ## Formati riconosciuti in input:
//! - **Immagini**: JPG, JPEG, PNG, WebP
//!
//! ## Esempio:
//! ```ignore
//! let files = FileManager::find_images("/path/to/photos")?;
//! for file in files {
//!     let out = FileManager::output_path(&file, base, output_dir, OutputFormat::Jpeg);
//! }
//! ```

use crate::codec::OutputFormat;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Manages file discovery and naming for callers
pub struct FileManager;

impl FileManager {
    /// Find all supported images in a directory, sorted for stable batch order
    pub fn find_images(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|path| Self::is_image(path))
            .collect();

        files.sort();
        Ok(files)
    }

    /// Check if a file is an image
    pub fn is_image(path: &Path) -> bool {
        if let Some(ext) = path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            matches!(ext_lower.as_str(), "jpg" | "jpeg" | "png" | "webp")
        } else {
            false
        }
    }

    /// Output path for `input`, mirroring its position under `input_base_dir`
    ///
    /// `/src/photos/2023/img.png` with base `/src/photos` → `<output_dir>/2023/img.jpg`
    pub fn output_path(
        input: &Path,
        input_base_dir: &Path,
        output_dir: &Path,
        format: OutputFormat,
    ) -> PathBuf {
        let stem = input.file_stem().unwrap_or_default();
        let filename = format!("{}.{}", stem.to_string_lossy(), format.extension());

        let relative_path = input
            .strip_prefix(input_base_dir)
            .ok()
            .and_then(|p| p.parent())
            .unwrap_or(Path::new(""));

        output_dir.join(relative_path).join(filename)
    }

    /// Copy `input` unchanged into `output_dir`, keeping its name and relative position.
    ///
    /// When the destination resolves to `input` itself the file is left untouched:
    /// copying a file onto itself truncates it.
    pub async fn copy_original(
        input: &Path,
        input_base_dir: &Path,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let relative = match input.strip_prefix(input_base_dir) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => PathBuf::from(input.file_name().unwrap_or_default()),
        };
        let output = output_dir.join(relative);

        if Self::is_same_file(input, &output).await {
            debug!("Output is the input itself, keeping {}", input.display());
            return Ok(output);
        }

        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(input, &output).await?;
        Ok(output)
    }

    /// True when both paths exist and resolve to the same file
    pub async fn is_same_file(a: &Path, b: &Path) -> bool {
        match (tokio::fs::canonicalize(a).await, tokio::fs::canonicalize(b).await) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }
}
