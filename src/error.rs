//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore della pipeline di ottimizzazione.
//!
//! ## Responsabilità:
//! - Definisce `OptimizeError` enum per categorizzare tutti gli errori possibili
//! - Converte gli errori del codec (`CodecError`) nella tassonomia pubblica
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `InvalidImageDimensions`: Dimensioni sorgente o bounding box a zero
//! - `UnsupportedImageFormat` / `Decode`: Il codec non riesce a leggere la sorgente
//! - `Encode`: Il codec non produce output ad una data qualità
//! - `UnsupportedSource`: Riferimento sorgente non risolvibile (schema URI sconosciuto)
//! - `Io`: Errori di I/O durante la lettura della sorgente
//! - `Cancelled`: Ricerca interrotta tramite segnale di stop
//! - `Worker`: Un worker del batch è andato in panic
//! - `Validation`: Parametri di configurazione o qualità non validi
//!
//! Nessun errore viene ritentato internamente. Raggiungere il floor di qualità
//! senza rispettare il target NON è un errore: il risultato viene restituito
//! e il chiamante confronta `optimized_size_bytes` con il proprio budget.
//!
//! ## Esempio:
//! ```ignore
//! if width == 0 || height == 0 {
//!     return Err(OptimizeError::InvalidImageDimensions { width, height });
//! }
//! ```

use crate::codec::CodecError;

/// Custom error types for image optimization
#[derive(thiserror::Error, Debug)]
pub enum OptimizeError {
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidImageDimensions { width: u32, height: u32 },

    #[error("Unsupported image format: {0}")]
    UnsupportedImageFormat(String),

    #[error("Image decode error: {0}")]
    Decode(String),

    #[error("Image encode error: {0}")]
    Encode(String),

    #[error("Unsupported image source: {0}")]
    UnsupportedSource(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Optimization cancelled")]
    Cancelled,

    #[error("Batch worker failed: {0}")]
    Worker(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl OptimizeError {
    /// True when the codec could not read the source at all.
    ///
    /// Callers use this to fall back to the original, unoptimized bytes.
    pub fn is_unreadable_source(&self) -> bool {
        matches!(
            self,
            OptimizeError::UnsupportedImageFormat(_) | OptimizeError::Decode(_)
        )
    }
}

impl From<CodecError> for OptimizeError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Decode(msg) => OptimizeError::Decode(msg),
            CodecError::UnsupportedFormat(msg) => OptimizeError::UnsupportedImageFormat(msg),
            CodecError::Encode(msg) => OptimizeError::Encode(msg),
        }
    }
}
