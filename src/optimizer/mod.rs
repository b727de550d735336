//! # Optimizer Module
//!
//! Facade pubblica della pipeline, separata in sottomoduli:
//! - `image_optimizer`: Entry point single-pass, aggressivo e per caso d'uso
//! - `batch`: Ottimizzazione di più sorgenti con concorrenza limitata
//! - `request`: Valori di input (preset o override, opzioni target)
//! - `result`: Valore di output e metriche di compressione

pub mod batch;
pub mod image_optimizer;
pub mod request;
pub mod result;

pub use image_optimizer::ImageOptimizer;
pub use request::{AggressiveOptions, OptimizationRequest, Sizing};
pub use result::{compression_ratio_percent, OptimizationResult};
