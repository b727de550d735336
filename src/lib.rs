//! # Budget Image Optimizer Library
//!
//! Pipeline di compressione adattiva: ri-codifica un'immagine sorgente in modo
//! che rispetti un budget di byte, preservando una fedeltà visiva accettabile,
//! per una serie di preset d'uso (avatar, post community, tour, route cover,
//! route stop, thumbnail).
//!
//! ## Architettura dei moduli:
//! - `preset`: Registry statico dei casi d'uso e dei parametri di default
//! - `dimensions`: Planner delle dimensioni di output (aspect ratio, no upscaling)
//! - `codec`: Capability iniettabile di decode/resize/encode (`image` crate di default)
//! - `source`: Risoluzione dei riferimenti sorgente in byte
//! - `encoder`: Single-pass encoder (una chiamata al codec)
//! - `search`: Ricerca convergente della qualità sotto un target di byte
//! - `optimizer`: Facade pubblica (single-pass, aggressiva, per caso d'uso, batch)
//! - `config`: Configurazione della ricerca e del batch
//! - `error`: Tassonomia degli errori
//! - `file_manager`, `progress`, `json_output`: Utilità per i chiamanti (CLI)
//!
//! ## Utilizzo:
//! ```ignore
//! use budget_image_optimizer::{Config, ImageOptimizer, SourceRef};
//!
//! let optimizer = ImageOptimizer::new(Config::default())?;
//! let result = optimizer.optimize_avatar(SourceRef::path("photo.jpg"))?;
//! std::fs::write("avatar.jpg", &result.bytes)?;
//! ```

pub mod codec;
pub mod config;
pub mod dimensions;
pub mod encoder;
pub mod error;
pub mod file_manager;
pub mod json_output;
pub mod optimizer;
pub mod preset;
pub mod progress;
pub mod search;
pub mod source;

pub use codec::{ImageCodec, ImageCrateCodec, OutputFormat};
pub use config::Config;
pub use error::OptimizeError;
pub use optimizer::{AggressiveOptions, ImageOptimizer, OptimizationRequest, OptimizationResult};
pub use preset::{Preset, UseCase};
pub use source::{LocalSourceReader, SourceReader, SourceRef};
