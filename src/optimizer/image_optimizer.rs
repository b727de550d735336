//! # Image Optimizer Facade
//!
//! Entry point pubblici della pipeline.
//!
//! ## Modalità:
//! - **Single-pass** (`optimize`): preset → planner → un solo encode
//! - **Aggressiva** (`optimize_aggressive`): preset → planner → ricerca convergente
//!   verso un target di byte con floor di qualità
//! - **Per caso d'uso** (`optimize_avatar`, `optimize_tour`, ...): modalità
//!   aggressiva con il budget di default del preset
//! - **Batch** (`optimize_many`, vedi `batch`): single-pass indipendente per ogni
//!   elemento, concorrenza limitata
//!
//! ## Side effect:
//! Nessuno oltre alle chiamate al codec e al reader iniettati. Il fallback ai
//! byte originali in caso di errore di decode è una policy del chiamante.

use crate::codec::{ImageCodec, ImageCrateCodec};
use crate::config::Config;
use crate::dimensions::{self, Dimensions};
use crate::encoder::{EncodedCandidate, SinglePassEncoder};
use crate::error::OptimizeError;
use crate::file_manager::FileManager;
use crate::optimizer::request::{AggressiveOptions, OptimizationRequest};
use crate::optimizer::result::{compression_ratio_percent, OptimizationResult};
use crate::preset::{Preset, UseCase};
use crate::search::{self, SearchParams};
use crate::source::{LocalSourceReader, SourceBytes, SourceReader, SourceRef};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Source bytes with their planned output geometry
struct Prepared {
    source: SourceBytes,
    preset: Preset,
    source_dims: Dimensions,
    dims: Dimensions,
}

/// Public facade over presets, planner, encoder and size search.
///
/// Cheap to clone: the codec and reader are shared behind `Arc`.
#[derive(Clone)]
pub struct ImageOptimizer {
    config: Config,
    codec: Arc<dyn ImageCodec>,
    reader: Arc<dyn SourceReader>,
}

impl ImageOptimizer {
    /// Optimizer backed by the `image` crate and local source reading
    pub fn new(config: Config) -> Result<Self> {
        Self::with_capabilities(config, Arc::new(ImageCrateCodec::new()), Arc::new(LocalSourceReader))
    }

    /// Optimizer with injected codec and source reader
    pub fn with_capabilities(
        config: Config,
        codec: Arc<dyn ImageCodec>,
        reader: Arc<dyn SourceReader>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            codec,
            reader,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Single-pass mode: exactly one encode at the preset's start quality
    pub fn optimize(&self, request: &OptimizationRequest) -> Result<OptimizationResult, OptimizeError> {
        let prepared = self.prepare(request)?;
        let encoder = SinglePassEncoder::new(self.codec.as_ref(), prepared.preset.format);

        let candidate = encoder.encode(
            &prepared.source.bytes,
            prepared.dims,
            prepared.preset.start_quality,
        )?;

        Ok(self.finish(request, &prepared, candidate, 1, None))
    }

    /// Aggressive mode: linear quality descent towards `options.target_size_bytes`
    pub fn optimize_aggressive(
        &self,
        request: &OptimizationRequest,
        options: AggressiveOptions,
    ) -> Result<OptimizationResult, OptimizeError> {
        self.run_aggressive(request, options, None)
    }

    /// Aggressive mode that stops between encodes when `stop` fires
    pub fn optimize_aggressive_cancellable(
        &self,
        request: &OptimizationRequest,
        options: AggressiveOptions,
        stop: &mut broadcast::Receiver<()>,
    ) -> Result<OptimizationResult, OptimizeError> {
        self.run_aggressive(request, options, Some(stop))
    }

    /// Use-case default: aggressive with the preset budget, single-pass without one
    pub fn optimize_for(
        &self,
        source: impl Into<SourceRef>,
        use_case: UseCase,
    ) -> Result<OptimizationResult, OptimizeError> {
        let request = OptimizationRequest::preset(source, use_case);
        match use_case.target_size_bytes() {
            Some(target) => self.optimize_aggressive(&request, AggressiveOptions::new(target)),
            None => self.optimize(&request),
        }
    }

    /// Avatar, 100 KB budget
    pub fn optimize_avatar(&self, source: impl Into<SourceRef>) -> Result<OptimizationResult, OptimizeError> {
        self.optimize_for(source, UseCase::Avatar)
    }

    /// Community post, 250 KB budget
    pub fn optimize_community(&self, source: impl Into<SourceRef>) -> Result<OptimizationResult, OptimizeError> {
        self.optimize_for(source, UseCase::Community)
    }

    /// Tour listing, 350 KB budget
    pub fn optimize_tour(&self, source: impl Into<SourceRef>) -> Result<OptimizationResult, OptimizeError> {
        self.optimize_for(source, UseCase::Tour)
    }

    /// Route cover, 400 KB budget
    pub fn optimize_route_cover(&self, source: impl Into<SourceRef>) -> Result<OptimizationResult, OptimizeError> {
        self.optimize_for(source, UseCase::RouteCover)
    }

    /// Route stop, 250 KB budget
    pub fn optimize_route_stop(&self, source: impl Into<SourceRef>) -> Result<OptimizationResult, OptimizeError> {
        self.optimize_for(source, UseCase::RouteStop)
    }

    pub fn optimize_thumbnail(&self, source: impl Into<SourceRef>) -> Result<OptimizationResult, OptimizeError> {
        self.optimize_for(source, UseCase::Thumbnail)
    }

    /// Quick pre-check: true when the source is larger than `threshold_bytes`
    pub fn should_optimize(&self, source: &SourceRef, threshold_bytes: u64) -> Result<bool, OptimizeError> {
        let size = match self.reader.size_hint(source)? {
            Some(size) => size,
            None => self.reader.read(source)?.original_size(),
        };
        debug!("Size pre-check for {}: {} bytes (threshold {})", source, size, threshold_bytes);
        Ok(size > threshold_bytes)
    }

    fn run_aggressive(
        &self,
        request: &OptimizationRequest,
        options: AggressiveOptions,
        stop: Option<&mut broadcast::Receiver<()>>,
    ) -> Result<OptimizationResult, OptimizeError> {
        let prepared = self.prepare(request)?;
        let encoder = SinglePassEncoder::new(self.codec.as_ref(), prepared.preset.format);

        let params = SearchParams::new(
            prepared.preset.start_quality,
            options.min_quality.unwrap_or(self.config.min_quality),
            options.target_size_bytes,
        )
        .with_step(self.config.quality_step)
        .with_max_encodes(self.config.max_encodes);

        let outcome = search::search(&encoder, &prepared.source.bytes, prepared.dims, &params, stop)?;

        Ok(self.finish(
            request,
            &prepared,
            outcome.candidate,
            outcome.encodes,
            Some(options.target_size_bytes),
        ))
    }

    fn prepare(&self, request: &OptimizationRequest) -> Result<Prepared, OptimizeError> {
        let preset = request.resolve(self.config.format)?;
        let source = self.reader.read(&request.source)?;

        let (width, height) = self.codec.decode_dimensions(&source.bytes)?;
        let dims = dimensions::plan(width, height, preset.max_width, preset.max_height)?;

        debug!(
            "Planned {} -> {}x{} (source {}x{}, box {}x{})",
            request.source, dims.width, dims.height, width, height, preset.max_width, preset.max_height
        );

        Ok(Prepared {
            source,
            preset,
            source_dims: Dimensions::new(width, height),
            dims,
        })
    }

    fn finish(
        &self,
        request: &OptimizationRequest,
        prepared: &Prepared,
        candidate: EncodedCandidate,
        encodes: usize,
        target_size_bytes: Option<u64>,
    ) -> OptimizationResult {
        let original_size_bytes = prepared.source.original_size();
        let optimized_size_bytes = candidate.binary_size();
        let compression_ratio_percent = compression_ratio_percent(original_size_bytes, optimized_size_bytes);

        info!(
            "Optimized {}: {}x{} -> {}x{}, {} -> {} ({}%), q={:.2}, {} encode(s)",
            request.source,
            prepared.source_dims.width,
            prepared.source_dims.height,
            candidate.width,
            candidate.height,
            FileManager::format_size(original_size_bytes),
            FileManager::format_size(optimized_size_bytes),
            compression_ratio_percent,
            candidate.quality_used,
            encodes
        );

        OptimizationResult {
            width: candidate.width,
            height: candidate.height,
            original_size_bytes,
            optimized_size_bytes,
            compression_ratio_percent,
            quality_used: candidate.quality_used,
            encodes,
            target_size_bytes,
            format: prepared.preset.format,
            bytes: candidate.bytes,
        }
    }
}
