//! # Budget Optimizer - Main Entry Point
//!
//! Chiamante di esempio della libreria: legge immagini da disco, le ottimizza
//! per un preset e scrive i risultati in una directory di output.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Persistenza dei risultati (la libreria non scrive mai su disco)
//! - Fallback ai byte originali quando il codec non legge la sorgente
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (input, preset, target, output, workers, etc.)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Carica la configurazione e trova le immagini in input
//! 4. Copia invariati i file sotto soglia, ottimizza gli altri
//! 5. Scrive output, fallback e statistiche finali
//!
//! ## Esempio di utilizzo:
//! ```bash
//! budget-optimizer ./photos --preset avatar --output ./out --verbose
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use budget_image_optimizer::file_manager::FileManager;
use budget_image_optimizer::json_output::JsonMessage;
use budget_image_optimizer::progress::{OptimizationStats, ProgressManager};
use budget_image_optimizer::{
    AggressiveOptions, Config, ImageOptimizer, OptimizationRequest, OptimizationResult,
    OptimizeError, SourceRef, UseCase,
};

#[derive(Parser)]
#[command(name = "budget-optimizer")]
#[command(about = "Re-encode images under a per-preset byte budget")]
struct Args {
    /// Image file or directory containing images
    input: PathBuf,

    /// Output directory for optimized files
    #[arg(short, long)]
    output: PathBuf,

    /// Usage preset (avatar, community, tour, route-cover, route-stop, thumbnail)
    #[arg(short, long, default_value = "community")]
    preset: UseCase,

    /// Target size in KB (defaults to the preset budget)
    #[arg(short, long)]
    target_kb: Option<u64>,

    /// Quality floor for the size search (0-1)
    #[arg(long)]
    min_quality: Option<f32>,

    /// Encode once at the preset quality, no size search
    #[arg(long)]
    single_pass: bool,

    /// Copy files at or below this size (KB) unchanged
    #[arg(long)]
    threshold_kb: Option<u64>,

    /// Number of parallel workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output progress and results as JSON lines
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Where results go and how they are reported
struct Sink<'a> {
    base_dir: &'a Path,
    output_dir: &'a Path,
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; JSON mode keeps stdout for messages
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&args).await {
        if args.json {
            JsonMessage::error(format!("{:#}", e)).emit();
        }
        return Err(e);
    }

    Ok(())
}

async fn run(args: &Args) -> Result<()> {
    let start_time = Instant::now();

    // Validate arguments
    if !args.input.exists() {
        return Err(anyhow::anyhow!("Input does not exist: {}", args.input.display()));
    }

    let mut config = match args.config {
        Some(ref path) => Config::from_file(path).await?,
        None => Config::default(),
    };
    if let Some(workers) = args.workers {
        config.workers = workers;
    }

    if !args.output.exists() {
        tokio::fs::create_dir_all(&args.output).await?;
        info!("Created output directory: {}", args.output.display());
    }
    if !args.output.is_dir() {
        return Err(anyhow::anyhow!("Output path is not a directory: {}", args.output.display()));
    }

    let (files, base_dir) = if args.input.is_dir() {
        (FileManager::find_images(&args.input)?, args.input.clone())
    } else {
        let parent = args.input.parent().map(Path::to_path_buf).unwrap_or_default();
        (vec![args.input.clone()], parent)
    };

    let target = if args.single_pass {
        None
    } else {
        args.target_kb
            .map(|kb| kb * 1024)
            .or_else(|| args.preset.target_size_bytes())
    };

    if args.json {
        JsonMessage::Start {
            input: args.input.clone(),
            output_dir: args.output.clone(),
            total_files: files.len(),
            preset: args.preset,
            target_size_bytes: target,
        }
        .emit();
    } else {
        info!("Found {} images, preset: {}", files.len(), args.preset);
        match target {
            Some(bytes) => info!("Mode: target size {}", FileManager::format_size(bytes)),
            None => info!("Mode: single pass"),
        }
    }

    let optimizer = ImageOptimizer::new(config)?;
    let progress = if args.json {
        ProgressManager::hidden()
    } else {
        ProgressManager::new(files.len() as u64)
    };
    let sink = Sink {
        base_dir: &base_dir,
        output_dir: &args.output,
        json: args.json,
    };
    let mut stats = OptimizationStats::new();

    let mut to_optimize = Vec::with_capacity(files.len());
    for file in files {
        if let Some(kb) = args.threshold_kb {
            let source = SourceRef::from(file.clone());
            match optimizer.should_optimize(&source, kb * 1024) {
                Ok(true) => {}
                Ok(false) => {
                    let size = tokio::fs::metadata(&file).await?.len();
                    let output =
                        FileManager::copy_original(&file, sink.base_dir, sink.output_dir).await?;
                    if sink.json {
                        JsonMessage::skipped(file.clone(), output).emit();
                    }
                    stats.add_skipped(size);
                    progress.update(&display_name(&file));
                    continue;
                }
                Err(e) => warn!("Size pre-check failed for {}: {}", file.display(), e),
            }
        }
        to_optimize.push(file);
    }

    let results = match target {
        None => {
            let sources = to_optimize.iter().cloned().map(SourceRef::from).collect();
            optimizer.optimize_many(sources, args.preset).await
        }
        Some(target_size_bytes) => {
            let options = AggressiveOptions {
                target_size_bytes,
                min_quality: args.min_quality,
            };
            let requests = to_optimize
                .iter()
                .map(|file| OptimizationRequest::preset(file.clone(), args.preset))
                .collect();
            optimizer.optimize_many_aggressive(requests, options).await
        }
    };

    for (file, result) in to_optimize.iter().zip(results) {
        persist(file, result, &sink, &mut stats).await?;
        progress.update(&display_name(file));
    }

    progress.finish(&stats.format_summary());

    if args.json {
        JsonMessage::complete(&stats, start_time.elapsed().as_secs_f64()).emit();
    } else {
        info!("=== Optimization Complete ===");
        info!("{}", stats.format_summary());
        info!("Duration: {:.2}s", start_time.elapsed().as_secs_f64());
    }

    Ok(())
}

/// Write one result, falling back to the original bytes for unreadable sources
async fn persist(
    file: &Path,
    result: Result<OptimizationResult, OptimizeError>,
    sink: &Sink<'_>,
    stats: &mut OptimizationStats,
) -> Result<()> {
    match result {
        Ok(result) => {
            let output = FileManager::output_path(file, sink.base_dir, sink.output_dir, result.format);
            if let Some(parent) = output.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&output, &result.bytes).await?;

            if !result.met_target() {
                warn!(
                    "{} is over budget: {} (quality floor reached)",
                    file.display(),
                    FileManager::format_size(result.optimized_size_bytes)
                );
            }
            if sink.json {
                JsonMessage::optimized(file.to_path_buf(), output, &result).emit();
            }
            stats.add_optimized(&result);
        }
        Err(e) if e.is_unreadable_source() => {
            let size = tokio::fs::metadata(file).await?.len();
            let output =
                FileManager::copy_original(file, sink.base_dir, sink.output_dir).await?;
            warn!("Keeping original for {}: {}", file.display(), e);
            if sink.json {
                JsonMessage::fallback(file.to_path_buf(), output, e.to_string()).emit();
            }
            stats.add_fallback(size);
        }
        Err(e) => {
            error!("Failed to optimize {}: {}", file.display(), e);
            if sink.json {
                JsonMessage::failed(file.to_path_buf(), e.to_string()).emit();
            }
            stats.add_error();
        }
    }

    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name().unwrap_or_default().to_string_lossy().to_string()
}
