//! # Batch Optimization
//!
//! Applica la modalità single-pass (o aggressiva, con opzioni condivise) a più
//! sorgenti in modo indipendente.
//!
//! ## Concorrenza:
//! - Semaforo con `config.workers` permessi (default: core disponibili, max 4)
//!   per non tenere in memoria troppe bitmap decodificate insieme
//! - Ogni elemento gira su `spawn_blocking`: l'encode è CPU-bound
//! - I risultati tornano nello stesso ordine dell'input, indipendentemente
//!   dall'ordine di completamento
//! - Un errore (es. immagine corrotta) non interrompe gli altri elementi

use crate::error::OptimizeError;
use crate::optimizer::image_optimizer::ImageOptimizer;
use crate::optimizer::request::{AggressiveOptions, OptimizationRequest};
use crate::optimizer::result::OptimizationResult;
use crate::preset::UseCase;
use crate::source::SourceRef;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

impl ImageOptimizer {
    /// Single-pass optimize every source with the same preset
    pub async fn optimize_many(
        &self,
        sources: Vec<SourceRef>,
        use_case: UseCase,
    ) -> Vec<Result<OptimizationResult, OptimizeError>> {
        let requests = sources
            .into_iter()
            .map(|source| OptimizationRequest::preset(source, use_case))
            .collect();

        self.optimize_many_requests(requests).await
    }

    /// Single-pass optimize heterogeneous requests, results in input order
    pub async fn optimize_many_requests(
        &self,
        requests: Vec<OptimizationRequest>,
    ) -> Vec<Result<OptimizationResult, OptimizeError>> {
        self.run_batch(requests, |optimizer, request| optimizer.optimize(request))
            .await
    }

    /// Aggressive mode on every request with shared target options, results in input order
    pub async fn optimize_many_aggressive(
        &self,
        requests: Vec<OptimizationRequest>,
        options: AggressiveOptions,
    ) -> Vec<Result<OptimizationResult, OptimizeError>> {
        self.run_batch(requests, move |optimizer, request| {
            optimizer.optimize_aggressive(request, options)
        })
        .await
    }

    async fn run_batch<F>(
        &self,
        requests: Vec<OptimizationRequest>,
        run: F,
    ) -> Vec<Result<OptimizationResult, OptimizeError>>
    where
        F: Fn(&ImageOptimizer, &OptimizationRequest) -> Result<OptimizationResult, OptimizeError>
            + Copy
            + Send
            + 'static,
    {
        let total = requests.len();
        let workers = self.config().workers;
        let semaphore = Arc::new(Semaphore::new(workers));

        info!("Optimizing batch of {} images with {} workers", total, workers);

        let tasks = requests.into_iter().enumerate().map(|(index, request)| {
            let semaphore = semaphore.clone();
            let optimizer = self.clone();

            async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| OptimizeError::Worker(e.to_string()))?;

                debug!("Batch item {}/{}: {}", index + 1, total, request.source);

                tokio::task::spawn_blocking(move || run(&optimizer, &request))
                    .await
                    .map_err(|e| OptimizeError::Worker(e.to_string()))?
            }
        });

        let results = futures::future::join_all(tasks).await;

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            warn!("Batch finished with {} of {} items failed", failed, total);
        }

        results
    }
}
