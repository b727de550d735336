//! # Convergent Size Search
//!
//! Cuore della pipeline: ripete l'encode abbassando la qualità finché la
//! dimensione rientra nel target oppure si raggiunge il floor di qualità.
//!
//! ## Algoritmo:
//! 1. Encode a `q0`. Se `size <= target` oppure `q0 <= q_min` → fine (un solo encode)
//! 2. Altrimenti ripete: `q = max(q_min, q - step)`, encode, stop se `size <= target` o `q == q_min`
//! 3. Il numero di encode è al massimo `ceil((q0 - q_min) / step) + 1`; in più
//!    vale un limite rigido (`max_encodes`) nel caso di codec non monotoni
//! 4. Best effort: se anche `q_min` supera il target il risultato viene
//!    restituito comunque, con `target_met = false`
//!
//! ## Regole:
//! - Discesa lineare, mai binary search, mai risalita di qualità
//! - Cancellazione controllata una volta per iterazione, mai durante un encode
//! - La dimensione riportata è sempre la lunghezza binaria reale, anche se il
//!   codec fornisce una misura approssimata per guidare il loop

use crate::dimensions::Dimensions;
use crate::encoder::{EncodedCandidate, SinglePassEncoder};
use crate::error::OptimizeError;
use tokio::sync::broadcast;
use tracing::{debug, warn};

pub const DEFAULT_QUALITY_STEP: f32 = 0.1;
pub const DEFAULT_MIN_QUALITY: f32 = 0.25;
pub const DEFAULT_MAX_ENCODES: usize = 10;

/// Quality values are snapped to this grid so the floor is hit exactly
const QUALITY_GRID: f32 = 1000.0;

/// Smallest quality and step the grid can represent
pub const MIN_QUALITY_UNIT: f32 = 1.0 / QUALITY_GRID;

fn snap(quality: f32) -> f32 {
    (quality * QUALITY_GRID).round() / QUALITY_GRID
}

/// Parameters for one search run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    pub start_quality: f32,
    pub min_quality: f32,
    pub step: f32,
    pub target_size_bytes: u64,
    pub max_encodes: usize,
}

impl SearchParams {
    pub fn new(start_quality: f32, min_quality: f32, target_size_bytes: u64) -> Self {
        Self {
            start_quality,
            min_quality,
            step: DEFAULT_QUALITY_STEP,
            target_size_bytes,
            max_encodes: DEFAULT_MAX_ENCODES,
        }
    }

    pub fn with_step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }

    pub fn with_max_encodes(mut self, max_encodes: usize) -> Self {
        self.max_encodes = max_encodes;
        self
    }

    /// Effective floor: a floor above the start quality collapses onto it
    pub fn floor(&self) -> f32 {
        snap(self.min_quality.min(self.start_quality))
    }

    /// Upper bound on encoder invocations implied by the descent alone
    pub fn encode_bound(&self) -> usize {
        let span = snap(self.start_quality) - self.floor();
        if span <= 0.0 {
            return 1;
        }
        (span / self.step - 1e-4).ceil() as usize + 1
    }

    fn validate(&self) -> Result<(), OptimizeError> {
        if !(self.start_quality >= MIN_QUALITY_UNIT && self.start_quality <= 1.0) {
            return Err(OptimizeError::Validation(format!(
                "start quality must be in [{}, 1], got {}",
                MIN_QUALITY_UNIT, self.start_quality
            )));
        }
        if !(self.min_quality >= MIN_QUALITY_UNIT && self.min_quality <= 1.0) {
            return Err(OptimizeError::Validation(format!(
                "minimum quality must be in [{}, 1], got {}",
                MIN_QUALITY_UNIT, self.min_quality
            )));
        }
        // A step below the grid unit snaps back onto the same quality
        if !(self.step >= MIN_QUALITY_UNIT && self.step <= 1.0) {
            return Err(OptimizeError::Validation(format!(
                "quality step must be in [{}, 1], got {}",
                MIN_QUALITY_UNIT, self.step
            )));
        }
        if self.max_encodes == 0 {
            return Err(OptimizeError::Validation(
                "at least one encode must be allowed".to_string(),
            ));
        }
        Ok(())
    }
}

/// Accepted candidate plus search bookkeeping
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub candidate: EncodedCandidate,
    pub encodes: usize,
    pub target_met: bool,
}

/// Checks if a stop signal has been received
fn should_stop(stop: &mut Option<&mut broadcast::Receiver<()>>) -> bool {
    if let Some(receiver) = stop {
        match receiver.try_recv() {
            Ok(_) => {
                debug!("Stop signal received, cancelling size search");
                return true;
            }
            Err(broadcast::error::TryRecvError::Empty) => return false,
            Err(broadcast::error::TryRecvError::Lagged(_)) => {
                debug!("Stop signal was lagged, cancelling size search");
                return true;
            }
            Err(broadcast::error::TryRecvError::Closed) => return false,
        }
    }
    false
}

/// Run the linear quality descent for `source` at fixed `dims`.
///
/// # Errors
/// - `Validation` for out-of-range parameters
/// - Codec failures from any encode (the request is aborted, no retry)
/// - `Cancelled` if a stop signal arrives between encodes
pub fn search(
    encoder: &SinglePassEncoder<'_>,
    source: &[u8],
    dims: Dimensions,
    params: &SearchParams,
    mut stop: Option<&mut broadcast::Receiver<()>>,
) -> Result<SearchOutcome, OptimizeError> {
    params.validate()?;

    let floor = params.floor();
    let target = params.target_size_bytes;
    let mut quality = snap(params.start_quality);

    let mut candidate = encoder.encode(source, dims, quality)?;
    let mut encodes = 1;

    loop {
        if candidate.byte_size <= target || quality <= floor {
            break;
        }

        if encodes >= params.max_encodes {
            warn!(
                "Size search hit the cap of {} encodes at q={:.2} ({} bytes, target {})",
                params.max_encodes, quality, candidate.byte_size, target
            );
            break;
        }

        if should_stop(&mut stop) {
            return Err(OptimizeError::Cancelled);
        }

        quality = snap(quality - params.step).max(floor);
        debug!(
            "Candidate {} bytes over target {}, retrying at q={:.2}",
            candidate.byte_size, target, quality
        );

        candidate = encoder.encode(source, dims, quality)?;
        encodes += 1;
    }

    // Report the real binary size, never the steering estimate
    candidate.byte_size = candidate.binary_size();
    let target_met = candidate.byte_size <= target;

    if !target_met {
        warn!(
            "Best-effort result: {} bytes at q={:.2} exceeds target {} bytes",
            candidate.byte_size, candidate.quality_used, target
        );
    }

    Ok(SearchOutcome {
        candidate,
        encodes,
        target_met,
    })
}
