//! # Dimension Planner
//!
//! Calcola le dimensioni di output da quelle sorgente e da un bounding box,
//! preservando l'aspect ratio. Non effettua mai upscaling.
//!
//! ## Algoritmo:
//! 1. `aspect = w / h`
//! 2. Se `w > max_w`: `out_w = max_w`, `out_h = round(out_w / aspect)`
//! 3. Poi, indipendentemente, se `out_h > max_h`: `out_h = max_h`, `out_w = round(out_h * aspect)`
//!
//! Il secondo clamp può solo ridurre ulteriormente, quindi anche con aspect
//! ratio estremi (1:50) entrambi i vincoli sono rispettati.

use crate::error::OptimizeError;
use serde::{Deserialize, Serialize};

/// Width/height pair in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixels(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn fits_within(&self, max_width: u32, max_height: u32) -> bool {
        self.width <= max_width && self.height <= max_height
    }
}

/// Plan output dimensions for a source inside a `max_width` x `max_height` box.
///
/// # Errors
/// `InvalidImageDimensions` if the source or the box has a zero side.
pub fn plan(
    source_width: u32,
    source_height: u32,
    max_width: u32,
    max_height: u32,
) -> Result<Dimensions, OptimizeError> {
    if source_width == 0 || source_height == 0 {
        return Err(OptimizeError::InvalidImageDimensions {
            width: source_width,
            height: source_height,
        });
    }
    if max_width == 0 || max_height == 0 {
        return Err(OptimizeError::InvalidImageDimensions {
            width: max_width,
            height: max_height,
        });
    }

    let aspect = source_width as f64 / source_height as f64;
    let mut width = source_width;
    let mut height = source_height;

    if width > max_width {
        width = max_width;
        height = round_px(width as f64 / aspect);
    }

    if height > max_height {
        height = max_height;
        width = round_px(height as f64 * aspect);
    }

    // Rounding can push the first side back over its bound only for
    // degenerate ratios; clamp keeps the box invariant.
    Ok(Dimensions::new(width.min(max_width), height.min(max_height)))
}

fn round_px(value: f64) -> u32 {
    (value.round() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landscape_width_bound() {
        // 3000x2000 into avatar box
        let dims = plan(3000, 2000, 400, 400).unwrap();
        assert_eq!(dims, Dimensions::new(400, 267));
        assert_eq!(dims.pixels(), 106_800);
    }

    #[test]
    fn test_portrait_height_bound() {
        let dims = plan(2000, 3000, 400, 400).unwrap();
        assert_eq!(dims, Dimensions::new(267, 400));
    }

    #[test]
    fn test_second_clamp_applies_after_first() {
        // 4000x3000 in a 1600x900 box: width clamp gives 1600x1200, then height clamp
        let dims = plan(4000, 3000, 1600, 900).unwrap();
        assert_eq!(dims, Dimensions::new(1200, 900));
    }

    #[test]
    fn test_no_upscaling() {
        let dims = plan(100, 100, 1200, 1200).unwrap();
        assert_eq!(dims, Dimensions::new(100, 100));

        let dims = plan(400, 400, 400, 400).unwrap();
        assert_eq!(dims, Dimensions::new(400, 400));
    }

    #[test]
    fn test_extreme_aspect_ratios() {
        let tall = plan(100, 5000, 400, 400).unwrap();
        assert!(tall.fits_within(400, 400));
        assert_eq!(tall, Dimensions::new(8, 400));

        let wide = plan(50_000, 10, 1600, 900).unwrap();
        assert!(wide.fits_within(1600, 900));
        assert_eq!(wide, Dimensions::new(1600, 1));
    }

    #[test]
    fn test_degenerate_source() {
        assert!(matches!(
            plan(0, 100, 400, 400),
            Err(OptimizeError::InvalidImageDimensions { width: 0, height: 100 })
        ));
        assert!(matches!(
            plan(100, 0, 400, 400),
            Err(OptimizeError::InvalidImageDimensions { .. })
        ));
        assert!(plan(100, 100, 0, 400).is_err());
    }

    #[test]
    fn test_bounds_and_ratio_over_grid() {
        let boxes = [(400, 400), (1200, 1200), (1400, 1050), (1600, 900), (1000, 750), (300, 300)];
        let sources = [
            (3000, 2000),
            (2000, 3000),
            (4032, 3024),
            (1080, 1920),
            (640, 480),
            (7, 3),
            (12000, 800),
            (333, 4999),
        ];

        for &(max_w, max_h) in &boxes {
            for &(src_w, src_h) in &sources {
                let dims = plan(src_w, src_h, max_w, max_h).unwrap();
                assert!(dims.fits_within(max_w, max_h), "{:?} in {}x{}", dims, max_w, max_h);
                assert!(dims.width >= 1 && dims.height >= 1);

                if src_w <= max_w && src_h <= max_h {
                    assert_eq!(dims, Dimensions::new(src_w, src_h));
                } else if dims.width > 1 && dims.height > 1 {
                    // Ratio error stays within one pixel on the derived side
                    let aspect = src_w as f64 / src_h as f64;
                    let expected_h = dims.width as f64 / aspect;
                    let expected_w = dims.height as f64 * aspect;
                    assert!(
                        (expected_h - dims.height as f64).abs() <= 1.0
                            || (expected_w - dims.width as f64).abs() <= 1.0,
                        "{}x{} -> {:?}",
                        src_w,
                        src_h,
                        dims
                    );
                }
            }
        }
    }
}
