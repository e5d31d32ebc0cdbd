//! Low-pass convolution of working planes and the choice between the direct
//! separable path and the FFT path.
//!
//! Both strategies use the same symmetric mirror border (`f[-1-i] = f[i]`,
//! repeated periodically for kernels wider than the image), so they agree to
//! within floating-point rounding. The selector is purely a cost decision.
//!
//! Horizontal and vertical factors are passed separately: callers fold a
//! kernel onto the mirror period of each axis (see
//! [`FilterFamily::folded`](crate::kernel::FilterFamily::folded)), which
//! gives the two axes different radii on non-square images.

pub mod fft;
pub mod separable;

use crate::error::Result;
use crate::image::{ImageF32, ImageView};
use crate::kernel::SeparableFilter;
use crate::parallel::{ParallelDriver, StatusMonitor};
use serde::{Deserialize, Serialize};

pub use fft::convolve_fft;
pub use separable::convolve_separable;

/// Kernel size from which the FFT path is assumed to be cheaper.
///
/// Break-even depends on the machine and the thread count; override it with
/// [`ConvolutionOptions::fft_threshold`] after benchmarking.
pub const DEFAULT_FFT_THRESHOLD: usize = 49;

/// Index into `[0, n)` after symmetric mirror extension of an arbitrary
/// offset.
#[inline]
pub fn mirror_index(i: isize, n: usize) -> usize {
    debug_assert!(n > 0);
    let n = n as isize;
    let period = 2 * n;
    let m = i.rem_euclid(period);
    (if m >= n { period - 1 - m } else { m }) as usize
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConvolutionStrategy {
    Separable,
    Fft,
}

/// Caller preference for the convolution strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StrategyChoice {
    #[default]
    Auto,
    Separable,
    Fft,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConvolutionOptions {
    /// Kernel size above which `Auto` switches to the FFT path.
    pub fft_threshold: usize,
    pub strategy: StrategyChoice,
    /// Smallest band of rows worth handing to a separate worker.
    pub min_rows_per_worker: usize,
}

impl Default for ConvolutionOptions {
    fn default() -> Self {
        Self {
            fft_threshold: DEFAULT_FFT_THRESHOLD,
            strategy: StrategyChoice::Auto,
            min_rows_per_worker: crate::parallel::DEFAULT_MIN_ROWS_PER_WORKER,
        }
    }
}

impl ConvolutionStrategy {
    /// Pick the strategy for a kernel of size `n` on a `w × h` plane.
    ///
    /// `Auto` uses the FFT when `n` exceeds the threshold or when the image
    /// is narrower or shorter than the kernel.
    pub fn select(n: usize, w: usize, h: usize, options: &ConvolutionOptions) -> Self {
        match options.strategy {
            StrategyChoice::Separable => ConvolutionStrategy::Separable,
            StrategyChoice::Fft => ConvolutionStrategy::Fft,
            StrategyChoice::Auto => {
                if n > options.fft_threshold || w < n || h < n {
                    ConvolutionStrategy::Fft
                } else {
                    ConvolutionStrategy::Separable
                }
            }
        }
    }

    /// Progress steps one pass of this strategy reports for a `w × h` plane
    /// and kernels of radius `rx` (along rows) and `ry` (along columns).
    pub fn progress_steps(self, w: usize, h: usize, rx: usize, ry: usize) -> u64 {
        match self {
            ConvolutionStrategy::Separable => 2 * h as u64,
            ConvolutionStrategy::Fft => fft::progress_steps(w, h, rx, ry),
        }
    }
}

/// Low-pass `src` with `horizontal` along rows and `vertical` along columns
/// using `strategy`.
///
/// `Ok(None)` means the monitor requested cancellation during the pass.
pub fn convolve(
    src: &ImageF32,
    horizontal: &dyn SeparableFilter,
    vertical: &dyn SeparableFilter,
    strategy: ConvolutionStrategy,
    driver: &ParallelDriver,
    monitor: &dyn StatusMonitor,
) -> Result<Option<ImageF32>> {
    if src.is_empty() {
        return Ok(Some(ImageF32::new(src.w, src.h)));
    }
    match strategy {
        ConvolutionStrategy::Separable => convolve_separable(src, horizontal, vertical, driver, monitor),
        ConvolutionStrategy::Fft => convolve_fft(src, horizontal, vertical, driver, monitor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_index_reflects_about_the_edges() {
        let got: Vec<usize> = (-4..8).map(|i| mirror_index(i, 4)).collect();
        assert_eq!(got, vec![3, 2, 1, 0, 0, 1, 2, 3, 3, 2, 1, 0]);
        assert_eq!(mirror_index(-9, 1), 0);
        assert_eq!(mirror_index(11, 3), 0);
    }

    #[test]
    fn auto_selection_follows_threshold_and_image_size() {
        let opts = ConvolutionOptions {
            fft_threshold: 33,
            ..Default::default()
        };
        assert_eq!(
            ConvolutionStrategy::select(9, 256, 256, &opts),
            ConvolutionStrategy::Separable
        );
        assert_eq!(
            ConvolutionStrategy::select(33, 256, 256, &opts),
            ConvolutionStrategy::Separable
        );
        assert_eq!(
            ConvolutionStrategy::select(65, 256, 256, &opts),
            ConvolutionStrategy::Fft
        );
        assert_eq!(
            ConvolutionStrategy::select(17, 256, 12, &opts),
            ConvolutionStrategy::Fft
        );
    }

    #[test]
    fn explicit_choice_overrides_auto() {
        let opts = ConvolutionOptions {
            strategy: StrategyChoice::Separable,
            ..Default::default()
        };
        assert_eq!(
            ConvolutionStrategy::select(129, 8, 8, &opts),
            ConvolutionStrategy::Separable
        );
    }
}
