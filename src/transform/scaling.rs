//! Kernel half-size sequence of the decomposition.
//!
//! Layer `j` (0-based) is computed with a kernel of size `2 s_j + 1`:
//! - dyadic: `s_j = 2^j` → sizes 3, 5, 9, 17, 33, ...
//! - linear with increment `d`: `s_j = d (j + 1)` → sizes 2d+1, 4d+1, ...
use serde::{Deserialize, Serialize};

/// Largest half-size whose kernel size `2 s + 1` still fits in `usize`.
///
/// Kernels are folded onto the image before use, so every half-size at or
/// beyond the image dimensions smooths the same way.
pub const MAX_HALF_SIZE: usize = (usize::MAX - 1) / 2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum ScalingSequence {
    #[default]
    Dyadic,
    Linear {
        increment: usize,
    },
}

impl ScalingSequence {
    /// `0` selects the dyadic sequence, any other value a linear one.
    pub fn from_increment(d: usize) -> Self {
        if d == 0 {
            ScalingSequence::Dyadic
        } else {
            ScalingSequence::Linear { increment: d }
        }
    }

    /// Distance between successive scales; `0` for the dyadic sequence.
    pub fn increment(self) -> usize {
        match self {
            ScalingSequence::Dyadic => 0,
            ScalingSequence::Linear { increment } => increment.max(1),
        }
    }

    /// Half-size `s_j`, saturating at [`MAX_HALF_SIZE`] for very deep
    /// transforms.
    pub fn half_size(self, j: usize) -> usize {
        let s = match self {
            ScalingSequence::Dyadic => u32::try_from(j)
                .ok()
                .and_then(|j| 1usize.checked_shl(j))
                .unwrap_or(MAX_HALF_SIZE),
            ScalingSequence::Linear { increment } => {
                increment.max(1).saturating_mul(j.saturating_add(1))
            }
        };
        s.min(MAX_HALF_SIZE)
    }

    /// Odd kernel size `2 s_j + 1` used for layer `j`.
    pub fn filter_size(self, j: usize) -> usize {
        1 + 2 * self.half_size(j)
    }

    pub fn half_sizes(self, layers: usize) -> Vec<usize> {
        (0..layers).map(|j| self.half_size(j)).collect()
    }
}
