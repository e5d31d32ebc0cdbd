//! Smoothing kernels used by the decomposition.
//!
//! Kernels are generated fresh for each scale from a [`FilterFamily`] and a
//! requested odd size `n = 2s + 1`. Both families are circularly symmetric
//! and separable, so every kernel can be applied as a pair of 1-D passes.
//!
//! Size policy: requests below 3 become 3, even requests round up to the next
//! odd size. This is a silent correction, not an error.
//!
//! A signal of length `len` under symmetric mirror extension is periodic with
//! period `2 len`, so a kernel wider than that period can be folded onto it
//! without changing the result. [`FilterFamily::folded`] does this and never
//! materialises more than `2 len + 1` taps, whatever the nominal size.

pub mod filters;

use serde::{Deserialize, Serialize};

pub use filters::{KernelFilter, SeparableFilter, SeparableKernel};

/// Default truncation error of the Gaussian family.
pub const DEFAULT_GAUSSIAN_EPSILON: f32 = 0.01;

fn default_epsilon() -> f32 {
    DEFAULT_GAUSSIAN_EPSILON
}

/// Closed set of smoothing filter families.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FilterFamily {
    /// Gaussian truncated at `n` taps; `epsilon` is the relative value of the
    /// outermost tap, which fixes `σ = (n / 2) / sqrt(-2 ln ε)`.
    Gaussian {
        #[serde(default = "default_epsilon")]
        epsilon: f32,
    },
    /// Box filter, every coefficient `1 / n²`.
    Mean,
}

impl Default for FilterFamily {
    fn default() -> Self {
        FilterFamily::Gaussian {
            epsilon: DEFAULT_GAUSSIAN_EPSILON,
        }
    }
}

impl FilterFamily {
    pub fn gaussian() -> Self {
        Self::default()
    }

    /// Separable 1-D factor of the filter of size `n` (rounded to a valid size).
    pub fn separable(self, n: usize) -> SeparableKernel {
        let n = odd_filter_size(n);
        match self {
            FilterFamily::Gaussian { epsilon } => {
                let sigma = gaussian_sigma(n, epsilon);
                let two_sigma2 = 2.0 * sigma * sigma;
                let r = (n / 2) as i64;
                let taps = (-r..=r)
                    .map(|d| (-((d * d) as f64) / two_sigma2).exp() as f32)
                    .collect();
                SeparableKernel::normalized(taps)
            }
            FilterFamily::Mean => SeparableKernel::normalized(vec![1.0; n]),
        }
    }

    /// Separable factor of size `n` folded onto the mirror period of a signal
    /// of length `len`; the radius of the result is `min(n / 2, len)`.
    pub fn folded(self, n: usize, len: usize) -> SeparableKernel {
        let n = odd_filter_size(n);
        let r = n / 2;
        if len == 0 || r <= len {
            return self.separable(n);
        }
        let period = 2 * len;
        let classes = match self {
            FilterFamily::Gaussian { epsilon }
                if (r as u128) <= FOLD_DIRECT_LIMIT as u128 * period as u128 =>
            {
                let sigma = gaussian_sigma(n, epsilon);
                let two_sigma2 = 2.0 * sigma * sigma;
                let mut acc = vec![0.0f64; period];
                let r = r as i64;
                for d in -r..=r {
                    acc[d.rem_euclid(period as i64) as usize] +=
                        (-((d as f64) * (d as f64)) / two_sigma2).exp();
                }
                acc
            }
            // Box taps, and Gaussians so wide that their periodic sum is flat:
            // every class weighs its number of members.
            _ => (0..period)
                .map(|m| class_count(r, m, period) as f64)
                .collect(),
        };
        let taps = (0..=period)
            .map(|i| {
                let m = (i + len) % period;
                if i == 0 || i == period {
                    // offsets -len and +len fall in the same class
                    (classes[m] / 2.0) as f32
                } else {
                    classes[m] as f32
                }
            })
            .collect();
        SeparableKernel::normalized(taps)
    }

    /// Full 2-D coefficients of the filter of size `n`, unit sum.
    pub fn kernel(self, n: usize) -> KernelFilter {
        KernelFilter::from_separable(&self.separable(n))
    }
}

/// Kernels whose radius exceeds this many mirror periods are folded in closed
/// form. A Gaussian that wide is treated as flat over its support; only its
/// epsilon-level tails deviate from that.
const FOLD_DIRECT_LIMIT: usize = 64;

/// Offsets `d` in `[-r, r]` with `d ≡ m (mod period)`.
fn class_count(r: usize, m: usize, period: usize) -> u128 {
    let (r, m, p) = (r as i128, m as i128, period as i128);
    ((r - m).div_euclid(p) - (-r - 1 - m).div_euclid(p)) as u128
}

/// Standard deviation of a Gaussian whose outer tap at distance `n / 2` has
/// relative amplitude `epsilon`.
pub fn gaussian_sigma(n: usize, epsilon: f32) -> f64 {
    let eps = (epsilon.abs() as f64).clamp(1e-12, 0.999_999);
    let half = (odd_filter_size(n) / 2) as f64;
    half / (-2.0 * eps.ln()).sqrt()
}

/// Round a requested kernel size to the nearest valid one: odd and `>= 3`.
pub fn odd_filter_size(n: usize) -> usize {
    if n < 3 {
        3
    } else {
        n | 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convolution::mirror_index;

    #[test]
    fn sizes_are_rounded_to_odd_values() {
        assert_eq!(odd_filter_size(0), 3);
        assert_eq!(odd_filter_size(2), 3);
        assert_eq!(odd_filter_size(3), 3);
        assert_eq!(odd_filter_size(4), 5);
        assert_eq!(odd_filter_size(17), 17);
        assert_eq!(FilterFamily::Mean.separable(6).size(), 7);
    }

    #[test]
    fn gaussian_taps_are_normalised_and_symmetric() {
        let k = FilterFamily::gaussian().separable(9);
        let taps = k.taps();
        let sum: f32 = taps.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6, "sum={sum}");
        for i in 0..taps.len() / 2 {
            assert!((taps[i] - taps[taps.len() - 1 - i]).abs() < 1e-7);
            assert!(taps[i] < taps[i + 1], "taps must increase towards centre");
        }
        // outermost tap sits at epsilon relative to the centre
        let ratio = taps[0] / taps[4];
        assert!((ratio - 0.01).abs() < 1e-4, "ratio={ratio}");
    }

    #[test]
    fn mean_kernel_is_flat() {
        let k = FilterFamily::Mean.kernel(5);
        assert_eq!(k.size(), 5);
        for &c in k.coefficients() {
            assert!((c - 1.0 / 25.0).abs() < 1e-7);
        }
        assert!((k.weight() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn two_dimensional_kernel_is_outer_product_of_separable_factor() {
        let family = FilterFamily::gaussian();
        let h = family.separable(7);
        let k = family.kernel(7);
        for y in 0..7 {
            for x in 0..7 {
                assert!((k.get(x, y) - h.taps()[x] * h.taps()[y]).abs() < 1e-7);
            }
        }
        assert!((k.weight() - 1.0).abs() < 1e-5);
    }

    fn mirrored_convolution(signal: &[f32], taps: &[f32]) -> Vec<f32> {
        let r = taps.len() as isize / 2;
        (0..signal.len() as isize)
            .map(|x| {
                taps.iter()
                    .enumerate()
                    .map(|(k, &t)| {
                        t as f64 * signal[mirror_index(x + k as isize - r, signal.len())] as f64
                    })
                    .sum::<f64>() as f32
            })
            .collect()
    }

    #[test]
    fn folding_onto_the_mirror_period_preserves_the_result() {
        let signal = [0.1f32, 0.9, 0.4, 0.0, 0.7];
        for family in [FilterFamily::gaussian(), FilterFamily::Mean] {
            let full = family.separable(41);
            let folded = family.folded(41, signal.len());
            assert_eq!(folded.size(), 2 * signal.len() + 1);
            let a = mirrored_convolution(&signal, full.taps());
            let b = mirrored_convolution(&signal, folded.taps());
            for (x, y) in a.iter().zip(&b) {
                assert!((x - y).abs() < 1e-6, "{family:?}: full={x} folded={y}");
            }
        }
        // narrow kernels are left alone
        assert_eq!(FilterFamily::Mean.folded(5, 8), FilterFamily::Mean.separable(5));
    }

    #[test]
    fn huge_kernels_fold_to_the_period() {
        for family in [FilterFamily::gaussian(), FilterFamily::Mean] {
            let k = family.folded(usize::MAX, 4);
            let taps = k.taps();
            assert_eq!(taps.len(), 9);
            let sum: f32 = taps.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
            assert!(taps.iter().all(|&t| t >= 0.0));
            for i in 0..taps.len() / 2 {
                assert!((taps[i] - taps[taps.len() - 1 - i]).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn filter_family_deserializes_with_defaults() {
        let f: FilterFamily = serde_json::from_str(r#"{"kind":"gaussian"}"#).unwrap();
        assert_eq!(f, FilterFamily::gaussian());
        let m: FilterFamily = serde_json::from_str(r#"{"kind":"mean"}"#).unwrap();
        assert_eq!(m, FilterFamily::Mean);
    }
}
