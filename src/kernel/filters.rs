/// Trait implemented by separable 1D filters consumed by the convolution code.
pub trait SeparableFilter {
    /// Return the 1D taps (in left-to-right order). Length is odd; the centre
    /// tap is at index `taps().len() / 2`.
    fn taps(&self) -> &[f32];

    #[inline]
    fn radius(&self) -> usize {
        self.taps().len() / 2
    }

    #[inline]
    fn size(&self) -> usize {
        self.taps().len()
    }
}

/// Owned, normalised 1-D kernel generated for one decomposition scale.
#[derive(Clone, Debug, PartialEq)]
pub struct SeparableKernel {
    taps: Vec<f32>,
}

impl SeparableKernel {
    /// Wrap raw taps, rescaling them to unit sum. A zero-sum tap vector is
    /// kept as is.
    pub fn normalized(mut taps: Vec<f32>) -> Self {
        debug_assert!(taps.len() % 2 == 1, "separable kernels have odd length");
        let sum: f64 = taps.iter().map(|&t| t as f64).sum();
        if sum != 0.0 {
            for t in &mut taps {
                *t = (*t as f64 / sum) as f32;
            }
        }
        Self { taps }
    }
}

impl SeparableFilter for SeparableKernel {
    #[inline]
    fn taps(&self) -> &[f32] {
        &self.taps
    }
}

/// Full 2-D kernel, `size × size` coefficients in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct KernelFilter {
    size: usize,
    coefficients: Vec<f32>,
}

impl KernelFilter {
    /// Outer product `h ⊗ h` of a separable kernel.
    pub fn from_separable(filter: &impl SeparableFilter) -> Self {
        let taps = filter.taps();
        let size = taps.len();
        let mut coefficients = Vec::with_capacity(size * size);
        for &hy in taps {
            coefficients.extend(taps.iter().map(|&hx| hx * hy));
        }
        Self { size, coefficients }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn coefficients(&self) -> &[f32] {
        &self.coefficients
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.coefficients[y * self.size + x]
    }

    /// Sum of all coefficients.
    pub fn weight(&self) -> f64 {
        self.coefficients.iter().map(|&c| c as f64).sum()
    }
}
