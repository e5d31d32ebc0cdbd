//! Owned single-plane f32 image in row-major layout.
//!
//! This is the working representation of the transform: every channel of an
//! input image is converted to one `ImageF32` and every layer plane is one.
//! Buffers are reserved fallibly so allocation failures surface as
//! [`TransformError::Allocation`] rather than aborting the process.
use crate::error::{Result, TransformError};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImageF32 {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Backing storage in row-major order, `w * h` samples
    pub data: Vec<f32>,
}

impl ImageF32 {
    /// Construct a zero-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0.0; w * h],
        }
    }

    /// Fallible variant of [`ImageF32::new`].
    pub fn try_new(w: usize, h: usize) -> Result<Self> {
        Ok(Self {
            w,
            h,
            data: try_zeroed(w * h)?,
        })
    }

    /// Wrap an existing buffer; `data.len()` must equal `w * h`.
    pub fn from_vec(w: usize, h: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != w * h {
            return Err(TransformError::InvalidBuffer {
                expected: w * h,
                actual: data.len(),
            });
        }
        Ok(Self { w, h, data })
    }

    /// Fallible clone, used when the engine snapshots a coarse plane.
    pub fn try_clone(&self) -> Result<Self> {
        let mut data = try_with_capacity(self.data.len())?;
        data.extend_from_slice(&self.data);
        Ok(Self {
            w: self.w,
            h: self.h,
            data,
        })
    }

    #[inline]
    /// Convert (x, y) to a linear index into `data`.
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }
    #[inline]
    /// Get the pixel value at (x, y).
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.idx(x, y)]
    }
    #[inline]
    /// Set the pixel value at (x, y).
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    pub fn same_size(&self, other: &ImageF32) -> bool {
        self.w == other.w && self.h == other.h
    }

    pub fn sub_assign(&mut self, other: &ImageF32) {
        debug_assert!(self.same_size(other));
        for (dst, &b) in self.data.iter_mut().zip(&other.data) {
            *dst -= b;
        }
    }

    pub fn add_assign(&mut self, other: &ImageF32) {
        debug_assert!(self.same_size(other));
        for (dst, &b) in self.data.iter_mut().zip(&other.data) {
            *dst += b;
        }
    }

    pub fn scale(&mut self, k: f32) {
        for v in &mut self.data {
            *v *= k;
        }
    }

    /// `(min, max)` over all samples, `None` for an empty plane.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let mut it = self.data.iter().copied();
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.data.iter().map(|&v| v as f64).sum();
        (sum / self.data.len() as f64) as f32
    }
}

impl crate::image::traits::ImageView for ImageF32 {
    type Pixel = f32;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn row(&self, y: usize) -> &[f32] {
        let start = y * self.w;
        &self.data[start..start + self.w]
    }
}

/// Reserve exactly `len` elements, reporting failure instead of aborting.
pub(crate) fn try_with_capacity<T>(len: usize) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| TransformError::Allocation {
            bytes: len.saturating_mul(std::mem::size_of::<T>()),
        })?;
    Ok(v)
}

pub(crate) fn try_zeroed(len: usize) -> Result<Vec<f32>> {
    let mut v = try_with_capacity(len)?;
    v.resize(len, 0.0);
    Ok(v)
}
