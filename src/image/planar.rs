//! Multi-channel image with planar (channel-major) storage.
//!
//! Channel `c` occupies `data[c * w * h .. (c + 1) * w * h]`, so every channel
//! converts to an [`ImageF32`] plane with a single contiguous copy.
use super::f32::{try_with_capacity, ImageF32};
use super::sample::{Sample, SampleFormat};
use crate::error::{Result, TransformError};

#[derive(Clone, Debug, PartialEq)]
pub struct Image<T: Sample> {
    pub w: usize,
    pub h: usize,
    pub channels: usize,
    pub data: Vec<T>,
}

impl<T: Sample> Image<T> {
    /// Zero-filled image.
    pub fn new(w: usize, h: usize, channels: usize) -> Self {
        Self {
            w,
            h,
            channels,
            data: vec![T::ZERO; w * h * channels],
        }
    }

    pub fn from_vec(w: usize, h: usize, channels: usize, data: Vec<T>) -> Result<Self> {
        let expected = w
            .checked_mul(h)
            .and_then(|n| n.checked_mul(channels))
            .unwrap_or(usize::MAX);
        if data.len() != expected {
            return Err(TransformError::InvalidBuffer {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            w,
            h,
            channels,
            data,
        })
    }

    /// Build a single-channel image by evaluating `f(x, y)`.
    pub fn from_fn(w: usize, h: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                data.push(f(x, y));
            }
        }
        Self {
            w,
            h,
            channels: 1,
            data,
        }
    }

    pub fn format(&self) -> SampleFormat {
        T::FORMAT
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0 || self.channels == 0
    }

    #[inline]
    pub fn plane_len(&self) -> usize {
        self.w * self.h
    }

    pub fn channel(&self, c: usize) -> &[T] {
        let n = self.plane_len();
        &self.data[c * n..(c + 1) * n]
    }

    pub fn channel_mut(&mut self, c: usize) -> &mut [T] {
        let n = self.plane_len();
        &mut self.data[c * n..(c + 1) * n]
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, c: usize) -> T {
        self.data[c * self.plane_len() + y * self.w + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, c: usize, v: T) {
        let i = c * self.plane_len() + y * self.w + x;
        self.data[i] = v;
    }

    /// Convert channel `c` to the working floating-point representation.
    pub fn to_plane(&self, c: usize) -> Result<ImageF32> {
        let mut data = try_with_capacity(self.plane_len())?;
        data.extend(self.channel(c).iter().map(|&v| v.to_f32()));
        ImageF32::from_vec(self.w, self.h, data)
    }

    /// Assemble an image from same-sized working planes, one per channel.
    pub fn from_planes(planes: &[ImageF32]) -> Result<Self> {
        let Some(first) = planes.first() else {
            return Ok(Self::new(0, 0, 0));
        };
        let (w, h) = (first.w, first.h);
        let mut data = try_with_capacity(w * h * planes.len())?;
        for plane in planes {
            if plane.w != w || plane.h != h {
                return Err(TransformError::DimensionMismatch {
                    expected: (w, h, planes.len()),
                    found: (plane.w, plane.h, planes.len()),
                });
            }
            data.extend(plane.data.iter().map(|&v| T::from_f32(v)));
        }
        Self::from_vec(w, h, planes.len(), data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planes_round_trip_through_u16() {
        let img = Image::<u16>::from_vec(2, 1, 2, vec![0, 65535, 32768, 1]).unwrap();
        let planes = vec![img.to_plane(0).unwrap(), img.to_plane(1).unwrap()];
        assert_eq!(planes[0].data, vec![0.0, 1.0]);
        let back = Image::<u16>::from_planes(&planes).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn mismatched_planes_are_rejected() {
        let planes = vec![ImageF32::new(2, 2), ImageF32::new(3, 2)];
        assert!(matches!(
            Image::<f32>::from_planes(&planes),
            Err(TransformError::DimensionMismatch { .. })
        ));
    }
}
