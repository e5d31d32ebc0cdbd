//! Tagged union over the supported sample encodings.
//!
//! Used where the sample type is only known at run time (raw byte buffers,
//! files decoded by the `image` crate). The transform dispatches on the tag
//! and converts to `f32` planes right away.
use super::planar::Image;
use super::sample::{Sample, SampleFormat};
use crate::error::{Result, TransformError};

#[derive(Clone, Debug, PartialEq)]
pub enum SampleImage {
    UInt8(Image<u8>),
    UInt16(Image<u16>),
    UInt32(Image<u32>),
    Float32(Image<f32>),
    Float64(Image<f64>),
}

impl SampleImage {
    /// Decode a tightly packed little-endian planar buffer.
    ///
    /// Complex encodings are rejected before the buffer is inspected.
    pub fn from_le_bytes(
        format: SampleFormat,
        w: usize,
        h: usize,
        channels: usize,
        bytes: &[u8],
    ) -> Result<Self> {
        if !format.is_supported() {
            return Err(TransformError::UnsupportedSampleFormat(format));
        }
        let expected = w
            .checked_mul(h)
            .and_then(|n| n.checked_mul(channels))
            .and_then(|n| n.checked_mul(format.bytes_per_sample()))
            .ok_or(TransformError::InvalidBuffer {
                expected: usize::MAX,
                actual: bytes.len(),
            })?;
        if bytes.len() != expected {
            return Err(TransformError::InvalidBuffer {
                expected,
                actual: bytes.len(),
            });
        }
        Ok(match format {
            SampleFormat::UInt8 => SampleImage::UInt8(decode(w, h, channels, bytes)?),
            SampleFormat::UInt16 => SampleImage::UInt16(decode(w, h, channels, bytes)?),
            SampleFormat::UInt32 => SampleImage::UInt32(decode(w, h, channels, bytes)?),
            SampleFormat::Float32 => SampleImage::Float32(decode(w, h, channels, bytes)?),
            SampleFormat::Float64 => SampleImage::Float64(decode(w, h, channels, bytes)?),
            SampleFormat::Complex32 | SampleFormat::Complex64 => {
                return Err(TransformError::UnsupportedSampleFormat(format))
            }
        })
    }

    pub fn format(&self) -> SampleFormat {
        match self {
            SampleImage::UInt8(_) => SampleFormat::UInt8,
            SampleImage::UInt16(_) => SampleFormat::UInt16,
            SampleImage::UInt32(_) => SampleFormat::UInt32,
            SampleImage::Float32(_) => SampleFormat::Float32,
            SampleImage::Float64(_) => SampleFormat::Float64,
        }
    }

    /// `(width, height, channels)`
    pub fn geometry(&self) -> (usize, usize, usize) {
        match self {
            SampleImage::UInt8(i) => (i.w, i.h, i.channels),
            SampleImage::UInt16(i) => (i.w, i.h, i.channels),
            SampleImage::UInt32(i) => (i.w, i.h, i.channels),
            SampleImage::Float32(i) => (i.w, i.h, i.channels),
            SampleImage::Float64(i) => (i.w, i.h, i.channels),
        }
    }
}

fn decode<T: Sample>(w: usize, h: usize, channels: usize, bytes: &[u8]) -> Result<Image<T>> {
    let size = T::FORMAT.bytes_per_sample();
    let data = bytes.chunks_exact(size).map(T::from_le_bytes).collect();
    Image::from_vec(w, h, channels, data)
}

impl From<Image<u8>> for SampleImage {
    fn from(img: Image<u8>) -> Self {
        SampleImage::UInt8(img)
    }
}

impl From<Image<u16>> for SampleImage {
    fn from(img: Image<u16>) -> Self {
        SampleImage::UInt16(img)
    }
}

impl From<Image<u32>> for SampleImage {
    fn from(img: Image<u32>) -> Self {
        SampleImage::UInt32(img)
    }
}

impl From<Image<f32>> for SampleImage {
    fn from(img: Image<f32>) -> Self {
        SampleImage::Float32(img)
    }
}

impl From<Image<f64>> for SampleImage {
    fn from(img: Image<f64>) -> Self {
        SampleImage::Float64(img)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_little_endian_u16() {
        let bytes = [0x00, 0x01, 0xff, 0xff];
        let img = SampleImage::from_le_bytes(SampleFormat::UInt16, 2, 1, 1, &bytes).unwrap();
        assert_eq!(img, SampleImage::UInt16(Image::from_vec(2, 1, 1, vec![256, 65535]).unwrap()));
        assert_eq!(img.geometry(), (2, 1, 1));
    }

    #[test]
    fn complex_buffers_are_rejected_up_front() {
        let err = SampleImage::from_le_bytes(SampleFormat::Complex32, 4, 4, 1, &[]).unwrap_err();
        assert!(matches!(
            err,
            TransformError::UnsupportedSampleFormat(SampleFormat::Complex32)
        ));
    }

    #[test]
    fn overflowing_geometry_is_rejected() {
        let err = SampleImage::from_le_bytes(SampleFormat::UInt16, usize::MAX, 2, 1, &[0; 4])
            .unwrap_err();
        assert!(matches!(
            err,
            TransformError::InvalidBuffer {
                expected: usize::MAX,
                actual: 4
            }
        ));
        assert!(SampleImage::from_le_bytes(SampleFormat::Float64, usize::MAX / 2, 3, 1, &[]).is_err());
    }

    #[test]
    fn short_buffers_are_rejected() {
        let err = SampleImage::from_le_bytes(SampleFormat::Float32, 2, 2, 1, &[0; 12]).unwrap_err();
        assert!(matches!(
            err,
            TransformError::InvalidBuffer {
                expected: 16,
                actual: 12
            }
        ));
    }
}
