//! Numeric sample encodings accepted at the transform boundary.
//!
//! Integer samples are normalised to `[0, 1]` on ingestion (`v / (2^bits - 1)`),
//! floating-point samples pass through unchanged. All processing happens on
//! `f32` planes; conversion back only happens when a reconstruction is
//! requested in a specific sample type.
use serde::{Deserialize, Serialize};

/// Tag describing how samples are stored in a raw buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SampleFormat {
    UInt8,
    UInt16,
    UInt32,
    Float32,
    Float64,
    /// Interleaved (re, im) f32 pairs. Rejected by the transform.
    Complex32,
    /// Interleaved (re, im) f64 pairs. Rejected by the transform.
    Complex64,
}

impl SampleFormat {
    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleFormat::UInt8 => 1,
            SampleFormat::UInt16 => 2,
            SampleFormat::UInt32 | SampleFormat::Float32 => 4,
            SampleFormat::Float64 | SampleFormat::Complex32 => 8,
            SampleFormat::Complex64 => 16,
        }
    }

    /// Whether the multiscale transform can ingest this encoding.
    pub fn is_supported(self) -> bool {
        !matches!(self, SampleFormat::Complex32 | SampleFormat::Complex64)
    }
}

/// A real-valued sample type convertible to and from the working `f32`.
pub trait Sample: Copy + Send + Sync + 'static {
    const FORMAT: SampleFormat;
    const ZERO: Self;

    fn to_f32(self) -> f32;

    /// Inverse of [`Sample::to_f32`]; integer types clamp to `[0, 1]` and round.
    fn from_f32(v: f32) -> Self;

    fn from_le_bytes(bytes: &[u8]) -> Self;
}

macro_rules! integer_sample {
    ($t:ty, $fmt:ident) => {
        impl Sample for $t {
            const FORMAT: SampleFormat = SampleFormat::$fmt;
            const ZERO: Self = 0;

            #[inline]
            fn to_f32(self) -> f32 {
                (self as f64 / <$t>::MAX as f64) as f32
            }

            #[inline]
            fn from_f32(v: f32) -> Self {
                let v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) as f64 };
                (v * <$t>::MAX as f64).round() as $t
            }

            #[inline]
            fn from_le_bytes(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$t>()];
                raw.copy_from_slice(bytes);
                <$t>::from_le_bytes(raw)
            }
        }
    };
}

integer_sample!(u8, UInt8);
integer_sample!(u16, UInt16);
integer_sample!(u32, UInt32);

impl Sample for f32 {
    const FORMAT: SampleFormat = SampleFormat::Float32;
    const ZERO: Self = 0.0;

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }
    #[inline]
    fn from_f32(v: f32) -> Self {
        v
    }
    #[inline]
    fn from_le_bytes(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(bytes);
        f32::from_le_bytes(raw)
    }
}

impl Sample for f64 {
    const FORMAT: SampleFormat = SampleFormat::Float64;
    const ZERO: Self = 0.0;

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }
    #[inline]
    fn from_f32(v: f32) -> Self {
        v as f64
    }
    #[inline]
    fn from_le_bytes(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        f64::from_le_bytes(raw)
    }
}
