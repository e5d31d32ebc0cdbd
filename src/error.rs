//! Error type shared by the transform, convolution and buffer code.
//!
//! Cancellation is a distinct variant so callers can tell an operator abort
//! apart from a genuine failure.

use crate::image::SampleFormat;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    /// The status monitor requested cancellation.
    #[error("process aborted")]
    Aborted,
    /// A working buffer could not be reserved.
    #[error("failed to allocate {bytes} bytes for a working buffer")]
    Allocation { bytes: usize },
    /// The sample encoding cannot be processed by the transform.
    #[error("unsupported sample format: {0:?}")]
    UnsupportedSampleFormat(SampleFormat),
    /// Raw buffer length disagrees with the declared geometry.
    #[error("invalid buffer length: expected {expected} elements, got {actual}")]
    InvalidBuffer { expected: usize, actual: usize },
    #[error("layer index {index} out of range (transform has {count} layers)")]
    LayerIndex { index: usize, count: usize },
    /// The layer was disabled, deleted or never computed.
    #[error("layer {0} has no data")]
    MissingLayer(usize),
    /// Reconstruction requested while no enabled layer holds data.
    #[error("transform holds no layer data")]
    NoLayers,
    #[error("layer geometry mismatch: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        expected: (usize, usize, usize),
        found: (usize, usize, usize),
    },
}

impl TransformError {
    /// True when the error reports a user-initiated cancellation.
    pub fn is_aborted(&self) -> bool {
        matches!(self, TransformError::Aborted)
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
