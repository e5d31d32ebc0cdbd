#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod diagnostics;
pub mod error;
pub mod image;
pub mod transform;

// Building blocks – public, but considered lower-level internals.
pub mod config;
pub mod convolution;
pub mod kernel;
pub mod parallel;

// --- High-level re-exports -------------------------------------------------

pub use crate::error::{Result, TransformError};
pub use crate::transform::{Layer, MultiscaleLinearTransform, ScalingSequence, TransformOptions};

pub use crate::diagnostics::{LayerReport, PassReport, TransformReport};
pub use crate::kernel::FilterFamily;
pub use crate::parallel::{ProgressCounter, SilentMonitor, StatusMonitor};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use multiscale_transform::prelude::*;
///
/// # fn main() -> Result<(), TransformError> {
/// let (w, h) = (256usize, 256usize);
/// let img = Image::from_fn(w, h, |x, y| ((x ^ y) & 0xff) as u8);
///
/// let mut mlt = MultiscaleLinearTransform::new(4, ScalingSequence::Dyadic, FilterFamily::gaussian());
/// let report = mlt.transform(&img, &SilentMonitor)?;
/// println!("passes={} elapsed_ms={:.3}", report.passes.len(), report.elapsed_ms);
/// let restored = mlt.reconstruct()?;
/// # let _ = restored;
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::{Image, ImageF32, SampleImage};
    pub use crate::{
        FilterFamily, MultiscaleLinearTransform, ScalingSequence, SilentMonitor,
        TransformError, TransformOptions,
    };
}
