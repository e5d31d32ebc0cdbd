use super::scaling::ScalingSequence;
use crate::convolution::ConvolutionOptions;
use crate::kernel::FilterFamily;
use crate::parallel::{available_processors, ParallelDriver};

use serde::{Deserialize, Serialize};

/// Default number of detail layers.
pub const DEFAULT_LAYERS: usize = 4;

/// Construction parameters of a [`MultiscaleLinearTransform`].
///
/// `TransformOptions::default()` holds the process-wide defaults; there is
/// no other source of implicit configuration.
///
/// [`MultiscaleLinearTransform`]: super::MultiscaleLinearTransform
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransformOptions {
    /// Number of detail layers N (>= 1); the transform yields N + 1 layers.
    pub layers: usize,
    pub scaling: ScalingSequence,
    pub filter: FilterFamily,
    /// Split each filtering pass across worker threads.
    pub parallel: bool,
    /// Upper bound on worker threads per pass.
    pub max_processors: usize,
    pub convolution: ConvolutionOptions,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            layers: DEFAULT_LAYERS,
            scaling: ScalingSequence::Dyadic,
            filter: FilterFamily::default(),
            parallel: true,
            max_processors: available_processors(),
            convolution: ConvolutionOptions::default(),
        }
    }
}

impl TransformOptions {
    pub fn new(layers: usize) -> Self {
        Self {
            layers: layers.max(1),
            ..Self::default()
        }
    }

    pub fn with_scaling(mut self, scaling: ScalingSequence) -> Self {
        self.scaling = scaling;
        self
    }

    pub fn with_filter(mut self, filter: FilterFamily) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_parallel(mut self, parallel: bool, max_processors: usize) -> Self {
        self.parallel = parallel;
        if max_processors > 0 {
            self.max_processors = max_processors;
        }
        self
    }

    pub fn with_convolution(mut self, convolution: ConvolutionOptions) -> Self {
        self.convolution = convolution;
        self
    }

    /// Clamp out-of-range values to the nearest valid ones.
    pub(crate) fn sanitized(mut self) -> Self {
        self.layers = self.layers.max(1);
        self.max_processors = self.max_processors.max(1);
        self.convolution.min_rows_per_worker = self.convolution.min_rows_per_worker.max(1);
        self
    }

    pub(crate) fn driver(&self) -> ParallelDriver {
        ParallelDriver::new(
            self.parallel,
            self.max_processors,
            self.convolution.min_rows_per_worker,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let opts: TransformOptions =
            serde_json::from_str(r#"{"layers":6,"filter":{"kind":"mean"}}"#).unwrap();
        assert_eq!(opts.layers, 6);
        assert_eq!(opts.filter, FilterFamily::Mean);
        assert_eq!(opts.scaling, ScalingSequence::Dyadic);
        assert!(opts.parallel);
    }

    #[test]
    fn sanitizing_clamps_zero_values() {
        let opts = TransformOptions {
            layers: 0,
            max_processors: 0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(opts.layers, 1);
        assert_eq!(opts.max_processors, 1);
    }
}
