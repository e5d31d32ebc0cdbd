//! Redundant multiscale linear transform.
//!
//! The transform decomposes an image into N detail layers plus one residual
//! layer, all with the dimensions of the input:
//!
//! ```text
//! c_0 = image
//! c_{j+1} = K_j * c_j            (K_j: low-pass kernel of size 2 s_j + 1)
//! w_j     = c_j - c_{j+1}        (detail layer j, 0 <= j < N)
//! residual = c_N                 (layer N)
//! ```
//!
//! Summing every detail layer and the residual telescopes back to the input.
//! Disabled layers are simply not stored; they do not change the other
//! layers.
//!
//! Each pass is row-parallel (see [`crate::parallel`]); passes run strictly in
//! sequence, and channels are processed one after another. A failed or
//! cancelled run leaves the container with no layer data.

pub mod layer;
pub mod options;
pub mod scaling;

pub use layer::Layer;
pub use options::{TransformOptions, DEFAULT_LAYERS};
pub use scaling::{ScalingSequence, MAX_HALF_SIZE};

use crate::convolution::{convolve, ConvolutionOptions, ConvolutionStrategy};
use crate::diagnostics::{PassReport, TransformReport};
use crate::error::{Result, TransformError};
use crate::image::{Image, ImageF32, Sample, SampleFormat, SampleImage};
use crate::kernel::FilterFamily;
use crate::parallel::{ParallelDriver, StatusMonitor};
use log::debug;
use std::time::Instant;

/// Kernel and strategy chosen for one decomposition scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PassPlan {
    half_size: usize,
    kernel_size: usize,
    strategy: ConvolutionStrategy,
}

#[derive(Clone, Debug)]
pub struct MultiscaleLinearTransform {
    options: TransformOptions,
    layers: Vec<Layer>,
    enabled: Vec<bool>,
}

impl Default for MultiscaleLinearTransform {
    fn default() -> Self {
        Self::with_options(TransformOptions::default())
    }
}

impl MultiscaleLinearTransform {
    /// Transform with `n` detail layers (clamped to >= 1).
    pub fn new(n: usize, scaling: ScalingSequence, filter: FilterFamily) -> Self {
        Self::with_options(
            TransformOptions::new(n)
                .with_scaling(scaling)
                .with_filter(filter),
        )
    }

    pub fn with_options(options: TransformOptions) -> Self {
        let options = options.sanitized();
        let slots = options.layers + 1;
        Self {
            options,
            layers: vec![Layer::empty(); slots],
            enabled: vec![true; slots],
        }
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    /// Number of detail layers N, not counting the residual.
    pub fn number_of_layers(&self) -> usize {
        self.options.layers
    }

    /// Changes N; destroys all layers and re-enables every slot.
    pub fn set_number_of_layers(&mut self, n: usize) {
        self.options.layers = n.max(1);
        self.reset();
    }

    pub fn scaling_sequence(&self) -> ScalingSequence {
        self.options.scaling
    }

    /// Destroys all existing layers.
    pub fn set_scaling_sequence(&mut self, scaling: ScalingSequence) {
        self.destroy_layers();
        self.options.scaling = scaling;
    }

    pub fn filter_family(&self) -> FilterFamily {
        self.options.filter
    }

    /// Destroys all existing layers.
    pub fn set_filter_family(&mut self, filter: FilterFamily) {
        self.destroy_layers();
        self.options.filter = filter;
    }

    pub fn set_convolution_options(&mut self, convolution: ConvolutionOptions) {
        self.options.convolution = convolution;
        self.options = self.options.sanitized();
    }

    /// Kernel size for detail layer `j`.
    pub fn filter_size(&self, j: usize) -> usize {
        self.options.scaling.filter_size(j)
    }

    /// Kernel half-sizes `s_1 < s_2 < ... < s_N` of this transform.
    pub fn half_sizes(&self) -> Vec<usize> {
        self.options.scaling.half_sizes(self.options.layers)
    }

    pub fn is_parallel_processing_enabled(&self) -> bool {
        self.options.parallel
    }

    /// `max_processors == 0` keeps the current limit.
    pub fn enable_parallel_processing(&mut self, enable: bool, max_processors: usize) {
        self.options.parallel = enable;
        if enable && max_processors > 0 {
            self.set_max_processors(max_processors);
        }
    }

    pub fn max_processors(&self) -> usize {
        self.options.max_processors
    }

    pub fn set_max_processors(&mut self, n: usize) {
        self.options.max_processors = n.max(1);
    }

    fn validate_index(&self, i: usize) -> Result<()> {
        if i > self.options.layers {
            return Err(TransformError::LayerIndex {
                index: i,
                count: self.options.layers + 1,
            });
        }
        Ok(())
    }

    /// Layer `i`; `i == N` is the residual.
    pub fn layer(&self, i: usize) -> Result<&Layer> {
        self.validate_index(i)?;
        let layer = &self.layers[i];
        if layer.is_empty() {
            return Err(TransformError::MissingLayer(i));
        }
        Ok(layer)
    }

    pub fn layer_mut(&mut self, i: usize) -> Result<&mut Layer> {
        self.validate_index(i)?;
        let layer = &mut self.layers[i];
        if layer.is_empty() {
            return Err(TransformError::MissingLayer(i));
        }
        Ok(layer)
    }

    /// All slots, including empty ones, residual last.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Whether layer `i` holds computed data.
    pub fn is_layer(&self, i: usize) -> Result<bool> {
        self.validate_index(i)?;
        Ok(!self.layers[i].is_empty())
    }

    /// Free layer `i`; it is excluded from later reconstructions.
    pub fn delete_layer(&mut self, i: usize) -> Result<()> {
        self.layer_mut(i)?.free();
        Ok(())
    }

    /// Before a run, disabled layers are not stored. After a run, disabling
    /// only excludes the layer from reconstruction.
    pub fn enable_layer(&mut self, i: usize, enable: bool) -> Result<()> {
        self.validate_index(i)?;
        self.enabled[i] = enable;
        Ok(())
    }

    pub fn disable_layer(&mut self, i: usize) -> Result<()> {
        self.enable_layer(i, false)
    }

    pub fn is_layer_enabled(&self, i: usize) -> Result<bool> {
        self.validate_index(i)?;
        Ok(self.enabled[i])
    }

    /// Multiply layer `i` by `1 + k` for `k > 0` or by `1 / (1 - k)` for
    /// `k < 0`.
    pub fn bias_layer(&mut self, i: usize, k: f32) -> Result<()> {
        let layer = self.layer_mut(i)?;
        if k != 0.0 {
            layer.scale(if k > 0.0 { 1.0 + k } else { 1.0 / (1.0 - k) });
        }
        Ok(())
    }

    /// Hand the layer set to the caller, leaving empty slots behind.
    pub fn release_transform(&mut self) -> Vec<Layer> {
        let slots = self.options.layers + 1;
        std::mem::replace(&mut self.layers, vec![Layer::empty(); slots])
    }

    /// Destroy all layers and re-enable every slot.
    pub fn reset(&mut self) {
        self.destroy_layers();
        self.enabled = vec![true; self.options.layers + 1];
    }

    fn destroy_layers(&mut self) {
        self.layers = vec![Layer::empty(); self.options.layers + 1];
    }

    /// Decompose a runtime-typed image.
    pub fn transform_image(
        &mut self,
        image: &SampleImage,
        monitor: &dyn StatusMonitor,
    ) -> Result<TransformReport> {
        match image {
            SampleImage::UInt8(img) => self.transform(img, monitor),
            SampleImage::UInt16(img) => self.transform(img, monitor),
            SampleImage::UInt32(img) => self.transform(img, monitor),
            SampleImage::Float32(img) => self.transform(img, monitor),
            SampleImage::Float64(img) => self.transform(img, monitor),
        }
    }

    /// Decompose a raw little-endian planar buffer. Unsupported encodings are
    /// rejected before the current layers are touched.
    pub fn transform_bytes(
        &mut self,
        format: SampleFormat,
        w: usize,
        h: usize,
        channels: usize,
        bytes: &[u8],
        monitor: &dyn StatusMonitor,
    ) -> Result<TransformReport> {
        let image = SampleImage::from_le_bytes(format, w, h, channels, bytes)?;
        self.transform_image(&image, monitor)
    }

    /// Decompose `image`, replacing any previously held layers.
    ///
    /// On error (including [`TransformError::Aborted`]) every slot is left
    /// empty. A zero-area image returns immediately with no layers.
    pub fn transform<T: Sample>(
        &mut self,
        image: &Image<T>,
        monitor: &dyn StatusMonitor,
    ) -> Result<TransformReport> {
        self.destroy_layers();
        let start = Instant::now();
        let mut report = TransformReport {
            width: image.w,
            height: image.h,
            channels: image.channels,
            sample_format: T::FORMAT,
            detail_layers: self.options.layers,
            scaling: self.options.scaling,
            filter: self.options.filter,
            passes: Vec::new(),
            elapsed_ms: 0.0,
        };
        if image.is_empty() {
            debug!("MultiscaleLinearTransform: empty input, nothing to do");
            return Ok(report);
        }

        let plan = self.plan(image.w, image.h);
        let per_channel: u64 = plan
            .iter()
            .map(|p| {
                p.strategy.progress_steps(
                    image.w,
                    image.h,
                    p.half_size.min(image.w),
                    p.half_size.min(image.h),
                )
            })
            .sum();
        monitor.initialize(per_channel * image.channels as u64);

        match self.decompose(image, &plan, monitor, &mut report.passes) {
            Ok(layers) => {
                self.layers = layers;
                monitor.complete();
                report.elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
                debug!(
                    "MultiscaleLinearTransform: {}x{}x{} in {} passes, {:.3} ms",
                    image.w,
                    image.h,
                    image.channels,
                    report.passes.len(),
                    report.elapsed_ms
                );
                Ok(report)
            }
            Err(err) => {
                self.destroy_layers();
                debug!("MultiscaleLinearTransform: discarded partial layers ({err})");
                Err(err)
            }
        }
    }

    fn plan(&self, w: usize, h: usize) -> Vec<PassPlan> {
        (0..self.options.layers)
            .map(|j| {
                let half_size = self.options.scaling.half_size(j);
                let kernel_size = self.options.scaling.filter_size(j);
                PassPlan {
                    half_size,
                    kernel_size,
                    strategy: ConvolutionStrategy::select(
                        kernel_size,
                        w,
                        h,
                        &self.options.convolution,
                    ),
                }
            })
            .collect()
    }

    fn decompose<T: Sample>(
        &self,
        image: &Image<T>,
        plan: &[PassPlan],
        monitor: &dyn StatusMonitor,
        passes: &mut Vec<PassReport>,
    ) -> Result<Vec<Layer>> {
        let n = self.options.layers;
        let driver = self.options.driver();
        let mut layers = vec![Layer::empty(); n + 1];

        for c in 0..image.channels {
            if monitor.is_aborted() {
                return Err(TransformError::Aborted);
            }
            let mut cj0 = image.to_plane(c)?;
            for (j, pass) in plan.iter().enumerate() {
                if monitor.is_aborted() {
                    return Err(TransformError::Aborted);
                }
                let started = Instant::now();
                let cj = self.smooth(&cj0, pass, &driver, monitor)?;
                let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
                debug!(
                    "MultiscaleLinearTransform: channel {c} layer {j} s={} n={} {:?} workers={} {:.3} ms",
                    pass.half_size,
                    pass.kernel_size,
                    pass.strategy,
                    driver.number_of_workers(cj0.h),
                    elapsed_ms
                );
                passes.push(PassReport {
                    channel: c,
                    layer: j,
                    half_size: pass.half_size,
                    kernel_size: pass.kernel_size,
                    strategy: pass.strategy,
                    workers: driver.number_of_workers(cj0.h),
                    elapsed_ms,
                });

                let mut detail = std::mem::replace(&mut cj0, cj);
                if self.enabled[j] {
                    detail.sub_assign(&cj0);
                    layers[j].push_plane(detail);
                }
            }
            if self.enabled[n] {
                layers[n].push_plane(cj0);
            }
        }
        Ok(layers)
    }

    fn smooth(
        &self,
        src: &ImageF32,
        pass: &PassPlan,
        driver: &ParallelDriver,
        monitor: &dyn StatusMonitor,
    ) -> Result<ImageF32> {
        // Folded per axis, so the cost of a pass is bounded by the image size.
        let horizontal = self.options.filter.folded(pass.kernel_size, src.w);
        let vertical = self.options.filter.folded(pass.kernel_size, src.h);
        convolve(src, &horizontal, &vertical, pass.strategy, driver, monitor)?
            .ok_or(TransformError::Aborted)
    }

    /// Inverse transform: per-channel sum of every enabled layer that holds
    /// data.
    pub fn reconstruct_planes(&self) -> Result<Vec<ImageF32>> {
        let mut acc: Option<Vec<ImageF32>> = None;
        for (i, layer) in self.layers.iter().enumerate() {
            if !self.enabled[i] || layer.is_empty() {
                continue;
            }
            match acc.as_mut() {
                None => {
                    let planes = layer
                        .planes()
                        .iter()
                        .map(ImageF32::try_clone)
                        .collect::<Result<Vec<_>>>()?;
                    acc = Some(planes);
                }
                Some(sum) => {
                    let expected = (sum[0].w, sum[0].h, sum.len());
                    if layer.geometry() != expected {
                        return Err(TransformError::DimensionMismatch {
                            expected,
                            found: layer.geometry(),
                        });
                    }
                    for (dst, src) in sum.iter_mut().zip(layer.planes()) {
                        dst.add_assign(src);
                    }
                }
            }
        }
        acc.ok_or(TransformError::NoLayers)
    }

    /// Inverse transform as an `f32` image.
    pub fn reconstruct(&self) -> Result<Image<f32>> {
        self.reconstruct_as()
    }

    /// Inverse transform converted to the sample type `T`; integer types
    /// clamp to `[0, 1]` before scaling.
    pub fn reconstruct_as<T: Sample>(&self) -> Result<Image<T>> {
        Image::from_planes(&self.reconstruct_planes()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::SilentMonitor;

    fn ramp(w: usize, h: usize) -> Image<f32> {
        Image::from_fn(w, h, |x, y| (x + y) as f32 / (w + h) as f32)
    }

    #[test]
    fn layer_count_is_fixed_by_depth() {
        for n in [1, 3, 5] {
            let mut t = MultiscaleLinearTransform::new(n, ScalingSequence::Dyadic, FilterFamily::Mean);
            t.transform(&ramp(9, 7), &SilentMonitor).unwrap();
            assert_eq!(t.layers().len(), n + 1);
            assert!(t.layers().iter().all(|l| l.geometry() == (9, 7, 1)));
        }
    }

    #[test]
    fn index_validation() {
        let t = MultiscaleLinearTransform::default();
        assert!(matches!(
            t.layer(5),
            Err(TransformError::LayerIndex { index: 5, count: 5 })
        ));
        assert!(matches!(t.layer(4), Err(TransformError::MissingLayer(4))));
        assert!(!t.is_layer(0).unwrap());
    }

    #[test]
    fn empty_input_is_a_no_op() {
        let mut t = MultiscaleLinearTransform::default();
        let report = t.transform(&Image::<u8>::new(0, 16, 1), &SilentMonitor).unwrap();
        assert!(report.passes.is_empty());
        assert!(t.layers().iter().all(Layer::is_empty));
        assert!(matches!(t.reconstruct(), Err(TransformError::NoLayers)));
    }

    #[test]
    fn bias_scales_a_layer() {
        let mut t = MultiscaleLinearTransform::new(1, ScalingSequence::Dyadic, FilterFamily::Mean);
        t.transform(&ramp(8, 8), &SilentMonitor).unwrap();
        let before = t.layer(1).unwrap().plane(0).clone();
        t.bias_layer(1, 1.0).unwrap();
        let after = t.layer(1).unwrap().plane(0);
        for (a, b) in before.data.iter().zip(&after.data) {
            assert!((a * 2.0 - b).abs() < 1e-6);
        }
        t.bias_layer(1, -1.0).unwrap();
        let back = t.layer(1).unwrap().plane(0);
        for (a, b) in before.data.iter().zip(&back.data) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn parameter_changes_destroy_layers() {
        let mut t = MultiscaleLinearTransform::new(2, ScalingSequence::Dyadic, FilterFamily::Mean);
        t.transform(&ramp(8, 8), &SilentMonitor).unwrap();
        assert!(t.is_layer(0).unwrap());
        t.set_scaling_sequence(ScalingSequence::from_increment(2));
        assert!(!t.is_layer(0).unwrap());

        t.disable_layer(1).unwrap();
        t.set_number_of_layers(3);
        assert_eq!(t.layers().len(), 4);
        assert!(t.is_layer_enabled(1).unwrap());
    }

    #[test]
    fn release_hands_over_layers() {
        let mut t = MultiscaleLinearTransform::new(2, ScalingSequence::Dyadic, FilterFamily::Mean);
        t.transform(&ramp(6, 6), &SilentMonitor).unwrap();
        let layers = t.release_transform();
        assert_eq!(layers.len(), 3);
        assert!(layers.iter().all(|l| !l.is_empty()));
        assert!(t.layers().iter().all(Layer::is_empty));
    }

    #[test]
    fn deleted_layers_drop_out_of_reconstruction() {
        let mut t = MultiscaleLinearTransform::new(2, ScalingSequence::Dyadic, FilterFamily::Mean);
        let img = ramp(10, 10);
        t.transform(&img, &SilentMonitor).unwrap();
        let residual = t.layer(2).unwrap().plane(0).clone();
        t.delete_layer(0).unwrap();
        t.delete_layer(1).unwrap();
        let rec = t.reconstruct().unwrap();
        assert_eq!(rec.channel(0), residual.data.as_slice());
    }
}
