//! Serializable run reports for tools and tests.
use crate::convolution::ConvolutionStrategy;
use crate::image::SampleFormat;
use crate::kernel::FilterFamily;
use crate::transform::{MultiscaleLinearTransform, ScalingSequence};
use serde::{Deserialize, Serialize};

/// One filtering pass over one channel.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassReport {
    pub channel: usize,
    pub layer: usize,
    pub half_size: usize,
    pub kernel_size: usize,
    pub strategy: ConvolutionStrategy,
    pub workers: usize,
    pub elapsed_ms: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformReport {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub sample_format: SampleFormat,
    pub detail_layers: usize,
    pub scaling: ScalingSequence,
    pub filter: FilterFamily,
    pub passes: Vec<PassReport>,
    pub elapsed_ms: f64,
}

/// Summary statistics of one layer slot after a run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerReport {
    pub index: usize,
    pub residual: bool,
    pub enabled: bool,
    pub computed: bool,
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

impl LayerReport {
    /// One entry per layer slot of `transform`, residual last.
    pub fn summarize(transform: &MultiscaleLinearTransform) -> Vec<LayerReport> {
        let n = transform.number_of_layers();
        (0..=n)
            .map(|index| {
                let layer = transform.layer(index).ok();
                let (mut min, mut max, mut mean) = (0.0f32, 0.0f32, 0.0f32);
                if let Some(layer) = layer {
                    let mut lo = f32::INFINITY;
                    let mut hi = f32::NEG_INFINITY;
                    let mut sum = 0.0f32;
                    for plane in layer.planes() {
                        if let Some((a, b)) = plane.min_max() {
                            lo = lo.min(a);
                            hi = hi.max(b);
                        }
                        sum += plane.mean();
                    }
                    if lo <= hi {
                        min = lo;
                        max = hi;
                    }
                    mean = sum / layer.channels().max(1) as f32;
                }
                LayerReport {
                    index,
                    residual: index == n,
                    enabled: transform.is_layer_enabled(index).unwrap_or(false),
                    computed: layer.is_some(),
                    min,
                    max,
                    mean,
                }
            })
            .collect()
    }
}
