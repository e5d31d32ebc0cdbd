use crate::error::Result;
use crate::image::{Image, ImageF32, Sample};

/// One multiscale layer: a floating-point plane per image channel, all with
/// the dimensions of the transformed image.
///
/// An empty layer (no planes) is a slot that was disabled, deleted, or not
/// yet computed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layer {
    planes: Vec<ImageF32>,
}

impl Layer {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_planes(planes: Vec<ImageF32>) -> Self {
        Self { planes }
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    pub fn channels(&self) -> usize {
        self.planes.len()
    }

    pub fn width(&self) -> usize {
        self.planes.first().map_or(0, |p| p.w)
    }

    pub fn height(&self) -> usize {
        self.planes.first().map_or(0, |p| p.h)
    }

    /// `(width, height, channels)`
    pub fn geometry(&self) -> (usize, usize, usize) {
        (self.width(), self.height(), self.channels())
    }

    pub fn plane(&self, c: usize) -> &ImageF32 {
        &self.planes[c]
    }

    pub fn planes(&self) -> &[ImageF32] {
        &self.planes
    }

    pub(crate) fn push_plane(&mut self, plane: ImageF32) {
        self.planes.push(plane);
    }

    /// Release the layer's memory.
    pub fn free(&mut self) {
        self.planes = Vec::new();
    }

    pub fn scale(&mut self, k: f32) {
        for p in &mut self.planes {
            p.scale(k);
        }
    }

    /// Convert to a sample image; integer types clamp to `[0, 1]`.
    pub fn to_image<T: Sample>(&self) -> Result<Image<T>> {
        Image::from_planes(&self.planes)
    }
}
