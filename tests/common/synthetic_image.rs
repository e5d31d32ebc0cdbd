use multiscale_transform::image::Image;

/// Diagonal ramp `(x + y) / (w + h)` in `[0, 1)`.
pub fn ramp_f32(width: usize, height: usize) -> Image<f32> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    let denom = (width + height) as f32;
    Image::from_fn(width, height, |x, y| (x + y) as f32 / denom)
}

/// Smooth waves plus a checkerboard, so every scale carries some energy.
pub fn pattern_f32(width: usize, height: usize, cell: usize) -> Image<f32> {
    assert!(cell > 0, "cell size must be positive");
    Image::from_fn(width, height, |x, y| {
        let wave = 0.25
            * ((x as f32 * 0.21).sin() * (y as f32 * 0.13).cos() + 1.0);
        let check = if ((x / cell) + (y / cell)) & 1 == 0 { 0.1 } else { 0.4 };
        (wave + check).clamp(0.0, 1.0)
    })
}

/// High-contrast 8-bit checkerboard.
pub fn checkerboard_u8(width: usize, height: usize, cell: usize) -> Image<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    assert!(cell > 0, "cell size must be positive");
    Image::from_fn(width, height, |x, y| {
        if ((x / cell) + (y / cell)) & 1 == 0 {
            32u8
        } else {
            220u8
        }
    })
}

/// 16-bit gradient with a bright square in the middle.
pub fn square_u16(width: usize, height: usize) -> Image<u16> {
    Image::from_fn(width, height, |x, y| {
        let inside = x > width / 4 && x < 3 * width / 4 && y > height / 4 && y < 3 * height / 4;
        if inside {
            60000
        } else {
            ((x * 997 + y * 131) % 20000) as u16
        }
    })
}

/// Three-channel planar image: ramp, pattern and their difference.
pub fn rgb_f32(width: usize, height: usize) -> Image<f32> {
    let r = ramp_f32(width, height);
    let g = pattern_f32(width, height, 5);
    let mut data = Vec::with_capacity(3 * width * height);
    data.extend_from_slice(&r.data);
    data.extend_from_slice(&g.data);
    data.extend(r.data.iter().zip(&g.data).map(|(a, b)| (a - b).abs()));
    Image::from_vec(width, height, 3, data).expect("planar buffer has the right length")
}

/// Largest absolute per-sample difference.
pub fn max_abs_diff(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "buffers must have the same length");
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0f32, f32::max)
}
